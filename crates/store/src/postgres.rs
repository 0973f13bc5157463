use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CategoryId, DetailId, ProductId, TransactionId};
use domain::{
    Category, CategoryUpdate, Money, NewCategory, NewProduct, NewTransactionDetail, Product,
    ProductUpdate, Quantity, Transaction, TransactionDetail,
};
use sqlx::{PgPool, Postgres, Row, postgres::PgRow};

use crate::{
    Result, StoreError,
    store::{CatalogStore, SalesStore, UnitOfWork},
};

const PRODUCT_COLUMNS: &str = r#"
    SELECT p.id, p.name, p.price, p.stock, c.id AS category_id, c.name AS category_name
    FROM products p
    JOIN categories c ON c.id = p.category_id
"#;

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        let migrator = sqlx::migrate!("../../migrations");
        migrator.run(&self.pool).await?;
        tracing::info!(count = migrator.iter().count(), "database migrations applied");
        Ok(())
    }

    fn row_to_category(row: PgRow) -> Result<Category> {
        Ok(Category {
            id: CategoryId::new(row.try_get("id")?),
            name: row.try_get("name")?,
        })
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            price: Money::new(row.try_get("price")?),
            stock: row.try_get("stock")?,
            category: Category {
                id: CategoryId::new(row.try_get("category_id")?),
                name: row.try_get("category_name")?,
            },
        })
    }

    fn row_to_detail(row: &PgRow) -> Result<TransactionDetail> {
        let raw_quantity: i64 = row.try_get("quantity")?;
        let quantity = Quantity::new(raw_quantity).ok_or_else(|| {
            StoreError::CorruptRow(format!("detail quantity {raw_quantity} is not positive"))
        })?;

        Ok(TransactionDetail {
            id: DetailId::new(row.try_get("id")?),
            transaction_id: TransactionId::new(row.try_get("transaction_id")?),
            product_id: ProductId::new(row.try_get("product_id")?),
            product_name: row.try_get("product_name")?,
            quantity,
            subtotal: Money::new(row.try_get("subtotal")?),
        })
    }

    /// Maps a foreign key violation on `products.category_id` to a missing
    /// category.
    fn map_category_reference(e: sqlx::Error, category_id: CategoryId) -> StoreError {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_foreign_key_violation()
        {
            return StoreError::category_not_found(category_id);
        }
        StoreError::Database(e)
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name FROM categories ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_category).collect()
    }

    async fn get_category(&self, id: CategoryId) -> Result<Category> {
        let row = sqlx::query("SELECT id, name FROM categories WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Self::row_to_category(row),
            None => Err(StoreError::category_not_found(id)),
        }
    }

    async fn create_category(&self, category: NewCategory) -> Result<Category> {
        let row = sqlx::query("INSERT INTO categories (name) VALUES ($1) RETURNING id, name")
            .bind(&category.name)
            .fetch_one(&self.pool)
            .await?;

        Self::row_to_category(row)
    }

    async fn update_category(&self, id: CategoryId, update: CategoryUpdate) -> Result<Category> {
        let row = sqlx::query("UPDATE categories SET name = $2 WHERE id = $1 RETURNING id, name")
            .bind(id.as_i64())
            .bind(&update.name)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Self::row_to_category(row),
            None => Err(StoreError::category_not_found(id)),
        }
    }

    async fn delete_category(&self, id: CategoryId) -> Result<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return StoreError::CategoryInUse(id);
                }
                StoreError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::category_not_found(id));
        }
        Ok(())
    }

    async fn list_products(&self, name_filter: Option<&str>) -> Result<Vec<Product>> {
        let sql = format!(
            "{PRODUCT_COLUMNS} WHERE $1::TEXT IS NULL OR position(lower($1) in lower(p.name)) > 0 ORDER BY p.id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(name_filter)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn get_product(&self, id: ProductId) -> Result<Product> {
        let sql = format!("{PRODUCT_COLUMNS} WHERE p.id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Self::row_to_product(row),
            None => Err(StoreError::product_not_found(id)),
        }
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO products (name, price, stock, category_id) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&product.name)
        .bind(product.price.amount())
        .bind(product.stock)
        .bind(product.category_id.as_i64())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_category_reference(e, product.category_id))?;

        self.get_product(ProductId::new(id)).await
    }

    async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product> {
        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET name = $2, price = $3, stock = $4, category_id = COALESCE($5, category_id)
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id.as_i64())
        .bind(&update.name)
        .bind(update.price.amount())
        .bind(update.stock)
        .bind(update.category_id.map(|c| c.as_i64()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match update.category_id {
            Some(category_id) => Self::map_category_reference(e, category_id),
            None => StoreError::Database(e),
        })?;

        match updated {
            Some(_) => self.get_product(id).await,
            None => Err(StoreError::product_not_found(id)),
        }
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::product_not_found(id));
        }
        Ok(())
    }
}

#[async_trait]
impl SalesStore for PostgresStore {
    type Unit = PostgresUnit;

    async fn begin(&self) -> Result<PostgresUnit> {
        let tx = self.pool.begin().await?;
        Ok(PostgresUnit { tx })
    }

    async fn transactions_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        // Both reads must come from the same snapshot.
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let headers = sqlx::query(
            r#"
            SELECT id, total_amount, created_at
            FROM transactions
            WHERE created_at >= $1 AND created_at < $2
            ORDER BY id ASC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&mut *tx)
        .await?;

        let detail_rows = sqlx::query(
            r#"
            SELECT d.id, d.transaction_id, d.product_id, d.product_name, d.quantity, d.subtotal
            FROM transaction_details d
            JOIN transactions t ON t.id = d.transaction_id
            WHERE t.created_at >= $1 AND t.created_at < $2
            ORDER BY d.id ASC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut transactions = Vec::with_capacity(headers.len());
        let mut index = HashMap::with_capacity(headers.len());
        for row in headers {
            let id = TransactionId::new(row.try_get("id")?);
            index.insert(id, transactions.len());
            transactions.push(Transaction {
                id,
                total_amount: Money::new(row.try_get("total_amount")?),
                created_at: row.try_get("created_at")?,
                details: Vec::new(),
            });
        }
        for row in &detail_rows {
            let detail = Self::row_to_detail(row)?;
            let position = index.get(&detail.transaction_id).copied().ok_or_else(|| {
                StoreError::CorruptRow(format!(
                    "detail {} references unknown transaction {}",
                    detail.id, detail.transaction_id
                ))
            })?;
            transactions[position].details.push(detail);
        }

        tracing::debug!(
            %from,
            %to,
            transactions = transactions.len(),
            details = detail_rows.len(),
            "loaded committed transactions"
        );
        Ok(transactions)
    }
}

/// Unit of work over a [`PostgresStore`], backed by a database transaction.
///
/// `sqlx` rolls the transaction back when it is dropped uncommitted.
pub struct PostgresUnit {
    tx: sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PostgresUnit {
    async fn lock_products(&mut self, ids: &[ProductId]) -> Result<()> {
        let mut ids: Vec<i64> = ids.iter().map(|id| id.as_i64()).collect();
        ids.sort_unstable();
        ids.dedup();

        sqlx::query("SELECT id FROM products WHERE id = ANY($1) ORDER BY id ASC FOR UPDATE")
            .bind(&ids)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn product(&mut self, id: ProductId) -> Result<Product> {
        let sql = format!("{PRODUCT_COLUMNS} WHERE p.id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_i64())
            .fetch_optional(&mut *self.tx)
            .await?;

        match row {
            Some(row) => PostgresStore::row_to_product(row),
            None => Err(StoreError::product_not_found(id)),
        }
    }

    async fn decrement_stock(&mut self, id: ProductId, quantity: Quantity) -> Result<i64> {
        let remaining: Option<i64> =
            sqlx::query_scalar("UPDATE products SET stock = stock - $1 WHERE id = $2 RETURNING stock")
                .bind(i64::from(quantity.get()))
                .bind(id.as_i64())
                .fetch_optional(&mut *self.tx)
                .await?;

        remaining.ok_or(StoreError::product_not_found(id))
    }

    async fn insert_transaction(
        &mut self,
        total_amount: Money,
    ) -> Result<(TransactionId, DateTime<Utc>)> {
        let row = sqlx::query(
            "INSERT INTO transactions (total_amount) VALUES ($1) RETURNING id, created_at",
        )
        .bind(total_amount.amount())
        .fetch_one(&mut *self.tx)
        .await?;

        Ok((
            TransactionId::new(row.try_get("id")?),
            row.try_get("created_at")?,
        ))
    }

    async fn insert_detail(
        &mut self,
        transaction_id: TransactionId,
        detail: NewTransactionDetail,
    ) -> Result<TransactionDetail> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO transaction_details (transaction_id, product_id, product_name, quantity, subtotal)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(transaction_id.as_i64())
        .bind(detail.product_id.as_i64())
        .bind(&detail.product_name)
        .bind(i64::from(detail.quantity.get()))
        .bind(detail.subtotal.amount())
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(detail.into_detail(DetailId::new(id), transaction_id))
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
