//! # Product Repository
//!
//! Catalog reads for the pricing engine.
//!
//! ## Row Normalization
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  products row → tavola_core::Product                    │
//! │                                                                         │
//! │  Imported catalog rows are loosely typed:                              │
//! │                                                                         │
//! │   disable_box_fee   1 | 'true' | '1' | 0 | 'false' | NULL              │
//! │   price             8.5 | '8.50' | NULL                                │
//! │   options           '[{"name":"size","pricingMode":"override",...}]'   │
//! │                     | 'null' (no options)                              │
//! │       │                                                                 │
//! │       ▼   json_quote(column) in SQL → serde_json::Value                │
//! │       ▼   tavola_core::parse::{parse_flag, parse_amount}               │
//! │                                                                         │
//! │   disable_box_fee: bool   price: Amount   options: Vec<ProductOption>  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The SQLite value of each loose column is quoted as JSON by the query, so
//! rows go through exactly the same parsers as product documents.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tavola_core::parse::{parse_amount, parse_flag, parse_list};
use tavola_core::validation::{validate_price_amount, validate_product_name, validate_sku};
use tavola_core::{CoreResult, Product, ProductLookup, ProductOption};

/// Column list shared by every product query.
const PRODUCT_COLUMNS: &str = r#"
    id,
    sku,
    name,
    json_quote(price) AS price,
    json_quote(is_promotion) AS is_promotion,
    json_quote(promotion_price) AS promotion_price,
    json_quote(disable_box_fee) AS disable_box_fee,
    options
"#;

/// Raw `products` row before normalization.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    sku: String,
    name: String,
    price: String,
    is_promotion: String,
    promotion_price: String,
    disable_box_fee: String,
    options: String,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> DbResult<Self> {
        let price = serde_json::from_str::<Value>(&row.price)?;
        let is_promotion = serde_json::from_str::<Value>(&row.is_promotion)?;
        let promotion_price = serde_json::from_str::<Value>(&row.promotion_price)?;
        let disable_box_fee = serde_json::from_str::<Value>(&row.disable_box_fee)?;

        // Only text that is not JSON at all is corrupt; `null`, non-arrays
        // and undecodable entries mean "no such option".
        let options: Vec<ProductOption> = if row.options.trim().is_empty() {
            Vec::new()
        } else {
            let raw = serde_json::from_str::<Value>(&row.options)
                .map_err(|e| DbError::invalid_record("Product", &row.id, e))?;
            parse_list(raw)
        };

        Ok(Product {
            id: row.id,
            sku: row.sku,
            name: row.name,
            price: parse_amount(&price),
            is_promotion: parse_flag(&is_promotion),
            promotion_price: match promotion_price {
                Value::Null => None,
                other => Some(parse_amount(&other)),
            },
            disable_box_fee: parse_flag(&disable_box_fee),
            options,
        })
    }
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let products = repo.find_by_ids(&["p-1".into(), "p-2".into()]).await?;
/// let one = repo.get_by_id("p-1").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Bulk lookup by id.
    ///
    /// ## Returns
    /// Matching products in no particular order. Unknown ids are absent from
    /// the result; an empty `ids` returns an empty vector without a query.
    pub async fn find_by_ids(&self, ids: &[String]) -> DbResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        debug!(count = ids.len(), "Looking up products by id");

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT ");
        query.push(PRODUCT_COLUMNS);
        query.push(" FROM products WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(id.as_str());
        }
        separated.push_unseparated(")");

        let rows: Vec<ProductRow> = query.build_query_as().fetch_all(&self.pool).await?;

        debug!(found = rows.len(), "Product lookup returned rows");
        rows.into_iter().map(Product::try_from).collect()
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Product::try_from).transpose()
    }

    /// Inserts a product.
    ///
    /// ## Returns
    /// * `Ok(())` - Inserted
    /// * `Err(DbError::Validation)` - Bad SKU, name or negative price
    /// * `Err(DbError::Duplicate)` - Id already exists
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        validate_sku(&product.sku)?;
        validate_product_name(&product.name)?;
        validate_price_amount("price", product.price)?;
        if let Some(promo) = product.promotion_price {
            validate_price_amount("promotion_price", promo)?;
        }

        debug!(id = %product.id, sku = %product.sku, "Inserting product");

        let options = serde_json::to_string(&product.options)?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, name, price,
                is_promotion, promotion_price, disable_box_fee, options
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.price.value())
        .bind(product.is_promotion)
        .bind(product.promotion_price.map(|p| p.value()))
        .bind(product.disable_box_fee)
        .bind(options)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl ProductLookup for ProductRepository {
    async fn find_by_ids(&self, ids: &[String]) -> CoreResult<Vec<Product>> {
        Ok(ProductRepository::find_by_ids(self, ids).await?)
    }
}

/// Generates a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use tavola_core::{Amount, OptionChoice, PricingMode};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn pizza() -> Product {
        Product {
            id: "pizza-1".to_string(),
            sku: "PIZ-MARG".to_string(),
            name: "Margherita".to_string(),
            price: Amount::new(9.0),
            is_promotion: true,
            promotion_price: Some(Amount::new(7.5)),
            disable_box_fee: false,
            options: vec![ProductOption {
                name: "size".to_string(),
                pricing_mode: PricingMode::Override,
                choices: vec![OptionChoice {
                    code: "L".to_string(),
                    price: Amount::new(12.0),
                }],
            }],
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&pizza()).await.unwrap();

        let loaded = repo.get_by_id("pizza-1").await.unwrap().unwrap();
        assert_eq!(loaded, pizza());
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_by_ids_skips_unknown() {
        let db = test_db().await;
        let repo = db.products();
        repo.insert(&pizza()).await.unwrap();

        let mut cola = pizza();
        cola.id = "cola-1".to_string();
        cola.sku = "DRK-COLA".to_string();
        cola.options.clear();
        repo.insert(&cola).await.unwrap();

        let ids = vec!["pizza-1".to_string(), "nope".to_string(), "cola-1".to_string()];
        let mut found = repo.find_by_ids(&ids).await.unwrap();
        found.sort_by(|a, b| a.id.cmp(&b.id));

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, "cola-1");
        assert_eq!(found[1].id, "pizza-1");

        assert!(repo.find_by_ids(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_loose_columns_are_normalized() {
        let db = test_db().await;

        let rows = [
            ("a", "8.50", "0", "true"),
            ("b", "x", "TRUE", "1"),
            ("c", "3", "false", "0"),
        ];
        for (id, price, promo, opt_out) in rows {
            sqlx::query(
                "INSERT INTO products (id, price, is_promotion, disable_box_fee) VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(id)
            .bind(price)
            .bind(promo)
            .bind(opt_out)
            .execute(db.pool())
            .await
            .unwrap();
        }
        sqlx::query("INSERT INTO products (id, price, disable_box_fee) VALUES ('d', 2, 1)")
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO products (id, price) VALUES ('e', NULL)")
            .execute(db.pool())
            .await
            .unwrap();

        let repo = db.products();
        let get = |id: &'static str| {
            let repo = repo.clone();
            async move { repo.get_by_id(id).await.unwrap().unwrap() }
        };

        let a = get("a").await;
        assert_eq!(a.price.value(), 8.5);
        assert!(!a.is_promotion);
        assert!(a.disable_box_fee);

        let b = get("b").await;
        assert!(b.price.is_zero());
        assert!(b.is_promotion);
        assert!(b.disable_box_fee);

        let c = get("c").await;
        assert_eq!(c.price.value(), 3.0);
        assert!(!c.disable_box_fee);
        assert!(c.promotion_price.is_none());

        assert!(get("d").await.disable_box_fee);

        let e = get("e").await;
        assert!(e.price.is_zero());
        assert!(!e.disable_box_fee);
        assert!(e.options.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_options_fail_lookup() {
        let db = test_db().await;
        sqlx::query("INSERT INTO products (id, price, options) VALUES ('bad', 1, '{not json')")
            .execute(db.pool())
            .await
            .unwrap();

        let err = db.products().get_by_id("bad").await.unwrap_err();
        assert!(matches!(err, DbError::InvalidRecord { .. }));
    }

    #[tokio::test]
    async fn test_null_and_loose_options_decode() {
        let db = test_db().await;
        sqlx::query("INSERT INTO products (id, price, options) VALUES ('plain', 3, 'null')")
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query(
            r#"INSERT INTO products (id, price, options) VALUES ('numbered', 5,
               '[{"name":"size","pricingMode":"add","choices":[{"code":1,"price":2}]}, 7]')"#,
        )
        .execute(db.pool())
        .await
        .unwrap();

        let repo = db.products();
        let plain = repo.get_by_id("plain").await.unwrap().unwrap();
        assert!(plain.options.is_empty());

        let numbered = repo.get_by_id("numbered").await.unwrap().unwrap();
        assert_eq!(numbered.options.len(), 1);
        let choice = numbered.options[0].choice("1").unwrap();
        assert_eq!(choice.price, Amount::new(2.0));

        let found = repo
            .find_by_ids(&["plain".to_string(), "numbered".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_product() {
        let db = test_db().await;

        let mut bad = pizza();
        bad.sku = String::new();
        assert!(matches!(db.products().insert(&bad).await, Err(DbError::Validation(_))));

        let mut bad = pizza();
        bad.price = Amount::new(-1.0);
        assert!(matches!(db.products().insert(&bad).await, Err(DbError::Validation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_id_is_unique_violation() {
        let db = test_db().await;
        db.products().insert(&pizza()).await.unwrap();

        let err = db.products().insert(&pizza()).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));
    }
}
