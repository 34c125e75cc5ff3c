//! # Settings Repository
//!
//! Restaurant settings records.
//!
//! Several settings rows can exist (drafts, older configurations). The
//! pricing engine only ever uses the one flagged both active and primary; if
//! more than one row carries both flags, the most recently updated wins.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use tavola_core::{CoreError, CoreResult, RestaurantSettings, SettingsSource};

/// Repository for restaurant settings.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Gets the active primary settings record.
    ///
    /// ## Returns
    /// * `Ok(Some(RestaurantSettings))` - Record found
    /// * `Ok(None)` - No record is both active and primary
    pub async fn find_active_primary(&self) -> DbResult<Option<RestaurantSettings>> {
        let settings = sqlx::query_as::<_, RestaurantSettings>(
            r#"
            SELECT
                id,
                name,
                CAST(box_fee AS REAL) AS box_fee,
                is_active,
                is_primary,
                created_at,
                updated_at
            FROM restaurant_settings
            WHERE is_active = 1 AND is_primary = 1
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        debug!(found = settings.is_some(), "Loaded active primary settings");
        Ok(settings)
    }

    /// Inserts a settings record.
    pub async fn insert(&self, settings: &RestaurantSettings) -> DbResult<()> {
        debug!(id = %settings.id, "Inserting restaurant settings");

        sqlx::query(
            r#"
            INSERT INTO restaurant_settings (
                id, name, box_fee, is_active, is_primary, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&settings.id)
        .bind(&settings.name)
        .bind(settings.box_fee)
        .bind(settings.is_active)
        .bind(settings.is_primary)
        .bind(settings.created_at)
        .bind(settings.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Clears the primary flag on every record and sets it on `id`.
    ///
    /// ## Returns
    /// * `Ok(true)` - `id` is now primary
    /// * `Ok(false)` - No record with that id
    pub async fn set_primary(&self, id: &str) -> DbResult<bool> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE restaurant_settings SET is_primary = 0 WHERE is_primary = 1")
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query(
            "UPDATE restaurant_settings SET is_primary = 1, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }
}

#[async_trait]
impl SettingsSource for SettingsRepository {
    async fn find_active_primary(&self) -> CoreResult<Option<RestaurantSettings>> {
        SettingsRepository::find_active_primary(self)
            .await
            .map_err(|e| CoreError::SettingsUnavailable(e.to_string()))
    }
}

/// Generates a new settings record ID.
pub fn generate_settings_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
