//! # Material Repository
//!
//! Database operations for the material registry.
//!
//! ## Ownership Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 Who writes materials.on_hand?                       │
//! │                                                                     │
//! │  Reconciliation engine ──► set_on_hand()   ← the ONLY caller        │
//! │                                                                     │
//! │  Movement journal      ──► (nothing)       ← advisory records only  │
//! │                                                                     │
//! │  adjust_on_hand() exists for a follow-up that wires movements to    │
//! │  debit/credit the registry; nothing calls it on the record path.    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Insert/update/soft-delete are the catalog-management boundary: the ledger
//! itself only reads rows and overwrites on-hand quantities.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use atelier_core::{Material, Quantity};

/// Column list shared by every material SELECT. The milli/cent columns are
/// aliased onto the domain field names so rows decode straight into
/// [`Material`].
const MATERIAL_COLUMNS: &str = r#"
    id,
    name,
    kind,
    code,
    unit,
    unit_cost_cents AS unit_cost,
    on_hand_milli AS on_hand,
    reorder_threshold_milli AS reorder_threshold,
    storage_location,
    is_active,
    created_at,
    updated_at
"#;

/// Repository for material registry operations.
#[derive(Debug, Clone)]
pub struct MaterialRepository {
    pool: SqlitePool,
}

impl MaterialRepository {
    /// Creates a new MaterialRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MaterialRepository { pool }
    }

    /// Gets a material by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Material))` - Material found
    /// * `Ok(None)` - Material not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Material>> {
        let sql = format!("SELECT {MATERIAL_COLUMNS} FROM materials WHERE id = ?1");

        let material = sqlx::query_as::<_, Material>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(material)
    }

    /// Gets a material by ID, failing explicitly when it does not exist.
    pub async fn require(&self, id: &str) -> DbResult<Material> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Material", id))
    }

    /// Lists active materials, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Material>> {
        let sql = format!("SELECT {MATERIAL_COLUMNS} FROM materials WHERE is_active = 1 ORDER BY name");

        let materials = sqlx::query_as::<_, Material>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(materials)
    }

    /// Lists active materials at or below their reorder threshold.
    ///
    /// The predicate is `on_hand <= reorder_threshold` (equality counts as
    /// low) and is recomputed on every call; nothing is cached and there is
    /// no hysteresis.
    pub async fn list_low_stock(&self) -> DbResult<Vec<Material>> {
        let sql = format!(
            r#"
            SELECT {MATERIAL_COLUMNS}
            FROM materials
            WHERE is_active = 1
              AND on_hand_milli <= reorder_threshold_milli
            ORDER BY name
            "#
        );

        let materials = sqlx::query_as::<_, Material>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = materials.len(), "Low-stock materials");
        Ok(materials)
    }

    /// Inserts a new material (catalog-management boundary).
    pub async fn insert(&self, material: &Material) -> DbResult<Material> {
        debug!(id = %material.id, name = %material.name, "Inserting material");

        sqlx::query(
            r#"
            INSERT INTO materials (
                id, name, kind, code, unit,
                unit_cost_cents, on_hand_milli, reorder_threshold_milli,
                storage_location, is_active, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8,
                ?9, ?10, ?11, ?12
            )
            "#,
        )
        .bind(&material.id)
        .bind(&material.name)
        .bind(material.kind)
        .bind(&material.code)
        .bind(&material.unit)
        .bind(material.unit_cost)
        .bind(material.on_hand)
        .bind(material.reorder_threshold)
        .bind(&material.storage_location)
        .bind(material.is_active)
        .bind(material.created_at)
        .bind(material.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(material.clone())
    }

    /// Updates an existing material's catalog fields.
    pub async fn update(&self, material: &Material) -> DbResult<()> {
        debug!(id = %material.id, "Updating material");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE materials SET
                name = ?2,
                kind = ?3,
                code = ?4,
                unit = ?5,
                unit_cost_cents = ?6,
                reorder_threshold_milli = ?7,
                storage_location = ?8,
                is_active = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(&material.id)
        .bind(&material.name)
        .bind(material.kind)
        .bind(&material.code)
        .bind(&material.unit)
        .bind(material.unit_cost)
        .bind(material.reorder_threshold)
        .bind(&material.storage_location)
        .bind(material.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Material", &material.id));
        }

        Ok(())
    }

    /// Overwrites a material's on-hand quantity.
    ///
    /// Last-write-wins assignment, not a delta. **Only the reconciliation
    /// engine calls this**: movements never touch on-hand, and the overwrite
    /// semantics make a re-application converge instead of double-counting.
    ///
    /// Non-negativity is not enforced here; a count can legitimately record
    /// drift that a later count corrects.
    pub async fn set_on_hand(&self, id: &str, quantity: Quantity) -> DbResult<Material> {
        debug!(id = %id, on_hand = %quantity, "Setting on-hand quantity");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE materials SET
                on_hand_milli = ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Material", id));
        }

        self.require(id).await
    }

    /// Applies a signed delta to a material's on-hand quantity.
    ///
    /// Kept for the follow-up that posts movements against the registry;
    /// the current record path does not call it (the bookkeeping split
    /// between journal and counts is intentional).
    pub async fn adjust_on_hand(&self, id: &str, delta: Quantity) -> DbResult<()> {
        debug!(id = %id, delta = %delta, "Adjusting on-hand quantity");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE materials SET
                on_hand_milli = on_hand_milli + ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Material", id));
        }

        Ok(())
    }

    /// Soft-deletes a material by setting is_active = false.
    ///
    /// Historical movement and count lines keep referencing the row.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting material");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE materials SET
                is_active = 0,
                updated_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Material", id));
        }

        Ok(())
    }

    /// Counts active materials (for diagnostics and the seed binary).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM materials WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new material ID.
pub fn generate_material_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
