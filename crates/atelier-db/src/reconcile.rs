//! # Reconciliation Engine
//!
//! The single writer of `materials.on_hand`: counted quantities land on the
//! registry only here, when a draft inventory count is finalized.
//!
//! ## Finalize Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                  finalize(count_id) — one transaction               │
//! │                                                                     │
//! │  1. Load the count header          → NotFound when absent           │
//! │  2. Check status                   → reject when already finalized  │
//! │  3. For each line with a Known ref → on_hand = counted (overwrite)  │
//! │  4. Flip status to 'finalized'     → guarded by status = 'draft'    │
//! │  5. Commit                                                          │
//! │                                                                     │
//! │  Freeform lines are recorded observations only; they never touch    │
//! │  the registry.                                                      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The write is last-write-wins: whatever was on the material before, the
//! counted quantity replaces it. Movements recorded between draft and
//! finalize are not folded in.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::inventory::{InventoryLineRow, INVENTORY_LINE_COLUMNS};
use crate::repository::material::MaterialRepository;
use atelier_core::{CountStatus, InventoryCount, Material};

/// Applies finalized counts to the material registry and answers the
/// low-stock question.
#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    pool: SqlitePool,
}

impl ReconciliationEngine {
    /// Creates a new ReconciliationEngine.
    pub fn new(pool: SqlitePool) -> Self {
        ReconciliationEngine { pool }
    }

    /// Finalizes a draft count, applying counted quantities to the registry.
    ///
    /// ## Semantics
    /// - Each line with a Known material ref overwrites that material's
    ///   on-hand with the counted quantity (last-write-wins).
    /// - Freeform lines are skipped; there is nothing to write to.
    /// - The whole operation is one transaction: either the status flips and
    ///   every registry write lands, or none do.
    ///
    /// ## Errors
    /// - [`DbError::NotFound`] when the count doesn't exist
    /// - [`DbError::CountAlreadyFinalized`] when it was finalized before;
    ///   the registry is left untouched
    pub async fn finalize(&self, count_id: &str) -> DbResult<InventoryCount> {
        debug!(count_id = %count_id, "Finalizing inventory count");

        let mut tx = self.pool.begin().await?;

        let count = sqlx::query_as::<_, InventoryCount>(
            r#"
            SELECT id, number, count_date, status, notes, created_at, finalized_at
            FROM inventory_counts
            WHERE id = ?1
            "#,
        )
        .bind(count_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("InventoryCount", count_id))?;

        if count.status == CountStatus::Finalized {
            warn!(count_id = %count_id, "Count is already finalized");
            return Err(DbError::CountAlreadyFinalized {
                id: count_id.to_string(),
            });
        }

        let sql = format!(
            "SELECT {INVENTORY_LINE_COLUMNS} FROM inventory_lines WHERE count_id = ?1 ORDER BY rowid"
        );
        let lines = sqlx::query_as::<_, InventoryLineRow>(&sql)
            .bind(count_id)
            .fetch_all(&mut *tx)
            .await?;

        let now = Utc::now();
        let mut applied = 0u32;

        for line in &lines {
            let Some(material_id) = &line.material_id else {
                continue;
            };

            sqlx::query(
                r#"
                UPDATE materials
                SET on_hand_milli = ?1, updated_at = ?2
                WHERE id = ?3
                "#,
            )
            .bind(line.counted_qty)
            .bind(now)
            .bind(material_id)
            .execute(&mut *tx)
            .await?;

            applied += 1;
        }

        // Guarded flip: a concurrent finalize that won the race leaves zero
        // rows to update here, and this transaction rolls back.
        let result = sqlx::query(
            r#"
            UPDATE inventory_counts
            SET status = 'finalized', finalized_at = ?1
            WHERE id = ?2 AND status = 'draft'
            "#,
        )
        .bind(now)
        .bind(count_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::CountAlreadyFinalized {
                id: count_id.to_string(),
            });
        }

        tx.commit().await?;

        info!(
            count_id = %count_id,
            number = %count.number,
            lines_applied = applied,
            "Inventory count finalized"
        );

        Ok(InventoryCount {
            status: CountStatus::Finalized,
            finalized_at: Some(now),
            ..count
        })
    }

    /// Returns active materials at or below their reorder threshold.
    ///
    /// Equality counts: a material sitting exactly on its threshold is
    /// already low.
    pub async fn low_stock(&self) -> DbResult<Vec<Material>> {
        MaterialRepository::new(self.pool.clone()).list_low_stock().await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::material::generate_material_id;
    use atelier_core::{
        MaterialKind, MaterialRef, Money, NewInventoryCount, NewInventoryLine, Quantity,
    };
    use chrono::NaiveDate;

    async fn seeded_material(db: &Database, name: &str, on_hand: i64, threshold: i64) -> String {
        let now = Utc::now();
        let id = generate_material_id();
        db.materials()
            .insert(&atelier_core::Material {
                id: id.clone(),
                name: name.to_string(),
                kind: MaterialKind::Fabric,
                code: None,
                unit: "m".to_string(),
                unit_cost: Money::from_cents(1500),
                on_hand: Quantity::from_units(on_hand),
                reorder_threshold: Quantity::from_units(threshold),
                storage_location: None,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        id
    }

    fn draft_with(lines: Vec<NewInventoryLine>) -> NewInventoryCount {
        NewInventoryCount {
            count_date: NaiveDate::from_ymd_opt(2026, 8, 25).unwrap(),
            notes: None,
            lines,
        }
    }

    #[tokio::test]
    async fn test_finalize_applies_counted_quantities() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mat_a = seeded_material(&db, "Denim", 10, 2).await;
        let mat_b = seeded_material(&db, "Lining", 5, 2).await;

        let count = db
            .inventory_counts()
            .create_draft(draft_with(vec![NewInventoryLine {
                material: MaterialRef::known(mat_a.clone(), "Denim"),
                unit: "m".to_string(),
                counted_qty: Quantity::from_units(7),
            }]))
            .await
            .unwrap();

        let finalized = db.reconciliation().finalize(&count.id).await.unwrap();
        assert_eq!(finalized.status, CountStatus::Finalized);
        assert!(finalized.finalized_at.is_some());

        // Counted material overwritten, uncounted material untouched.
        let a = db.materials().require(&mat_a).await.unwrap();
        assert_eq!(a.on_hand, Quantity::from_units(7));
        let b = db.materials().require(&mat_b).await.unwrap();
        assert_eq!(b.on_hand, Quantity::from_units(5));
    }

    #[tokio::test]
    async fn test_second_finalize_rejected_and_registry_unchanged() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mat = seeded_material(&db, "Denim", 10, 2).await;

        let count = db
            .inventory_counts()
            .create_draft(draft_with(vec![NewInventoryLine {
                material: MaterialRef::known(mat.clone(), "Denim"),
                unit: "m".to_string(),
                counted_qty: Quantity::from_units(7),
            }]))
            .await
            .unwrap();

        db.reconciliation().finalize(&count.id).await.unwrap();

        // On-hand drifts after the first finalize.
        db.materials()
            .set_on_hand(&mat, Quantity::from_units(42))
            .await
            .unwrap();

        let err = db.reconciliation().finalize(&count.id).await.unwrap_err();
        assert!(matches!(err, DbError::CountAlreadyFinalized { .. }));

        let material = db.materials().require(&mat).await.unwrap();
        assert_eq!(material.on_hand, Quantity::from_units(42));
    }

    #[tokio::test]
    async fn test_freeform_lines_never_touch_registry() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mat = seeded_material(&db, "Denim", 10, 2).await;

        let count = db
            .inventory_counts()
            .create_draft(draft_with(vec![NewInventoryLine {
                material: MaterialRef::freeform("Denim"),
                unit: "m".to_string(),
                counted_qty: Quantity::from_units(1),
            }]))
            .await
            .unwrap();

        db.reconciliation().finalize(&count.id).await.unwrap();

        // Name matches a registry row but the ref was freeform; no write.
        let material = db.materials().require(&mat).await.unwrap();
        assert_eq!(material.on_hand, Quantity::from_units(10));
    }

    #[tokio::test]
    async fn test_finalize_missing_count() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db.reconciliation().finalize("no-such-id").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_low_stock_after_finalize() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mat = seeded_material(&db, "Denim", 10, 3).await;

        assert!(db.reconciliation().low_stock().await.unwrap().is_empty());

        let count = db
            .inventory_counts()
            .create_draft(draft_with(vec![NewInventoryLine {
                material: MaterialRef::known(mat.clone(), "Denim"),
                unit: "m".to_string(),
                counted_qty: Quantity::from_units(3), // exactly on threshold
            }]))
            .await
            .unwrap();

        db.reconciliation().finalize(&count.id).await.unwrap();

        let low = db.reconciliation().low_stock().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].id, mat);
    }
}
