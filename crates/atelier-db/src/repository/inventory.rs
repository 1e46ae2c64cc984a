//! # Inventory Count Repository
//!
//! Database operations for inventory counts and their lines.
//!
//! ## Count Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Inventory Count Lifecycle                       │
//! │                                                                     │
//! │  1. CREATE DRAFT (one transaction)                                  │
//! │     └── create_draft() → for each linked line, snapshot the         │
//! │         registry on-hand as system_qty; store                       │
//! │         difference = counted - system; INSERT header + lines        │
//! │                                                                     │
//! │  2. FINALIZE (reconciliation engine, one transaction)               │
//! │     └── apply counted quantities onto materials.on_hand,            │
//! │         status → finalized. Terminal; never reopened.               │
//! │                                                                     │
//! │  3. DELETE                                                          │
//! │     └── delete() → removes count and lines regardless of status,    │
//! │         WITHOUT reversing registry writes a finalize already made   │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The system snapshot is deliberately point-in-time: if the registry moves
//! between draft creation and finalization, the count still compares against
//! what the system believed on count day.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use atelier_core::validation::validate_inventory_line;
use atelier_core::{
    CountStatus, InventoryCount, InventoryLine, MaterialRef, NewInventoryCount, Quantity,
};

/// Persisted shape of an inventory line: the sum-typed [`MaterialRef`]
/// flattens into a nullable id plus a mandatory name.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct InventoryLineRow {
    pub id: String,
    pub count_id: String,
    pub material_id: Option<String>,
    pub material_name: String,
    pub unit: String,
    pub system_qty: Quantity,
    pub counted_qty: Quantity,
    pub difference: Quantity,
    pub created_at: DateTime<Utc>,
}

impl From<InventoryLineRow> for InventoryLine {
    fn from(row: InventoryLineRow) -> Self {
        InventoryLine {
            id: row.id,
            count_id: row.count_id,
            material: MaterialRef::from_parts(row.material_id, row.material_name),
            unit: row.unit,
            system_qty: row.system_qty,
            counted_qty: row.counted_qty,
            difference: row.difference,
            created_at: row.created_at,
        }
    }
}

/// SELECT list for inventory lines, aliased onto row-struct field names.
pub(crate) const INVENTORY_LINE_COLUMNS: &str = r#"
    id,
    count_id,
    material_id,
    material_name,
    unit,
    system_milli AS system_qty,
    counted_milli AS counted_qty,
    difference_milli AS difference,
    created_at
"#;

/// Repository for inventory count operations.
#[derive(Debug, Clone)]
pub struct InventoryCountRepository {
    pool: SqlitePool,
}

impl InventoryCountRepository {
    /// Creates a new InventoryCountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryCountRepository { pool }
    }

    /// Creates a draft count: header and all lines in one transaction.
    ///
    /// ## Snapshot Semantics
    /// For every line with a Known material ref, the material's current
    /// on-hand is captured as `system_qty` inside the same transaction.
    /// Registry changes after the draft exists do not refresh the snapshot.
    ///
    /// `difference = counted - system` is computed here and stored, not
    /// derived on read, so historical counts remain interpretable.
    ///
    /// A Known ref whose registry row no longer exists degrades to a
    /// freeform line (system zero) instead of failing the draft; the lookup
    /// is best-effort by design.
    pub async fn create_draft(&self, new: NewInventoryCount) -> DbResult<InventoryCount> {
        for line in &new.lines {
            validate_inventory_line(line)?;
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        // Number allocation shares the insert transaction, so two drafts
        // created on the same day cannot be handed the same sequence.
        let number = next_count_number(&mut tx, new.count_date).await?;

        debug!(id = %id, number = %number, lines = new.lines.len(), "Creating draft count");

        let count = InventoryCount {
            id: id.clone(),
            number,
            count_date: new.count_date,
            status: CountStatus::Draft,
            notes: new.notes,
            created_at: now,
            finalized_at: None,
        };

        sqlx::query(
            r#"
            INSERT INTO inventory_counts (
                id, number, count_date, status, notes, created_at, finalized_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&count.id)
        .bind(&count.number)
        .bind(count.count_date)
        .bind(count.status)
        .bind(&count.notes)
        .bind(count.created_at)
        .bind(count.finalized_at)
        .execute(&mut *tx)
        .await?;

        for line in &new.lines {
            let (material, system_qty) = match &line.material {
                MaterialRef::Known { id: mat_id, name } => {
                    let milli: Option<i64> =
                        sqlx::query_scalar("SELECT on_hand_milli FROM materials WHERE id = ?1")
                            .bind(mat_id)
                            .fetch_optional(&mut *tx)
                            .await?;

                    match milli {
                        Some(m) => (line.material.clone(), Quantity::from_milli(m)),
                        None => {
                            warn!(
                                material_id = %mat_id,
                                "Line references a missing material; storing as freeform"
                            );
                            (MaterialRef::freeform(name.clone()), Quantity::zero())
                        }
                    }
                }
                MaterialRef::Freeform { .. } => (line.material.clone(), Quantity::zero()),
            };

            let difference = line.counted_qty.diff_from(system_qty);

            sqlx::query(
                r#"
                INSERT INTO inventory_lines (
                    id, count_id, material_id, material_name, unit,
                    system_milli, counted_milli, difference_milli, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&count.id)
            .bind(material.material_id())
            .bind(material.name())
            .bind(&line.unit)
            .bind(system_qty)
            .bind(line.counted_qty)
            .bind(difference)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(count)
    }

    /// Gets a count header by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<InventoryCount>> {
        let count = sqlx::query_as::<_, InventoryCount>(
            r#"
            SELECT id, number, count_date, status, notes, created_at, finalized_at
            FROM inventory_counts
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(count)
    }

    /// Gets all lines for a count, in creation order.
    pub async fn get_lines(&self, count_id: &str) -> DbResult<Vec<InventoryLine>> {
        let sql = format!(
            "SELECT {INVENTORY_LINE_COLUMNS} FROM inventory_lines WHERE count_id = ?1 ORDER BY rowid"
        );

        let rows = sqlx::query_as::<_, InventoryLineRow>(&sql)
            .bind(count_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(InventoryLine::from).collect())
    }

    /// Gets a count with its lines, or None when the header is missing.
    pub async fn get_with_lines(
        &self,
        id: &str,
    ) -> DbResult<Option<(InventoryCount, Vec<InventoryLine>)>> {
        let Some(count) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let lines = self.get_lines(id).await?;
        Ok(Some((count, lines)))
    }

    /// Lists counts, newest count date first.
    pub async fn list(&self) -> DbResult<Vec<InventoryCount>> {
        let counts = sqlx::query_as::<_, InventoryCount>(
            r#"
            SELECT id, number, count_date, status, notes, created_at, finalized_at
            FROM inventory_counts
            ORDER BY count_date DESC, created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    /// Deletes a count and its lines, regardless of status.
    ///
    /// Registry writes an earlier finalize made are NOT reversed: the count
    /// record disappears but the applied quantities stand.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting inventory count");

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM inventory_lines WHERE count_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM inventory_counts WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("InventoryCount", id));
        }

        tx.commit().await?;
        Ok(())
    }
}

/// Allocates the next count number in format: INV-YYYYMMDD-NNNN
///
/// ## Format
/// - YYYYMMDD: the count date
/// - NNNN: per-day sequence, starting at 0001
///
/// ## Example
/// `INV-20260825-0003` for the third count taken on that date.
///
/// The sequence is derived from the highest number already stored for the
/// date, inside the caller's transaction; the UNIQUE constraint on
/// `inventory_counts.number` backstops it.
async fn next_count_number(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    count_date: NaiveDate,
) -> DbResult<String> {
    let prefix = format!("INV-{}-", count_date.format("%Y%m%d"));

    let highest: Option<String> =
        sqlx::query_scalar("SELECT MAX(number) FROM inventory_counts WHERE number LIKE ?1")
            .bind(format!("{prefix}%"))
            .fetch_one(&mut **tx)
            .await?;

    let seq = highest
        .and_then(|n| n.rsplit('-').next().and_then(|s| s.parse::<u32>().ok()))
        .map_or(1, |s| s + 1);

    Ok(format!("{prefix}{seq:04}"))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::material::generate_material_id;
    use atelier_core::{Material, MaterialKind, Money, NewInventoryLine};

    async fn seeded_material(db: &Database, name: &str, on_hand: i64) -> String {
        let now = Utc::now();
        let id = generate_material_id();
        db.materials()
            .insert(&Material {
                id: id.clone(),
                name: name.to_string(),
                kind: MaterialKind::Fabric,
                code: None,
                unit: "m".to_string(),
                unit_cost: Money::from_cents(1000),
                on_hand: Quantity::from_units(on_hand),
                reorder_threshold: Quantity::from_units(5),
                storage_location: None,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        id
    }

    fn draft(lines: Vec<NewInventoryLine>) -> NewInventoryCount {
        NewInventoryCount {
            count_date: NaiveDate::from_ymd_opt(2026, 8, 25).unwrap(),
            notes: Some("monthly count".to_string()),
            lines,
        }
    }

    #[tokio::test]
    async fn test_draft_snapshots_system_and_stores_difference() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mat = seeded_material(&db, "Denim", 10).await;
        let repo = db.inventory_counts();

        let count = repo
            .create_draft(draft(vec![NewInventoryLine {
                material: MaterialRef::known(mat.clone(), "Denim"),
                unit: "m".to_string(),
                counted_qty: Quantity::from_units(7),
            }]))
            .await
            .unwrap();

        let lines = repo.get_lines(&count.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].system_qty, Quantity::from_units(10));
        assert_eq!(lines[0].counted_qty, Quantity::from_units(7));
        assert_eq!(lines[0].difference, Quantity::from_units(-3));
        assert_eq!(
            lines[0].difference,
            lines[0].counted_qty - lines[0].system_qty
        );
    }

    #[tokio::test]
    async fn test_snapshot_is_point_in_time() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mat = seeded_material(&db, "Denim", 10).await;
        let repo = db.inventory_counts();

        let count = repo
            .create_draft(draft(vec![NewInventoryLine {
                material: MaterialRef::known(mat.clone(), "Denim"),
                unit: "m".to_string(),
                counted_qty: Quantity::from_units(7),
            }]))
            .await
            .unwrap();

        // Registry moves after the draft exists; the snapshot must not.
        db.materials()
            .set_on_hand(&mat, Quantity::from_units(99))
            .await
            .unwrap();

        let lines = repo.get_lines(&count.id).await.unwrap();
        assert_eq!(lines[0].system_qty, Quantity::from_units(10));
    }

    #[tokio::test]
    async fn test_freeform_line_snapshots_zero() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.inventory_counts();

        let count = repo
            .create_draft(draft(vec![NewInventoryLine {
                material: MaterialRef::freeform("Sample buttons"),
                unit: "pc".to_string(),
                counted_qty: Quantity::from_units(240),
            }]))
            .await
            .unwrap();

        let lines = repo.get_lines(&count.id).await.unwrap();
        assert_eq!(lines[0].material, MaterialRef::freeform("Sample buttons"));
        assert_eq!(lines[0].system_qty, Quantity::zero());
        assert_eq!(lines[0].difference, Quantity::from_units(240));
    }

    #[tokio::test]
    async fn test_missing_material_degrades_to_freeform() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.inventory_counts();

        let count = repo
            .create_draft(draft(vec![NewInventoryLine {
                material: MaterialRef::known("no-such-id", "Ghost fabric"),
                unit: "m".to_string(),
                counted_qty: Quantity::from_units(3),
            }]))
            .await
            .unwrap();

        let lines = repo.get_lines(&count.id).await.unwrap();
        assert_eq!(lines[0].material, MaterialRef::freeform("Ghost fabric"));
        assert_eq!(lines[0].system_qty, Quantity::zero());
    }

    #[tokio::test]
    async fn test_round_trip_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.inventory_counts();

        let created = repo.create_draft(draft(vec![])).await.unwrap();

        let (header, lines) = repo.get_with_lines(&created.id).await.unwrap().unwrap();
        assert_eq!(header.status, CountStatus::Draft);
        assert_eq!(header.notes.as_deref(), Some("monthly count"));
        assert!(header.number.starts_with("INV-20260825-"));
        assert!(lines.is_empty());

        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_draft_persists_every_line_with_timestamp() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.inventory_counts();

        let count = repo
            .create_draft(draft(vec![
                NewInventoryLine {
                    material: MaterialRef::freeform("Denim"),
                    unit: "m".to_string(),
                    counted_qty: Quantity::from_units(4),
                },
                NewInventoryLine {
                    material: MaterialRef::freeform("Poplin"),
                    unit: "m".to_string(),
                    counted_qty: Quantity::from_units(6),
                },
            ]))
            .await
            .unwrap();

        let lines = repo.get_lines(&count.id).await.unwrap();
        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert_eq!(line.created_at, count.created_at);
        }
    }

    #[tokio::test]
    async fn test_count_numbers_sequence_per_day() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.inventory_counts();

        let first = repo.create_draft(draft(vec![])).await.unwrap();
        let second = repo.create_draft(draft(vec![])).await.unwrap();
        let third = repo.create_draft(draft(vec![])).await.unwrap();

        assert_eq!(first.number, "INV-20260825-0001");
        assert_eq!(second.number, "INV-20260825-0002");
        assert_eq!(third.number, "INV-20260825-0003");

        // A different count date starts its own sequence.
        let other_day = repo
            .create_draft(NewInventoryCount {
                count_date: NaiveDate::from_ymd_opt(2026, 8, 26).unwrap(),
                notes: None,
                lines: vec![],
            })
            .await
            .unwrap();
        assert_eq!(other_day.number, "INV-20260826-0001");
    }

    #[tokio::test]
    async fn test_negative_counted_quantity_rejects_draft() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.inventory_counts();

        let err = repo
            .create_draft(draft(vec![NewInventoryLine {
                material: MaterialRef::freeform("Denim"),
                unit: "m".to_string(),
                counted_qty: Quantity::from_milli(-1),
            }]))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Validation(_)));
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_count_and_lines() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.inventory_counts();

        let count = repo
            .create_draft(draft(vec![NewInventoryLine {
                material: MaterialRef::freeform("Denim"),
                unit: "m".to_string(),
                counted_qty: Quantity::from_units(1),
            }]))
            .await
            .unwrap();

        repo.delete(&count.id).await.unwrap();

        assert!(repo.get_by_id(&count.id).await.unwrap().is_none());
        assert!(repo.get_lines(&count.id).await.unwrap().is_empty());

        let err = repo.delete(&count.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
