//! # Movement Repository
//!
//! Database operations for the movement journal.
//!
//! ## Movement Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Movement Lifecycle                             │
//! │                                                                     │
//! │  1. RECORD (one transaction)                                        │
//! │     └── record() → validate lines → INSERT header + all lines       │
//! │         Either the whole aggregate commits or nothing does;         │
//! │         an orphan header with no lines cannot occur.                │
//! │                                                                     │
//! │  2. READ                                                            │
//! │     └── get_by_id() / get_lines() / get_with_lines() / list()       │
//! │                                                                     │
//! │  3. DELETE (one transaction)                                        │
//! │     └── delete() → removes header and lines as a whole              │
//! │                                                                     │
//! │  Lines are immutable once recorded: corrections are new movements.  │
//! │  No step touches materials.on_hand - the journal is a record of     │
//! │  events, not authoritative over registry quantities.                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use atelier_core::validation::validate_movement_line;
use atelier_core::{MaterialRef, Money, Movement, MovementLine, NewMovement, Quantity};

/// Persisted shape of a movement line: the sum-typed [`MaterialRef`] flattens
/// into a nullable id plus a mandatory name.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MovementLineRow {
    pub id: String,
    pub movement_id: String,
    pub material_id: Option<String>,
    pub material_name: String,
    pub quantity: Quantity,
    pub unit: String,
    pub unit_cost: Money,
    pub storage_location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<MovementLineRow> for MovementLine {
    fn from(row: MovementLineRow) -> Self {
        MovementLine {
            id: row.id,
            movement_id: row.movement_id,
            material: MaterialRef::from_parts(row.material_id, row.material_name),
            quantity: row.quantity,
            unit: row.unit,
            unit_cost: row.unit_cost,
            storage_location: row.storage_location,
            created_at: row.created_at,
        }
    }
}

/// Repository for movement journal operations.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// Records a movement: header and all lines as one caller-visible unit.
    ///
    /// ## Preconditions
    /// - Every line has a positive quantity and a non-empty material name
    ///   (checked before any write; an invalid line rejects the whole
    ///   aggregate)
    /// - `lines` may be empty: a header-only movement is permitted
    ///
    /// ## Guarantee
    /// Header and lines are written inside a single transaction. A failure
    /// on line N rolls back the header and lines 1..N-1.
    ///
    /// ## Registry
    /// Recording does NOT debit or credit material on-hand quantities; the
    /// authoritative path runs only through inventory count finalization.
    pub async fn record(&self, new: NewMovement) -> DbResult<Movement> {
        for line in &new.lines {
            validate_movement_line(line)?;
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(
            id = %id,
            direction = ?new.direction,
            lines = new.lines.len(),
            "Recording movement"
        );

        let movement = Movement {
            id: id.clone(),
            direction: new.direction,
            source: new.source,
            document: new.document,
            effective_date: new.effective_date,
            notes: new.notes,
            created_at: now,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO movements (
                id, direction, source, document, effective_date, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&movement.id)
        .bind(movement.direction)
        .bind(&movement.source)
        .bind(&movement.document)
        .bind(movement.effective_date)
        .bind(&movement.notes)
        .bind(movement.created_at)
        .execute(&mut *tx)
        .await?;

        for line in &new.lines {
            sqlx::query(
                r#"
                INSERT INTO movement_lines (
                    id, movement_id, material_id, material_name,
                    quantity_milli, unit, unit_cost_cents, storage_location, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&movement.id)
            .bind(line.material.material_id())
            .bind(line.material.name())
            .bind(line.quantity)
            .bind(&line.unit)
            .bind(line.unit_cost)
            .bind(&line.storage_location)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(movement)
    }

    /// Gets a movement header by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Movement>> {
        let movement = sqlx::query_as::<_, Movement>(
            r#"
            SELECT id, direction, source, document, effective_date, notes, created_at
            FROM movements
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(movement)
    }

    /// Gets all lines for a movement, in recording order.
    pub async fn get_lines(&self, movement_id: &str) -> DbResult<Vec<MovementLine>> {
        let rows = sqlx::query_as::<_, MovementLineRow>(
            r#"
            SELECT
                id,
                movement_id,
                material_id,
                material_name,
                quantity_milli AS quantity,
                unit,
                unit_cost_cents AS unit_cost,
                storage_location,
                created_at
            FROM movement_lines
            WHERE movement_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(movement_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MovementLine::from).collect())
    }

    /// Gets a movement with its lines, or None when the header is missing.
    pub async fn get_with_lines(&self, id: &str) -> DbResult<Option<(Movement, Vec<MovementLine>)>> {
        let Some(movement) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let lines = self.get_lines(id).await?;
        Ok(Some((movement, lines)))
    }

    /// Lists movements, newest effective date first.
    pub async fn list(&self) -> DbResult<Vec<Movement>> {
        let movements = sqlx::query_as::<_, Movement>(
            r#"
            SELECT id, direction, source, document, effective_date, notes, created_at
            FROM movements
            ORDER BY effective_date DESC, created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Deletes a movement and its lines as a whole.
    ///
    /// No quantity reversal happens: the registry was never touched when the
    /// movement was recorded, so there is nothing to undo. Lines are not
    /// independently deletable.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting movement");

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM movement_lines WHERE movement_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM movements WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Movement", id));
        }

        tx.commit().await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use atelier_core::{MovementDirection, NewMovementLine};
    use chrono::NaiveDate;

    fn entry_with_lines(lines: Vec<NewMovementLine>) -> NewMovement {
        NewMovement {
            direction: MovementDirection::Entry,
            source: Some("purchase".to_string()),
            document: Some("PO-2026-0042".to_string()),
            effective_date: NaiveDate::from_ymd_opt(2026, 8, 20).unwrap(),
            notes: None,
            lines,
        }
    }

    fn freeform_line(name: &str, qty_milli: i64) -> NewMovementLine {
        NewMovementLine {
            material: MaterialRef::freeform(name),
            quantity: Quantity::from_milli(qty_milli),
            unit: "m".to_string(),
            unit_cost: Money::from_cents(990),
            storage_location: Some("A1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_record_two_lines_and_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.movements();

        let new = entry_with_lines(vec![
            freeform_line("Denim 12oz", 25_000),
            freeform_line("Poplin white", 10_500),
        ]);
        let recorded = repo.record(new.clone()).await.unwrap();

        let (header, lines) = repo.get_with_lines(&recorded.id).await.unwrap().unwrap();
        assert_eq!(header.direction, MovementDirection::Entry);
        assert_eq!(header.document.as_deref(), Some("PO-2026-0042"));
        assert_eq!(header.effective_date, new.effective_date);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].material.name(), "Denim 12oz");
        assert_eq!(lines[0].quantity, Quantity::from_milli(25_000));
        assert_eq!(lines[1].material.name(), "Poplin white");
        assert_eq!(lines[1].unit_cost, Money::from_cents(990));
    }

    #[tokio::test]
    async fn test_record_with_empty_lines_is_permitted() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.movements();

        let recorded = repo.record(entry_with_lines(vec![])).await.unwrap();

        let (_, lines) = repo.get_with_lines(&recorded.id).await.unwrap().unwrap();
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_line_rejects_whole_aggregate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.movements();

        let new = entry_with_lines(vec![
            freeform_line("Denim 12oz", 25_000),
            freeform_line("Denim 12oz", 0), // non-positive quantity
        ]);
        let err = repo.record(new).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        // Nothing was written, not even the valid first line's header
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_known_line_keeps_registry_untouched() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let materials = db.materials();
        let repo = db.movements();

        let material = crate::repository::material::generate_material_id();
        let now = Utc::now();
        materials
            .insert(&atelier_core::Material {
                id: material.clone(),
                name: "Denim 12oz".to_string(),
                kind: atelier_core::MaterialKind::Fabric,
                code: None,
                unit: "m".to_string(),
                unit_cost: Money::from_cents(1890),
                on_hand: Quantity::from_units(40),
                reorder_threshold: Quantity::from_units(10),
                storage_location: None,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        let new = entry_with_lines(vec![NewMovementLine {
            material: MaterialRef::known(material.clone(), "Denim 12oz"),
            quantity: Quantity::from_units(5),
            unit: "m".to_string(),
            unit_cost: Money::from_cents(1890),
            storage_location: None,
        }]);
        repo.record(new).await.unwrap();

        // Movements are advisory: on-hand is unchanged.
        let loaded = materials.require(&material).await.unwrap();
        assert_eq!(loaded.on_hand, Quantity::from_units(40));
    }

    #[tokio::test]
    async fn test_delete_removes_header_and_lines() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.movements();

        let recorded = repo
            .record(entry_with_lines(vec![
                freeform_line("Denim", 1_000),
                freeform_line("Poplin", 2_000),
            ]))
            .await
            .unwrap();

        repo.delete(&recorded.id).await.unwrap();

        assert!(repo.get_by_id(&recorded.id).await.unwrap().is_none());
        assert!(repo.get_lines(&recorded.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_movement_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.movements();

        let err = repo.delete("missing").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
