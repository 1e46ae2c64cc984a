//! # Location Index Repository
//!
//! Storage locations in one of two modes, decided once at startup:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Location Index Modes                          │
//! │                                                                     │
//! │  DedicatedTable                                                     │
//! │    locations is the source of names; the index is a LEFT JOIN       │
//! │    against active materials, so empty locations still appear.       │
//! │    create/rename/delete are available.                              │
//! │                                                                     │
//! │  DerivedFromMaterials                                               │
//! │    No locations table (legacy database). The index is a GROUP BY    │
//! │    over materials.storage_location; only occupied locations exist,  │
//! │    and creating one is meaningless → LocationTableUnavailable.      │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! In both modes the authoritative link from a material to its location is
//! the `materials.storage_location` text column.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use atelier_core::validation::validate_location_name;
use atelier_core::{Location, LocationEntry};

/// How the location index operates this session.
///
/// Picked by a single probe at startup and never re-evaluated; see
/// [`crate::pool::Database::probe_location_mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationMode {
    /// A `locations` table exists; it owns the set of location names.
    DedicatedTable,
    /// No `locations` table; names are derived from materials.
    DerivedFromMaterials,
}

/// Repository for the location index.
#[derive(Debug, Clone)]
pub struct LocationRepository {
    pool: SqlitePool,
    mode: LocationMode,
}

impl LocationRepository {
    /// Creates a new LocationRepository bound to the session mode.
    pub fn new(pool: SqlitePool, mode: LocationMode) -> Self {
        LocationRepository { pool, mode }
    }

    /// Returns the mode this repository operates in.
    pub fn mode(&self) -> LocationMode {
        self.mode
    }

    /// Lists the location index: each location name with the number of
    /// active materials stored under it, alphabetical.
    ///
    /// In dedicated-table mode, locations with zero materials appear with a
    /// count of 0. In derived mode only occupied locations can appear, and
    /// blank storage fields are excluded.
    pub async fn list(&self) -> DbResult<Vec<LocationEntry>> {
        let entries = match self.mode {
            LocationMode::DedicatedTable => {
                sqlx::query_as::<_, LocationEntry>(
                    r#"
                    SELECT
                        l.name AS name,
                        l.description AS description,
                        COUNT(m.id) AS material_count
                    FROM locations l
                    LEFT JOIN materials m
                        ON m.storage_location = l.name AND m.is_active = 1
                    GROUP BY l.name, l.description
                    ORDER BY l.name
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
            LocationMode::DerivedFromMaterials => {
                sqlx::query_as::<_, LocationEntry>(
                    r#"
                    SELECT
                        storage_location AS name,
                        NULL AS description,
                        COUNT(*) AS material_count
                    FROM materials
                    WHERE is_active = 1
                      AND storage_location IS NOT NULL
                      AND storage_location != ''
                    GROUP BY storage_location
                    ORDER BY storage_location
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(entries)
    }

    /// Creates a named location (dedicated-table mode only).
    ///
    /// ## Errors
    /// - [`DbError::LocationTableUnavailable`] in derived mode
    /// - [`DbError::UniqueViolation`] when the name is taken
    pub async fn create(&self, name: &str, description: Option<&str>) -> DbResult<Location> {
        if self.mode == LocationMode::DerivedFromMaterials {
            return Err(DbError::LocationTableUnavailable);
        }

        validate_location_name(name)?;

        let location = Location {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.map(String::from),
            created_at: Utc::now(),
        };

        debug!(name = %name, "Creating location");

        sqlx::query(
            r#"
            INSERT INTO locations (id, name, description, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&location.id)
        .bind(&location.name)
        .bind(&location.description)
        .bind(location.created_at)
        .execute(&self.pool)
        .await?;

        Ok(location)
    }

    /// Assigns a material to a location by writing its storage field.
    ///
    /// Works in both modes; passing `None` clears the assignment.
    pub async fn assign(&self, material_id: &str, location: Option<&str>) -> DbResult<()> {
        if let Some(name) = location {
            validate_location_name(name)?;
        }

        let result = sqlx::query(
            r#"
            UPDATE materials
            SET storage_location = ?1, updated_at = ?2
            WHERE id = ?3
            "#,
        )
        .bind(location)
        .bind(Utc::now())
        .bind(material_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Material", material_id));
        }

        Ok(())
    }

    /// Renames a location everywhere it is referenced, in one transaction.
    ///
    /// Materials pointing at the old name are repointed; in dedicated-table
    /// mode the location row itself is renamed too.
    pub async fn rename(&self, old_name: &str, new_name: &str) -> DbResult<()> {
        validate_location_name(new_name)?;

        info!(old = %old_name, new = %new_name, "Renaming location");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE materials
            SET storage_location = ?1, updated_at = ?2
            WHERE storage_location = ?3
            "#,
        )
        .bind(new_name)
        .bind(Utc::now())
        .bind(old_name)
        .execute(&mut *tx)
        .await?;

        if self.mode == LocationMode::DedicatedTable {
            sqlx::query("UPDATE locations SET name = ?1 WHERE name = ?2")
                .bind(new_name)
                .bind(old_name)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
