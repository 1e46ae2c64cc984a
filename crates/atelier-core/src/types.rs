//! # Domain Types
//!
//! Core domain types for the Atelier stock ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Domain Types                               │
//! │                                                                     │
//! │  ┌───────────────┐   ┌────────────────┐   ┌────────────────────┐   │
//! │  │   Material    │   │    Movement    │   │   InventoryCount   │   │
//! │  │  ───────────  │   │  ────────────  │   │  ────────────────  │   │
//! │  │  id (UUID)    │   │  id (UUID)     │   │  id (UUID)         │   │
//! │  │  on_hand      │   │  direction     │   │  number (business) │   │
//! │  │  threshold    │   │  1─N lines     │   │  status            │   │
//! │  └───────────────┘   └────────────────┘   │  1─N lines         │   │
//! │                                           └────────────────────┘   │
//! │                                                                     │
//! │  Lines reference materials through MaterialRef:                     │
//! │    Known { id, name }  ← linked to the registry                     │
//! │    Freeform { name }   ← ad-hoc material, text only                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership Rule
//! `Material.on_hand` is written by the reconciliation engine only.
//! Movements are advisory records; they never mutate the registry.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::quantity::Quantity;

// =============================================================================
// Material Kind
// =============================================================================

/// Classification of a registry material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    Fabric,
    Trim,
    Packaging,
    Other,
}

impl Default for MaterialKind {
    fn default() -> Self {
        MaterialKind::Other
    }
}

// =============================================================================
// Movement Direction
// =============================================================================

/// Whether a movement brings stock in or takes it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum MovementDirection {
    /// Stock coming in (goods receipt, production return).
    Entry,
    /// Stock going out (cutting-room issue, shrinkage write-off).
    Exit,
}

// =============================================================================
// Count Status
// =============================================================================

/// The status of an inventory count. `Finalized` is terminal: a finalized
/// count is never reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum CountStatus {
    /// Count is being prepared; lines can still be discarded with the draft.
    Draft,
    /// Counted quantities have been applied to the registry.
    Finalized,
}

impl Default for CountStatus {
    fn default() -> Self {
        CountStatus::Draft
    }
}

// =============================================================================
// Material Reference
// =============================================================================

/// How a movement or inventory line names its material.
///
/// The registry link is optional: a line may describe a material that is not
/// (yet) catalogued. Making this a sum type instead of a nullable foreign key
/// plus a separately-maintained name string keeps the "unlinked line" case
/// explicit.
///
/// ## Example
/// ```rust
/// use atelier_core::types::MaterialRef;
///
/// let linked = MaterialRef::known("mat-1", "Denim 12oz");
/// assert_eq!(linked.material_id(), Some("mat-1"));
///
/// let adhoc = MaterialRef::freeform("Sample buttons");
/// assert_eq!(adhoc.material_id(), None);
/// assert_eq!(adhoc.name(), "Sample buttons");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "ref", rename_all = "snake_case")]
pub enum MaterialRef {
    /// Line is linked to a registry material. The name is a snapshot taken
    /// when the line was written, so history survives renames.
    Known { id: String, name: String },
    /// Ad-hoc material named by text only; never touches the registry.
    Freeform { name: String },
}

impl MaterialRef {
    pub fn known(id: impl Into<String>, name: impl Into<String>) -> Self {
        MaterialRef::Known {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn freeform(name: impl Into<String>) -> Self {
        MaterialRef::Freeform { name: name.into() }
    }

    /// Rebuilds a reference from its persisted shape (nullable id + name).
    pub fn from_parts(material_id: Option<String>, name: String) -> Self {
        match material_id {
            Some(id) => MaterialRef::Known { id, name },
            None => MaterialRef::Freeform { name },
        }
    }

    /// The registry id, if the line is linked.
    pub fn material_id(&self) -> Option<&str> {
        match self {
            MaterialRef::Known { id, .. } => Some(id),
            MaterialRef::Freeform { .. } => None,
        }
    }

    /// The material name. Always present, for both variants.
    pub fn name(&self) -> &str {
        match self {
            MaterialRef::Known { name, .. } => name,
            MaterialRef::Freeform { name } => name,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, MaterialRef::Known { .. })
    }
}

// =============================================================================
// Material
// =============================================================================

/// A registry material: the owner of the authoritative on-hand quantity.
///
/// Rows are created and retired by catalog management; the ledger reads them
/// and the reconciliation engine writes `on_hand`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Material {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, e.g. "Denim 12oz indigo".
    pub name: String,

    /// Material classification.
    pub kind: MaterialKind,

    /// Optional business code, e.g. "FAB-DNM-012".
    pub code: Option<String>,

    /// Unit of measure as free text ("m", "pc", "kg").
    pub unit: String,

    /// Current unit cost.
    pub unit_cost: Money,

    /// Authoritative current stock level. Conceptually non-negative, but the
    /// system does not hard-enforce it; drift shows up between counts.
    pub on_hand: Quantity,

    /// On-hand level at or below which the material is flagged low-stock.
    pub reorder_threshold: Quantity,

    /// Free-text storage location; also feeds the derived location index.
    pub storage_location: Option<String>,

    /// Whether the material is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Material {
    /// Low-stock predicate: `on_hand <= reorder_threshold`.
    ///
    /// Equality counts as low. Recomputed on every read; there is no
    /// hysteresis, so a material sitting exactly on its threshold stays in
    /// the alert set until a count lifts it above.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.on_hand <= self.reorder_threshold
    }
}

// =============================================================================
// Movement
// =============================================================================

/// A recorded stock-affecting event (entry or exit) with line items.
///
/// Movements are immutable once created: there is no partial edit, and
/// corrections are new movements. Deleting a movement removes the header and
/// all lines but performs no quantity reversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Movement {
    pub id: String,
    pub direction: MovementDirection,

    /// Origin tag, e.g. "purchase" or "production".
    pub source: Option<String>,

    /// External document reference (purchase order, delivery note) as free
    /// text; no referential integrity is enforced.
    pub document: Option<String>,

    /// Effective calendar date of the event (`YYYY-MM-DD`).
    pub effective_date: NaiveDate,

    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A line item of a movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementLine {
    pub id: String,
    pub movement_id: String,
    pub material: MaterialRef,

    /// Moved quantity; strictly positive.
    pub quantity: Quantity,

    /// Unit of measure at the time of the movement.
    pub unit: String,

    /// Unit cost frozen at recording time.
    pub unit_cost: Money,

    /// Target storage location, free text.
    pub storage_location: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Input for recording a new movement. The header and all lines are written
/// as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMovement {
    pub direction: MovementDirection,
    pub source: Option<String>,
    pub document: Option<String>,
    pub effective_date: NaiveDate,
    pub notes: Option<String>,
    pub lines: Vec<NewMovementLine>,
}

/// Input for a single movement line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMovementLine {
    pub material: MaterialRef,
    pub quantity: Quantity,
    pub unit: String,
    pub unit_cost: Money,
    pub storage_location: Option<String>,
}

// =============================================================================
// Inventory Count
// =============================================================================

/// A physical stock-taking exercise, reconciled against system quantities.
///
/// Created as a draft; finalized exactly once by the reconciliation engine,
/// which applies every linked line's counted quantity onto the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryCount {
    pub id: String,

    /// Human-readable count number, e.g. `INV-20260825-0421`.
    pub number: String,

    /// Day the shelves were counted (`YYYY-MM-DD`).
    pub count_date: NaiveDate,

    pub status: CountStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,

    /// Set when the count transitions to `Finalized`.
    pub finalized_at: Option<DateTime<Utc>>,
}

impl InventoryCount {
    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.status == CountStatus::Finalized
    }
}

/// A line of an inventory count.
///
/// `system_qty` is a point-in-time snapshot of the registry on-hand taken
/// when the draft was created; registry changes between draft and finalize do
/// not refresh it ("count day" semantics). `difference` is stored, not
/// derived on read, so historical counts stay interpretable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryLine {
    pub id: String,
    pub count_id: String,
    pub material: MaterialRef,
    pub unit: String,

    /// Registry on-hand at draft creation. Zero for freeform lines.
    pub system_qty: Quantity,

    /// Operator-entered physical count.
    pub counted_qty: Quantity,

    /// `counted_qty - system_qty`, materialized at write time.
    pub difference: Quantity,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a draft inventory count. System quantities are captured
/// by the repository at creation time, not supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInventoryCount {
    pub count_date: NaiveDate,
    pub notes: Option<String>,
    pub lines: Vec<NewInventoryLine>,
}

/// Input for a single count line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInventoryLine {
    pub material: MaterialRef,
    pub unit: String,
    pub counted_qty: Quantity,
}

// =============================================================================
// Location Index
// =============================================================================

/// A first-class storage location row (dedicated-table mode only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Location {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One entry of the location index: a location name and how many materials
/// are stored under it. Produced in both dedicated and derived modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LocationEntry {
    pub name: String,
    pub description: Option<String>,
    pub material_count: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn material(on_hand: i64, threshold: i64) -> Material {
        let now = Utc::now();
        Material {
            id: "mat-1".to_string(),
            name: "Denim 12oz".to_string(),
            kind: MaterialKind::Fabric,
            code: Some("FAB-DNM-012".to_string()),
            unit: "m".to_string(),
            unit_cost: Money::from_cents(1890),
            on_hand: Quantity::from_units(on_hand),
            reorder_threshold: Quantity::from_units(threshold),
            storage_location: Some("A1".to_string()),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_low_stock_boundary() {
        // Below threshold: low
        assert!(material(15, 20).is_low_stock());
        // Exactly at threshold: still low
        assert!(material(20, 20).is_low_stock());
        // Above threshold: not low
        assert!(!material(21, 20).is_low_stock());
    }

    #[test]
    fn test_material_ref_accessors() {
        let known = MaterialRef::known("mat-1", "Denim 12oz");
        assert!(known.is_known());
        assert_eq!(known.material_id(), Some("mat-1"));
        assert_eq!(known.name(), "Denim 12oz");

        let freeform = MaterialRef::freeform("Sample buttons");
        assert!(!freeform.is_known());
        assert_eq!(freeform.material_id(), None);
        assert_eq!(freeform.name(), "Sample buttons");
    }

    #[test]
    fn test_material_ref_from_parts() {
        let linked = MaterialRef::from_parts(Some("mat-1".to_string()), "Denim".to_string());
        assert_eq!(linked, MaterialRef::known("mat-1", "Denim"));

        let unlinked = MaterialRef::from_parts(None, "Denim".to_string());
        assert_eq!(unlinked, MaterialRef::freeform("Denim"));
    }

    #[test]
    fn test_count_status_default_is_draft() {
        assert_eq!(CountStatus::default(), CountStatus::Draft);
    }

    #[test]
    fn test_material_ref_serde_shape() {
        let json = serde_json::to_value(MaterialRef::known("mat-1", "Denim")).unwrap();
        assert_eq!(json["ref"], "known");
        assert_eq!(json["id"], "mat-1");

        let json = serde_json::to_value(MaterialRef::freeform("Denim")).unwrap();
        assert_eq!(json["ref"], "freeform");
        assert!(json.get("id").is_none());
    }
}
