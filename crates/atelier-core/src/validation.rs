//! # Validation Module
//!
//! Input validation for ledger operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Validation Layers                             │
//! │                                                                     │
//! │  Layer 1: THIS MODULE - field and business rule validation,         │
//! │           runs before any write                                     │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: Database (SQLite)                                         │
//! │  ├── NOT NULL / CHECK constraints                                   │
//! │  ├── UNIQUE constraints (count numbers, location names)             │
//! │  └── Foreign key constraints                                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{NewInventoryLine, NewMovementLine};
use crate::{MAX_LOCATION_LEN, MAX_NAME_LEN, MAX_UNIT_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a material name (registry-linked or freeform).
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_NAME_LEN`] characters
pub fn validate_material_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "material name".to_string(),
        });
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "material name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a unit-of-measure tag ("m", "pc", "kg").
pub fn validate_unit(unit: &str) -> ValidationResult<()> {
    let unit = unit.trim();

    if unit.is_empty() {
        return Err(ValidationError::Required {
            field: "unit".to_string(),
        });
    }

    if unit.len() > MAX_UNIT_LEN {
        return Err(ValidationError::TooLong {
            field: "unit".to_string(),
            max: MAX_UNIT_LEN,
        });
    }

    Ok(())
}

/// Validates a storage location name.
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_LOCATION_LEN`] characters
pub fn validate_location_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "location name".to_string(),
        });
    }

    if name.len() > MAX_LOCATION_LEN {
        return Err(ValidationError::TooLong {
            field: "location name".to_string(),
            max: MAX_LOCATION_LEN,
        });
    }

    Ok(())
}

/// Validates a UUID string.
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Line Validators
// =============================================================================

/// Validates one movement line before the aggregate write.
///
/// ## Rules
/// - Material name must be non-empty (for both Known and Freeform refs)
/// - Quantity must be strictly positive
/// - Unit must be non-empty
///
/// An invalid line rejects the whole movement; nothing is written.
pub fn validate_movement_line(line: &NewMovementLine) -> ValidationResult<()> {
    validate_material_name(line.material.name())?;
    validate_unit(&line.unit)?;

    if !line.quantity.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates one inventory count line before the draft write.
///
/// Counted quantity of zero is allowed: "the shelf is empty" is a legitimate
/// count result. Negative counts are not.
pub fn validate_inventory_line(line: &NewInventoryLine) -> ValidationResult<()> {
    validate_material_name(line.material.name())?;
    validate_unit(&line.unit)?;

    if line.counted_qty.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: "counted quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::quantity::Quantity;
    use crate::types::MaterialRef;

    fn movement_line(name: &str, qty_milli: i64) -> NewMovementLine {
        NewMovementLine {
            material: MaterialRef::freeform(name),
            quantity: Quantity::from_milli(qty_milli),
            unit: "m".to_string(),
            unit_cost: Money::from_cents(100),
            storage_location: None,
        }
    }

    #[test]
    fn test_validate_material_name() {
        assert!(validate_material_name("Denim 12oz").is_ok());
        assert!(validate_material_name("").is_err());
        assert!(validate_material_name("   ").is_err());
        assert!(validate_material_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_unit() {
        assert!(validate_unit("m").is_ok());
        assert!(validate_unit("pc").is_ok());
        assert!(validate_unit("").is_err());
        assert!(validate_unit(&"x".repeat(50)).is_err());
    }

    #[test]
    fn test_validate_movement_line() {
        assert!(validate_movement_line(&movement_line("Denim", 1_000)).is_ok());

        // Non-positive quantities reject the line
        assert!(validate_movement_line(&movement_line("Denim", 0)).is_err());
        assert!(validate_movement_line(&movement_line("Denim", -500)).is_err());

        // Empty material name rejects the line
        assert!(validate_movement_line(&movement_line("", 1_000)).is_err());
    }

    #[test]
    fn test_validate_inventory_line() {
        let line = NewInventoryLine {
            material: MaterialRef::freeform("Denim"),
            unit: "m".to_string(),
            counted_qty: Quantity::zero(),
        };
        // Zero counted quantity is a legitimate result
        assert!(validate_inventory_line(&line).is_ok());

        let negative = NewInventoryLine {
            counted_qty: Quantity::from_milli(-1),
            ..line
        };
        let err = validate_inventory_line(&negative).unwrap_err();
        assert!(matches!(err, ValidationError::MustBeNonNegative { .. }));
        assert_eq!(err.to_string(), "counted quantity must not be negative");
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }

    #[test]
    fn test_validate_location_name() {
        assert!(validate_location_name("Shelf A1").is_ok());
        assert!(validate_location_name("").is_err());
        assert!(validate_location_name(&"L".repeat(200)).is_err());
    }
}
