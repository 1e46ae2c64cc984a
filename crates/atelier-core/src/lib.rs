//! # atelier-core: Pure Domain Logic for the Atelier Stock Ledger
//!
//! This crate is the **heart** of the stock ledger. It contains the domain
//! types and rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Atelier Architecture                           │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │          Presentation / API layer (external)                  │ │
//! │  └───────────────────────────────┬───────────────────────────────┘ │
//! │                                  │                                  │
//! │  ┌───────────────────────────────▼───────────────────────────────┐ │
//! │  │             ★ atelier-core (THIS CRATE) ★                     │ │
//! │  │                                                               │ │
//! │  │  ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌────────────┐       │ │
//! │  │  │  types   │ │ quantity │ │  money   │ │ validation │       │ │
//! │  │  │ Material │ │ Quantity │ │  Money   │ │   rules    │       │ │
//! │  │  │ Movement │ │ (milli)  │ │ (cents)  │ │   checks   │       │ │
//! │  │  └──────────┘ └──────────┘ └──────────┘ └────────────┘       │ │
//! │  │                                                               │ │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │ │
//! │  └───────────────────────────────┬───────────────────────────────┘ │
//! │                                  │                                  │
//! │  ┌───────────────────────────────▼───────────────────────────────┐ │
//! │  │               atelier-db (Database Layer)                     │ │
//! │  │       SQLite repositories, reconciliation engine              │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Material, Movement, InventoryCount, ...)
//! - [`quantity`] - Integer milli-unit quantities (no floating point!)
//! - [`money`] - Integer cent unit costs
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: deterministic, no side effects
//! 2. **No I/O**: database, network and file access are FORBIDDEN here
//! 3. **Integer Scalars**: quantities in milli-units, money in cents
//! 4. **Explicit Errors**: typed errors, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod quantity;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use quantity::Quantity;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of material and document names.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length of a unit-of-measure tag.
pub const MAX_UNIT_LEN: usize = 20;

/// Maximum length of a storage location name.
pub const MAX_LOCATION_LEN: usize = 120;
