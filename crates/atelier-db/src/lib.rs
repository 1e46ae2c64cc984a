//! # atelier-db: Database Layer for the Atelier Stock Ledger
//!
//! This crate provides database access for the Atelier stock ledger.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Atelier Ledger Data Flow                           │
//! │                                                                         │
//! │  Caller (desktop shell, seed tool, tests)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    atelier-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │(repository/..)│    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ MaterialRepo  │    │ 001_initial_ │  │   │
//! │  │   │ LocationMode  │◄───│ MovementRepo  │    │ schema.sql   │  │   │
//! │  │   │ probe         │    │ InventoryRepo │    │              │  │   │
//! │  │   └───────────────┘    │ LocationRepo  │    └──────────────┘  │   │
//! │  │                        └───────────────┘                       │   │
//! │  │   ┌─────────────────────────────────────┐                     │   │
//! │  │   │  ReconciliationEngine (reconcile.rs)│  ← sole writer of   │   │
//! │  │   │  finalize() / low_stock()           │    on-hand          │   │
//! │  │   └─────────────────────────────────────┘                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation, configuration, location-mode probe
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (material, movement, ...)
//! - [`reconcile`] - Count finalization and the low-stock report
//!
//! ## Usage
//!
//! ```rust,ignore
//! use atelier_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/ledger.db")).await?;
//!
//! let low = db.reconciliation().low_stock().await?;
//! for material in low {
//!     println!("{} is at {}", material.name, material.on_hand);
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod reconcile;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use reconcile::ReconciliationEngine;

// Repository re-exports for convenience
pub use repository::inventory::InventoryCountRepository;
pub use repository::location::{LocationMode, LocationRepository};
pub use repository::material::MaterialRepository;
pub use repository::movement::MovementRepository;
