//! # Repository Modules
//!
//! Data access repositories, one per aggregate:
//!
//! - [`material`]: the material registry (catalog rows + on-hand + threshold)
//! - [`movement`]: the movement journal (entry/exit headers with lines)
//! - [`inventory`]: inventory counts (drafts with system-qty snapshots)
//! - [`location`]: the location index (dedicated-table or derived mode)
//!
//! Repositories own all SQL; callers see domain types from `atelier-core`.
//! Anything that writes an aggregate (header + lines) does so in a single
//! transaction.

pub mod inventory;
pub mod location;
pub mod material;
pub mod movement;
