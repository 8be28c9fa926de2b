// crates/privilege-gate-config/src/lib.rs
// ============================================================================
// Module: Privilege Gate Config Library
// Description: Canonical config model, validation, and snapshot loading.
// Purpose: Single source of truth for privilege-gate.toml semantics.
// Dependencies: privilege-gate-core, serde, serde_json, toml
// ============================================================================

//! ## Overview
//! `privilege-gate-config` defines the configuration model for Privilege
//! Gate: evaluator settings, action classification, action groups, and role
//! definitions. It provides strict, fail-closed validation, a
//! [`RoleRegistry`] that serves roles to the evaluator, and a loader for JSON
//! catalog snapshots.
//!
//! Security posture: config and snapshot files are untrusted input.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod config;
pub mod roles;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::load_catalog_snapshot;
pub use config::*;
pub use roles::RoleRegistry;
