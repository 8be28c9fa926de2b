// crates/privilege-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Privilege Gate Interfaces
// Description: Collaborator contracts for metadata and role snapshots.
// Purpose: Keep the engine independent of cluster and configuration backends.
// Dependencies: thiserror, crate::core
// ============================================================================

//! ## Overview
//! The engine never fetches metadata or role definitions itself. Callers plug
//! in a [`CatalogProvider`] and a [`RoleProvider`]; both hand out immutable
//! snapshots scoped to one request. Implementations must fail closed when a
//! snapshot cannot be produced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::ResourceCatalog;
use crate::core::Role;
use crate::core::RoleName;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Collaborator errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The catalog snapshot is unavailable.
    #[error("catalog snapshot unavailable: {0}")]
    Catalog(String),
    /// Role definitions are unavailable.
    #[error("role definitions unavailable: {0}")]
    Roles(String),
}

// ============================================================================
// SECTION: Providers
// ============================================================================

/// Source of point-in-time catalog snapshots.
pub trait CatalogProvider {
    /// Returns the current catalog snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Catalog`] when no snapshot is available.
    fn snapshot(&self) -> Result<Arc<ResourceCatalog>, ProviderError>;
}

/// Source of role definitions for authenticated role names.
pub trait RoleProvider {
    /// Returns the definitions of `names`; names without a definition are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Roles`] when definitions cannot be read.
    fn roles_for(&self, names: &[RoleName]) -> Result<Vec<Role>, ProviderError>;
}
