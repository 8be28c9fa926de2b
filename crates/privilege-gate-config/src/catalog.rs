// crates/privilege-gate-config/src/catalog.rs
// ============================================================================
// Module: Catalog Snapshot Loading
// Description: Reads JSON catalog snapshots from disk.
// Purpose: Build validated catalog views for offline evaluation.
// Dependencies: privilege-gate-core, serde_json
// ============================================================================

//! ## Overview
//! A catalog snapshot is a JSON document with `indices`, `aliases`, and
//! `data_streams` arrays. Loading applies the same path, size, and encoding
//! guards as configuration files, then validates the topology.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use privilege_gate_core::CatalogSnapshot;
use privilege_gate_core::ResourceCatalog;

use crate::config::ConfigError;
use crate::config::read_guarded;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum catalog snapshot size in bytes.
pub(crate) const MAX_CATALOG_FILE_SIZE: usize = 16 * 1024 * 1024;

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Loads and validates a JSON catalog snapshot.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file violates limits, fails to parse, or
/// describes an inconsistent topology.
pub fn load_catalog_snapshot(path: &Path) -> Result<ResourceCatalog, ConfigError> {
    let content = read_guarded(path, "catalog", MAX_CATALOG_FILE_SIZE)?;
    let snapshot: CatalogSnapshot =
        serde_json::from_str(&content).map_err(|err| ConfigError::Parse(err.to_string()))?;
    ResourceCatalog::from_snapshot(snapshot)
        .map_err(|err| ConfigError::Invalid(format!("catalog: {err}")))
}
