// crates/privilege-gate-core/src/core/actions.rs
// ============================================================================
// Module: Action Policy
// Description: Classification of actions for partial execution and writes.
// Purpose: Tell the evaluator how an action resolves and how it may degrade.
// Dependencies: serde, crate::core::pattern
// ============================================================================

//! ## Overview
//! Actions are classified by pattern lists:
//! - `partial`: multi-resource actions that may run on an authorized subset
//!   ("do not fail on forbidden").
//! - `write`: actions that target the write index of aliases and data streams.
//! - `top_level`: administrative actions that keep alias and data-stream names
//!   instead of expanding them to backing indices.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::core::pattern::PatternError;
use crate::core::pattern::PatternSet;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default actions that support partial execution.
pub const DEFAULT_PARTIAL_ACTIONS: &[&str] = &[
    "read",
    "search",
    "indices:data/read/*",
    "indices:admin/mappings/fields/get*",
    "indices:admin/resolve/index",
    "indices:admin/aliases/get",
    "indices:admin/data_stream/get",
    "indices:monitor/*",
];

/// Default write actions.
pub const DEFAULT_WRITE_ACTIONS: &[&str] = &["write", "index", "indices:data/write/*"];

/// Default actions that keep top-level alias and data-stream names.
pub const DEFAULT_TOP_LEVEL_ACTIONS: &[&str] = &[
    "manage",
    "indices:admin/aliases/get",
    "indices:admin/data_stream/get",
    "indices:admin/resolve/index",
];

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Classification flags for one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ActionProfile {
    /// Action may run on an authorized subset.
    pub partial: bool,
    /// Action writes through write indices.
    pub write: bool,
    /// Action keeps alias and data-stream names.
    pub top_level: bool,
}

/// Pattern-based action classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionPolicy {
    /// Partial-execution actions.
    partial: PatternSet,
    /// Write actions.
    write: PatternSet,
    /// Top-level actions.
    top_level: PatternSet,
}

impl ActionPolicy {
    /// Builds a policy from pattern lists.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] when a pattern is invalid.
    pub fn new<S: AsRef<str>>(
        partial: &[S],
        write: &[S],
        top_level: &[S],
    ) -> Result<Self, PatternError> {
        Ok(Self {
            partial: PatternSet::parse(partial)?,
            write: PatternSet::parse(write)?,
            top_level: PatternSet::parse(top_level)?,
        })
    }

    /// Classifies an action.
    #[must_use]
    pub fn profile(&self, action: &str) -> ActionProfile {
        let write = self.write.matches(action);
        ActionProfile {
            partial: !write && self.partial.matches(action),
            write,
            top_level: !write && self.top_level.matches(action),
        }
    }
}

impl Default for ActionPolicy {
    fn default() -> Self {
        Self {
            partial: PatternSet::parse(DEFAULT_PARTIAL_ACTIONS).unwrap_or_default(),
            write: PatternSet::parse(DEFAULT_WRITE_ACTIONS).unwrap_or_default(),
            top_level: PatternSet::parse(DEFAULT_TOP_LEVEL_ACTIONS).unwrap_or_default(),
        }
    }
}
