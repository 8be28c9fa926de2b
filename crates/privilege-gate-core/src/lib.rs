// crates/privilege-gate-core/src/lib.rs
// ============================================================================
// Module: Privilege Gate Core Library
// Description: Public API surface for the privilege resolution engine.
// Purpose: Expose core types, collaborator interfaces, and the evaluator.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Privilege Gate core decides whether a caller, carrying a set of roles, may
//! run an action over a resource expression of indices, aliases, and data
//! streams. It expands the expression against a catalog snapshot, intersects
//! it with role permissions, and returns a verdict together with the
//! document- and field-level restrictions of the authorized resources.
//!
//! The engine is synchronous, stateless across requests, and consumes
//! immutable snapshots; it never fetches or caches metadata itself.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::CatalogProvider;
pub use interfaces::ProviderError;
pub use interfaces::RoleProvider;
pub use runtime::AuthorizationService;
pub use runtime::DlsFlsBundle;
pub use runtime::Evaluation;
pub use runtime::EvaluatorSettings;
pub use runtime::IndexRestrictions;
pub use runtime::PrivilegesEvaluator;
pub use runtime::ServiceError;
