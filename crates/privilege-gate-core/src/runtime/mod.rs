// crates/privilege-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Privilege Gate Runtime
// Description: Resolution, component gating, evaluation, and DLS/FLS combination.
// Purpose: Turn one request plus snapshots into a verdict deterministically.
// Dependencies: crate::{core, interfaces}, tracing
// ============================================================================

//! ## Overview
//! Runtime modules implement the request pipeline. Every caller (library,
//! CLI, service wrapper) goes through [`PrivilegesEvaluator`] so verdicts stay
//! identical across entry points.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod dlsfls;
pub mod evaluator;
pub mod gate;
pub mod resolver;
pub mod service;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use dlsfls::DlsFlsBundle;
pub use dlsfls::DocumentFilter;
pub use dlsfls::FieldMasking;
pub use dlsfls::FieldVisibility;
pub use dlsfls::IndexRestrictions;
pub use evaluator::Evaluation;
pub use evaluator::EvaluatorSettings;
pub use evaluator::PrivilegesEvaluator;
pub use gate::ComponentGate;
pub use resolver::Candidate;
pub use resolver::Resolution;
pub use resolver::Target;
pub use service::AuthorizationService;
pub use service::InMemoryRoleProvider;
pub use service::ServiceError;
pub use service::StaticCatalogProvider;
