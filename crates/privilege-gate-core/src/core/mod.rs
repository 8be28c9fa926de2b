// crates/privilege-gate-core/src/core/mod.rs
// ============================================================================
// Module: Privilege Gate Core Types
// Description: Patterns, catalog view, permissions, expressions, and verdicts.
// Purpose: Provide the typed vocabulary shared by resolution and evaluation.
// Dependencies: blake2b_simd, regex, serde, serde_json, sha2, thiserror
// ============================================================================

//! ## Overview
//! Core types describe what is being authorized (resource expressions over a
//! catalog snapshot), who may do it (roles and permission entries), and the
//! outcome (verdicts and errors). They hold no request state.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod actions;
pub mod catalog;
pub mod expression;
pub mod fields;
pub mod identifiers;
pub mod masking;
pub mod pattern;
pub mod permissions;
pub mod verdict;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use actions::ActionPolicy;
pub use actions::ActionProfile;
pub use actions::DEFAULT_PARTIAL_ACTIONS;
pub use actions::DEFAULT_TOP_LEVEL_ACTIONS;
pub use actions::DEFAULT_WRITE_ACTIONS;
pub use catalog::AliasMember;
pub use catalog::AliasMeta;
pub use catalog::CatalogError;
pub use catalog::CatalogSnapshot;
pub use catalog::Component;
pub use catalog::DataStreamMeta;
pub use catalog::IndexMeta;
pub use catalog::Resource;
pub use catalog::ResourceCatalog;
pub use catalog::ResourceCatalogBuilder;
pub use catalog::ResourceKind;
pub use expression::Clause;
pub use expression::ComponentSelector;
pub use expression::ExpressionError;
pub use expression::IndicesOptions;
pub use expression::ResourceExpression;
pub use expression::ResourceRequest;
pub use expression::WildcardExpansion;
pub use fields::FieldRule;
pub use fields::FieldRuleError;
pub use identifiers::ActionId;
pub use identifiers::RoleName;
pub use masking::DEFAULT_MASKING_SALT;
pub use masking::MAX_MASKING_SALT_LENGTH;
pub use masking::MaskedField;
pub use masking::MaskingError;
pub use masking::MaskingSalt;
pub use pattern::Pattern;
pub use pattern::PatternError;
pub use pattern::PatternSet;
pub use permissions::ComponentRestriction;
pub use permissions::FAILURE_STORE_PRIVILEGE;
pub use permissions::GrantScope;
pub use permissions::NameGuard;
pub use permissions::PermissionEntry;
pub use permissions::PermissionError;
pub use permissions::Role;
pub use verdict::AuthorizedResources;
pub use verdict::EvaluationError;
pub use verdict::ForbiddenDetail;
pub use verdict::MissingPrivilege;
pub use verdict::RequestShapeError;
pub use verdict::Verdict;
