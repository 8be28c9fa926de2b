// crates/privilege-gate-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared catalogs, roles, and evaluation helpers.
// Purpose: Keep integration tests focused on authorization outcomes.
// Dependencies: privilege-gate-core
// ============================================================================

//! ## Overview
//! Fixture builders for catalogs and roles plus a one-call evaluation helper.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::unwrap_in_result,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use privilege_gate_core::AliasMeta;
use privilege_gate_core::AuthorizedResources;
use privilege_gate_core::ComponentSelector;
use privilege_gate_core::DataStreamMeta;
use privilege_gate_core::Evaluation;
use privilege_gate_core::EvaluationError;
use privilege_gate_core::EvaluatorSettings;
use privilege_gate_core::IndexMeta;
use privilege_gate_core::IndicesOptions;
use privilege_gate_core::PermissionEntry;
use privilege_gate_core::PrivilegesEvaluator;
use privilege_gate_core::ResourceCatalog;
use privilege_gate_core::ResourceKind;
use privilege_gate_core::ResourceRequest;
use privilege_gate_core::Role;
use privilege_gate_core::Verdict;
use privilege_gate_core::WildcardExpansion;

// ============================================================================
// SECTION: Catalog Fixtures
// ============================================================================

/// Data streams `ds_a1` and `ds_b1` (both with failure stores), plain indices
/// `idx1`, `idx2`, `x1`, `x2`, a hidden index, a system index, and aliases.
pub fn sample_catalog() -> ResourceCatalog {
    ResourceCatalog::builder()
        .data_stream(
            DataStreamMeta::new("ds_a1", [".ds-ds_a1-000001", ".ds-ds_a1-000002"])
                .with_failure_indices([".fs-ds_a1-000001"]),
        )
        .data_stream(
            DataStreamMeta::new("ds_b1", [".ds-ds_b1-000001"])
                .with_failure_indices([".fs-ds_b1-000001"]),
        )
        .index(IndexMeta::new("idx1"))
        .index(IndexMeta::new("idx2"))
        .index(IndexMeta::new("x1"))
        .index(IndexMeta::new("x2"))
        .index(IndexMeta::new(".hidden_idx").hidden())
        .index(IndexMeta::new(".security").hidden().system())
        .alias(AliasMeta::new("alias_w", ["idx1"]).with_write_index("idx1"))
        .alias(AliasMeta::new("alias_nw", ["idx1"]))
        .alias(AliasMeta::new("alias_pair", ["idx1", "idx2"]))
        .alias(AliasMeta::new("alias_ds", ["ds_a1"]).with_write_index("ds_a1"))
        .build()
        .expect("sample catalog is valid")
}

// ============================================================================
// SECTION: Role Fixtures
// ============================================================================

pub fn grant(kind: ResourceKind, resources: &[&str], actions: &[&str]) -> PermissionEntry {
    PermissionEntry::grant(kind, resources, actions).expect("valid grant entry")
}

pub fn exclude(kind: ResourceKind, resources: &[&str], actions: &[&str]) -> PermissionEntry {
    PermissionEntry::exclude(kind, resources, actions).expect("valid exclusion entry")
}

pub fn role(name: &str, entries: Vec<PermissionEntry>) -> Role {
    Role::new(name, entries)
}

// ============================================================================
// SECTION: Evaluation Helpers
// ============================================================================

pub fn request(action: &str, expression: &str) -> ResourceRequest {
    ResourceRequest::new(action, expression).expect("valid expression")
}

pub fn request_with(
    action: &str,
    expression: &str,
    component: ComponentSelector,
    expand_wildcards: WildcardExpansion,
) -> ResourceRequest {
    request(action, expression).with_component(component).with_options(IndicesOptions {
        expand_wildcards,
        ..IndicesOptions::default()
    })
}

pub fn evaluate(
    request: &ResourceRequest,
    roles: &[Role],
    catalog: &ResourceCatalog,
) -> Result<Evaluation, EvaluationError> {
    PrivilegesEvaluator::default().evaluate(request, roles, catalog)
}

pub fn evaluate_with(
    settings: EvaluatorSettings,
    request: &ResourceRequest,
    roles: &[Role],
    catalog: &ResourceCatalog,
) -> Result<Evaluation, EvaluationError> {
    PrivilegesEvaluator::new(settings).evaluate(request, roles, catalog)
}

pub fn names(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|item| (*item).to_string()).collect()
}

pub fn full(verdict: &Verdict) -> Option<&AuthorizedResources> {
    match verdict {
        Verdict::AllowedFull(resources) => Some(resources),
        _ => None,
    }
}

pub fn partial(verdict: &Verdict) -> Option<&AuthorizedResources> {
    match verdict {
        Verdict::AllowedPartial(resources) => Some(resources),
        _ => None,
    }
}
