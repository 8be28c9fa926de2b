// crates/privilege-gate-core/tests/proptest_properties.rs
// ============================================================================
// Module: Evaluator Property-Based Tests
// Description: Property tests for monotonicity, locality, and determinism.
// Purpose: Detect invariant violations across generated roles and requests.
// ============================================================================

//! Property-based tests for privilege evaluation invariants.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use std::collections::BTreeSet;

use common::evaluate;
use common::exclude;
use common::grant;
use common::request;
use common::role;
use common::sample_catalog;
use privilege_gate_core::Evaluation;
use privilege_gate_core::Pattern;
use privilege_gate_core::PermissionEntry;
use privilege_gate_core::ResourceExpression;
use privilege_gate_core::ResourceKind;
use privilege_gate_core::Role;
use proptest::prelude::*;

/// Existing names and wildcards; missing literals are left out so that
/// not-found never masks the verdict.
const REQUEST_CLAUSES: &[&str] = &[
    "x1", "x2", "idx1", "idx2", "ds_a1", "ds_b1", "alias_pair", "alias_w", "x*", "idx*", "ds_*",
    "*",
];

const ENTRY_PATTERNS: &[&str] =
    &["x1", "x*", "idx1", "idx*", "ds_a*", "ds_b1", "alias_pair", "alias_*", ".ds-*", "*", "-x2"];

const KINDS: [ResourceKind; 3] =
    [ResourceKind::Index, ResourceKind::Alias, ResourceKind::DataStream];

fn entry_strategy(exclusion: bool) -> impl Strategy<Value = PermissionEntry> {
    (
        prop::sample::select(KINDS.to_vec()),
        prop::collection::vec(prop::sample::select(ENTRY_PATTERNS.to_vec()), 1 .. 4),
    )
        .prop_filter("needs a positive pattern", |(_, patterns)| {
            patterns.iter().any(|pattern| !pattern.starts_with('-'))
        })
        .prop_map(move |(kind, patterns)| {
            if exclusion {
                exclude(kind, &patterns, &["read"])
            } else {
                grant(kind, &patterns, &["read"])
            }
        })
}

fn role_strategy(name: &'static str) -> impl Strategy<Value = Role> {
    (
        prop::collection::vec(entry_strategy(false), 0 .. 4),
        prop::collection::vec(entry_strategy(true), 0 .. 2),
    )
        .prop_map(move |(mut grants, exclusions)| {
            grants.extend(exclusions);
            role(name, grants)
        })
}

fn expression_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(REQUEST_CLAUSES.to_vec()), 1 .. 4)
        .prop_map(|clauses| clauses.join(","))
}

fn authorized_indices(evaluation: &Evaluation) -> BTreeSet<String> {
    evaluation.verdict.authorized().map(|resources| resources.indices.clone()).unwrap_or_default()
}

proptest! {
    #[test]
    fn adding_a_role_never_removes_access(
        base in role_strategy("base"),
        extra in role_strategy("extra"),
        expression in expression_strategy(),
    ) {
        let catalog = sample_catalog();
        let request = request("read", &expression);

        let before = evaluate(&request, std::slice::from_ref(&base), &catalog).unwrap();
        let after = evaluate(&request, &[base, extra], &catalog).unwrap();

        let before = authorized_indices(&before);
        let after = authorized_indices(&after);
        prop_assert!(before.is_subset(&after));
    }

    #[test]
    fn adding_a_grant_to_a_role_never_removes_access(
        base in role_strategy("base"),
        extra in entry_strategy(false),
        expression in expression_strategy(),
    ) {
        let catalog = sample_catalog();
        let request = request("read", &expression);
        let mut entries = base.entries().to_vec();
        entries.push(extra);
        let widened = role("base", entries);

        let before = evaluate(&request, std::slice::from_ref(&base), &catalog).unwrap();
        let after = evaluate(&request, std::slice::from_ref(&widened), &catalog).unwrap();

        let before = authorized_indices(&before);
        let after = authorized_indices(&after);
        prop_assert!(before.is_subset(&after));
    }

    #[test]
    fn exclusion_only_role_changes_nothing(
        base in role_strategy("base"),
        exclusion in entry_strategy(true),
        expression in expression_strategy(),
    ) {
        let catalog = sample_catalog();
        let request = request("read", &expression);

        let alone = evaluate(&request, std::slice::from_ref(&base), &catalog).unwrap();
        let with_exclusion =
            evaluate(&request, &[base, role("deny", vec![exclusion])], &catalog).unwrap();

        prop_assert_eq!(alone.verdict, with_exclusion.verdict);
    }

    #[test]
    fn evaluation_is_deterministic_and_order_free(
        first in role_strategy("first"),
        second in role_strategy("second"),
        expression in expression_strategy(),
    ) {
        let catalog = sample_catalog();
        let request = request("read", &expression);

        let forward = evaluate(&request, &[first.clone(), second.clone()], &catalog).unwrap();
        let again = evaluate(&request, &[first.clone(), second.clone()], &catalog).unwrap();
        let reversed = evaluate(&request, &[second, first], &catalog).unwrap();

        prop_assert_eq!(&forward, &again);
        prop_assert_eq!(forward.verdict, reversed.verdict);
    }

    #[test]
    fn prefix_glob_matches_like_starts_with(prefix in "[a-z]{0,4}", name in "[a-z]{0,8}") {
        let pattern = Pattern::parse(&format!("{prefix}*")).unwrap();
        prop_assert_eq!(pattern.matches(&name), name.starts_with(&prefix));
    }

    #[test]
    fn arbitrary_expressions_never_panic(text in "[a-z0-9_*,:/.-]{0,24}") {
        let catalog = sample_catalog();
        let roles = [role("r", vec![grant(ResourceKind::Index, &["*"], &["read"])])];
        if ResourceExpression::parse(&text).is_ok() {
            let _ = evaluate(&request("read", &text), &roles, &catalog);
        }
    }
}
