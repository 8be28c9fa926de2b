// crates/privilege-gate-core/src/core/pattern/tests.rs
// ============================================================================
// Module: Pattern Matcher Tests
// Description: Unit tests for glob, regex, and literal matching.
// Purpose: Pin matching semantics, including the universal-wildcard guard.
// Dependencies: privilege-gate-core
// ============================================================================

//! ## Overview
//! Exercises the private glob matcher and the public pattern surface.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use super::Pattern;
use super::PatternError;
use super::PatternSet;
use super::glob_matches;

// ============================================================================
// SECTION: Glob Matching
// ============================================================================

#[test]
fn glob_handles_leading_trailing_and_inner_stars() {
    assert!(glob_matches("logs-*", "logs-2024"));
    assert!(glob_matches("*-2024", "logs-2024"));
    assert!(glob_matches("lo*20*4", "logs-2024"));
    assert!(glob_matches("*", ""));
    assert!(glob_matches("a**b", "ab"));
    assert!(!glob_matches("a*a", "a"));
    assert!(!glob_matches("logs-*", "metrics-2024"));
}

#[test]
fn glob_has_no_path_semantics() {
    assert!(glob_matches("a*", "a/b/c"));
    assert!(glob_matches("*.keyword", "user.name.keyword"));
}

// ============================================================================
// SECTION: Pattern Parsing
// ============================================================================

#[test]
fn parse_dispatches_by_shape() {
    assert!(matches!(Pattern::parse("idx").unwrap(), Pattern::Literal(_)));
    assert!(matches!(Pattern::parse("idx*").unwrap(), Pattern::Glob(_)));
    assert!(matches!(Pattern::parse("/idx[0-9]+/").unwrap(), Pattern::Regex { .. }));
    assert_eq!(Pattern::parse("").unwrap_err(), PatternError::Empty);
    assert!(matches!(Pattern::parse("/[/").unwrap_err(), PatternError::InvalidRegex { .. }));
}

#[test]
fn regex_is_anchored_to_whole_name() {
    let pattern = Pattern::parse("/idx[0-9]/").unwrap();
    assert!(pattern.matches("idx1"));
    assert!(!pattern.matches("idx12"));
    assert!(!pattern.matches("my-idx1"));
}

#[test]
fn literal_is_case_sensitive() {
    let pattern = Pattern::parse("Logs").unwrap();
    assert!(pattern.matches("Logs"));
    assert!(!pattern.matches("logs"));
}

#[test]
fn universal_wildcard_respects_protected_guard() {
    let universal = Pattern::parse("*").unwrap();
    assert!(universal.is_universal());
    assert!(!universal.matches_guarded(".security", true, false));
    assert!(universal.matches_guarded(".security", true, true));
    let scoped = Pattern::parse(".sec*").unwrap();
    assert!(!scoped.is_universal());
    assert!(scoped.matches_guarded(".security", true, false));
}

// ============================================================================
// SECTION: Pattern Sets
// ============================================================================

#[test]
fn pattern_set_negation_subtracts() {
    let set = PatternSet::parse(["logs-*", "-logs-secret"]).unwrap();
    assert!(set.matches("logs-app"));
    assert!(!set.matches("logs-secret"));
    assert!(!set.matches("metrics"));
}

#[test]
fn pattern_set_with_only_negations_matches_nothing() {
    let set = PatternSet::parse(["-logs"]).unwrap();
    assert!(set.is_empty());
    assert!(!set.matches("logs"));
    assert!(!set.matches("other"));
}

#[test]
fn pattern_set_serializes_round_trip_text() {
    let set = PatternSet::parse(["a*", "-ab"]).unwrap();
    let json = serde_json::to_string(&set).unwrap();
    assert_eq!(json, r#"["a*","-ab"]"#);
}
