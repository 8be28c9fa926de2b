// crates/privilege-gate-core/src/core/expression.rs
// ============================================================================
// Module: Resource Expressions
// Description: Parsed request expressions, component selectors, and options.
// Purpose: Turn caller-supplied resource strings into typed request clauses.
// Dependencies: serde, thiserror, crate::core
// ============================================================================

//! ## Overview
//! A resource expression is a comma-joined clause list. Each clause is a
//! literal, glob, or `/regex/`, optionally negated with a leading `-` and
//! optionally suffixed with a component selector (`::data`, `::failures`,
//! `::*`). `_all` and the empty expression both mean `*`.
//!
//! [`ResourceRequest`] bundles the action, the expression, the request-level
//! component, and [`IndicesOptions`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::ActionId;
use crate::core::pattern::Pattern;
use crate::core::pattern::PatternError;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum accepted expression length in bytes.
pub const MAX_EXPRESSION_BYTES: usize = 64 * 1024;

/// Expression alias for every resource.
const ALL_KEYWORD: &str = "_all";

/// Separator between a clause name and its selector.
const SELECTOR_SEPARATOR: &str = "::";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while parsing resource expressions.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    /// Expression exceeded [`MAX_EXPRESSION_BYTES`].
    #[error("resource expression exceeds {max} bytes")]
    TooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// A clause between commas was empty.
    #[error("resource expression contains an empty clause")]
    EmptyClause,
    /// Selector suffix was not `data`, `failures`, or `*`.
    #[error("unknown component selector {selector} in {clause}")]
    UnknownSelector {
        /// Offending clause.
        clause: String,
        /// Selector text.
        selector: String,
    },
    /// Clause pattern failed to parse.
    #[error("invalid resource pattern: {0}")]
    Pattern(#[from] PatternError),
}

// ============================================================================
// SECTION: Selectors and Options
// ============================================================================

/// Component selector for a clause or request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ComponentSelector {
    /// Main data component.
    #[default]
    Data,
    /// Failure-store component.
    Failures,
    /// Both components, subject to the failure-store gate.
    All,
}

impl ComponentSelector {
    /// Parses a selector suffix.
    fn parse(text: &str) -> Option<Self> {
        match text {
            "data" => Some(Self::Data),
            "failures" => Some(Self::Failures),
            "*" => Some(Self::All),
            _ => None,
        }
    }
}

impl fmt::Display for ComponentSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Data => "data",
            Self::Failures => "failures",
            Self::All => "*",
        };
        f.write_str(label)
    }
}

/// Wildcard expansion mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WildcardExpansion {
    /// Wildcards match nothing.
    None,
    /// Wildcards match visible, non-system resources.
    #[default]
    Open,
    /// Wildcards match hidden and system resources too.
    All,
}

impl WildcardExpansion {
    /// Returns true when a resource with these flags is reachable by wildcards.
    #[must_use]
    pub const fn admits(self, hidden: bool, system: bool) -> bool {
        match self {
            Self::None => false,
            Self::Open => !hidden && !system,
            Self::All => true,
        }
    }
}

/// Request-level resolution options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicesOptions {
    /// Wildcard expansion mode.
    pub expand_wildcards: WildcardExpansion,
    /// Skip missing literal names instead of failing.
    pub ignore_unavailable: bool,
    /// Succeed with an empty result instead of reporting not found.
    pub allow_no_indices: bool,
}

impl Default for IndicesOptions {
    fn default() -> Self {
        Self {
            expand_wildcards: WildcardExpansion::Open,
            ignore_unavailable: false,
            allow_no_indices: true,
        }
    }
}

// ============================================================================
// SECTION: Expressions
// ============================================================================

/// One clause of a resource expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    /// Resource pattern.
    pub pattern: Pattern,
    /// Leading `-` present.
    pub negated: bool,
    /// Explicit selector suffix.
    pub selector: Option<ComponentSelector>,
}

/// Parsed resource expression.
///
/// # Invariants
/// - Contains at least one clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceExpression {
    /// Clauses in request order.
    clauses: Vec<Clause>,
    /// Original expression text.
    source: String,
}

impl ResourceExpression {
    /// Parses a comma-joined expression.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError`] for empty clauses, unknown selectors, or
    /// invalid patterns.
    pub fn parse(text: &str) -> Result<Self, ExpressionError> {
        if text.len() > MAX_EXPRESSION_BYTES {
            return Err(ExpressionError::TooLong {
                max: MAX_EXPRESSION_BYTES,
            });
        }
        let trimmed = text.trim();
        let mut clauses = Vec::new();
        if trimmed.is_empty() {
            clauses.push(Clause {
                pattern: Pattern::parse("*")?,
                negated: false,
                selector: None,
            });
        } else {
            for raw in trimmed.split(',') {
                clauses.push(parse_clause(raw.trim())?);
            }
        }
        Ok(Self {
            clauses,
            source: text.to_string(),
        })
    }

    /// Returns the clauses.
    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Returns the original text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true when any positive clause is a wildcard.
    #[must_use]
    pub fn has_positive_wildcard(&self) -> bool {
        self.clauses.iter().any(|clause| !clause.negated && clause.pattern.is_wildcard())
    }
}

/// Splits a trailing `::selector` that lies outside any `/regex/` body.
fn split_selector(body: &str) -> Option<(&str, &str)> {
    let whole_regex = body.len() >= 2 && body.starts_with('/') && body.ends_with('/');
    if whole_regex {
        return None;
    }
    body.rsplit_once(SELECTOR_SEPARATOR)
}

/// Parses one clause.
fn parse_clause(raw: &str) -> Result<Clause, ExpressionError> {
    if raw.is_empty() {
        return Err(ExpressionError::EmptyClause);
    }
    let (negated, body) = match raw.strip_prefix('-') {
        Some(rest) if !rest.is_empty() => (true, rest),
        _ => (false, raw),
    };
    let (name, selector) = match split_selector(body) {
        Some((name, suffix)) => {
            let selector = ComponentSelector::parse(suffix).ok_or_else(|| {
                ExpressionError::UnknownSelector {
                    clause: raw.to_string(),
                    selector: suffix.to_string(),
                }
            })?;
            (name, Some(selector))
        }
        None => (body, None),
    };
    if name.is_empty() {
        return Err(ExpressionError::EmptyClause);
    }
    let name = if name == ALL_KEYWORD { "*" } else { name };
    Ok(Clause {
        pattern: Pattern::parse(name)?,
        negated,
        selector,
    })
}

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Authorization request for one action over a resource expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    /// Requested action.
    pub action: ActionId,
    /// Parsed resource expression.
    pub expression: ResourceExpression,
    /// Component applied to clauses without an explicit selector.
    pub component: ComponentSelector,
    /// Resolution options.
    pub options: IndicesOptions,
}

impl ResourceRequest {
    /// Parses a request with default component and options.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError`] when the expression is invalid.
    pub fn new(action: impl Into<ActionId>, expression: &str) -> Result<Self, ExpressionError> {
        Ok(Self {
            action: action.into(),
            expression: ResourceExpression::parse(expression)?,
            component: ComponentSelector::Data,
            options: IndicesOptions::default(),
        })
    }

    /// Sets the request-level component.
    #[must_use]
    pub const fn with_component(mut self, component: ComponentSelector) -> Self {
        self.component = component;
        self
    }

    /// Sets the resolution options.
    #[must_use]
    pub const fn with_options(mut self, options: IndicesOptions) -> Self {
        self.options = options;
        self
    }
}
