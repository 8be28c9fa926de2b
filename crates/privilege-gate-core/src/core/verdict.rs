// crates/privilege-gate-core/src/core/verdict.rs
// ============================================================================
// Module: Authorization Verdicts
// Description: Verdicts, authorized resource sets, and evaluation errors.
// Purpose: Report the outcome of one privilege evaluation.
// Dependencies: serde, thiserror, crate::core::expression
// ============================================================================

//! ## Overview
//! A [`Verdict`] is computed fresh for every request and never cached.
//! Partial success is a verdict, not an error. Errors are limited to
//! [`EvaluationError::NotFound`] and [`EvaluationError::RequestShape`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

use crate::core::expression::ExpressionError;

// ============================================================================
// SECTION: Verdicts
// ============================================================================

/// Resources a verdict allows the action to touch.
///
/// # Invariants
/// - `indices` only lists concrete indices.
/// - Both sets are ordered, so equal inputs serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthorizedResources {
    /// Reduced request names; failure components are rendered `name::failures`.
    pub names: BTreeSet<String>,
    /// Concrete indices behind `names`.
    pub indices: BTreeSet<String>,
    /// Negated literals passed through unresolved.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub passthrough: Vec<String>,
}

impl AuthorizedResources {
    /// Returns true when nothing is authorized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Missing (resource, action) pair reported in verbose mode.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MissingPrivilege {
    /// Resource display name.
    pub resource: String,
    /// Action that was not granted.
    pub action: String,
}

/// Details attached to a forbidden verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ForbiddenDetail {
    /// Missing privileges; empty unless verbose errors are enabled.
    pub missing: Vec<MissingPrivilege>,
}

/// Final authorization verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// The action must not run.
    Forbidden(ForbiddenDetail),
    /// Every candidate is authorized.
    AllowedFull(AuthorizedResources),
    /// Only the listed subset is authorized.
    AllowedPartial(AuthorizedResources),
}

impl Verdict {
    /// Returns true for allowed verdicts.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        !matches!(self, Self::Forbidden(_))
    }

    /// Returns the authorized resources of an allowed verdict.
    #[must_use]
    pub const fn authorized(&self) -> Option<&AuthorizedResources> {
        match self {
            Self::Forbidden(_) => None,
            Self::AllowedFull(resources) | Self::AllowedPartial(resources) => Some(resources),
        }
    }

    /// Returns a stable label for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Forbidden(_) => "forbidden",
            Self::AllowedFull(_) => "allowed_full",
            Self::AllowedPartial(_) => "allowed_partial",
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Malformed requests, distinct from forbidden and not found.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestShapeError {
    /// Expression failed to parse.
    #[error("invalid resource expression: {0}")]
    InvalidExpression(#[from] ExpressionError),
    /// `::failures` was requested on a plain index.
    #[error("index {name} has no failures component")]
    FailuresOnPlainIndex {
        /// Index name.
        name: String,
    },
    /// `::failures` was requested on an alias without data-stream members.
    #[error("alias {name} has no data stream members and no failures component")]
    AliasWithoutFailureStore {
        /// Alias name.
        name: String,
    },
    /// Write through an alias without a designated write index.
    #[error("alias {alias} has no write index")]
    NoWriteIndex {
        /// Alias name.
        alias: String,
    },
    /// Write addressed to a failures component.
    #[error("cannot write to the failures component of {name}")]
    WriteToFailureStore {
        /// Target name.
        name: String,
    },
}

/// Evaluation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    /// Literal names are missing and tolerance is strict.
    #[error("resources not found: {}", names.join(","))]
    NotFound {
        /// Missing names; empty when a wildcard-only request matched nothing.
        names: Vec<String>,
    },
    /// Request is malformed.
    #[error("{0}")]
    RequestShape(#[from] RequestShapeError),
}

impl From<ExpressionError> for EvaluationError {
    fn from(value: ExpressionError) -> Self {
        Self::RequestShape(RequestShapeError::InvalidExpression(value))
    }
}
