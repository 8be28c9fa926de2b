// crates/privilege-gate-core/src/core/fields.rs
// ============================================================================
// Module: Field Visibility Rules
// Description: Field-level security include/exclude rule sets.
// Purpose: Decide which document fields a single permission entry exposes.
// Dependencies: serde, thiserror, crate::core::pattern
// ============================================================================

//! ## Overview
//! A [`FieldRule`] is an ordered list of field patterns. Items prefixed with
//! `~` or `!` exclude, all others include. The last matching item decides.
//! When no item matches, the default depends on the list shape:
//! - only exclusions: the field is visible;
//! - otherwise: the field is hidden.
//!
//! A trailing `.keyword` on the queried field is ignored so multi-field
//! subfields follow their parent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::pattern::Pattern;
use crate::core::pattern::PatternError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Multi-field suffix ignored during matching.
const KEYWORD_SUFFIX: &str = ".keyword";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while parsing field rules.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldRuleError {
    /// Rule list was empty.
    #[error("field rule list must not be empty")]
    Empty,
    /// A rule item failed to parse.
    #[error("invalid field rule {rule}: {source}")]
    InvalidPattern {
        /// Original rule text.
        rule: String,
        /// Underlying pattern error.
        source: PatternError,
    },
}

// ============================================================================
// SECTION: Field Rules
// ============================================================================

/// Single include or exclude item.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldRuleItem {
    /// Field pattern.
    pattern: Pattern,
    /// True for `~`/`!` items.
    exclude: bool,
}

/// Ordered FLS rule set of one permission entry.
///
/// # Invariants
/// - Contains at least one item.
/// - `source` preserves the configured text for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FieldRule {
    /// Parsed items in declaration order.
    items: Vec<FieldRuleItem>,
    /// Visibility when no item matches.
    default_visible: bool,
    /// Configured rule text.
    source: Vec<String>,
}

impl FieldRule {
    /// Parses a rule list.
    ///
    /// # Errors
    ///
    /// Returns [`FieldRuleError`] when the list is empty or an item is invalid.
    pub fn parse<I, S>(rules: I) -> Result<Self, FieldRuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut items = Vec::new();
        let mut source = Vec::new();
        for rule in rules {
            let rule = rule.as_ref();
            let (exclude, body) = match rule.strip_prefix(['~', '!']) {
                Some(body) => (true, body),
                None => (false, rule),
            };
            let pattern = Pattern::parse(body).map_err(|err| FieldRuleError::InvalidPattern {
                rule: rule.to_string(),
                source: err,
            })?;
            items.push(FieldRuleItem {
                pattern,
                exclude,
            });
            source.push(rule.to_string());
        }
        if items.is_empty() {
            return Err(FieldRuleError::Empty);
        }
        let default_visible = items.iter().all(|item| item.exclude);
        Ok(Self {
            items,
            default_visible,
            source,
        })
    }

    /// Returns true when the rule set exposes `field`.
    #[must_use]
    pub fn is_visible(&self, field: &str) -> bool {
        let field = field.strip_suffix(KEYWORD_SUFFIX).unwrap_or(field);
        self.items
            .iter()
            .rev()
            .find(|item| item.pattern.matches(field))
            .map_or(self.default_visible, |item| !item.exclude)
    }

    /// Returns the configured rule text.
    #[must_use]
    pub fn rules(&self) -> &[String] {
        &self.source
    }
}

impl TryFrom<Vec<String>> for FieldRule {
    type Error = FieldRuleError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<FieldRule> for Vec<String> {
    fn from(value: FieldRule) -> Self {
        value.source
    }
}
