// crates/privilege-gate-core/src/core/pattern.rs
// ============================================================================
// Module: Resource Pattern Matcher
// Description: Literal, wildcard, and regex patterns over resource names.
// Purpose: Match permission and request patterns against catalog names.
// Dependencies: regex, serde, thiserror
// ============================================================================

//! ## Overview
//! A [`Pattern`] is parsed once from its textual form and dispatched as a
//! tagged variant:
//! - `/.../` is a regex anchored to the whole name.
//! - Any other text containing `*` is a glob where `*` matches zero or more
//!   characters with no path semantics.
//! - Everything else is an exact literal.
//!
//! Matching is case-sensitive and compares exact codepoints. The universal
//! wildcard (`*`, `**`, ...) is the only pattern that can be barred from
//! protected names through [`Pattern::matches_guarded`].
//!
//! [`PatternSet`] groups patterns from one permission entry. Items prefixed
//! with `-` subtract from the positive patterns of the same set.
//!
//! Security posture: patterns originate from role definitions and request
//! expressions; regex compilation uses the linear-time `regex` engine.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use regex::Regex;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum accepted length of a single pattern in bytes.
pub const MAX_PATTERN_BYTES: usize = 1024;

/// Compiled regex size limit applied to `/.../` patterns.
const MAX_REGEX_SIZE: usize = 1 << 20;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while parsing patterns.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// Pattern text was empty.
    #[error("pattern must not be empty")]
    Empty,
    /// Pattern text exceeded [`MAX_PATTERN_BYTES`].
    #[error("pattern exceeds {max} bytes")]
    TooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Regex pattern failed to compile.
    #[error("invalid regex pattern {pattern}: {message}")]
    InvalidRegex {
        /// Original pattern text.
        pattern: String,
        /// Compiler error message.
        message: String,
    },
}

// ============================================================================
// SECTION: Pattern
// ============================================================================

/// Single resource or action pattern.
///
/// # Invariants
/// - `Regex` values are anchored to the entire name.
/// - `Glob` values contain at least one `*`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Pattern {
    /// Exact name.
    Literal(String),
    /// Wildcard pattern using `*`.
    Glob(String),
    /// Delimited regex pattern.
    Regex {
        /// Original `/.../` text.
        source: String,
        /// Compiled, anchored regex.
        regex: Regex,
    },
}

impl Pattern {
    /// Parses a pattern from its textual form.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] when the text is empty, too long, or an invalid regex.
    pub fn parse(text: &str) -> Result<Self, PatternError> {
        if text.is_empty() {
            return Err(PatternError::Empty);
        }
        if text.len() > MAX_PATTERN_BYTES {
            return Err(PatternError::TooLong {
                max: MAX_PATTERN_BYTES,
            });
        }
        if let Some(body) = regex_body(text) {
            let regex = regex::RegexBuilder::new(&format!("^(?:{body})$"))
                .size_limit(MAX_REGEX_SIZE)
                .build()
                .map_err(|err| PatternError::InvalidRegex {
                    pattern: text.to_string(),
                    message: err.to_string(),
                })?;
            return Ok(Self::Regex {
                source: text.to_string(),
                regex,
            });
        }
        if text.contains('*') {
            return Ok(Self::Glob(text.to_string()));
        }
        Ok(Self::Literal(text.to_string()))
    }

    /// Returns the original pattern text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(text) | Self::Glob(text) => text,
            Self::Regex {
                source, ..
            } => source,
        }
    }

    /// Returns true for glob and regex patterns.
    #[must_use]
    pub const fn is_wildcard(&self) -> bool {
        !matches!(self, Self::Literal(_))
    }

    /// Returns true when the pattern is a glob made only of `*`.
    #[must_use]
    pub fn is_universal(&self) -> bool {
        matches!(self, Self::Glob(text) if text.chars().all(|ch| ch == '*'))
    }

    /// Returns true when the pattern matches `name`.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Literal(text) => text == name,
            Self::Glob(text) => glob_matches(text, name),
            Self::Regex {
                regex, ..
            } => regex.is_match(name),
        }
    }

    /// Matches `name`, refusing the universal wildcard on protected names
    /// unless `include_protected` is set.
    #[must_use]
    pub fn matches_guarded(&self, name: &str, protected: bool, include_protected: bool) -> bool {
        if protected && !include_protected && self.is_universal() {
            return false;
        }
        self.matches(name)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Pattern {}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Pattern {
    type Error = PatternError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Pattern> for String {
    fn from(value: Pattern) -> Self {
        value.as_str().to_string()
    }
}

/// Returns the regex body of a `/.../` delimited pattern.
fn regex_body(text: &str) -> Option<&str> {
    if text.len() < 2 {
        return None;
    }
    text.strip_prefix('/').and_then(|rest| rest.strip_suffix('/'))
}

/// Matches a `*` glob against a name without backtracking.
fn glob_matches(pattern: &str, name: &str) -> bool {
    let mut segments: Vec<&str> = pattern.split('*').collect();
    let Some(last) = segments.pop() else {
        return name.is_empty();
    };
    if segments.is_empty() {
        return pattern == name;
    }
    let first = segments.remove(0);
    let Some(mut rest) = name.strip_prefix(first) else {
        return false;
    };
    for segment in segments {
        if segment.is_empty() {
            continue;
        }
        match rest.find(segment) {
            Some(position) => rest = &rest[position + segment.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}

// ============================================================================
// SECTION: Pattern Sets
// ============================================================================

/// Ordered pattern list with entry-local negation.
///
/// # Invariants
/// - A name matches when any positive pattern matches and no negated pattern does.
/// - A set with no positive patterns matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct PatternSet {
    /// Patterns that grant a match.
    positive: Vec<Pattern>,
    /// Patterns prefixed with `-` that veto a match.
    negative: Vec<Pattern>,
}

impl PatternSet {
    /// Parses a pattern list; items starting with `-` are negations.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] when any item fails to parse.
    pub fn parse<I, S>(items: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for item in items {
            let item = item.as_ref();
            match item.strip_prefix('-') {
                Some(negated) if !negated.is_empty() => set.negative.push(Pattern::parse(negated)?),
                _ => set.positive.push(Pattern::parse(item)?),
            }
        }
        Ok(set)
    }

    /// Returns true when the set has no positive patterns.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.positive.is_empty()
    }

    /// Returns true when `name` matches the set.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.find_match(name, false, true).is_some()
    }

    /// Returns true when `name` matches under the protected-name guard.
    #[must_use]
    pub fn matches_guarded(&self, name: &str, protected: bool, include_protected: bool) -> bool {
        self.find_match(name, protected, include_protected).is_some()
    }

    /// Returns the first positive pattern matching `name`, if no negation vetoes it.
    #[must_use]
    pub fn find_match(
        &self,
        name: &str,
        protected: bool,
        include_protected: bool,
    ) -> Option<&Pattern> {
        if self.negative.iter().any(|pattern| pattern.matches(name)) {
            return None;
        }
        self.positive
            .iter()
            .find(|pattern| pattern.matches_guarded(name, protected, include_protected))
    }
}

impl TryFrom<Vec<String>> for PatternSet {
    type Error = PatternError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<PatternSet> for Vec<String> {
    fn from(value: PatternSet) -> Self {
        let mut items: Self = value.positive.iter().map(|p| p.as_str().to_string()).collect();
        items.extend(value.negative.iter().map(|p| format!("-{p}")));
        items
    }
}

#[cfg(test)]
mod tests;
