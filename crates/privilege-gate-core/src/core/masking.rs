// crates/privilege-gate-core/src/core/masking.rs
// ============================================================================
// Module: Field Masking Rules
// Description: Field masking expressions and their irreversible transforms.
// Purpose: Describe how masked field values are rewritten by the storage layer.
// Dependencies: blake2b_simd, regex, serde, sha2, thiserror, crate::core::pattern
// ============================================================================

//! ## Overview
//! Masking expressions have three shapes:
//! - `field` masks with the default algorithm (salted Blake2b-256, lowercase
//!   hex);
//! - `field::SHA-256` or `field::SHA-512` masks with a named digest;
//! - `field::/regex/::replacement[::/regex/::replacement...]` applies ordered
//!   regex replacements.
//!
//! The engine only combines masking rules; [`MaskedField::mask`] is exposed so
//! the enforcement layer applies exactly the transform configured here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use blake2b_simd::Params;
use regex::Regex;
use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use sha2::Sha512;
use thiserror::Error;

use crate::core::pattern::Pattern;
use crate::core::pattern::PatternError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Separator between the field pattern and masking parameters.
const SEPARATOR: &str = "::";
/// Salt used by the default digest when none is configured.
pub const DEFAULT_MASKING_SALT: &str = "e1ukloTsQlOgPquJ";
/// Maximum Blake2b salt length in bytes.
pub const MAX_MASKING_SALT_LENGTH: usize = 16;
/// Blake2b digest length in bytes.
const BLAKE2B_DIGEST_LENGTH: usize = 32;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while parsing masking expressions.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaskingError {
    /// Field pattern was invalid.
    #[error("invalid masked field {expression}: {source}")]
    InvalidField {
        /// Original expression.
        expression: String,
        /// Underlying pattern error.
        source: PatternError,
    },
    /// Digest name is not supported.
    #[error("unsupported masking algorithm: {0}")]
    UnknownAlgorithm(String),
    /// Regex replacement parameters were malformed.
    #[error("invalid masking expression: {0}")]
    InvalidExpression(String),
    /// Salt is longer than Blake2b allows.
    #[error("masking salt exceeds 16 bytes")]
    SaltTooLong,
}

// ============================================================================
// SECTION: Hashing
// ============================================================================

/// Salt mixed into the default Blake2b digest.
///
/// # Invariants
/// - At most [`MAX_MASKING_SALT_LENGTH`] bytes; shorter salts are zero-padded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MaskingSalt(String);

impl MaskingSalt {
    /// Creates a salt.
    ///
    /// # Errors
    ///
    /// Returns [`MaskingError::SaltTooLong`] when `salt` exceeds 16 bytes.
    pub fn new(salt: impl Into<String>) -> Result<Self, MaskingError> {
        let salt = salt.into();
        if salt.len() > MAX_MASKING_SALT_LENGTH {
            return Err(MaskingError::SaltTooLong);
        }
        Ok(Self(salt))
    }

    /// Returns the salt text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MaskingSalt {
    fn default() -> Self {
        Self(DEFAULT_MASKING_SALT.to_string())
    }
}

/// Digest algorithms available for masking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum HashAlgorithm {
    /// Salted Blake2b with a 256-bit digest.
    #[default]
    Blake2b,
    /// SHA-256.
    Sha256,
    /// SHA-512.
    Sha512,
}

impl HashAlgorithm {
    /// Parses a digest name such as `SHA-256` (case-insensitive, dash optional).
    fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().replace('-', "").as_str() {
            "SHA256" => Some(Self::Sha256),
            "SHA512" => Some(Self::Sha512),
            _ => None,
        }
    }

    /// Hashes bytes and returns the lowercase hex digest.
    fn hash_hex(self, bytes: &[u8], salt: &MaskingSalt) -> String {
        match self {
            Self::Blake2b => {
                let hash = Params::new()
                    .hash_length(BLAKE2B_DIGEST_LENGTH)
                    .salt(salt.as_str().as_bytes())
                    .hash(bytes);
                hex_encode(hash.as_bytes())
            }
            Self::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(bytes);
                hex_encode(&hasher.finalize())
            }
            Self::Sha512 => {
                let mut hasher = Sha512::new();
                hasher.update(bytes);
                hex_encode(&hasher.finalize())
            }
        }
    }
}

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(char::from(HEX[usize::from(byte >> 4)]));
        out.push(char::from(HEX[usize::from(byte & 0x0f)]));
    }
    out
}

// ============================================================================
// SECTION: Masked Fields
// ============================================================================

/// Transform applied to a masked value.
#[derive(Debug, Clone)]
enum MaskMethod {
    /// Replace the value with its digest.
    Hash(HashAlgorithm),
    /// Apply regex replacements in order.
    Replace(Vec<(Regex, String)>),
}

/// One masked-field rule.
///
/// # Invariants
/// - `expression` is the configured text and round-trips through serde.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MaskedField {
    /// Field pattern.
    pattern: Pattern,
    /// Masking transform.
    method: MaskMethod,
    /// Configured expression.
    expression: String,
}

impl MaskedField {
    /// Parses a masking expression.
    ///
    /// # Errors
    ///
    /// Returns [`MaskingError`] when the field pattern, algorithm, or regex
    /// parameters are invalid.
    pub fn parse(expression: &str) -> Result<Self, MaskingError> {
        let mut parts = expression.split(SEPARATOR);
        let field = parts.next().unwrap_or_default();
        let pattern = Pattern::parse(field).map_err(|err| MaskingError::InvalidField {
            expression: expression.to_string(),
            source: err,
        })?;
        let params: Vec<&str> = parts.collect();
        let method = match params.as_slice() {
            [] => MaskMethod::Hash(HashAlgorithm::default()),
            [algorithm] => MaskMethod::Hash(
                HashAlgorithm::parse(algorithm)
                    .ok_or_else(|| MaskingError::UnknownAlgorithm((*algorithm).to_string()))?,
            ),
            pairs if pairs.len() % 2 == 0 => {
                let mut replacements = Vec::with_capacity(pairs.len() / 2);
                for pair in pairs.chunks(2) {
                    let [regex, replacement] = pair else {
                        return Err(MaskingError::InvalidExpression(expression.to_string()));
                    };
                    let body = regex
                        .strip_prefix('/')
                        .and_then(|rest| rest.strip_suffix('/'))
                        .filter(|body| !body.is_empty())
                        .ok_or_else(|| MaskingError::InvalidExpression(expression.to_string()))?;
                    let compiled = Regex::new(body)
                        .map_err(|err| MaskingError::InvalidExpression(err.to_string()))?;
                    replacements.push((compiled, (*replacement).to_string()));
                }
                MaskMethod::Replace(replacements)
            }
            _ => return Err(MaskingError::InvalidExpression(expression.to_string())),
        };
        Ok(Self {
            pattern,
            method,
            expression: expression.to_string(),
        })
    }

    /// Returns true when the rule applies to `field`.
    #[must_use]
    pub fn applies_to(&self, field: &str) -> bool {
        self.pattern.matches(field)
    }

    /// Applies the masking transform to a value.
    ///
    /// `salt` only affects the default Blake2b digest.
    #[must_use]
    pub fn mask(&self, value: &str, salt: &MaskingSalt) -> String {
        match &self.method {
            MaskMethod::Hash(algorithm) => algorithm.hash_hex(value.as_bytes(), salt),
            MaskMethod::Replace(replacements) => {
                replacements.iter().fold(value.to_string(), |current, (regex, replacement)| {
                    regex.replace_all(&current, replacement.as_str()).into_owned()
                })
            }
        }
    }
}

impl PartialEq for MaskedField {
    fn eq(&self, other: &Self) -> bool {
        self.expression == other.expression
    }
}

impl Eq for MaskedField {}

impl TryFrom<String> for MaskedField {
    type Error = MaskingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MaskedField> for String {
    fn from(value: MaskedField) -> Self {
        value.expression
    }
}
