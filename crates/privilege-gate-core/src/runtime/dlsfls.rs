// crates/privilege-gate-core/src/runtime/dlsfls.rs
// ============================================================================
// Module: DLS/FLS Combiner
// Description: Merges document filters, field rules, and masks per index.
// Purpose: Produce the restriction contract enforced by the storage layer.
// Dependencies: serde, serde_json, crate::core
// ============================================================================

//! ## Overview
//! For every authorized candidate the combiner looks at the grant entries that
//! contributed to its authorization, across all roles:
//! - Document filters combine with OR. One contributing entry without a
//!   filter leaves the candidate unfiltered.
//! - Field rules combine by intersection. Entries without field rules do not
//!   take part.
//! - Masks combine by union; the first matching rule decides the transform.
//!   The configured salt travels with the masks so hashes are reproducible.
//!
//! Candidates without any restriction are left out of the bundle, so an empty
//! bundle means "no document or field restrictions".
//!
//! Security posture: query fragments are passed through unvalidated and are
//! never logged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::core::FieldRule;
use crate::core::MaskedField;
use crate::core::MaskingSalt;
use crate::core::PermissionEntry;

// ============================================================================
// SECTION: Restriction Types
// ============================================================================

/// OR-combined document filter.
///
/// # Invariants
/// - Contains at least one query; duplicates are removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DocumentFilter {
    /// Query fragments in contribution order.
    queries: Vec<Value>,
}

impl DocumentFilter {
    /// Returns the individual query fragments.
    #[must_use]
    pub fn queries(&self) -> &[Value] {
        &self.queries
    }

    /// Renders the filter as a single query.
    #[must_use]
    pub fn to_query(&self) -> Value {
        match self.queries.as_slice() {
            [single] => single.clone(),
            queries => json!({
                "bool": {
                    "should": queries,
                    "minimum_should_match": 1
                }
            }),
        }
    }
}

/// Intersection of field rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldVisibility {
    /// Rules that must all expose a field.
    rules: Vec<FieldRule>,
}

impl FieldVisibility {
    /// Returns true when every rule exposes `field`.
    #[must_use]
    pub fn is_visible(&self, field: &str) -> bool {
        self.rules.iter().all(|rule| rule.is_visible(field))
    }

    /// Returns the combined rules.
    #[must_use]
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }
}

/// Union of field masks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldMasking {
    /// Masking rules in contribution order.
    fields: Vec<MaskedField>,
    /// Salt for the default digest.
    #[serde(skip)]
    salt: MaskingSalt,
}

impl FieldMasking {
    /// Returns the rule that masks `field`, if any.
    #[must_use]
    pub fn masking_for(&self, field: &str) -> Option<&MaskedField> {
        self.fields.iter().find(|masked| masked.applies_to(field))
    }

    /// Masks `value` when `field` is masked.
    #[must_use]
    pub fn mask(&self, field: &str, value: &str) -> Option<String> {
        self.masking_for(field).map(|masked| masked.mask(value, &self.salt))
    }

    /// Returns the combined rules.
    #[must_use]
    pub fn fields(&self) -> &[MaskedField] {
        &self.fields
    }
}

/// Restrictions attached to one authorized resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexRestrictions {
    /// Document filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dls: Option<DocumentFilter>,
    /// Field visibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fls: Option<FieldVisibility>,
    /// Field masking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masking: Option<FieldMasking>,
}

impl IndexRestrictions {
    /// Returns true when nothing is restricted.
    #[must_use]
    pub const fn is_unrestricted(&self) -> bool {
        self.dls.is_none() && self.fls.is_none() && self.masking.is_none()
    }
}

/// Restrictions keyed by authorized resource name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DlsFlsBundle {
    /// Restricted resources only.
    restrictions: BTreeMap<String, IndexRestrictions>,
}

impl DlsFlsBundle {
    /// Returns true when no resource is restricted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.restrictions.is_empty()
    }

    /// Returns the restrictions of one resource.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&IndexRestrictions> {
        self.restrictions.get(name)
    }

    /// Iterates over restricted resources in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &IndexRestrictions)> {
        self.restrictions.iter()
    }
}

impl FromIterator<(String, IndexRestrictions)> for DlsFlsBundle {
    fn from_iter<T: IntoIterator<Item = (String, IndexRestrictions)>>(iter: T) -> Self {
        Self {
            restrictions: iter
                .into_iter()
                .filter(|(_, restrictions)| !restrictions.is_unrestricted())
                .collect(),
        }
    }
}

// ============================================================================
// SECTION: Combination
// ============================================================================

/// Combines the restrictions of the entries that authorized one resource.
#[must_use]
pub fn combine(contributions: &[&PermissionEntry], salt: &MaskingSalt) -> IndexRestrictions {
    if contributions.is_empty() {
        return IndexRestrictions::default();
    }
    IndexRestrictions {
        dls: combine_dls(contributions),
        fls: combine_fls(contributions),
        masking: combine_masking(contributions, salt),
    }
}

/// OR-combines filters; any unfiltered contribution lifts the filter.
fn combine_dls(contributions: &[&PermissionEntry]) -> Option<DocumentFilter> {
    let mut queries: Vec<Value> = Vec::new();
    for entry in contributions {
        let query = entry.dls()?;
        if !queries.contains(query) {
            queries.push(query.clone());
        }
    }
    Some(DocumentFilter {
        queries,
    })
}

/// Intersects field rules of contributions that carry them.
fn combine_fls(contributions: &[&PermissionEntry]) -> Option<FieldVisibility> {
    let mut rules: Vec<FieldRule> = Vec::new();
    for rule in contributions.iter().filter_map(|entry| entry.fls()) {
        if !rules.contains(rule) {
            rules.push(rule.clone());
        }
    }
    (!rules.is_empty()).then_some(FieldVisibility {
        rules,
    })
}

/// Unions masked fields of all contributions.
fn combine_masking(contributions: &[&PermissionEntry], salt: &MaskingSalt) -> Option<FieldMasking> {
    let mut fields: Vec<MaskedField> = Vec::new();
    for masked in contributions.iter().flat_map(|entry| entry.masked_fields()) {
        if !fields.contains(masked) {
            fields.push(masked.clone());
        }
    }
    (!fields.is_empty()).then(|| FieldMasking {
        fields,
        salt: salt.clone(),
    })
}
