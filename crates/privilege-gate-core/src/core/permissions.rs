// crates/privilege-gate-core/src/core/permissions.rs
// ============================================================================
// Module: Permission Set
// Description: Roles and their grant/exclude permission entries.
// Purpose: Model per-role privileges over indices, aliases, and data streams.
// Dependencies: serde, serde_json, thiserror, crate::core
// ============================================================================

//! ## Overview
//! A [`Role`] is an ordered list of [`PermissionEntry`] values and nothing
//! else. A caller's effective privilege is the union across roles; an
//! exclusion entry only narrows grants of its own role.
//!
//! Entries are typed by [`ResourceKind`]: index entries never authorize alias
//! or data-stream paths and vice versa.
//!
//! Resource patterns may carry a `::failures` or `::data` suffix. All patterns
//! of one entry must agree on the suffix, which becomes the entry's
//! [`ComponentRestriction`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::catalog::Component;
use crate::core::catalog::ResourceKind;
use crate::core::fields::FieldRule;
use crate::core::identifiers::RoleName;
use crate::core::masking::MaskedField;
use crate::core::pattern::PatternError;
use crate::core::pattern::PatternSet;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Action that unlocks the failures component of data streams.
pub const FAILURE_STORE_PRIVILEGE: &str = "special:failure_store";

/// Pattern suffix restricting an entry to the failures component.
const FAILURES_SUFFIX: &str = "::failures";

/// Pattern suffix restricting an entry to the data component.
const DATA_SUFFIX: &str = "::data";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while building permission entries.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionError {
    /// Entry listed no resource patterns.
    #[error("permission entry must list at least one resource pattern")]
    NoResources,
    /// Entry listed no action patterns.
    #[error("permission entry must list at least one action")]
    NoActions,
    /// A resource or action pattern was invalid.
    #[error("invalid permission pattern: {0}")]
    Pattern(#[from] PatternError),
    /// Some patterns carried a component suffix and others did not.
    #[error("resource patterns mix component suffixes: {0}")]
    MixedComponents(String),
    /// Component suffix on a kind that has no components.
    #[error("component suffix not allowed on {kind} pattern {pattern}")]
    ComponentOnIndex {
        /// Entry kind.
        kind: ResourceKind,
        /// Offending pattern.
        pattern: String,
    },
}

// ============================================================================
// SECTION: Entry Types
// ============================================================================

/// Entry polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Polarity {
    /// Grants the listed actions.
    Grant,
    /// Removes the listed actions from grants of the same role.
    Exclude,
}

/// Data-stream components an entry applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentRestriction {
    /// Data and failures components.
    #[default]
    Both,
    /// Data component only.
    DataOnly,
    /// Failures component only.
    FailuresOnly,
}

impl ComponentRestriction {
    /// Returns true when the restriction admits `component`.
    #[must_use]
    pub const fn allows(self, component: Component) -> bool {
        matches!(
            (self, component),
            (Self::Both, _)
                | (Self::DataOnly, Component::Data)
                | (Self::FailuresOnly, Component::Failures)
        )
    }
}

/// Scope of a failure-store grant matching a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GrantScope {
    /// Granted through a pattern naming exactly this resource.
    Exact,
    /// Granted through a wildcard or regex pattern.
    Broad,
}

// ============================================================================
// SECTION: Permission Entry
// ============================================================================

/// One permission entry of a role.
///
/// # Invariants
/// - `resources` and `actions` each contain at least one positive pattern.
/// - Resource patterns are stored without component suffixes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PermissionEntry {
    /// Resource kind the entry applies to.
    kind: ResourceKind,
    /// Grant or exclude.
    polarity: Polarity,
    /// Resource patterns.
    resources: PatternSet,
    /// Action patterns.
    actions: PatternSet,
    /// Data-stream component restriction.
    component: ComponentRestriction,
    /// Document-level security query fragment.
    #[serde(skip_serializing_if = "Option::is_none")]
    dls: Option<Value>,
    /// Field-level security rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    fls: Option<FieldRule>,
    /// Field masking rules.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    masked_fields: Vec<MaskedField>,
}

impl PermissionEntry {
    /// Builds a grant entry.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError`] when patterns are missing, invalid, or mix
    /// component suffixes.
    pub fn grant<R, A, S, T>(
        kind: ResourceKind,
        resources: R,
        actions: A,
    ) -> Result<Self, PermissionError>
    where
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
        A: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self::build(kind, Polarity::Grant, resources, actions)
    }

    /// Builds an exclusion entry.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError`] when patterns are missing, invalid, or mix
    /// component suffixes.
    pub fn exclude<R, A, S, T>(
        kind: ResourceKind,
        resources: R,
        actions: A,
    ) -> Result<Self, PermissionError>
    where
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
        A: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self::build(kind, Polarity::Exclude, resources, actions)
    }

    /// Parses patterns and derives the component restriction.
    fn build<R, A, S, T>(
        kind: ResourceKind,
        polarity: Polarity,
        resources: R,
        actions: A,
    ) -> Result<Self, PermissionError>
    where
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
        A: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut stripped = Vec::new();
        let mut restriction: Option<ComponentRestriction> = None;
        for raw in resources {
            let raw = raw.as_ref();
            let (pattern, found) = if let Some(base) = raw.strip_suffix(FAILURES_SUFFIX) {
                (base, ComponentRestriction::FailuresOnly)
            } else if let Some(base) = raw.strip_suffix(DATA_SUFFIX) {
                (base, ComponentRestriction::DataOnly)
            } else {
                (raw, ComponentRestriction::Both)
            };
            if found != ComponentRestriction::Both && kind == ResourceKind::Index {
                return Err(PermissionError::ComponentOnIndex {
                    kind,
                    pattern: raw.to_string(),
                });
            }
            match restriction {
                Some(existing) if existing != found => {
                    return Err(PermissionError::MixedComponents(raw.to_string()));
                }
                _ => restriction = Some(found),
            }
            stripped.push(pattern.to_string());
        }
        let resources = PatternSet::parse(&stripped)?;
        if resources.is_empty() {
            return Err(PermissionError::NoResources);
        }
        let actions = PatternSet::parse(actions)?;
        if actions.is_empty() {
            return Err(PermissionError::NoActions);
        }
        Ok(Self {
            kind,
            polarity,
            resources,
            actions,
            component: restriction.unwrap_or_default(),
            dls: None,
            fls: None,
            masked_fields: Vec::new(),
        })
    }

    /// Attaches a document-level security query.
    #[must_use]
    pub fn with_dls(mut self, query: Value) -> Self {
        self.dls = Some(query);
        self
    }

    /// Attaches field-level security rules.
    #[must_use]
    pub fn with_fls(mut self, rule: FieldRule) -> Self {
        self.fls = Some(rule);
        self
    }

    /// Attaches field masking rules.
    #[must_use]
    pub fn with_masked_fields(mut self, fields: Vec<MaskedField>) -> Self {
        self.masked_fields = fields;
        self
    }

    /// Overrides the component restriction.
    #[must_use]
    pub const fn with_component(mut self, component: ComponentRestriction) -> Self {
        self.component = component;
        self
    }

    /// Returns the resource kind.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Returns the resource patterns.
    #[must_use]
    pub const fn resources(&self) -> &PatternSet {
        &self.resources
    }

    /// Returns the action patterns.
    #[must_use]
    pub const fn actions(&self) -> &PatternSet {
        &self.actions
    }

    /// Returns the component restriction.
    #[must_use]
    pub const fn component(&self) -> ComponentRestriction {
        self.component
    }

    /// Returns the DLS query, if any.
    #[must_use]
    pub const fn dls(&self) -> Option<&Value> {
        self.dls.as_ref()
    }

    /// Returns the FLS rules, if any.
    #[must_use]
    pub const fn fls(&self) -> Option<&FieldRule> {
        self.fls.as_ref()
    }

    /// Returns the masked fields.
    #[must_use]
    pub fn masked_fields(&self) -> &[MaskedField] {
        &self.masked_fields
    }

    /// Returns true when the entry is a grant.
    #[must_use]
    pub fn is_grant(&self) -> bool {
        self.polarity == Polarity::Grant
    }

    /// Returns true when any action pattern matches `action`.
    #[must_use]
    pub fn matches_action(&self, action: &str) -> bool {
        self.actions.matches(action)
    }

    /// Returns true when the entry covers `name` of `kind` for `component`.
    #[must_use]
    pub fn covers(
        &self,
        kind: ResourceKind,
        name: &str,
        component: Component,
        guard: NameGuard,
    ) -> bool {
        self.kind == kind
            && self.component.allows(component)
            && self.resources.matches_guarded(name, guard.protected, guard.include_protected)
    }
}

/// Protected-name guard applied when matching entry patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NameGuard {
    /// The name being matched is a system resource.
    pub protected: bool,
    /// Universal wildcards may match protected names.
    pub include_protected: bool,
}

// ============================================================================
// SECTION: Roles
// ============================================================================

/// Named, ordered list of permission entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Role {
    /// Role name.
    name: RoleName,
    /// Entries in declaration order.
    entries: Vec<PermissionEntry>,
}

impl Role {
    /// Creates a role.
    #[must_use]
    pub fn new(name: impl Into<RoleName>, entries: Vec<PermissionEntry>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    /// Returns the role name.
    #[must_use]
    pub const fn name(&self) -> &RoleName {
        &self.name
    }

    /// Returns the entries.
    #[must_use]
    pub fn entries(&self) -> &[PermissionEntry] {
        &self.entries
    }

    /// Returns true when an exclusion entry of this role vetoes `action` on `name`.
    #[must_use]
    pub fn excludes(
        &self,
        action: &str,
        kind: ResourceKind,
        name: &str,
        component: Component,
    ) -> bool {
        self.entries.iter().any(|entry| {
            !entry.is_grant()
                && entry.matches_action(action)
                && entry.covers(kind, name, component, NameGuard::default())
        })
    }

    /// Returns the widest failure-store grant of this role on `name`.
    ///
    /// A grant counts when a grant entry of `kind` matches `name` and either
    /// lists [`FAILURE_STORE_PRIVILEGE`] or is restricted to the failures
    /// component, and no exclusion of this role vetoes it.
    #[must_use]
    pub fn failure_store_scope(
        &self,
        kind: ResourceKind,
        name: &str,
        guard: NameGuard,
    ) -> Option<GrantScope> {
        if self.excludes(FAILURE_STORE_PRIVILEGE, kind, name, Component::Failures) {
            return None;
        }
        self.entries
            .iter()
            .filter(|entry| {
                entry.is_grant()
                    && entry.kind() == kind
                    && entry.component().allows(Component::Failures)
                    && (entry.matches_action(FAILURE_STORE_PRIVILEGE)
                        || entry.component() == ComponentRestriction::FailuresOnly)
            })
            .filter_map(|entry| {
                entry.resources().find_match(name, guard.protected, guard.include_protected)
            })
            .map(|pattern| {
                if pattern.is_wildcard() { GrantScope::Broad } else { GrantScope::Exact }
            })
            .max()
    }
}
