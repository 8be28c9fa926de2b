// crates/privilege-gate-core/src/runtime/resolver.rs
// ============================================================================
// Module: Resource Expression Resolver
// Description: Expands resource expressions into targets and candidates.
// Purpose: Bridge caller expressions and catalog topology deterministically.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Resolution runs in two stages:
//! - [`resolve`] turns clauses into top-level [`Target`] values. Literals are
//!   looked up directly; wildcards match catalog entries admitted by the
//!   expansion mode; negations subtract only when a positive clause is a
//!   wildcard and otherwise pass through verbatim.
//! - [`expand`] turns one gated target into [`Candidate`] values, descending
//!   into alias members and data-stream backing indices unless the action
//!   keeps top-level names.
//!
//! Missing literals are recorded instead of failing, because existence is
//! only reported after authorization.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::ActionProfile;
use crate::core::Clause;
use crate::core::Component;
use crate::core::ComponentSelector;
use crate::core::Pattern;
use crate::core::ResourceCatalog;
use crate::core::ResourceKind;
use crate::core::ResourceRequest;
use crate::core::WildcardExpansion;

// ============================================================================
// SECTION: Targets
// ============================================================================

/// Top-level resource selected by an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Resource name.
    pub name: String,
    /// Resource kind.
    pub kind: ResourceKind,
    /// Effective component selector.
    pub selector: ComponentSelector,
    /// Selected only through wildcard clauses.
    pub wildcard: bool,
    /// Hidden flag.
    pub hidden: bool,
    /// System flag.
    pub system: bool,
}

/// Literal name absent from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingLiteral {
    /// Requested name.
    pub name: String,
    /// Effective component selector.
    pub selector: ComponentSelector,
}

/// Output of [`resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Targets in name order.
    pub targets: Vec<Target>,
    /// Missing literals (empty under `ignore_unavailable`).
    pub missing: Vec<MissingLiteral>,
    /// Negated clauses left unresolved.
    pub passthrough: Vec<String>,
}

/// Resolves a request expression against the catalog.
#[must_use]
pub fn resolve(request: &ResourceRequest, catalog: &ResourceCatalog) -> Resolution {
    let expansion = request.options.expand_wildcards;
    let mut targets: BTreeMap<(String, ComponentSelector), Target> = BTreeMap::new();
    let mut missing: BTreeMap<(String, ComponentSelector), MissingLiteral> = BTreeMap::new();

    for clause in request.expression.clauses().iter().filter(|clause| !clause.negated) {
        let selector = clause.selector.unwrap_or(request.component);
        match &clause.pattern {
            Pattern::Literal(name) => match catalog.get(name) {
                Some(resource) => {
                    targets
                        .entry((name.clone(), selector))
                        .and_modify(|target| target.wildcard = false)
                        .or_insert_with(|| Target {
                            name: resource.name.clone(),
                            kind: resource.kind,
                            selector,
                            wildcard: false,
                            hidden: resource.hidden,
                            system: resource.system,
                        });
                }
                None if !request.options.ignore_unavailable => {
                    missing.entry((name.clone(), selector)).or_insert_with(|| MissingLiteral {
                        name: name.clone(),
                        selector,
                    });
                }
                None => {}
            },
            pattern => {
                for resource in catalog.list_all() {
                    if !expansion.admits(resource.hidden, resource.system)
                        || !pattern.matches(&resource.name)
                    {
                        continue;
                    }
                    targets.entry((resource.name.clone(), selector)).or_insert_with(|| Target {
                        name: resource.name.clone(),
                        kind: resource.kind,
                        selector,
                        wildcard: true,
                        hidden: resource.hidden,
                        system: resource.system,
                    });
                }
            }
        }
    }

    let negation_active = request.expression.has_positive_wildcard();
    let mut passthrough = Vec::new();
    for clause in request.expression.clauses().iter().filter(|clause| clause.negated) {
        if !negation_active {
            passthrough.push(render_clause(clause));
            continue;
        }
        targets.retain(|(name, selector), target| {
            !negation_removes(clause, name, *selector, expansion, target.hidden, target.system)
        });
        missing.retain(|(name, selector), _| {
            !negation_removes(clause, name, *selector, expansion, false, false)
        });
    }

    Resolution {
        targets: targets.into_values().collect(),
        missing: missing.into_values().collect(),
        passthrough,
    }
}

/// Returns true when a negated clause removes the named entry.
fn negation_removes(
    clause: &Clause,
    name: &str,
    selector: ComponentSelector,
    expansion: WildcardExpansion,
    hidden: bool,
    system: bool,
) -> bool {
    if clause.selector.is_some_and(|negated| negated != selector) {
        return false;
    }
    if clause.pattern.is_wildcard() && !expansion.admits(hidden, system) {
        return false;
    }
    clause.pattern.matches(name)
}

/// Renders a clause back to expression text.
fn render_clause(clause: &Clause) -> String {
    let prefix = if clause.negated { "-" } else { "" };
    clause.selector.map_or_else(
        || format!("{prefix}{}", clause.pattern),
        |selector| format!("{prefix}{}::{selector}", clause.pattern),
    )
}

// ============================================================================
// SECTION: Candidates
// ============================================================================

/// Target after component gating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedTarget {
    /// Underlying target.
    pub target: Target,
    /// Concrete component.
    pub component: Component,
    /// Unauthorized members are dropped instead of counted.
    pub optional: bool,
}

/// Name through which a candidate can be authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthPath {
    /// Permission kind that applies to this path.
    pub kind: ResourceKind,
    /// Name matched against entry patterns.
    pub name: String,
    /// Name belongs to a system resource.
    pub system: bool,
    /// Grants on this path apply; exclusions apply either way.
    pub grants: bool,
}

/// Resource the action would touch, with its authorization paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Candidate name (concrete index or top-level resource).
    pub name: String,
    /// Candidate kind; `Index` for concrete indices.
    pub kind: ResourceKind,
    /// Component the candidate belongs to.
    pub component: Component,
    /// Authorization paths.
    pub paths: Vec<AuthPath>,
    /// Alias write without a designated write index.
    pub write_target_missing: bool,
}

impl Candidate {
    /// Returns the reduced-request name of the candidate.
    #[must_use]
    pub fn display_name(&self) -> String {
        display_name(&self.name, self.kind, self.component)
    }

    /// Returns the concrete indices behind the candidate.
    #[must_use]
    pub fn concrete_indices(&self, catalog: &ResourceCatalog) -> Vec<String> {
        match self.kind {
            ResourceKind::Index => vec![self.name.clone()],
            ResourceKind::DataStream => {
                catalog.backing_indices_of_data_stream(&self.name, self.component).to_vec()
            }
            ResourceKind::Alias if self.write_target_missing => Vec::new(),
            ResourceKind::Alias => catalog
                .members_of_alias(&self.name)
                .into_iter()
                .flat_map(|member| match member.kind {
                    ResourceKind::DataStream => catalog
                        .backing_indices_of_data_stream(member.name, self.component)
                        .to_vec(),
                    _ if self.component == Component::Data => vec![member.name.to_string()],
                    _ => Vec::new(),
                })
                .collect(),
        }
    }
}

/// Renders `name` or `name::failures` for top-level failure components.
#[must_use]
pub fn display_name(name: &str, kind: ResourceKind, component: Component) -> String {
    if component == Component::Failures && kind != ResourceKind::Index {
        format!("{name}::failures")
    } else {
        name.to_string()
    }
}

/// Expands a gated target into candidates.
///
/// Write actions only reach the write targets of aliases and data streams.
/// Alias and data-stream paths of a written index grant only when the index
/// is the write target behind that name.
#[must_use]
pub fn expand(
    catalog: &ResourceCatalog,
    scoped: &ScopedTarget,
    profile: ActionProfile,
) -> Vec<Candidate> {
    let target = &scoped.target;
    let component = scoped.component;
    let write = profile.write;
    if profile.top_level && target.kind != ResourceKind::Index {
        return vec![top_level_candidate(catalog, &target.name, target.kind, component, write)];
    }
    match target.kind {
        ResourceKind::Index => {
            vec![concrete_candidate(catalog, &target.name, component, None, write)]
        }
        ResourceKind::DataStream => {
            let selected = stream_indices(catalog, &target.name, component, write);
            if selected.is_empty() {
                return vec![top_level_candidate(
                    catalog,
                    &target.name,
                    target.kind,
                    component,
                    write,
                )];
            }
            selected
                .iter()
                .map(|index| {
                    concrete_candidate(catalog, index, component, Some(target.name.as_str()), write)
                })
                .collect()
        }
        ResourceKind::Alias => expand_alias(catalog, &target.name, component, write),
    }
}

/// Returns the backing indices a data-stream access reaches.
fn stream_indices<'a>(
    catalog: &'a ResourceCatalog,
    stream: &str,
    component: Component,
    write: bool,
) -> &'a [String] {
    let backing = catalog.backing_indices_of_data_stream(stream, component);
    if write && !backing.is_empty() { &backing[backing.len() - 1..] } else { backing }
}

/// Returns true when `member` is the designated write member of `alias`.
fn is_alias_write_member(catalog: &ResourceCatalog, alias: &str, member: &str) -> bool {
    catalog
        .members_of_alias(alias)
        .iter()
        .any(|candidate| candidate.is_write_index && candidate.name == member)
}

/// Expands an alias into member candidates.
fn expand_alias(
    catalog: &ResourceCatalog,
    alias: &str,
    component: Component,
    write: bool,
) -> Vec<Candidate> {
    let members = catalog.members_of_alias(alias);
    let mut candidates = Vec::new();
    if write {
        let Some(member) = members.iter().find(|member| member.is_write_index) else {
            let mut candidate =
                top_level_candidate(catalog, alias, ResourceKind::Alias, component, true);
            candidate.write_target_missing = true;
            return vec![candidate];
        };
        if member.kind == ResourceKind::DataStream {
            for index in stream_indices(catalog, member.name, Component::Data, true) {
                candidates.push(concrete_candidate(
                    catalog,
                    index,
                    Component::Data,
                    Some(member.name),
                    true,
                ));
            }
        } else {
            candidates.push(concrete_candidate(catalog, member.name, Component::Data, None, true));
        }
        return candidates;
    }
    for member in &members {
        match (member.kind, component) {
            (ResourceKind::DataStream, _) => {
                for index in catalog.backing_indices_of_data_stream(member.name, component) {
                    candidates.push(concrete_candidate(
                        catalog,
                        index,
                        component,
                        Some(member.name),
                        false,
                    ));
                }
            }
            (_, Component::Data) => {
                candidates.push(concrete_candidate(catalog, member.name, component, None, false));
            }
            (_, Component::Failures) => {}
        }
    }
    if candidates.is_empty() {
        candidates.push(top_level_candidate(
            catalog,
            alias,
            ResourceKind::Alias,
            component,
            false,
        ));
    }
    candidates
}

/// Builds a concrete index candidate.
fn concrete_candidate(
    catalog: &ResourceCatalog,
    index: &str,
    component: Component,
    owner: Option<&str>,
    write: bool,
) -> Candidate {
    let mut paths = Vec::new();
    let stream = match component {
        Component::Data => {
            paths.push(AuthPath {
                kind: ResourceKind::Index,
                name: index.to_string(),
                system: catalog.is_system(index),
                grants: true,
            });
            for alias in catalog.aliases_of(index) {
                let grants = !write || is_alias_write_member(catalog, alias, index);
                paths.push(alias_path(alias, grants));
            }
            catalog.parent_data_stream(index).or(owner)
        }
        Component::Failures => owner,
    };
    if let Some(stream) = stream {
        let newest = stream_indices(catalog, stream, component, true);
        let grants = !write || newest.iter().any(|name| name == index);
        push_stream_paths(catalog, stream, &mut paths, write, grants);
    }
    Candidate {
        name: index.to_string(),
        kind: ResourceKind::Index,
        component,
        paths,
        write_target_missing: false,
    }
}

/// Builds an unexpanded alias or data-stream candidate.
fn top_level_candidate(
    catalog: &ResourceCatalog,
    name: &str,
    kind: ResourceKind,
    component: Component,
    write: bool,
) -> Candidate {
    let mut paths = Vec::new();
    match kind {
        ResourceKind::DataStream => push_stream_paths(catalog, name, &mut paths, write, true),
        ResourceKind::Alias => paths.push(alias_path(name, true)),
        ResourceKind::Index => {
            return concrete_candidate(catalog, name, component, None, write);
        }
    }
    Candidate {
        name: name.to_string(),
        kind,
        component,
        paths,
        write_target_missing: false,
    }
}

/// Adds the data-stream path and the paths of aliases over the stream.
///
/// `grants` is false when the candidate is not the stream's write target.
fn push_stream_paths(
    catalog: &ResourceCatalog,
    stream: &str,
    paths: &mut Vec<AuthPath>,
    write: bool,
    grants: bool,
) {
    paths.push(AuthPath {
        kind: ResourceKind::DataStream,
        name: stream.to_string(),
        system: catalog.is_system(stream),
        grants,
    });
    for alias in catalog.aliases_of(stream) {
        let alias_grants = grants && (!write || is_alias_write_member(catalog, alias, stream));
        paths.push(alias_path(alias, alias_grants));
    }
}

/// Builds an alias path.
fn alias_path(alias: &str, grants: bool) -> AuthPath {
    AuthPath {
        kind: ResourceKind::Alias,
        name: alias.to_string(),
        system: false,
        grants,
    }
}
