// crates/privilege-gate-core/src/runtime/evaluator.rs
// ============================================================================
// Module: Privilege Evaluator
// Description: Decides verdicts for resource requests against role snapshots.
// Purpose: Classify candidates, reduce the request, and attach DLS/FLS.
// Dependencies: serde, tracing, crate::core, crate::runtime
// ============================================================================

//! ## Overview
//! The evaluator drives one request through
//! `Received -> Resolved -> Evaluated -> {Forbidden | Executed}`:
//! 1. resolve the expression into targets;
//! 2. gate components and expand targets into candidates;
//! 3. decide each candidate against every role (grants OR across roles,
//!    exclusions only within their own role);
//! 4. classify, reduce, and combine DLS/FLS for authorized candidates.
//!
//! Invariants:
//! - Forbidden takes precedence over not found.
//! - Evaluation is pure; identical inputs give identical outputs.
//! - Adding a grant entry never removes an authorized candidate.
//!
//! Security posture: roles and catalog are trusted snapshots; request
//! expressions are untrusted and fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;
use tracing::trace;

use crate::core::ActionPolicy;
use crate::core::ActionProfile;
use crate::core::AuthorizedResources;
use crate::core::Component;
use crate::core::ComponentRestriction;
use crate::core::EvaluationError;
use crate::core::ForbiddenDetail;
use crate::core::MaskingSalt;
use crate::core::MissingPrivilege;
use crate::core::NameGuard;
use crate::core::PermissionEntry;
use crate::core::RequestShapeError;
use crate::core::ResourceCatalog;
use crate::core::ResourceKind;
use crate::core::ResourceRequest;
use crate::core::Role;
use crate::core::Verdict;
use crate::runtime::dlsfls::DlsFlsBundle;
use crate::runtime::dlsfls::combine;
use crate::runtime::gate::ComponentGate;
use crate::runtime::resolver::AuthPath;
use crate::runtime::resolver::Candidate;
use crate::runtime::resolver::ScopedTarget;
use crate::runtime::resolver::display_name;
use crate::runtime::resolver::expand;
use crate::runtime::resolver::resolve;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Evaluator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluatorSettings {
    /// List missing privileges on forbidden verdicts.
    pub verbose_errors: bool,
    /// Keep universal wildcards in role patterns away from system resources.
    pub protect_system_resources: bool,
    /// Allow partial execution for actions classified as partial.
    pub do_not_fail_on_forbidden: bool,
    /// Action classification.
    pub action_policy: ActionPolicy,
    /// Salt for the default masking digest.
    pub masking_salt: MaskingSalt,
}

impl Default for EvaluatorSettings {
    fn default() -> Self {
        Self {
            verbose_errors: false,
            protect_system_resources: true,
            do_not_fail_on_forbidden: true,
            action_policy: ActionPolicy::default(),
            masking_salt: MaskingSalt::default(),
        }
    }
}

// ============================================================================
// SECTION: Evaluation Output
// ============================================================================

/// Verdict plus the DLS/FLS bundle for authorized resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    /// Authorization verdict.
    pub verdict: Verdict,
    /// Restrictions keyed by authorized resource name.
    pub dls_fls: DlsFlsBundle,
}

/// Per-candidate decision.
struct Decision<'r> {
    /// At least one role authorizes the candidate.
    authorized: bool,
    /// Grant entries of authorizing roles.
    contributions: Vec<&'r PermissionEntry>,
}

/// Gated target with indices of its candidates.
struct TargetGroup {
    /// Gated target.
    scoped: ScopedTarget,
    /// Indices into the deduplicated candidate list.
    members: Vec<usize>,
}

// ============================================================================
// SECTION: Evaluator
// ============================================================================

/// Privilege evaluator.
#[derive(Debug, Clone, Default)]
pub struct PrivilegesEvaluator {
    /// Evaluation settings.
    settings: EvaluatorSettings,
}

impl PrivilegesEvaluator {
    /// Creates an evaluator.
    #[must_use]
    pub const fn new(settings: EvaluatorSettings) -> Self {
        Self {
            settings,
        }
    }

    /// Evaluates a request for a caller carrying `roles`.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::RequestShape`] for malformed requests and
    /// [`EvaluationError::NotFound`] for missing literals the caller would be
    /// allowed to see.
    pub fn evaluate(
        &self,
        request: &ResourceRequest,
        roles: &[Role],
        catalog: &ResourceCatalog,
    ) -> Result<Evaluation, EvaluationError> {
        let action = request.action.as_str();
        let profile = self.settings.action_policy.profile(action);
        let resolution = resolve(request, catalog);
        let gate = ComponentGate::new(
            catalog,
            roles,
            request.options.expand_wildcards,
            !self.settings.protect_system_resources,
        );

        let mut candidates: Vec<Candidate> = Vec::new();
        let mut positions: BTreeMap<(String, Component), usize> = BTreeMap::new();
        let mut groups: Vec<TargetGroup> = Vec::new();
        for target in &resolution.targets {
            for scoped in gate.admit(target, profile.write)? {
                let mut members = Vec::new();
                for candidate in expand(catalog, &scoped, profile) {
                    let key = (candidate.name.clone(), candidate.component);
                    let position = *positions.entry(key).or_insert_with(|| {
                        candidates.push(candidate);
                        candidates.len() - 1
                    });
                    if !members.contains(&position) {
                        members.push(position);
                    }
                }
                groups.push(TargetGroup {
                    scoped,
                    members,
                });
            }
        }

        let decisions: Vec<Decision<'_>> =
            candidates.iter().map(|candidate| self.decide(action, candidate, roles)).collect();

        if let Some(candidate) = candidates
            .iter()
            .zip(&decisions)
            .find(|(candidate, decision)| candidate.write_target_missing && decision.authorized)
            .map(|(candidate, _)| candidate)
        {
            return Err(RequestShapeError::NoWriteIndex {
                alias: candidate.name.clone(),
            }
            .into());
        }

        let mut not_found = Vec::new();
        let mut unauthorized_missing = Vec::new();
        for missing in &resolution.missing {
            if self.grants_any(action, &missing.name, roles) {
                not_found.push(missing.name.clone());
            } else {
                unauthorized_missing.push(missing.name.clone());
            }
        }

        let mut counted: BTreeSet<usize> = BTreeSet::new();
        let mut unauthorized: BTreeSet<usize> = BTreeSet::new();
        for group in &groups {
            for &position in &group.members {
                let authorized = decisions.get(position).is_some_and(|d| d.authorized);
                if authorized || !group.scoped.optional {
                    counted.insert(position);
                }
                if !authorized && !group.scoped.optional {
                    unauthorized.insert(position);
                }
            }
        }

        let total = counted.len() + unauthorized_missing.len();
        let denied = unauthorized.len() + unauthorized_missing.len();
        if total == 0 {
            if !not_found.is_empty() || !request.options.allow_no_indices {
                return Err(EvaluationError::NotFound {
                    names: not_found,
                });
            }
            debug!(action, verdict = "allowed_full", "no resources matched the request");
            return Ok(Evaluation {
                verdict: Verdict::AllowedFull(AuthorizedResources {
                    passthrough: resolution.passthrough,
                    ..AuthorizedResources::default()
                }),
                dls_fls: DlsFlsBundle::default(),
            });
        }

        let partial_allowed = profile.partial && self.settings.do_not_fail_on_forbidden;
        if denied == total || (denied > 0 && !partial_allowed) {
            let detail =
                self.forbidden_detail(action, &candidates, &unauthorized, &unauthorized_missing);
            debug!(action, candidates = total, denied, verdict = "forbidden", "request forbidden");
            return Ok(Evaluation {
                verdict: Verdict::Forbidden(detail),
                dls_fls: DlsFlsBundle::default(),
            });
        }
        if !not_found.is_empty() {
            return Err(EvaluationError::NotFound {
                names: not_found,
            });
        }

        let resources =
            reduce(catalog, profile, &groups, &candidates, &decisions, resolution.passthrough);
        let dls_fls = candidates
            .iter()
            .zip(&decisions)
            .filter(|(_, decision)| decision.authorized)
            .map(|(candidate, decision)| {
                (
                    candidate.display_name(),
                    combine(&decision.contributions, &self.settings.masking_salt),
                )
            })
            .collect();
        let verdict = if denied == 0 {
            Verdict::AllowedFull(resources)
        } else {
            Verdict::AllowedPartial(resources)
        };
        debug!(action, candidates = total, denied, verdict = verdict.label(), "request evaluated");
        Ok(Evaluation {
            verdict,
            dls_fls,
        })
    }

    /// Decides one candidate against all roles.
    fn decide<'r>(&self, action: &str, candidate: &Candidate, roles: &'r [Role]) -> Decision<'r> {
        let mut decision = Decision {
            authorized: false,
            contributions: Vec::new(),
        };
        for role in roles {
            let grants: Vec<&PermissionEntry> = role
                .entries()
                .iter()
                .filter(|entry| entry.is_grant() && entry.matches_action(action))
                .filter(|entry| {
                    candidate
                        .paths
                        .iter()
                        .any(|path| self.entry_grants(role, entry, path, candidate.component))
                })
                .collect();
            if grants.is_empty() {
                continue;
            }
            let vetoed = candidate
                .paths
                .iter()
                .any(|path| role.excludes(action, path.kind, &path.name, candidate.component));
            if vetoed {
                trace!(
                    role = %role.name(),
                    candidate = %candidate.name,
                    "grant vetoed by role exclusion"
                );
                continue;
            }
            decision.authorized = true;
            decision.contributions.extend(grants);
        }
        trace!(
            candidate = %candidate.display_name(),
            authorized = decision.authorized,
            "candidate decided"
        );
        decision
    }

    /// Returns true when `entry` of `role` grants access through `path`.
    fn entry_grants(
        &self,
        role: &Role,
        entry: &PermissionEntry,
        path: &AuthPath,
        component: Component,
    ) -> bool {
        if !path.grants {
            return false;
        }
        let guard = self.guard(path.system);
        if !entry.covers(path.kind, &path.name, component, guard) {
            return false;
        }
        match component {
            Component::Data => true,
            Component::Failures => {
                entry.component() == ComponentRestriction::FailuresOnly
                    || role.failure_store_scope(path.kind, &path.name, guard).is_some()
            }
        }
    }

    /// Returns true when some role grants `action` on `name` under any kind.
    fn grants_any(&self, action: &str, name: &str, roles: &[Role]) -> bool {
        const KINDS: [ResourceKind; 3] =
            [ResourceKind::Index, ResourceKind::Alias, ResourceKind::DataStream];
        let guard = self.guard(false);
        roles.iter().any(|role| {
            KINDS.iter().any(|kind| {
                let granted = role.entries().iter().any(|entry| {
                    entry.is_grant()
                        && entry.matches_action(action)
                        && entry.covers(*kind, name, Component::Data, guard)
                });
                granted && !role.excludes(action, *kind, name, Component::Data)
            })
        })
    }

    /// Builds the name guard for a path.
    const fn guard(&self, system: bool) -> NameGuard {
        NameGuard {
            protected: system,
            include_protected: !self.settings.protect_system_resources,
        }
    }

    /// Builds the forbidden detail, listing missing privileges in verbose mode.
    fn forbidden_detail(
        &self,
        action: &str,
        candidates: &[Candidate],
        unauthorized: &BTreeSet<usize>,
        unauthorized_missing: &[String],
    ) -> ForbiddenDetail {
        if !self.settings.verbose_errors {
            return ForbiddenDetail::default();
        }
        let mut missing: BTreeSet<MissingPrivilege> = unauthorized
            .iter()
            .filter_map(|position| candidates.get(*position))
            .map(|candidate| MissingPrivilege {
                resource: candidate.display_name(),
                action: action.to_string(),
            })
            .collect();
        missing.extend(unauthorized_missing.iter().map(|name| MissingPrivilege {
            resource: name.clone(),
            action: action.to_string(),
        }));
        ForbiddenDetail {
            missing: missing.into_iter().collect(),
        }
    }
}

// ============================================================================
// SECTION: Reduction
// ============================================================================

/// Reduces the request to authorized names and concrete indices.
fn reduce(
    catalog: &ResourceCatalog,
    profile: ActionProfile,
    groups: &[TargetGroup],
    candidates: &[Candidate],
    decisions: &[Decision<'_>],
    passthrough: Vec<String>,
) -> AuthorizedResources {
    let mut resources = AuthorizedResources {
        passthrough,
        ..AuthorizedResources::default()
    };
    for group in groups {
        let authorized: Vec<&Candidate> = group
            .members
            .iter()
            .filter(|position| decisions.get(**position).is_some_and(|d| d.authorized))
            .filter_map(|position| candidates.get(*position))
            .collect();
        if authorized.is_empty() {
            continue;
        }
        let target = &group.scoped.target;
        let whole = authorized.len() == group.members.len();
        if whole && !profile.write && target.kind != ResourceKind::Index {
            resources.names.insert(display_name(&target.name, target.kind, group.scoped.component));
        } else {
            resources.names.extend(authorized.iter().map(|candidate| candidate.display_name()));
        }
        for candidate in authorized {
            resources.indices.extend(candidate.concrete_indices(catalog));
        }
    }
    resources
}
