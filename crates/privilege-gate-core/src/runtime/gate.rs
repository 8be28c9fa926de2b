// crates/privilege-gate-core/src/runtime/gate.rs
// ============================================================================
// Module: Failure-Store Component Gate
// Description: Normalizes requested components against resource kinds.
// Purpose: Keep failure-store indices out of requests unless explicitly unlocked.
// Dependencies: crate::core, crate::runtime::resolver
// ============================================================================

//! ## Overview
//! The gate runs before expansion and decides which components of each target
//! the request reaches:
//! - `data` always maps to the data component.
//! - `failures` on a plain index, or on an alias without data-stream members,
//!   is a request-shape error for literals and silently empty for wildcards.
//! - `all` adds the failures component only when a role holds the
//!   `special:failure_store` privilege on the target. Wildcard targets also
//!   need `all` expansion and a grant made through a wildcard pattern.
//!
//! Failure components admitted through `all` are optional: members the
//! evaluator rejects are dropped instead of failing the request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::Component;
use crate::core::ComponentSelector;
use crate::core::GrantScope;
use crate::core::NameGuard;
use crate::core::RequestShapeError;
use crate::core::ResourceCatalog;
use crate::core::ResourceKind;
use crate::core::Role;
use crate::core::WildcardExpansion;
use crate::runtime::resolver::ScopedTarget;
use crate::runtime::resolver::Target;

// ============================================================================
// SECTION: Component Gate
// ============================================================================

/// Request-scoped component gate.
pub struct ComponentGate<'a> {
    /// Catalog snapshot.
    catalog: &'a ResourceCatalog,
    /// Roles carried by the caller.
    roles: &'a [Role],
    /// Wildcard expansion mode of the request.
    expansion: WildcardExpansion,
    /// Universal wildcards may match system resources.
    include_protected: bool,
}

impl<'a> ComponentGate<'a> {
    /// Creates a gate for one request.
    #[must_use]
    pub const fn new(
        catalog: &'a ResourceCatalog,
        roles: &'a [Role],
        expansion: WildcardExpansion,
        include_protected: bool,
    ) -> Self {
        Self {
            catalog,
            roles,
            expansion,
            include_protected,
        }
    }

    /// Maps a target to the components the request reaches.
    ///
    /// # Errors
    ///
    /// Returns [`RequestShapeError`] when a literal asks for a failures
    /// component that cannot exist or a write addresses one.
    pub fn admit(
        &self,
        target: &Target,
        write: bool,
    ) -> Result<Vec<ScopedTarget>, RequestShapeError> {
        let scoped = |component: Component, optional: bool| ScopedTarget {
            target: target.clone(),
            component,
            optional,
        };
        match target.selector {
            ComponentSelector::Data => Ok(vec![scoped(Component::Data, false)]),
            ComponentSelector::Failures => {
                if write {
                    return Err(RequestShapeError::WriteToFailureStore {
                        name: target.name.clone(),
                    });
                }
                if self.has_failures_component(target) {
                    return Ok(vec![scoped(Component::Failures, false)]);
                }
                if target.wildcard {
                    return Ok(Vec::new());
                }
                Err(if target.kind == ResourceKind::Alias {
                    RequestShapeError::AliasWithoutFailureStore {
                        name: target.name.clone(),
                    }
                } else {
                    RequestShapeError::FailuresOnPlainIndex {
                        name: target.name.clone(),
                    }
                })
            }
            ComponentSelector::All => {
                let mut components = vec![scoped(Component::Data, false)];
                if !write && self.has_failures_component(target) && self.unlocks_failures(target) {
                    components.push(scoped(Component::Failures, true));
                }
                Ok(components)
            }
        }
    }

    /// Returns true for data streams and aliases with data-stream members.
    fn has_failures_component(&self, target: &Target) -> bool {
        match target.kind {
            ResourceKind::DataStream => true,
            ResourceKind::Alias => self.catalog.alias_has_data_streams(&target.name),
            ResourceKind::Index => false,
        }
    }

    /// Returns true when an `all` selector reaches the failures component.
    fn unlocks_failures(&self, target: &Target) -> bool {
        match self.failure_scope(target) {
            None => false,
            Some(_) if !target.wildcard => true,
            Some(scope) => {
                self.expansion == WildcardExpansion::All && scope == GrantScope::Broad
            }
        }
    }

    /// Returns the widest failure-store grant any role holds on the target.
    fn failure_scope(&self, target: &Target) -> Option<GrantScope> {
        let mut paths = vec![(target.kind, target.name.as_str(), target.system)];
        if target.kind == ResourceKind::DataStream {
            for alias in self.catalog.aliases_of(&target.name) {
                paths.push((ResourceKind::Alias, alias.as_str(), false));
            }
        }
        self.roles
            .iter()
            .flat_map(|role| {
                paths.iter().filter_map(move |(kind, name, system)| {
                    let guard = NameGuard {
                        protected: *system,
                        include_protected: self.include_protected,
                    };
                    role.failure_store_scope(*kind, name, guard)
                })
            })
            .max()
    }
}
