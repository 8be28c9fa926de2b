// crates/privilege-gate-core/src/runtime/service.rs
// ============================================================================
// Module: Authorization Service
// Description: Wires collaborator snapshots into the privilege evaluator.
// Purpose: Authorize one request per call from role names and a provider pair.
// Dependencies: thiserror, tracing, crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! [`AuthorizationService`] takes role names from the authentication layer,
//! fetches fresh snapshots from its providers, and runs the evaluator. It
//! keeps no state between calls.
//!
//! [`StaticCatalogProvider`] and [`InMemoryRoleProvider`] are simple
//! snapshot holders for tests, the CLI, and embedding.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::core::EvaluationError;
use crate::core::ResourceCatalog;
use crate::core::ResourceRequest;
use crate::core::Role;
use crate::core::RoleName;
use crate::interfaces::CatalogProvider;
use crate::interfaces::ProviderError;
use crate::interfaces::RoleProvider;
use crate::runtime::evaluator::Evaluation;
use crate::runtime::evaluator::PrivilegesEvaluator;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Service-level errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// A collaborator failed to produce a snapshot.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// Evaluation reported not found or a request-shape error.
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

// ============================================================================
// SECTION: Service
// ============================================================================

/// Request-scoped authorization over pluggable providers.
#[derive(Debug, Clone)]
pub struct AuthorizationService<C, R> {
    /// Catalog snapshot source.
    catalog: C,
    /// Role definition source.
    roles: R,
    /// Shared evaluator.
    evaluator: PrivilegesEvaluator,
}

impl<C, R> AuthorizationService<C, R>
where
    C: CatalogProvider,
    R: RoleProvider,
{
    /// Creates a service.
    #[must_use]
    pub const fn new(catalog: C, roles: R, evaluator: PrivilegesEvaluator) -> Self {
        Self {
            catalog,
            roles,
            evaluator,
        }
    }

    /// Authorizes a request for a caller carrying `role_names`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when a snapshot is unavailable or evaluation
    /// reports not found or a request-shape error.
    pub fn authorize(
        &self,
        role_names: &[RoleName],
        request: &ResourceRequest,
    ) -> Result<Evaluation, ServiceError> {
        let catalog = self.catalog.snapshot()?;
        let roles = self.roles.roles_for(role_names)?;
        Ok(self.evaluator.evaluate(request, &roles, &catalog)?)
    }
}

// ============================================================================
// SECTION: In-Memory Providers
// ============================================================================

/// Catalog provider returning one fixed snapshot.
#[derive(Debug, Clone)]
pub struct StaticCatalogProvider {
    /// Shared snapshot.
    catalog: Arc<ResourceCatalog>,
}

impl StaticCatalogProvider {
    /// Wraps a catalog snapshot.
    #[must_use]
    pub fn new(catalog: ResourceCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

impl CatalogProvider for StaticCatalogProvider {
    fn snapshot(&self) -> Result<Arc<ResourceCatalog>, ProviderError> {
        Ok(Arc::clone(&self.catalog))
    }
}

/// Role provider backed by an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRoleProvider {
    /// Roles keyed by name.
    roles: BTreeMap<RoleName, Role>,
}

impl InMemoryRoleProvider {
    /// Builds a provider from role definitions; later duplicates win.
    #[must_use]
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles.into_iter().map(|role| (role.name().clone(), role)).collect(),
        }
    }
}

impl RoleProvider for InMemoryRoleProvider {
    fn roles_for(&self, names: &[RoleName]) -> Result<Vec<Role>, ProviderError> {
        Ok(names
            .iter()
            .filter_map(|name| {
                let role = self.roles.get(name);
                if role.is_none() {
                    warn!(role = %name, "role has no definition and grants nothing");
                }
                role.cloned()
            })
            .collect())
    }
}
