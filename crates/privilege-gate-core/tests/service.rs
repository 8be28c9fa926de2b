// crates/privilege-gate-core/tests/service.rs
// ============================================================================
// Module: Authorization Service Tests
// Description: Provider wiring and error propagation for the service facade.
// Purpose: Validate role lookup and snapshot use per request.
// Dependencies: privilege-gate-core
// ============================================================================

//! Service tests over in-memory catalog and role providers.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use std::sync::Arc;

use common::grant;
use common::names;
use common::request;
use common::role;
use common::sample_catalog;
use privilege_gate_core::AuthorizationService;
use privilege_gate_core::CatalogProvider;
use privilege_gate_core::EvaluationError;
use privilege_gate_core::PrivilegesEvaluator;
use privilege_gate_core::ProviderError;
use privilege_gate_core::ResourceCatalog;
use privilege_gate_core::ResourceKind;
use privilege_gate_core::RoleName;
use privilege_gate_core::ServiceError;
use privilege_gate_core::runtime::InMemoryRoleProvider;
use privilege_gate_core::runtime::StaticCatalogProvider;

type TestResult = Result<(), Box<dyn std::error::Error>>;

struct UnavailableCatalog;

impl CatalogProvider for UnavailableCatalog {
    fn snapshot(&self) -> Result<Arc<ResourceCatalog>, ProviderError> {
        Err(ProviderError::Catalog("cluster state unavailable".to_string()))
    }
}

fn service() -> AuthorizationService<StaticCatalogProvider, InMemoryRoleProvider> {
    let roles = InMemoryRoleProvider::new([
        role("x_reader", vec![grant(ResourceKind::Index, &["x*"], &["read"])]),
        role("idx_reader", vec![grant(ResourceKind::Index, &["idx*"], &["read"])]),
    ]);
    AuthorizationService::new(
        StaticCatalogProvider::new(sample_catalog()),
        roles,
        PrivilegesEvaluator::default(),
    )
}

#[test]
fn service_unions_requested_roles() -> TestResult {
    let service = service();
    let roles = [RoleName::new("x_reader"), RoleName::new("idx_reader")];

    let evaluation = service.authorize(&roles, &request("read", "x1,idx1"))?;

    let resources = evaluation.verdict.authorized().expect("allowed verdict");
    assert_eq!(resources.names, names(&["idx1", "x1"]));
    Ok(())
}

#[test]
fn unknown_roles_grant_nothing() -> TestResult {
    let service = service();
    let roles = [RoleName::new("ghost")];

    let evaluation = service.authorize(&roles, &request("read", "x1"))?;

    assert!(!evaluation.verdict.is_allowed());
    Ok(())
}

#[test]
fn evaluation_errors_surface_through_the_service() {
    let service = service();
    let roles = [RoleName::new("x_reader")];

    let result = service.authorize(&roles, &request("read", "x_missing"));

    assert_eq!(
        result.unwrap_err(),
        ServiceError::Evaluation(EvaluationError::NotFound {
            names: vec!["x_missing".to_string()],
        })
    );
}

#[test]
fn provider_failures_surface_through_the_service() {
    let service = AuthorizationService::new(
        UnavailableCatalog,
        InMemoryRoleProvider::default(),
        PrivilegesEvaluator::default(),
    );

    let result = service.authorize(&[], &request("read", "x1"));

    assert!(matches!(result, Err(ServiceError::Provider(ProviderError::Catalog(_)))));
}
