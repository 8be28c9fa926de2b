//! Role validation tests for privilege-gate-config.
// crates/privilege-gate-config/tests/role_validation.rs
// =============================================================================
// Module: Role Validation Tests
// Description: Validate role building, action groups, and DLS/FLS parsing.
// Purpose: Ensure role definitions fail closed and evaluate as configured.
// =============================================================================

use privilege_gate_config::ConfigError;
use privilege_gate_config::PrivilegeGateConfig;
use privilege_gate_core::ComponentRestriction;
use privilege_gate_core::IndexMeta;
use privilege_gate_core::PrivilegesEvaluator;
use privilege_gate_core::ResourceCatalog;
use privilege_gate_core::ResourceKind;
use privilege_gate_core::ResourceRequest;
use privilege_gate_core::RoleName;
use privilege_gate_core::RoleProvider;

type TestResult = Result<(), String>;

fn assert_invalid(content: &str, needle: &str) -> TestResult {
    match PrivilegeGateConfig::from_toml_str(content) {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}

// ============================================================================
// SECTION: Role Structure
// ============================================================================

#[test]
fn roles_build_entries_per_kind() -> TestResult {
    let config = PrivilegeGateConfig::from_toml_str(
        r#"
[[roles]]
name = "logs"

[[roles.index_permissions]]
patterns = ["idx*"]
allowed_actions = ["read"]

[[roles.data_stream_permissions]]
patterns = ["logs-*::failures"]
allowed_actions = ["read"]

[[roles.exclude_alias_permissions]]
patterns = ["secret"]
actions = ["read"]
"#,
    )
    .map_err(|err| err.to_string())?;
    let registry = config.role_registry().map_err(|err| err.to_string())?;
    let role = registry.get("logs").ok_or("role missing")?;
    let entries = role.entries();
    if entries.len() != 3 {
        return Err(format!("expected 3 entries, got {}", entries.len()));
    }
    if entries[1].kind() != ResourceKind::DataStream
        || entries[1].component() != ComponentRestriction::FailuresOnly
    {
        return Err("data stream entry should be failures-only".to_string());
    }
    if entries[2].is_grant() || entries[2].kind() != ResourceKind::Alias {
        return Err("exclusion entry should be an alias exclusion".to_string());
    }
    Ok(())
}

#[test]
fn duplicate_role_names_are_rejected() -> TestResult {
    assert_invalid(
        r#"
[[roles]]
name = "a"

[[roles]]
name = "a"
"#,
        "duplicate role name: a",
    )
}

#[test]
fn empty_role_name_is_rejected() -> TestResult {
    assert_invalid("[[roles]]\nname = \" \"\n", "roles.name must be non-empty")
}

#[test]
fn permission_without_actions_is_rejected() -> TestResult {
    assert_invalid(
        r#"
[[roles]]
name = "a"

[[roles.index_permissions]]
patterns = ["x"]
allowed_actions = []
"#,
        "roles[a].index_permissions[0]",
    )
}

#[test]
fn invalid_regex_pattern_is_rejected() -> TestResult {
    assert_invalid(
        r#"
[[roles]]
name = "a"

[[roles.alias_permissions]]
patterns = ["/[/"]
allowed_actions = ["read"]
"#,
        "invalid regex pattern",
    )
}

#[test]
fn component_on_index_permission_is_rejected() -> TestResult {
    assert_invalid(
        r#"
[[roles]]
name = "a"

[[roles.index_permissions]]
patterns = ["x"]
allowed_actions = ["read"]
component = "failures"
"#,
        "component is not allowed on index permissions",
    )
}

#[test]
fn component_conflicting_with_suffix_is_rejected() -> TestResult {
    assert_invalid(
        r#"
[[roles]]
name = "a"

[[roles.data_stream_permissions]]
patterns = ["logs::failures"]
allowed_actions = ["read"]
component = "data"
"#,
        "component conflicts with pattern suffixes",
    )
}

#[test]
fn explicit_component_applies() -> TestResult {
    let config = PrivilegeGateConfig::from_toml_str(
        r#"
[[roles]]
name = "a"

[[roles.data_stream_permissions]]
patterns = ["logs-*"]
allowed_actions = ["read"]
component = "data"
"#,
    )
    .map_err(|err| err.to_string())?;
    let registry = config.role_registry().map_err(|err| err.to_string())?;
    let role = registry.get("a").ok_or("role missing")?;
    if role.entries()[0].component() != ComponentRestriction::DataOnly {
        return Err("component not applied".to_string());
    }
    Ok(())
}

// ============================================================================
// SECTION: DLS/FLS Attachments
// ============================================================================

#[test]
fn invalid_dls_json_is_rejected() -> TestResult {
    assert_invalid(
        r#"
[[roles]]
name = "a"

[[roles.index_permissions]]
patterns = ["x"]
allowed_actions = ["read"]
dls = "{not json"
"#,
        "dls must be valid json",
    )
}

#[test]
fn non_object_dls_is_rejected() -> TestResult {
    assert_invalid(
        r#"
[[roles]]
name = "a"

[[roles.index_permissions]]
patterns = ["x"]
allowed_actions = ["read"]
dls = "[1, 2]"
"#,
        "dls must be a json object",
    )
}

#[test]
fn invalid_masking_rule_is_rejected() -> TestResult {
    assert_invalid(
        r#"
[[roles]]
name = "a"

[[roles.index_permissions]]
patterns = ["x"]
allowed_actions = ["read"]
masked_fields = ["email::MD5"]
"#,
        "masked_fields",
    )
}

#[test]
fn empty_fls_list_is_rejected() -> TestResult {
    assert_invalid(
        r#"
[[roles]]
name = "a"

[[roles.index_permissions]]
patterns = ["x"]
allowed_actions = ["read"]
fls = []
"#,
        "field rule list must not be empty",
    )
}

#[test]
fn attachments_reach_the_evaluation() -> TestResult {
    let config = PrivilegeGateConfig::from_toml_str(
        r#"
[[roles]]
name = "a"

[[roles.index_permissions]]
patterns = ["x1"]
allowed_actions = ["read"]
dls = '{"term": {"owner": "alice"}}'
fls = ["~secret"]
masked_fields = ["email"]
"#,
    )
    .map_err(|err| err.to_string())?;
    let registry = config.role_registry().map_err(|err| err.to_string())?;
    let roles = registry.roles_for(&[RoleName::new("a")]).map_err(|err| err.to_string())?;
    let catalog = ResourceCatalog::builder()
        .index(IndexMeta::new("x1"))
        .build()
        .map_err(|err| err.to_string())?;
    let request = ResourceRequest::new("read", "x1").map_err(|err| err.to_string())?;
    let evaluation = PrivilegesEvaluator::default()
        .evaluate(&request, &roles, &catalog)
        .map_err(|err| err.to_string())?;
    let restrictions = evaluation.dls_fls.get("x1").ok_or("x1 should be restricted")?;
    if restrictions.dls.is_none() || restrictions.masking.is_none() {
        return Err("dls and masking should be attached".to_string());
    }
    let fls = restrictions.fls.as_ref().ok_or("fls should be attached")?;
    if fls.is_visible("secret") || !fls.is_visible("name") {
        return Err("fls exclusion not applied".to_string());
    }
    Ok(())
}

// ============================================================================
// SECTION: Action Groups
// ============================================================================

#[test]
fn action_groups_expand_into_entries() -> TestResult {
    let config = PrivilegeGateConfig::from_toml_str(
        r#"
[action_groups]
reader = ["read", "search"]
all_read = ["reader", "indices:monitor/*"]

[[roles]]
name = "a"

[[roles.index_permissions]]
patterns = ["x*"]
allowed_actions = ["all_read"]
"#,
    )
    .map_err(|err| err.to_string())?;
    let registry = config.role_registry().map_err(|err| err.to_string())?;
    let role = registry.get("a").ok_or("role missing")?;
    let entry = &role.entries()[0];
    for action in ["read", "search", "indices:monitor/stats"] {
        if !entry.matches_action(action) {
            return Err(format!("action {action} should be granted"));
        }
    }
    if entry.matches_action("all_read") {
        return Err("group name should not remain as an action".to_string());
    }
    Ok(())
}

#[test]
fn cyclic_action_groups_are_rejected() -> TestResult {
    assert_invalid(
        r#"
[action_groups]
a = ["b"]
b = ["a"]
"#,
        "action_groups cycle",
    )
}

#[test]
fn empty_action_groups_are_rejected() -> TestResult {
    assert_invalid("[action_groups]\nnothing = []\n", "action_groups.nothing must not be empty")
}

// ============================================================================
// SECTION: Registry Lookup
// ============================================================================

#[test]
fn registry_skips_unknown_and_repeated_names() -> TestResult {
    let config = PrivilegeGateConfig::from_toml_str("[[roles]]\nname = \"a\"\n")
        .map_err(|err| err.to_string())?;
    let registry = config.role_registry().map_err(|err| err.to_string())?;
    let names = [RoleName::new("a"), RoleName::new("ghost"), RoleName::new("a")];
    let roles = registry.roles_for(&names).map_err(|err| err.to_string())?;
    if roles.len() != 1 {
        return Err(format!("expected 1 role, got {}", roles.len()));
    }
    Ok(())
}

#[test]
fn config_errors_are_classified() {
    let parse = PrivilegeGateConfig::from_toml_str("roles = 3");
    assert!(matches!(parse, Err(ConfigError::Parse(_))));
    let invalid = PrivilegeGateConfig::from_toml_str("[[roles]]\nname = \"\"\n");
    assert!(matches!(invalid, Err(ConfigError::Invalid(_))));
}
