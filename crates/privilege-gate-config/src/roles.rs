// crates/privilege-gate-config/src/roles.rs
// ============================================================================
// Module: Role Registry
// Description: Builds role definitions from configuration.
// Purpose: Expand action groups and serve roles to the evaluator.
// Dependencies: privilege-gate-core, serde_json, tracing
// ============================================================================

//! ## Overview
//! Role building runs once per configuration:
//! - action groups are flattened, rejecting empty groups and nesting cycles;
//! - each permission block becomes a [`PermissionEntry`] with its DLS query,
//!   FLS rules, masked fields, and component restriction parsed up front;
//! - the resulting [`RoleRegistry`] implements [`RoleProvider`].
//!
//! An action item that names a group is replaced by the group members; any
//! other item is kept as an action pattern.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use privilege_gate_core::ComponentRestriction;
use privilege_gate_core::FieldRule;
use privilege_gate_core::MaskedField;
use privilege_gate_core::PermissionEntry;
use privilege_gate_core::ProviderError;
use privilege_gate_core::ResourceKind;
use privilege_gate_core::Role;
use privilege_gate_core::RoleName;
use privilege_gate_core::RoleProvider;
use serde_json::Value;
use tracing::warn;

use crate::config::ComponentConfig;
use crate::config::ConfigError;
use crate::config::ExclusionConfig;
use crate::config::PermissionConfig;
use crate::config::RoleConfig;

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Validated role definitions keyed by name.
///
/// # Invariants
/// - Every role was built from a validated [`RoleConfig`].
/// - Action group references are already expanded.
#[derive(Debug, Clone, Default)]
pub struct RoleRegistry {
    /// Roles keyed by name.
    roles: BTreeMap<RoleName, Role>,
}

impl RoleRegistry {
    /// Returns the number of roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Returns true when no role is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Returns a role by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Role> {
        self.roles.get(&RoleName::new(name))
    }

    /// Iterates over role names in order.
    pub fn names(&self) -> impl Iterator<Item = &RoleName> {
        self.roles.keys()
    }
}

impl RoleProvider for RoleRegistry {
    fn roles_for(&self, names: &[RoleName]) -> Result<Vec<Role>, ProviderError> {
        let mut seen = BTreeSet::new();
        let mut roles = Vec::new();
        for name in names {
            if !seen.insert(name) {
                continue;
            }
            match self.roles.get(name) {
                Some(role) => roles.push(role.clone()),
                None => warn!(role = %name, "role has no definition and grants nothing"),
            }
        }
        Ok(roles)
    }
}

// ============================================================================
// SECTION: Building
// ============================================================================

/// Builds the registry from role and action group definitions.
pub(crate) fn build_registry(
    roles: &[RoleConfig],
    groups: &BTreeMap<String, Vec<String>>,
) -> Result<RoleRegistry, ConfigError> {
    let groups = expand_groups(groups)?;
    let mut registry = RoleRegistry::default();
    for config in roles {
        let name = config.name.trim();
        if name.is_empty() {
            return Err(ConfigError::Invalid("roles.name must be non-empty".to_string()));
        }
        let role = build_role(name, config, &groups)?;
        if registry.roles.insert(RoleName::new(name), role).is_some() {
            return Err(ConfigError::Invalid(format!("duplicate role name: {name}")));
        }
    }
    Ok(registry)
}

/// Builds one role.
fn build_role(
    name: &str,
    config: &RoleConfig,
    groups: &BTreeMap<String, Vec<String>>,
) -> Result<Role, ConfigError> {
    let grants = [
        ("index_permissions", ResourceKind::Index, &config.index_permissions),
        ("alias_permissions", ResourceKind::Alias, &config.alias_permissions),
        ("data_stream_permissions", ResourceKind::DataStream, &config.data_stream_permissions),
    ];
    let exclusions = [
        ("exclude_index_permissions", ResourceKind::Index, &config.exclude_index_permissions),
        ("exclude_alias_permissions", ResourceKind::Alias, &config.exclude_alias_permissions),
        (
            "exclude_data_stream_permissions",
            ResourceKind::DataStream,
            &config.exclude_data_stream_permissions,
        ),
    ];

    let mut entries = Vec::new();
    for (field, kind, permissions) in grants {
        for (position, permission) in permissions.iter().enumerate() {
            let location = format!("roles[{name}].{field}[{position}]");
            entries.push(build_grant(&location, kind, permission, groups)?);
        }
    }
    for (field, kind, exclusions) in exclusions {
        for (position, exclusion) in exclusions.iter().enumerate() {
            let location = format!("roles[{name}].{field}[{position}]");
            entries.push(build_exclusion(&location, kind, exclusion, groups)?);
        }
    }
    Ok(Role::new(name, entries))
}

/// Builds a grant entry with its DLS/FLS attachments.
fn build_grant(
    location: &str,
    kind: ResourceKind,
    permission: &PermissionConfig,
    groups: &BTreeMap<String, Vec<String>>,
) -> Result<PermissionEntry, ConfigError> {
    let actions = expand_actions(&permission.allowed_actions, groups);
    let mut entry = PermissionEntry::grant(kind, &permission.patterns, &actions)
        .map_err(|err| invalid(location, &err))?;
    entry = apply_component(location, entry, permission.component)?;
    if let Some(dls) = &permission.dls {
        let query: Value = serde_json::from_str(dls).map_err(|err| {
            ConfigError::Invalid(format!("{location}.dls must be valid json: {err}"))
        })?;
        if !query.is_object() {
            return Err(ConfigError::Invalid(format!("{location}.dls must be a json object")));
        }
        entry = entry.with_dls(query);
    }
    if let Some(fls) = &permission.fls {
        let rule = FieldRule::parse(fls).map_err(|err| invalid(&format!("{location}.fls"), &err))?;
        entry = entry.with_fls(rule);
    }
    if !permission.masked_fields.is_empty() {
        let masked = permission
            .masked_fields
            .iter()
            .map(|expression| MaskedField::parse(expression))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| invalid(&format!("{location}.masked_fields"), &err))?;
        entry = entry.with_masked_fields(masked);
    }
    Ok(entry)
}

/// Builds an exclusion entry.
fn build_exclusion(
    location: &str,
    kind: ResourceKind,
    exclusion: &ExclusionConfig,
    groups: &BTreeMap<String, Vec<String>>,
) -> Result<PermissionEntry, ConfigError> {
    let actions = expand_actions(&exclusion.actions, groups);
    let entry = PermissionEntry::exclude(kind, &exclusion.patterns, &actions)
        .map_err(|err| invalid(location, &err))?;
    apply_component(location, entry, exclusion.component)
}

/// Applies an explicit component restriction, rejecting conflicts with suffixes.
fn apply_component(
    location: &str,
    entry: PermissionEntry,
    component: Option<ComponentConfig>,
) -> Result<PermissionEntry, ConfigError> {
    let Some(component) = component else {
        return Ok(entry);
    };
    let restriction = ComponentRestriction::from(component);
    if entry.kind() == ResourceKind::Index && restriction != ComponentRestriction::Both {
        return Err(ConfigError::Invalid(format!(
            "{location}.component is not allowed on index permissions"
        )));
    }
    if entry.component() != ComponentRestriction::Both && entry.component() != restriction {
        return Err(ConfigError::Invalid(format!(
            "{location}.component conflicts with pattern suffixes"
        )));
    }
    Ok(entry.with_component(restriction))
}

/// Formats an entry-level error with its config location.
fn invalid(location: &str, err: &dyn std::error::Error) -> ConfigError {
    ConfigError::Invalid(format!("{location}: {err}"))
}

// ============================================================================
// SECTION: Action Groups
// ============================================================================

/// Replaces group names with their flattened members.
fn expand_actions(items: &[String], groups: &BTreeMap<String, Vec<String>>) -> Vec<String> {
    let mut actions = Vec::new();
    for item in items {
        match groups.get(item) {
            Some(members) => {
                for member in members {
                    if !actions.contains(member) {
                        actions.push(member.clone());
                    }
                }
            }
            None => {
                if !actions.contains(item) {
                    actions.push(item.clone());
                }
            }
        }
    }
    actions
}

/// Flattens nested action groups.
fn expand_groups(
    groups: &BTreeMap<String, Vec<String>>,
) -> Result<BTreeMap<String, Vec<String>>, ConfigError> {
    let mut expanded = BTreeMap::new();
    for name in groups.keys() {
        if name.trim().is_empty() {
            return Err(ConfigError::Invalid("action_groups names must be non-empty".to_string()));
        }
        let mut stack = Vec::new();
        let members = flatten_group(name, groups, &mut stack, &mut expanded)?;
        if members.is_empty() {
            return Err(ConfigError::Invalid(format!("action_groups.{name} must not be empty")));
        }
    }
    Ok(expanded)
}

/// Depth-first flattening with cycle detection on the current path.
///
/// Flattened groups are cached in `expanded` and reused on later visits.
fn flatten_group(
    name: &str,
    groups: &BTreeMap<String, Vec<String>>,
    stack: &mut Vec<String>,
    expanded: &mut BTreeMap<String, Vec<String>>,
) -> Result<Vec<String>, ConfigError> {
    if let Some(members) = expanded.get(name) {
        return Ok(members.clone());
    }
    if stack.iter().any(|visited| visited == name) {
        stack.push(name.to_string());
        return Err(ConfigError::Invalid(format!(
            "action_groups cycle: {}",
            stack.join(" -> ")
        )));
    }
    stack.push(name.to_string());
    let mut members = Vec::new();
    for member in groups.get(name).map(Vec::as_slice).unwrap_or_default() {
        let flattened = if groups.contains_key(member) {
            flatten_group(member, groups, stack, expanded)?
        } else {
            vec![member.clone()]
        };
        for action in flattened {
            if !members.contains(&action) {
                members.push(action);
            }
        }
    }
    stack.pop();
    expanded.insert(name.to_string(), members.clone());
    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(name, members)| {
                ((*name).to_string(), members.iter().map(|m| (*m).to_string()).collect())
            })
            .collect()
    }

    #[test]
    fn nested_groups_flatten_in_order() {
        let groups = groups(&[
            ("read_all", &["reader", "indices:monitor/*"]),
            ("reader", &["read", "search"]),
        ]);
        let expanded = expand_groups(&groups).unwrap_or_default();
        assert_eq!(
            expanded.get("read_all").cloned().unwrap_or_default(),
            vec!["read".to_string(), "search".to_string(), "indices:monitor/*".to_string()]
        );
    }

    #[test]
    fn group_cycles_are_rejected() {
        let groups = groups(&[("a", &["b"]), ("b", &["c", "a"]), ("c", &["read"])]);
        let result = expand_groups(&groups);
        assert_eq!(
            result,
            Err(ConfigError::Invalid("action_groups cycle: a -> b -> a".to_string()))
        );
    }

    #[test]
    fn diamond_groups_flatten_once_per_group() {
        const DEPTH: usize = 64;
        let mut groups = BTreeMap::new();
        for level in 0..DEPTH {
            let next = [format!("g{}", level + 1), format!("h{}", level + 1)];
            groups.insert(format!("g{level}"), next.to_vec());
            groups.insert(format!("h{level}"), next.to_vec());
        }
        groups.insert(format!("g{DEPTH}"), vec!["read".to_string()]);
        groups.insert(format!("h{DEPTH}"), vec!["search".to_string()]);
        let expanded = expand_groups(&groups).unwrap_or_default();
        assert_eq!(expanded.len(), groups.len());
        assert_eq!(
            expanded.get("g0").cloned().unwrap_or_default(),
            vec!["read".to_string(), "search".to_string()]
        );
    }

    #[test]
    fn expand_actions_keeps_unknown_items_as_patterns() {
        let groups = groups(&[("crud", &["read", "write"])]);
        let actions = expand_actions(&["crud".to_string(), "manage".to_string()], &groups);
        assert_eq!(actions, vec!["read".to_string(), "write".to_string(), "manage".to_string()]);
    }
}
