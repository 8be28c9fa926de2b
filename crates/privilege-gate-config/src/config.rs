// crates/privilege-gate-config/src/config.rs
// ============================================================================
// Module: Privilege Gate Configuration
// Description: Configuration loading and validation for Privilege Gate.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: privilege-gate-core, serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing or invalid configuration fails closed; a config that loads is one
//! whose roles, action groups, and action lists all build.
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use privilege_gate_core::ActionPolicy;
use privilege_gate_core::ComponentRestriction;
use privilege_gate_core::DEFAULT_PARTIAL_ACTIONS;
use privilege_gate_core::DEFAULT_TOP_LEVEL_ACTIONS;
use privilege_gate_core::DEFAULT_WRITE_ACTIONS;
use privilege_gate_core::EvaluatorSettings;
use privilege_gate_core::MaskingSalt;
use serde::Deserialize;
use thiserror::Error;

use crate::roles::RoleRegistry;
use crate::roles::build_registry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "privilege-gate.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "PRIVILEGE_GATE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of roles in one config.
pub(crate) const MAX_ROLES: usize = 4096;
/// Maximum number of action groups in one config.
pub(crate) const MAX_ACTION_GROUPS: usize = 1024;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Privilege Gate configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrivilegeGateConfig {
    /// Evaluator toggles.
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
    /// Action classification lists.
    #[serde(default)]
    pub actions: ActionsConfig,
    /// Named action groups; members may reference other groups.
    #[serde(default)]
    pub action_groups: BTreeMap<String, Vec<String>>,
    /// Role definitions.
    #[serde(default)]
    pub roles: Vec<RoleConfig>,
}

impl PrivilegeGateConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: explicit path, `PRIVILEGE_GATE_CONFIG`, then
    /// `privilege-gate.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        let content = read_guarded(&resolved, "config", MAX_CONFIG_FILE_SIZE)?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.roles.len() > MAX_ROLES {
            return Err(ConfigError::Invalid(format!("roles exceeds {MAX_ROLES} entries")));
        }
        if self.action_groups.len() > MAX_ACTION_GROUPS {
            return Err(ConfigError::Invalid(format!(
                "action_groups exceeds {MAX_ACTION_GROUPS} entries"
            )));
        }
        self.actions.policy()?;
        self.evaluator.masking_salt()?;
        self.role_registry()?;
        Ok(())
    }

    /// Returns evaluator settings derived from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an action list or the masking salt is invalid.
    pub fn evaluator_settings(&self) -> Result<EvaluatorSettings, ConfigError> {
        Ok(EvaluatorSettings {
            verbose_errors: self.evaluator.verbose_errors,
            protect_system_resources: self.evaluator.protect_system_resources,
            do_not_fail_on_forbidden: self.evaluator.do_not_fail_on_forbidden,
            action_policy: self.actions.policy()?,
            masking_salt: self.evaluator.masking_salt()?,
        })
    }

    /// Builds the role registry with action groups expanded.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a role or action group is invalid.
    pub fn role_registry(&self) -> Result<RoleRegistry, ConfigError> {
        build_registry(&self.roles, &self.action_groups)
    }
}

/// Evaluator toggles.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluatorConfig {
    /// List missing privileges on forbidden verdicts.
    #[serde(default)]
    pub verbose_errors: bool,
    /// Keep universal wildcards in role patterns away from system resources.
    #[serde(default = "default_true")]
    pub protect_system_resources: bool,
    /// Allow partial execution for partial actions.
    #[serde(default = "default_true")]
    pub do_not_fail_on_forbidden: bool,
    /// Salt for the default masking digest (at most 16 bytes).
    #[serde(default)]
    pub masking_salt: Option<String>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            verbose_errors: false,
            protect_system_resources: true,
            do_not_fail_on_forbidden: true,
            masking_salt: None,
        }
    }
}

impl EvaluatorConfig {
    /// Builds the masking salt, falling back to the built-in default.
    fn masking_salt(&self) -> Result<MaskingSalt, ConfigError> {
        self.masking_salt.as_deref().map_or_else(
            || Ok(MaskingSalt::default()),
            |salt| {
                MaskingSalt::new(salt)
                    .map_err(|err| ConfigError::Invalid(format!("evaluator: {err}")))
            },
        )
    }
}

/// Action classification lists; omitted lists use the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionsConfig {
    /// Actions that may run on an authorized subset.
    #[serde(default)]
    pub partial: Option<Vec<String>>,
    /// Actions that write through write indices.
    #[serde(default)]
    pub write: Option<Vec<String>>,
    /// Actions that keep alias and data-stream names.
    #[serde(default)]
    pub top_level: Option<Vec<String>>,
}

impl ActionsConfig {
    /// Builds the action policy.
    fn policy(&self) -> Result<ActionPolicy, ConfigError> {
        let list = |configured: Option<&[String]>, defaults: &[&str]| -> Vec<String> {
            configured.map_or_else(
                || defaults.iter().map(ToString::to_string).collect(),
                <[String]>::to_vec,
            )
        };
        ActionPolicy::new(
            &list(self.partial.as_deref(), DEFAULT_PARTIAL_ACTIONS),
            &list(self.write.as_deref(), DEFAULT_WRITE_ACTIONS),
            &list(self.top_level.as_deref(), DEFAULT_TOP_LEVEL_ACTIONS),
        )
        .map_err(|err| ConfigError::Invalid(format!("actions: {err}")))
    }
}

/// Role definition.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleConfig {
    /// Role name.
    pub name: String,
    /// Grants on concrete indices.
    #[serde(default)]
    pub index_permissions: Vec<PermissionConfig>,
    /// Grants on aliases.
    #[serde(default)]
    pub alias_permissions: Vec<PermissionConfig>,
    /// Grants on data streams.
    #[serde(default)]
    pub data_stream_permissions: Vec<PermissionConfig>,
    /// Exclusions on concrete indices.
    #[serde(default)]
    pub exclude_index_permissions: Vec<ExclusionConfig>,
    /// Exclusions on aliases.
    #[serde(default)]
    pub exclude_alias_permissions: Vec<ExclusionConfig>,
    /// Exclusions on data streams.
    #[serde(default)]
    pub exclude_data_stream_permissions: Vec<ExclusionConfig>,
}

/// Grant entry definition.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionConfig {
    /// Resource patterns; `-` negates, `::failures`/`::data` restrict components.
    pub patterns: Vec<String>,
    /// Action patterns or action group names.
    pub allowed_actions: Vec<String>,
    /// Document-level security query as JSON text.
    #[serde(default)]
    pub dls: Option<String>,
    /// Field-level security rules.
    #[serde(default)]
    pub fls: Option<Vec<String>>,
    /// Field masking expressions.
    #[serde(default)]
    pub masked_fields: Vec<String>,
    /// Component restriction for data-stream and alias entries.
    #[serde(default)]
    pub component: Option<ComponentConfig>,
}

/// Exclusion entry definition.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExclusionConfig {
    /// Resource patterns.
    pub patterns: Vec<String>,
    /// Excluded action patterns or action group names.
    pub actions: Vec<String>,
    /// Component restriction for data-stream and alias entries.
    #[serde(default)]
    pub component: Option<ComponentConfig>,
}

/// Configured component restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentConfig {
    /// Data and failures components.
    Both,
    /// Data component only.
    Data,
    /// Failures component only.
    Failures,
}

impl From<ComponentConfig> for ComponentRestriction {
    fn from(value: ComponentConfig) -> Self {
        match value {
            ComponentConfig::Both => Self::Both,
            ComponentConfig::Data => Self::DataOnly,
            ComponentConfig::Failures => Self::FailuresOnly,
        }
    }
}

/// Serde default helper.
const fn default_true() -> bool {
    true
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML or JSON parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path, label: &str) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{label} path exceeds max length")));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{label} path component too long")));
        }
    }
    Ok(())
}

/// Reads a UTF-8 file after path and size checks.
pub(crate) fn read_guarded(
    path: &Path,
    label: &str,
    max_bytes: usize,
) -> Result<String, ConfigError> {
    validate_path(path, label)?;
    let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
    if bytes.len() > max_bytes {
        return Err(ConfigError::Invalid(format!("{label} file exceeds size limit")));
    }
    String::from_utf8(bytes)
        .map_err(|_| ConfigError::Invalid(format!("{label} file must be utf-8")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_path_accepts_normal_path() {
        assert!(validate_path(Path::new("./config/privilege-gate.toml"), "config").is_ok());
    }

    #[test]
    fn validate_path_rejects_long_component() {
        let component = "a".repeat(MAX_PATH_COMPONENT_LENGTH + 1);
        let result = validate_path(Path::new(&component), "catalog");
        assert_eq!(
            result,
            Err(ConfigError::Invalid("catalog path component too long".to_string()))
        );
    }

    #[test]
    fn evaluator_defaults_are_safe() {
        let config = EvaluatorConfig::default();
        assert!(!config.verbose_errors);
        assert!(config.protect_system_resources);
        assert!(config.do_not_fail_on_forbidden);
        assert_eq!(config.masking_salt(), Ok(MaskingSalt::default()));
    }
}
