//! Config load validation tests for privilege-gate-config.
// crates/privilege-gate-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use privilege_gate_config::ConfigError;
use privilege_gate_config::PrivilegeGateConfig;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<PrivilegeGateConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(content: &str) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(content.as_bytes()).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(PrivilegeGateConfig::load(Some(path)), "config path exceeds max length")?;
    Ok(())
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(PrivilegeGateConfig::load(Some(path)), "config path component too long")?;
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'a'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(PrivilegeGateConfig::load(Some(file.path())), "config file exceeds size limit")?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(PrivilegeGateConfig::load(Some(file.path())), "config file must be utf-8")?;
    Ok(())
}

#[test]
fn load_rejects_missing_file() -> TestResult {
    let path = Path::new("definitely-missing-privilege-gate.toml");
    match PrivilegeGateConfig::load(Some(path)) {
        Err(ConfigError::Io(_)) => Ok(()),
        Err(error) => Err(format!("expected io error, got {error}")),
        Ok(_) => Err("expected missing file to fail".to_string()),
    }
}

#[test]
fn load_rejects_unknown_fields() -> TestResult {
    let file = write_config("[evaluator]\nverbose = true\n")?;
    match PrivilegeGateConfig::load(Some(file.path())) {
        Err(ConfigError::Parse(_)) => Ok(()),
        Err(error) => Err(format!("expected parse error, got {error}")),
        Ok(_) => Err("expected unknown field to fail".to_string()),
    }
}

#[test]
fn empty_config_uses_defaults() -> TestResult {
    let file = write_config("")?;
    let config = PrivilegeGateConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    let settings = config.evaluator_settings().map_err(|err| err.to_string())?;
    if settings.verbose_errors || !settings.protect_system_resources {
        return Err("unexpected evaluator defaults".to_string());
    }
    if !settings.do_not_fail_on_forbidden {
        return Err("partial execution should default on".to_string());
    }
    let profile = settings.action_policy.profile("read");
    if !profile.partial || profile.write {
        return Err("read should classify as a partial action".to_string());
    }
    Ok(())
}

#[test]
fn evaluator_and_action_sections_apply() -> TestResult {
    let file = write_config(
        r#"
[evaluator]
verbose_errors = true
do_not_fail_on_forbidden = false

[actions]
write = ["bulk*"]
"#,
    )?;
    let config = PrivilegeGateConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    let settings = config.evaluator_settings().map_err(|err| err.to_string())?;
    if !settings.verbose_errors || settings.do_not_fail_on_forbidden {
        return Err("evaluator toggles not applied".to_string());
    }
    if !settings.action_policy.profile("bulk_index").write {
        return Err("configured write action not applied".to_string());
    }
    if settings.action_policy.profile("write").write {
        return Err("configured write list should replace the defaults".to_string());
    }
    Ok(())
}

#[test]
fn invalid_action_pattern_is_rejected() -> TestResult {
    let file = write_config("[actions]\npartial = [\"/(/\"]\n")?;
    assert_invalid(PrivilegeGateConfig::load(Some(file.path())), "actions")?;
    Ok(())
}

#[test]
fn masking_salt_reaches_settings() -> TestResult {
    let file = write_config("[evaluator]\nmasking_salt = \"another-salt-16b\"\n")?;
    let config = PrivilegeGateConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    let settings = config.evaluator_settings().map_err(|err| err.to_string())?;
    if settings.masking_salt.as_str() != "another-salt-16b" {
        return Err("configured masking salt not applied".to_string());
    }
    Ok(())
}

#[test]
fn oversized_masking_salt_is_rejected() -> TestResult {
    let file = write_config("[evaluator]\nmasking_salt = \"seventeen-bytes!!\"\n")?;
    assert_invalid(PrivilegeGateConfig::load(Some(file.path())), "masking salt exceeds 16 bytes")?;
    Ok(())
}
