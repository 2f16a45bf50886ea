//! Settings loading from configuration files.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `THANOS_DEBUG` | `debug` |
//! | `THANOS_SITE_TITLE` | `site_title` |
//! | `THANOS_BIND_ADDRESS` | `bind_address` |
//! | `THANOS_URL_PREFIX` | `url_prefix` |
//! | `THANOS_LIST_PER_PAGE` | `list_per_page` |
//! | `THANOS_DELETE_CONFIRM_TOKEN` | `delete_confirm_token` |
//! | `THANOS_TEMPLATE_DIRS` | `template_dirs` (comma-separated) |
//! | `THANOS_LOG_LEVEL` | `log_level` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use thanos_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("thanos.toml").unwrap();
//! ```

use std::path::{Path, PathBuf};

use crate::error::ThanosError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Keys absent from the TOML keep their default values.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or cannot be deserialized.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, ThanosError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| ThanosError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;
    merge_into_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, ThanosError> {
    let content = read_file(path.as_ref(), "TOML")?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, ThanosError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or cannot be deserialized.
pub fn from_json_str(json_str: &str) -> Result<Settings, ThanosError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| ThanosError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;
    merge_into_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, ThanosError> {
    let content = read_file(path.as_ref(), "JSON")?;
    from_json_str(&content)
}

/// Loads settings from environment variables only, starting from defaults.
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `THANOS_*` environment variable overrides to a settings struct.
///
/// Numeric variables that fail to parse are ignored.
pub fn apply_env_overrides(settings: &mut Settings) {
    apply_overrides(settings, |key| std::env::var(key).ok());
}

/// Applies overrides from an arbitrary key lookup.
///
/// Split out from [`apply_env_overrides`] so the mapping can be exercised
/// without touching the process environment.
pub fn apply_overrides<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("THANOS_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Some(val) = lookup("THANOS_SITE_TITLE") {
        settings.site_title = val;
    }

    if let Some(val) = lookup("THANOS_BIND_ADDRESS") {
        settings.bind_address = val;
    }

    if let Some(val) = lookup("THANOS_URL_PREFIX") {
        settings.url_prefix = val;
    }

    if let Some(val) = lookup("THANOS_LIST_PER_PAGE") {
        if let Ok(per_page) = val.parse::<usize>() {
            settings.list_per_page = per_page;
        }
    }

    if let Some(val) = lookup("THANOS_DELETE_CONFIRM_TOKEN") {
        settings.delete_confirm_token = val;
    }

    if let Some(val) = lookup("THANOS_TEMPLATE_DIRS") {
        settings.template_dirs = val
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect();
    }

    if let Some(val) = lookup("THANOS_LOG_LEVEL") {
        settings.log_level = val;
    }
}

// ============================================================
// Helpers
// ============================================================

fn read_file(path: &Path, kind: &str) -> Result<String, ThanosError> {
    std::fs::read_to_string(path).map_err(|e| {
        ThanosError::ConfigurationError(format!(
            "Failed to read {kind} file '{}': {e}",
            path.display()
        ))
    })
}

/// Deep-merges `value` over the serialized defaults and deserializes the result.
fn merge_into_defaults(value: serde_json::Value, kind: &str) -> Result<Settings, ThanosError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        ThanosError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        ThanosError::ConfigurationError(format!("Failed to deserialize settings from {kind}: {e}"))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => serde_json::Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_from_toml_str_basic() {
        let toml = r#"
            debug = false
            url_prefix = "/crm"
            list_per_page = 25
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.url_prefix, "/crm");
        assert_eq!(settings.list_per_page, 25);
        // Defaults preserved
        assert_eq!(settings.delete_confirm_token, "confirm");
    }

    #[test]
    fn test_from_toml_str_template_dirs() {
        let toml = r#"
            template_dirs = ["templates", "/srv/thanos/templates"]
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.template_dirs.len(), 2);
        assert_eq!(settings.template_dirs[0], PathBuf::from("templates"));
    }

    #[test]
    fn test_from_toml_str_empty() {
        let settings = from_toml_str("").unwrap();
        assert!(settings.debug);
        assert_eq!(settings.url_prefix, "/thanos");
    }

    #[test]
    fn test_from_toml_str_invalid() {
        assert!(from_toml_str("[[invalid toml content").is_err());
    }

    #[test]
    fn test_from_toml_str_wrong_type() {
        let err = from_toml_str("list_per_page = \"many\"").unwrap_err();
        assert!(matches!(err, ThanosError::ConfigurationError(_)));
    }

    #[test]
    fn test_from_json_str_basic() {
        let json = r#"{ "delete_confirm_token": "yes", "log_level": "debug" }"#;

        let settings = from_json_str(json).unwrap();
        assert_eq!(settings.delete_confirm_token, "yes");
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.list_per_page, 10);
    }

    #[test]
    fn test_from_json_str_invalid() {
        let err = from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ThanosError::ConfigurationError(_)));
        assert!(err.to_string().contains("Failed to parse JSON"));
    }

    #[test]
    fn test_from_toml_file_missing() {
        let err = from_toml_file("/nonexistent/thanos.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read TOML file"));
    }

    #[test]
    fn test_apply_overrides() {
        let mut env = HashMap::new();
        env.insert("THANOS_DEBUG", "false");
        env.insert("THANOS_URL_PREFIX", "/admin");
        env.insert("THANOS_LIST_PER_PAGE", "50");
        env.insert("THANOS_TEMPLATE_DIRS", "a, b,,c");
        env.insert("THANOS_DELETE_CONFIRM_TOKEN", "ok");

        let mut settings = Settings::default();
        apply_overrides(&mut settings, |key| env.get(key).map(|v| (*v).to_string()));

        assert!(!settings.debug);
        assert_eq!(settings.url_prefix, "/admin");
        assert_eq!(settings.list_per_page, 50);
        assert_eq!(settings.delete_confirm_token, "ok");
        assert_eq!(
            settings.template_dirs,
            vec![PathBuf::from("a"), PathBuf::from("b"), PathBuf::from("c")]
        );
    }

    #[test]
    fn test_apply_overrides_ignores_bad_numbers() {
        let mut settings = Settings::default();
        apply_overrides(&mut settings, |key| {
            (key == "THANOS_LIST_PER_PAGE").then(|| "lots".to_string())
        });
        assert_eq!(settings.list_per_page, 10);
    }

    #[test]
    fn test_merge_json_nested() {
        let base = serde_json::json!({"a": {"b": 1, "c": 2}, "d": 3});
        let over = serde_json::json!({"a": {"b": 10}});
        let merged = merge_json(base, over);
        assert_eq!(merged, serde_json::json!({"a": {"b": 10, "c": 2}, "d": 3}));
    }
}
