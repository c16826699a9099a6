//! Effective values preview with deep merge support
//!
//! Helm merges `-f` files in order, then applies `--set` style values, then
//! `--set-file` values. [`effective_values`] reproduces that for a resolved
//! release so the outcome can be inspected without a cluster.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::Path;
use tracing::warn;

use crate::error::{CoreError, Result};
use crate::resolved::ResolvedReleaseProperties;

/// Values container with deep merge capability
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Values(pub JsonValue);

impl Values {
    /// Create empty values
    pub fn new() -> Self {
        Self(JsonValue::Object(serde_json::Map::new()))
    }

    /// Load values from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse values from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let value: JsonValue = serde_yaml::from_str(yaml)?;
        // an empty document parses as null
        if value.is_null() {
            return Ok(Self::new());
        }
        Ok(Self(value))
    }

    /// Deep merge another Values into this one
    ///
    /// Rules:
    /// - Scalars: overlay replaces base
    /// - Objects: recursive merge
    /// - Arrays: overlay replaces base (not appended)
    pub fn merge(&mut self, overlay: &Values) {
        deep_merge(&mut self.0, &overlay.0);
    }

    /// Set a value by dotted path (e.g., "image.tag")
    pub fn set(&mut self, path: &str, value: JsonValue) -> Result<()> {
        if path.is_empty() || path.split('.').any(str::is_empty) {
            return Err(CoreError::ValuesMerge {
                message: format!("Invalid value path: '{}'", path),
            });
        }
        let parts: Vec<&str> = path.split('.').collect();
        set_nested(&mut self.0, &parts, value);
        Ok(())
    }

    /// Get a value by dotted path
    pub fn get(&self, path: &str) -> Option<&JsonValue> {
        let parts: Vec<&str> = path.split('.').collect();
        get_nested(&self.0, &parts)
    }

    /// Get the inner JSON value
    pub fn inner(&self) -> &JsonValue {
        &self.0
    }
}

/// Deep merge two JSON values
fn deep_merge(base: &mut JsonValue, overlay: &JsonValue) {
    match (base, overlay) {
        (JsonValue::Object(base_map), JsonValue::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}

/// Set a nested value by path
fn set_nested(value: &mut JsonValue, path: &[&str], new_value: JsonValue) {
    let Some((key, remaining)) = path.split_first() else {
        *value = new_value;
        return;
    };

    if !value.is_object() {
        *value = JsonValue::Object(serde_json::Map::new());
    }

    if let JsonValue::Object(map) = value {
        if remaining.is_empty() {
            map.insert(key.to_string(), new_value);
        } else {
            let entry = map
                .entry(key.to_string())
                .or_insert_with(|| JsonValue::Object(serde_json::Map::new()));
            set_nested(entry, remaining, new_value);
        }
    }
}

/// Get a nested value by path
fn get_nested<'a>(value: &'a JsonValue, path: &[&str]) -> Option<&'a JsonValue> {
    let Some((key, remaining)) = path.split_first() else {
        return Some(value);
    };

    match value {
        JsonValue::Object(map) => map.get(*key).and_then(|v| get_nested(v, remaining)),
        _ => None,
    }
}

/// Parse --set arguments (key=value format)
pub fn parse_set_values(set_args: &[String]) -> Result<Values> {
    let mut values = Values::new();

    for arg in set_args {
        let (key, val) = arg.split_once('=').ok_or_else(|| CoreError::ValuesMerge {
            message: format!("Invalid --set format: '{}'. Expected key=value", arg),
        })?;

        values.set(key, parse_scalar(val))?;
    }

    Ok(values)
}

fn parse_scalar(val: &str) -> JsonValue {
    if val == "true" {
        JsonValue::Bool(true)
    } else if val == "false" {
        JsonValue::Bool(false)
    } else if val == "null" {
        JsonValue::Null
    } else if let Ok(num) = val.parse::<i64>() {
        JsonValue::Number(num.into())
    } else if let Some(num) = val
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
    {
        JsonValue::Number(num)
    } else if val.starts_with('[') || val.starts_with('{') {
        serde_json::from_str(val).unwrap_or_else(|_| JsonValue::String(val.to_string()))
    } else {
        JsonValue::String(val.to_string())
    }
}

/// Compute the values Helm would see for a resolved release
///
/// Value files that do not exist are skipped with a warning, mirroring the
/// fact that they may be produced later in the build.
pub fn effective_values(props: &ResolvedReleaseProperties) -> Result<Values> {
    let mut values = Values::new();

    for file in &props.values.value_files {
        let path = props.resolve_path(file);
        if !path.is_file() {
            warn!(release = %props.name, file = %path.display(), "Values file not found, skipping");
            continue;
        }
        values.merge(&Values::from_file(&path)?);
    }

    for (key, value) in &props.values.values {
        values.set(key, value.clone())?;
    }

    for (key, file) in &props.values.file_values {
        let path = props.resolve_path(file);
        let content = std::fs::read_to_string(&path)?;
        values.set(key, JsonValue::String(content))?;
    }

    Ok(values)
}
