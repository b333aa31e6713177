//! Schema validation helpers for recipe service JSON5 configuration.

use crate::ConfigError;
use serde_json::{Map, Value};

/// Validate a config layer against the schema.
pub(super) fn validate_config_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    ensure_allowed_keys(map, &["$schema", "server", "database"], layer, "")?;

    if let Some(value) = map.get("$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = map.get("server") {
        validate_server(value, layer, "server")?;
    }
    if let Some(value) = map.get("database") {
        validate_database(value, layer, "database")?;
    }
    Ok(())
}

/// Validate the "server" block.
fn validate_server(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &[
            "address",
            "port",
            "keep_alive_secs",
            "shutdown_grace_secs",
            "shutdown_mercy_secs",
            "json_limit_bytes",
        ],
        layer,
        path,
    )?;
    if let Some(value) = map.get("address") {
        expect_string(value, layer, &join_path(path, "address"))?;
    }
    if let Some(value) = map.get("port") {
        expect_u64_max(value, u16::MAX as u64, layer, &join_path(path, "port"))?;
    }
    for key in ["keep_alive_secs", "shutdown_grace_secs", "shutdown_mercy_secs"] {
        if let Some(value) = map.get(key) {
            expect_u64_max(value, u32::MAX as u64, layer, &join_path(path, key))?;
        }
    }
    if let Some(value) = map.get("json_limit_bytes") {
        expect_u64(value, layer, &join_path(path, "json_limit_bytes"))?;
    }
    Ok(())
}

/// Validate the "database" block.
fn validate_database(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &["path", "pool_size", "busy_timeout_ms", "create_schema"],
        layer,
        path,
    )?;
    if let Some(value) = map.get("path").filter(|value| !value.is_null()) {
        expect_string(value, layer, &join_path(path, "path"))?;
    }
    for key in ["pool_size", "busy_timeout_ms"] {
        if let Some(value) = map.get(key) {
            expect_u64(value, layer, &join_path(path, key))?;
        }
    }
    if let Some(value) = map.get("create_schema") {
        expect_bool(value, layer, &join_path(path, "create_schema"))?;
    }
    Ok(())
}

/// Expect a JSON object or return a typed error.
fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

/// Expect a JSON string or return a typed error.
fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.as_str().is_some() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected string"))
    }
}

/// Expect a JSON boolean or return a typed error.
fn expect_bool(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if matches!(value, Value::Bool(_)) {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected bool"))
    }
}

/// Expect a non-negative JSON integer or return a typed error.
fn expect_u64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_u64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected non-negative integer"))
    }
}

/// Expect a non-negative JSON integer no larger than `max`.
fn expect_u64_max(value: &Value, max: u64, layer: &str, path: &str) -> Result<(), ConfigError> {
    match value.as_u64() {
        Some(number) if number <= max => Ok(()),
        Some(_) => Err(invalid_field(
            layer,
            path,
            &format!("expected integer <= {max}"),
        )),
        None => Err(invalid_field(layer, path, "expected non-negative integer")),
    }
}

/// Ensure no unexpected keys are present.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(invalid_field(layer, &join_path(path, key), "unknown key"));
        }
    }
    Ok(())
}

/// Join nested paths for better error messages.
fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{normalized_path}"),
        message: message.to_string(),
    }
}
