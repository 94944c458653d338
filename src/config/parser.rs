use std::path::Path;
use crate::errors::RemediatorError;
use super::types::RemediatorConfig;
use super::security::validate_security_patterns;
use super::schema::CONFIG_SCHEMA;
use tracing::warn;

pub async fn parse_config(path: &Path) -> Result<RemediatorConfig, RemediatorError> {
    if !path.exists() {
        return Err(RemediatorError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > 1_048_576 {
        return Err(RemediatorError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    parse_config_str(&content)
}

pub fn parse_config_str(content: &str) -> Result<RemediatorConfig, RemediatorError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;
    if yaml.is_null() {
        return Ok(RemediatorConfig::default());
    }

    // Security pattern validation
    validate_security_patterns(&yaml)?;

    // JSON Schema validation
    validate_schema(&yaml)?;

    // Parse into typed config
    let config: RemediatorConfig = serde_yaml::from_value(yaml)?;

    // Semantic conflict detection
    validate_conflicts(&config)?;

    Ok(config)
}

/// Validate config against the JSON schema for structural correctness.
fn validate_schema(yaml: &serde_yaml::Value) -> Result<(), RemediatorError> {
    let json_value = serde_json::to_value(yaml)
        .map_err(|e| RemediatorError::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| RemediatorError::Config(format!("Schema compilation error: {}", e)))?;

    let result = compiled.validate(&json_value);
    if let Err(errors) = result {
        // Advisory: typed deserialization and the semantic checks below are authoritative.
        for e in errors {
            warn!(validation_error = %format!("{} at {}", e, e.instance_path), "Config schema warning");
        }
    }

    Ok(())
}

/// Detect semantic conflicts in the parsed configuration.
fn validate_conflicts(config: &RemediatorConfig) -> Result<(), RemediatorError> {
    if config.concurrency == Some(0) {
        return Err(RemediatorError::Config("concurrency must be at least 1".into()));
    }

    if let Some(retry) = &config.retry {
        if retry.max_delay_ms < retry.base_delay_ms {
            return Err(RemediatorError::Config(format!(
                "retry.max_delay_ms ({}) is smaller than retry.base_delay_ms ({})",
                retry.max_delay_ms, retry.base_delay_ms
            )));
        }
    }

    if let Some(branch) = &config.base_branch {
        if branch.trim().is_empty() {
            return Err(RemediatorError::Config("base_branch must not be empty".into()));
        }
    }

    if let Some(url) = &config.api_url {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(RemediatorError::Config(format!("api_url must be an http(s) URL: {}", url)));
        }
    }

    // Warn if a literal token is committed to the config file
    if let Some(token) = &config.token {
        if !token.starts_with('$') {
            warn!("Config file contains a literal token; prefer a $VARIABLE reference");
        }
    }

    Ok(())
}
