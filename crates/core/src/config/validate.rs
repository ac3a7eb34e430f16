use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server URL is http(s)
/// - Workspace, store, style and layer group names are usable as path segments
/// - Readiness budget allows at least one attempt
/// - Tuning target names an element when tuning is enabled
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let url = config.server.url.as_str();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "server.url must start with http:// or https:// (got {:?})",
            url
        )));
    }

    for (key, value) in [
        ("workspace.name", &config.workspace.name),
        ("datastore.name", &config.datastore.name),
        ("style.name", &config.style.name),
        ("layer_group.name", &config.layer_group.name),
    ] {
        validate_name(key, value)?;
    }

    if config.datastore.archive_path.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "datastore.archive_path cannot be empty".to_string(),
        ));
    }

    if config.readiness.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "readiness.max_attempts cannot be 0".to_string(),
        ));
    }

    if config.tuning.enabled {
        validate_name("tuning.service", &config.tuning.service)?;
        if config.tuning.field.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "tuning.field cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_name(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "{} cannot be empty",
            key
        )));
    }
    if value.contains('/') {
        return Err(ConfigError::ValidationError(format!(
            "{} cannot contain '/' (got {:?})",
            key, value
        )));
    }
    Ok(())
}
