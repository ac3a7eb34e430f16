use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Environment variable prefix for overrides (e.g., `GEOSEED_SERVER__URL`).
pub const ENV_PREFIX: &str = "GEOSEED_";

/// Load configuration from defaults, an optional TOML file and environment overrides.
///
/// `required` controls whether a missing file is an error; the default
/// config path may be absent, an explicitly requested one may not.
pub fn load_config(path: &Path, required: bool) -> Result<Config, ConfigError> {
    if required && !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
