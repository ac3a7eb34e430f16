use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub datastore: DatastoreConfig,
    #[serde(default)]
    pub style: StyleConfig,
    #[serde(default)]
    pub layer_group: LayerGroupConfig,
    #[serde(default)]
    pub readiness: ReadinessConfig,
    #[serde(default)]
    pub tuning: TuningConfig,
}

/// Administrative API endpoint and credentials
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Base URL of the server (e.g., "http://localhost:8080/geoserver")
    #[serde(default = "default_url", deserialize_with = "string_or_number")]
    pub url: String,
    #[serde(default = "default_username", deserialize_with = "string_or_number")]
    pub username: String,
    #[serde(default = "default_password", deserialize_with = "string_or_number")]
    pub password: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            username: default_username(),
            password: default_password(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_url() -> String {
    "http://localhost:8080/geoserver".to_string()
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_password() -> String {
    "geoserver".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Workspace configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkspaceConfig {
    #[serde(default = "default_workspace_name", deserialize_with = "string_or_number")]
    pub name: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            name: default_workspace_name(),
        }
    }
}

fn default_workspace_name() -> String {
    "tiles".to_string()
}

/// Tile archive datastore configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatastoreConfig {
    #[serde(default = "default_store_name", deserialize_with = "string_or_number")]
    pub name: String,
    /// Path of the tile archive as seen by the server
    #[serde(default = "default_archive_path", deserialize_with = "string_or_number")]
    pub archive_path: String,
    #[serde(default = "default_store_type", deserialize_with = "string_or_number")]
    pub store_type: String,
    #[serde(default = "default_dbtype", deserialize_with = "string_or_number")]
    pub dbtype: String,
    /// Additional connection parameters, written after the fixed ones
    #[serde(default, deserialize_with = "string_or_number_map")]
    pub extra_parameters: BTreeMap<String, String>,
}

impl Default for DatastoreConfig {
    fn default() -> Self {
        Self {
            name: default_store_name(),
            archive_path: default_archive_path(),
            store_type: default_store_type(),
            dbtype: default_dbtype(),
            extra_parameters: BTreeMap::new(),
        }
    }
}

fn default_store_name() -> String {
    "vector_tiles".to_string()
}

fn default_archive_path() -> String {
    "/data/tiles.mbtiles".to_string()
}

fn default_store_type() -> String {
    "MBTiles with vector tiles".to_string()
}

fn default_dbtype() -> String {
    "mbtiles".to_string()
}

/// Style configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StyleConfig {
    #[serde(default = "default_style_name", deserialize_with = "string_or_number")]
    pub name: String,
    #[serde(default)]
    pub format: StyleFormat,
    /// Local file holding the style body. Upload is skipped when missing.
    #[serde(default = "default_style_file")]
    pub file: PathBuf,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            name: default_style_name(),
            format: StyleFormat::default(),
            file: default_style_file(),
        }
    }
}

fn default_style_name() -> String {
    "tiles_style".to_string()
}

fn default_style_file() -> PathBuf {
    PathBuf::from("styles/style.json")
}

/// Style encodings understood by the server
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StyleFormat {
    #[default]
    Mbstyle,
    Sld,
    Css,
    Ysld,
}

impl StyleFormat {
    /// Format name used in style descriptors.
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleFormat::Mbstyle => "mbstyle",
            StyleFormat::Sld => "sld",
            StyleFormat::Css => "css",
            StyleFormat::Ysld => "ysld",
        }
    }

    /// Content type for uploading a style body.
    pub fn content_type(&self) -> &'static str {
        match self {
            StyleFormat::Mbstyle => "application/vnd.geoserver.mbstyle+json",
            StyleFormat::Sld => "application/vnd.ogc.sld+xml",
            StyleFormat::Css => "application/vnd.geoserver.geocss+css",
            StyleFormat::Ysld => "application/vnd.geoserver.ysld+yaml",
        }
    }

    /// File extension the server stores the style under.
    pub fn extension(&self) -> &'static str {
        match self {
            StyleFormat::Mbstyle => "json",
            StyleFormat::Sld => "sld",
            StyleFormat::Css => "css",
            StyleFormat::Ysld => "yaml",
        }
    }
}

/// Layer group configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LayerGroupConfig {
    #[serde(default = "default_group_name", deserialize_with = "string_or_number")]
    pub name: String,
    #[serde(default = "default_group_title", deserialize_with = "string_or_number")]
    pub title: String,
    #[serde(default = "default_group_mode", deserialize_with = "string_or_number")]
    pub mode: String,
}

impl Default for LayerGroupConfig {
    fn default() -> Self {
        Self {
            name: default_group_name(),
            title: default_group_title(),
            mode: default_group_mode(),
        }
    }
}

fn default_group_name() -> String {
    "all_tiles".to_string()
}

fn default_group_title() -> String {
    "All tile layers".to_string()
}

fn default_group_mode() -> String {
    "SINGLE".to_string()
}

/// Readiness polling configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReadinessConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Pause between attempts (milliseconds).
    #[serde(default = "default_interval")]
    pub interval_ms: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_ms: default_interval(),
        }
    }
}

fn default_max_attempts() -> u32 {
    30
}

fn default_interval() -> u64 {
    5000 // 5 seconds
}

/// Service settings tuning configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TuningConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Service whose settings document is rewritten (e.g., "wms")
    #[serde(default = "default_service", deserialize_with = "string_or_number")]
    pub service: String,
    /// Element whose text is replaced
    #[serde(default = "default_field", deserialize_with = "string_or_number")]
    pub field: String,
    /// Replacement value. "0" means unlimited.
    #[serde(default = "default_value", deserialize_with = "string_or_number")]
    pub value: String,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            service: default_service(),
            field: default_field(),
            value: default_value(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_service() -> String {
    "wms".to_string()
}

fn default_field() -> String {
    "maxRequestMemory".to_string()
}

fn default_value() -> String {
    "0".to_string()
}

/// Accept a string, or a scalar that environment overrides turn into a number
/// or boolean (e.g., `GEOSEED_TUNING__VALUE=0`), as text.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(ScalarText)
}

fn string_or_number_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Text(#[serde(deserialize_with = "string_or_number")] String);

    let map = BTreeMap::<String, Text>::deserialize(deserializer)?;
    Ok(map.into_iter().map(|(k, Text(v))| (k, v)).collect())
}

struct ScalarText;

impl<'de> Visitor<'de> for ScalarText {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_char<E: de::Error>(self, v: char) -> Result<String, E> {
        Ok(v.to_string())
    }
}

/// Sanitized config for display (password redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: SanitizedServerConfig,
    pub workspace: WorkspaceConfig,
    pub datastore: DatastoreConfig,
    pub style: StyleConfig,
    pub layer_group: LayerGroupConfig,
    pub readiness: ReadinessConfig,
    pub tuning: TuningConfig,
}

/// Sanitized server config (password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedServerConfig {
    pub url: String,
    pub username: String,
    pub password_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: SanitizedServerConfig {
                url: config.server.url.clone(),
                username: config.server.username.clone(),
                password_configured: !config.server.password.is_empty(),
                timeout_secs: config.server.timeout_secs,
            },
            workspace: config.workspace.clone(),
            datastore: config.datastore.clone(),
            style: config.style.clone(),
            layer_group: config.layer_group.clone(),
            readiness: config.readiness.clone(),
            tuning: config.tuning.clone(),
        }
    }
}
