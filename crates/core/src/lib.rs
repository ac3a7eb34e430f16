pub mod admin_api;
pub mod config;
pub mod outcome;
pub mod provision;
pub mod testing;
pub mod xml;

pub use admin_api::{AdminApi, AdminApiError, GeoServerClient, StyleDefinition};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatastoreConfig,
    LayerGroupConfig, ReadinessConfig, SanitizedConfig, ServerConfig, StyleConfig, StyleFormat,
    TuningConfig, WorkspaceConfig,
};
pub use outcome::{FailureKind, HttpOutcome, Outcome};
pub use provision::{
    ProvisionError, ProvisionReport, Provisioner, Step, StepPolicy, StepRecord, StepStatus,
};
pub use xml::XmlError;
