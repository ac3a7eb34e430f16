//! Testing utilities and a mock administrative API.
//!
//! # Example
//!
//! ```rust,ignore
//! use geoseed_core::testing::{fixtures, MockAdminApi};
//!
//! let api = MockAdminApi::with_feature_types(&["roads", "buildings"]);
//! let provisioner = Provisioner::new(fixtures::fast_config(), Arc::new(api.clone()));
//! ```

mod mock_admin_api;

pub use mock_admin_api::{MockAdminApi, MockOperation, RecordedCall, DEFAULT_WMS_SETTINGS};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::Path;

    use crate::config::Config;

    /// Default configuration with a 1ms readiness interval.
    ///
    /// The style file points at a path that does not exist; use
    /// [`config_with_style_file`] to upload a style.
    pub fn fast_config() -> Config {
        let mut config = Config::default();
        config.readiness.interval_ms = 1;
        config.style.file = "/nonexistent/geoseed/style.json".into();
        config
    }

    /// [`fast_config`] with the style body read from `path`.
    pub fn config_with_style_file(path: &Path) -> Config {
        let mut config = fast_config();
        config.style.file = path.to_path_buf();
        config
    }

    /// A small Mapbox style document.
    pub fn mbstyle_json() -> &'static str {
        r#"{"version":8,"name":"tiles","sources":{},"layers":[]}"#
    }
}
