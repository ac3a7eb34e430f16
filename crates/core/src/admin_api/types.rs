//! Types for administrative API operations.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{DatastoreConfig, LayerGroupConfig, StyleFormat};
use crate::outcome::HttpOutcome;

/// Errors that can occur before a response is received.
///
/// HTTP error statuses are not errors at this layer; they come back as an
/// [`HttpOutcome`] and are classified by the caller.
#[derive(Debug, Error)]
pub enum AdminApiError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(String),
}

/// Style descriptor to register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDefinition {
    pub name: String,
    pub format: StyleFormat,
}

/// Administrative REST API of a tile server.
///
/// One method per endpoint the provisioning run touches. All calls are
/// authenticated by the implementation.
#[async_trait]
pub trait AdminApi: Send + Sync {
    /// Returns the backend name for logging.
    fn name(&self) -> &str;

    /// GET the version document. Used as the readiness check.
    async fn server_version(&self) -> Result<HttpOutcome, AdminApiError>;

    async fn create_workspace(&self, workspace: &str) -> Result<HttpOutcome, AdminApiError>;

    async fn create_datastore(
        &self,
        workspace: &str,
        store: &DatastoreConfig,
    ) -> Result<HttpOutcome, AdminApiError>;

    /// GET the feature types the store offers but that are not published yet.
    async fn list_available_feature_types(
        &self,
        workspace: &str,
        store: &str,
    ) -> Result<HttpOutcome, AdminApiError>;

    async fn publish_feature_type(
        &self,
        workspace: &str,
        store: &str,
        name: &str,
    ) -> Result<HttpOutcome, AdminApiError>;

    async fn create_style(
        &self,
        workspace: &str,
        style: &StyleDefinition,
    ) -> Result<HttpOutcome, AdminApiError>;

    /// PUT the raw style body.
    async fn upload_style_content(
        &self,
        workspace: &str,
        style: &str,
        content_type: &str,
        content: Vec<u8>,
    ) -> Result<HttpOutcome, AdminApiError>;

    /// `style` is the workspace-local style to attach, if any.
    async fn create_layer_group(
        &self,
        workspace: &str,
        group: &LayerGroupConfig,
        style: Option<&str>,
    ) -> Result<HttpOutcome, AdminApiError>;

    async fn service_settings(&self, service: &str) -> Result<HttpOutcome, AdminApiError>;

    async fn update_service_settings(
        &self,
        service: &str,
        settings: String,
    ) -> Result<HttpOutcome, AdminApiError>;
}
