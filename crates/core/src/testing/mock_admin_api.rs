//! Mock administrative API for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::admin_api::{AdminApi, AdminApiError, StyleDefinition};
use crate::config::{DatastoreConfig, LayerGroupConfig, StyleFormat};
use crate::outcome::HttpOutcome;

/// Settings document served before any update.
pub const DEFAULT_WMS_SETTINGS: &str = "<wms><enabled>true</enabled><name>WMS</name>\
<maxBuffer>25</maxBuffer><maxRequestMemory>65536</maxRequestMemory>\
<maxRenderingTime>60</maxRenderingTime></wms>";

/// A call made against the mock, for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    ServerVersion,
    CreateWorkspace {
        workspace: String,
    },
    CreateDatastore {
        workspace: String,
        store: String,
        archive_path: String,
    },
    ListAvailableFeatureTypes {
        workspace: String,
        store: String,
    },
    PublishFeatureType {
        workspace: String,
        store: String,
        name: String,
    },
    CreateStyle {
        workspace: String,
        name: String,
        format: StyleFormat,
    },
    UploadStyleContent {
        workspace: String,
        style: String,
        content_type: String,
        content: Vec<u8>,
    },
    CreateLayerGroup {
        workspace: String,
        name: String,
        style: Option<String>,
    },
    GetServiceSettings {
        service: String,
    },
    UpdateServiceSettings {
        service: String,
        settings: String,
    },
}

/// Endpoint selector for status overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    ServerVersion,
    CreateWorkspace,
    CreateDatastore,
    ListAvailableFeatureTypes,
    PublishFeatureType,
    CreateStyle,
    UploadStyleContent,
    CreateLayerGroup,
    GetServiceSettings,
    UpdateServiceSettings,
}

#[derive(Debug)]
struct MockState {
    calls: Vec<RecordedCall>,
    /// Native feature types the store exposes, in listing order.
    feature_types: Vec<String>,
    workspaces: HashSet<String>,
    datastores: HashSet<(String, String)>,
    published: HashSet<(String, String)>,
    styles: HashMap<(String, String), Option<Vec<u8>>>,
    layer_groups: HashSet<(String, String)>,
    settings: HashMap<String, String>,
    status_overrides: HashMap<MockOperation, u16>,
    publish_overrides: HashMap<String, u16>,
    /// Readiness checks that still answer 503.
    unready_checks: u32,
    unreachable: bool,
}

/// Mock implementation of the AdminApi trait.
///
/// Behaves like a small in-memory server:
/// - Creating a resource answers 201 the first time and 409 afterwards
/// - Resources under a missing workspace or store answer 404
/// - The feature type listing always returns every configured name, published or not
/// - Settings documents are stored and served back
///
/// Behaviour can be bent per endpoint with status overrides, delayed
/// readiness, or a fully unreachable server. Every call is recorded.
///
/// # Example
///
/// ```rust,ignore
/// let api = MockAdminApi::with_feature_types(&["roads", "water"]);
/// api.set_publish_status("water", 500).await;
///
/// let report = Provisioner::new(config, Arc::new(api.clone())).run().await?;
/// assert_eq!(report.failed, 1);
/// assert_eq!(api.publish_requests().await, vec!["roads", "water"]);
/// ```
#[derive(Debug, Clone)]
pub struct MockAdminApi {
    state: Arc<RwLock<MockState>>,
}

impl Default for MockAdminApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAdminApi {
    /// Create a mock server with no feature types.
    pub fn new() -> Self {
        Self::with_feature_types(&[])
    }

    /// Create a mock server whose store exposes the given feature types.
    pub fn with_feature_types(names: &[&str]) -> Self {
        let mut settings = HashMap::new();
        settings.insert("wms".to_string(), DEFAULT_WMS_SETTINGS.to_string());

        Self {
            state: Arc::new(RwLock::new(MockState {
                calls: Vec::new(),
                feature_types: names.iter().map(|n| n.to_string()).collect(),
                workspaces: HashSet::new(),
                datastores: HashSet::new(),
                published: HashSet::new(),
                styles: HashMap::new(),
                layer_groups: HashSet::new(),
                settings,
                status_overrides: HashMap::new(),
                publish_overrides: HashMap::new(),
                unready_checks: 0,
                unreachable: false,
            })),
        }
    }

    /// Force every call to `operation` to answer `status`.
    pub async fn set_status(&self, operation: MockOperation, status: u16) {
        self.state
            .write()
            .await
            .status_overrides
            .insert(operation, status);
    }

    /// Force publishing `name` to answer `status`.
    pub async fn set_publish_status(&self, name: &str, status: u16) {
        self.state
            .write()
            .await
            .publish_overrides
            .insert(name.to_string(), status);
    }

    /// Answer 503 to the next `count` readiness checks.
    pub async fn set_unready_checks(&self, count: u32) {
        self.state.write().await.unready_checks = count;
    }

    /// Fail every call with a connection error.
    pub async fn set_unreachable(&self, unreachable: bool) {
        self.state.write().await.unreachable = unreachable;
    }

    /// Replace the settings document of `service`.
    pub async fn set_settings(&self, service: &str, settings: &str) {
        self.state
            .write()
            .await
            .settings
            .insert(service.to_string(), settings.to_string());
    }

    /// Current settings document of `service`.
    pub async fn settings(&self, service: &str) -> Option<String> {
        self.state.read().await.settings.get(service).cloned()
    }

    /// Uploaded body of a style, if any.
    pub async fn style_content(&self, workspace: &str, style: &str) -> Option<Vec<u8>> {
        self.state
            .read()
            .await
            .styles
            .get(&(workspace.to_string(), style.to_string()))
            .cloned()
            .flatten()
    }

    /// Whether a feature type has been published.
    pub async fn is_published(&self, workspace: &str, name: &str) -> bool {
        self.state
            .read()
            .await
            .published
            .contains(&(workspace.to_string(), name.to_string()))
    }

    /// All recorded calls in order.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.state.read().await.calls.clone()
    }

    /// Number of readiness checks made.
    pub async fn readiness_checks(&self) -> usize {
        self.state
            .read()
            .await
            .calls
            .iter()
            .filter(|c| matches!(c, RecordedCall::ServerVersion))
            .count()
    }

    /// Names of every publish request made, in order.
    pub async fn publish_requests(&self) -> Vec<String> {
        self.state
            .read()
            .await
            .calls
            .iter()
            .filter_map(|c| match c {
                RecordedCall::PublishFeatureType { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Clear recorded calls, keeping server state.
    pub async fn clear_calls(&self) {
        self.state.write().await.calls.clear();
    }

    /// Record a call and apply transport failure and status overrides.
    ///
    /// Returns `Some` when the response is decided by an override.
    async fn intercept(
        &self,
        call: RecordedCall,
        operation: MockOperation,
    ) -> Option<Result<HttpOutcome, AdminApiError>> {
        let mut state = self.state.write().await;
        state.calls.push(call);

        if state.unreachable {
            return Some(Err(AdminApiError::ConnectionFailed(
                "connection refused".to_string(),
            )));
        }

        state
            .status_overrides
            .get(&operation)
            .map(|status| Ok(HttpOutcome::new(*status, format!("mock status {}", status))))
    }
}

fn created(inserted: bool) -> Result<HttpOutcome, AdminApiError> {
    Ok(if inserted {
        HttpOutcome::new(201, "")
    } else {
        HttpOutcome::new(409, "already exists")
    })
}

fn not_found(what: &str) -> Result<HttpOutcome, AdminApiError> {
    Ok(HttpOutcome::new(404, format!("{} not found", what)))
}

#[async_trait]
impl AdminApi for MockAdminApi {
    fn name(&self) -> &str {
        "mock"
    }

    async fn server_version(&self) -> Result<HttpOutcome, AdminApiError> {
        if let Some(result) = self
            .intercept(RecordedCall::ServerVersion, MockOperation::ServerVersion)
            .await
        {
            return result;
        }

        let mut state = self.state.write().await;
        if state.unready_checks > 0 {
            state.unready_checks -= 1;
            return Ok(HttpOutcome::new(503, "starting"));
        }
        Ok(HttpOutcome::new(
            200,
            "<about><resource name=\"GeoServer\"><Version>2.25.0</Version></resource></about>",
        ))
    }

    async fn create_workspace(&self, workspace: &str) -> Result<HttpOutcome, AdminApiError> {
        let call = RecordedCall::CreateWorkspace {
            workspace: workspace.to_string(),
        };
        if let Some(result) = self.intercept(call, MockOperation::CreateWorkspace).await {
            return result;
        }

        let mut state = self.state.write().await;
        created(state.workspaces.insert(workspace.to_string()))
    }

    async fn create_datastore(
        &self,
        workspace: &str,
        store: &DatastoreConfig,
    ) -> Result<HttpOutcome, AdminApiError> {
        let call = RecordedCall::CreateDatastore {
            workspace: workspace.to_string(),
            store: store.name.clone(),
            archive_path: store.archive_path.clone(),
        };
        if let Some(result) = self.intercept(call, MockOperation::CreateDatastore).await {
            return result;
        }

        let mut state = self.state.write().await;
        if !state.workspaces.contains(workspace) {
            return not_found("workspace");
        }
        created(
            state
                .datastores
                .insert((workspace.to_string(), store.name.clone())),
        )
    }

    async fn list_available_feature_types(
        &self,
        workspace: &str,
        store: &str,
    ) -> Result<HttpOutcome, AdminApiError> {
        let call = RecordedCall::ListAvailableFeatureTypes {
            workspace: workspace.to_string(),
            store: store.to_string(),
        };
        if let Some(result) = self
            .intercept(call, MockOperation::ListAvailableFeatureTypes)
            .await
        {
            return result;
        }

        let state = self.state.read().await;
        if !state
            .datastores
            .contains(&(workspace.to_string(), store.to_string()))
        {
            return not_found("datastore");
        }

        let items: String = state
            .feature_types
            .iter()
            .map(|n| format!("<featureTypeName>{}</featureTypeName>", n))
            .collect();
        Ok(HttpOutcome::new(200, format!("<list>{}</list>", items)))
    }

    async fn publish_feature_type(
        &self,
        workspace: &str,
        store: &str,
        name: &str,
    ) -> Result<HttpOutcome, AdminApiError> {
        let call = RecordedCall::PublishFeatureType {
            workspace: workspace.to_string(),
            store: store.to_string(),
            name: name.to_string(),
        };
        if let Some(result) = self.intercept(call, MockOperation::PublishFeatureType).await {
            return result;
        }

        let mut state = self.state.write().await;
        if let Some(status) = state.publish_overrides.get(name) {
            return Ok(HttpOutcome::new(*status, format!("mock status {}", status)));
        }
        if !state.feature_types.iter().any(|n| n == name) {
            return not_found("feature type");
        }
        created(
            state
                .published
                .insert((workspace.to_string(), name.to_string())),
        )
    }

    async fn create_style(
        &self,
        workspace: &str,
        style: &StyleDefinition,
    ) -> Result<HttpOutcome, AdminApiError> {
        let call = RecordedCall::CreateStyle {
            workspace: workspace.to_string(),
            name: style.name.clone(),
            format: style.format,
        };
        if let Some(result) = self.intercept(call, MockOperation::CreateStyle).await {
            return result;
        }

        let mut state = self.state.write().await;
        if !state.workspaces.contains(workspace) {
            return not_found("workspace");
        }
        let key = (workspace.to_string(), style.name.clone());
        if state.styles.contains_key(&key) {
            return created(false);
        }
        state.styles.insert(key, None);
        created(true)
    }

    async fn upload_style_content(
        &self,
        workspace: &str,
        style: &str,
        content_type: &str,
        content: Vec<u8>,
    ) -> Result<HttpOutcome, AdminApiError> {
        let call = RecordedCall::UploadStyleContent {
            workspace: workspace.to_string(),
            style: style.to_string(),
            content_type: content_type.to_string(),
            content: content.clone(),
        };
        if let Some(result) = self.intercept(call, MockOperation::UploadStyleContent).await {
            return result;
        }

        let mut state = self.state.write().await;
        match state
            .styles
            .get_mut(&(workspace.to_string(), style.to_string()))
        {
            Some(body) => {
                *body = Some(content);
                Ok(HttpOutcome::new(200, ""))
            }
            None => not_found("style"),
        }
    }

    async fn create_layer_group(
        &self,
        workspace: &str,
        group: &LayerGroupConfig,
        style: Option<&str>,
    ) -> Result<HttpOutcome, AdminApiError> {
        let call = RecordedCall::CreateLayerGroup {
            workspace: workspace.to_string(),
            name: group.name.clone(),
            style: style.map(str::to_string),
        };
        if let Some(result) = self.intercept(call, MockOperation::CreateLayerGroup).await {
            return result;
        }

        let mut state = self.state.write().await;
        if !state.workspaces.contains(workspace) {
            return not_found("workspace");
        }
        created(
            state
                .layer_groups
                .insert((workspace.to_string(), group.name.clone())),
        )
    }

    async fn service_settings(&self, service: &str) -> Result<HttpOutcome, AdminApiError> {
        let call = RecordedCall::GetServiceSettings {
            service: service.to_string(),
        };
        if let Some(result) = self.intercept(call, MockOperation::GetServiceSettings).await {
            return result;
        }

        match self.state.read().await.settings.get(service) {
            Some(settings) => Ok(HttpOutcome::new(200, settings.clone())),
            None => not_found("service"),
        }
    }

    async fn update_service_settings(
        &self,
        service: &str,
        settings: String,
    ) -> Result<HttpOutcome, AdminApiError> {
        let call = RecordedCall::UpdateServiceSettings {
            service: service.to_string(),
            settings: settings.clone(),
        };
        if let Some(result) = self
            .intercept(call, MockOperation::UpdateServiceSettings)
            .await
        {
            return result;
        }

        let mut state = self.state.write().await;
        if !state.settings.contains_key(service) {
            return not_found("service");
        }
        state.settings.insert(service.to_string(), settings);
        Ok(HttpOutcome::new(200, ""))
    }
}
