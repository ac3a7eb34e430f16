//! GeoServer REST implementation of [`AdminApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use tracing::debug;

use crate::config::{DatastoreConfig, LayerGroupConfig, ServerConfig};
use crate::outcome::HttpOutcome;
use crate::xml;

use super::{AdminApi, AdminApiError, StyleDefinition};

const XML: &str = "application/xml";

/// GeoServer REST client.
pub struct GeoServerClient {
    client: Client,
    config: ServerConfig,
}

impl GeoServerClient {
    /// Create a new GeoServer client.
    pub fn new(config: ServerConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    /// Build an authenticated request for a path under `/rest`.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/rest{}", self.base_url(), path);
        debug!(method = %method, url = %url, "GeoServer request");
        self.client
            .request(method, url)
            .basic_auth(&self.config.username, Some(&self.config.password))
    }

    fn xml_request(&self, method: Method, path: &str, body: String) -> RequestBuilder {
        self.request(method, path)
            .header(CONTENT_TYPE, XML)
            .header(ACCEPT, XML)
            .body(body)
    }

    /// Send a request and capture status and body.
    async fn send(&self, request: RequestBuilder) -> Result<HttpOutcome, AdminApiError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AdminApiError::Timeout
            } else if e.is_connect() {
                AdminApiError::ConnectionFailed(e.to_string())
            } else {
                AdminApiError::Request(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AdminApiError::Request(format!("Failed to read response: {}", e)))?;

        debug!(status, bytes = body.len(), "GeoServer response");
        Ok(HttpOutcome::new(status, body))
    }
}

fn seg(value: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(value)
}

#[async_trait]
impl AdminApi for GeoServerClient {
    fn name(&self) -> &str {
        "geoserver"
    }

    async fn server_version(&self) -> Result<HttpOutcome, AdminApiError> {
        self.send(self.request(Method::GET, "/about/version.xml"))
            .await
    }

    async fn create_workspace(&self, workspace: &str) -> Result<HttpOutcome, AdminApiError> {
        self.send(self.xml_request(
            Method::POST,
            "/workspaces",
            xml::workspace_xml(workspace),
        ))
        .await
    }

    async fn create_datastore(
        &self,
        workspace: &str,
        store: &DatastoreConfig,
    ) -> Result<HttpOutcome, AdminApiError> {
        let path = format!("/workspaces/{}/datastores", seg(workspace));
        self.send(self.xml_request(Method::POST, &path, xml::datastore_xml(workspace, store)))
            .await
    }

    async fn list_available_feature_types(
        &self,
        workspace: &str,
        store: &str,
    ) -> Result<HttpOutcome, AdminApiError> {
        let path = format!(
            "/workspaces/{}/datastores/{}/featuretypes.xml?list=available",
            seg(workspace),
            seg(store)
        );
        self.send(self.request(Method::GET, &path)).await
    }

    async fn publish_feature_type(
        &self,
        workspace: &str,
        store: &str,
        name: &str,
    ) -> Result<HttpOutcome, AdminApiError> {
        let path = format!(
            "/workspaces/{}/datastores/{}/featuretypes",
            seg(workspace),
            seg(store)
        );
        self.send(self.xml_request(Method::POST, &path, xml::feature_type_xml(name)))
            .await
    }

    async fn create_style(
        &self,
        workspace: &str,
        style: &StyleDefinition,
    ) -> Result<HttpOutcome, AdminApiError> {
        let path = format!("/workspaces/{}/styles", seg(workspace));
        self.send(self.xml_request(
            Method::POST,
            &path,
            xml::style_xml(&style.name, style.format),
        ))
        .await
    }

    async fn upload_style_content(
        &self,
        workspace: &str,
        style: &str,
        content_type: &str,
        content: Vec<u8>,
    ) -> Result<HttpOutcome, AdminApiError> {
        let path = format!("/workspaces/{}/styles/{}", seg(workspace), seg(style));
        let request = self
            .request(Method::PUT, &path)
            .header(CONTENT_TYPE, content_type)
            .body(content);
        self.send(request).await
    }

    async fn create_layer_group(
        &self,
        workspace: &str,
        group: &LayerGroupConfig,
        style: Option<&str>,
    ) -> Result<HttpOutcome, AdminApiError> {
        let path = format!("/workspaces/{}/layergroups", seg(workspace));
        self.send(self.xml_request(
            Method::POST,
            &path,
            xml::layer_group_xml(workspace, group, style),
        ))
        .await
    }

    async fn service_settings(&self, service: &str) -> Result<HttpOutcome, AdminApiError> {
        let path = format!("/services/{}/settings.xml", seg(service));
        self.send(self.request(Method::GET, &path).header(ACCEPT, XML))
            .await
    }

    async fn update_service_settings(
        &self,
        service: &str,
        settings: String,
    ) -> Result<HttpOutcome, AdminApiError> {
        let path = format!("/services/{}/settings", seg(service));
        self.send(self.xml_request(Method::PUT, &path, settings))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> GeoServerClient {
        GeoServerClient::new(ServerConfig {
            url: url.to_string(),
            ..ServerConfig::default()
        })
    }

    #[test]
    fn test_base_url_trims_trailing_slash() {
        assert_eq!(
            client("http://localhost:8080/geoserver/").base_url(),
            "http://localhost:8080/geoserver"
        );
        assert_eq!(
            client("http://localhost:8080/geoserver").base_url(),
            "http://localhost:8080/geoserver"
        );
    }

    #[test]
    fn test_path_segments_are_encoded() {
        assert_eq!(seg("land use"), "land%20use");
        assert_eq!(seg("tiles"), "tiles");
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Port 9 (discard) is not expected to accept HTTP connections.
        let client = client("http://127.0.0.1:9/geoserver");
        let result = client.server_version().await;
        assert!(matches!(
            result,
            Err(AdminApiError::ConnectionFailed(_)) | Err(AdminApiError::Request(_))
        ));
    }
}
