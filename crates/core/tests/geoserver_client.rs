//! GeoServer REST client tests against a local mock HTTP server.

use wiremock::matchers::{body_string, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use geoseed_core::{
    AdminApi, DatastoreConfig, GeoServerClient, LayerGroupConfig, ServerConfig, StyleDefinition,
    StyleFormat,
};

/// Basic auth header for the default admin:geoserver credentials.
const AUTH: &str = "Basic YWRtaW46Z2Vvc2VydmVy";

fn client_for(server: &MockServer) -> GeoServerClient {
    GeoServerClient::new(ServerConfig {
        url: format!("{}/geoserver/", server.uri()),
        ..ServerConfig::default()
    })
}

#[tokio::test]
async fn test_server_version_is_authenticated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geoserver/rest/about/version.xml"))
        .and(header("authorization", AUTH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<about/>"))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server).server_version().await.unwrap();
    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.body, "<about/>");
}

#[tokio::test]
async fn test_error_status_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/geoserver/rest/workspaces"))
        .respond_with(ResponseTemplate::new(409).set_body_string("Workspace 'tiles' already exists"))
        .mount(&server)
        .await;

    let outcome = client_for(&server).create_workspace("tiles").await.unwrap();
    assert_eq!(outcome.status, 409);
    assert!(outcome.body.contains("already exists"));
}

#[tokio::test]
async fn test_create_workspace_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/geoserver/rest/workspaces"))
        .and(header("content-type", "application/xml"))
        .and(body_string("<workspace><name>tiles</name></workspace>"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server).create_workspace("tiles").await.unwrap();
    assert_eq!(outcome.status, 201);
}

#[tokio::test]
async fn test_create_datastore_points_at_archive() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/geoserver/rest/workspaces/tiles/datastores"))
        .and(body_string_contains(
            "<entry key=\"database\">/data/tiles.mbtiles</entry>",
        ))
        .and(body_string_contains("<name>vector_tiles</name>"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server)
        .create_datastore("tiles", &DatastoreConfig::default())
        .await
        .unwrap();
    assert_eq!(outcome.status, 201);
}

#[tokio::test]
async fn test_list_available_feature_types() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(
            "/geoserver/rest/workspaces/tiles/datastores/vector_tiles/featuretypes.xml",
        ))
        .and(query_param("list", "available"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<list><featureTypeName>roads</featureTypeName></list>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server)
        .list_available_feature_types("tiles", "vector_tiles")
        .await
        .unwrap();
    assert_eq!(
        geoseed_core::xml::parse_feature_type_names(&outcome.body).unwrap(),
        vec!["roads"]
    );
}

#[tokio::test]
async fn test_publish_feature_type_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(
            "/geoserver/rest/workspaces/tiles/datastores/vector_tiles/featuretypes",
        ))
        .and(body_string_contains("<nativeName>water</nativeName>"))
        .and(body_string_contains("<title>water</title>"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server)
        .publish_feature_type("tiles", "vector_tiles", "water")
        .await
        .unwrap();
    assert_eq!(outcome.status, 201);
}

#[tokio::test]
async fn test_style_definition_and_upload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/geoserver/rest/workspaces/tiles/styles"))
        .and(body_string_contains("<format>mbstyle</format>"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/geoserver/rest/workspaces/tiles/styles/basic"))
        .and(header("content-type", "application/vnd.geoserver.mbstyle+json"))
        .and(body_string("{\"version\":8}"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let definition = StyleDefinition {
        name: "basic".to_string(),
        format: StyleFormat::Mbstyle,
    };
    assert_eq!(client.create_style("tiles", &definition).await.unwrap().status, 201);

    let outcome = client
        .upload_style_content(
            "tiles",
            "basic",
            StyleFormat::Mbstyle.content_type(),
            b"{\"version\":8}".to_vec(),
        )
        .await
        .unwrap();
    assert_eq!(outcome.status, 200);
}

#[tokio::test]
async fn test_create_layer_group_attaches_style() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/geoserver/rest/workspaces/tiles/layergroups"))
        .and(body_string_contains("<publishables/>"))
        .and(body_string_contains("<name>tiles:basic</name>"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server)
        .create_layer_group("tiles", &LayerGroupConfig::default(), Some("basic"))
        .await
        .unwrap();
    assert_eq!(outcome.status, 201);
}

#[tokio::test]
async fn test_service_settings_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geoserver/rest/services/wms/settings.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<wms><maxRequestMemory>65536</maxRequestMemory></wms>"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/geoserver/rest/services/wms/settings"))
        .and(body_string("<wms><maxRequestMemory>0</maxRequestMemory></wms>"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let current = client.service_settings("wms").await.unwrap();
    let updated =
        geoseed_core::xml::set_element_text(&current.body, "maxRequestMemory", "0").unwrap();
    let outcome = client.update_service_settings("wms", updated).await.unwrap();
    assert_eq!(outcome.status, 200);
}
