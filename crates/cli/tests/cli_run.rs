use std::io::Write;
use std::net::TcpListener;
use std::process::Output;

use tempfile::{NamedTempFile, TempDir};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Find a port nothing is listening on
fn get_unused_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Run the binary in an empty directory so no geoseed.toml is picked up
async fn run_geoseed(args: &[&str], envs: &[(&str, String)]) -> Output {
    let workdir = TempDir::new().unwrap();
    let mut command = tokio::process::Command::new(env!("CARGO_BIN_EXE_geoseed"));
    command
        .args(args)
        .current_dir(workdir.path())
        .env("RUST_LOG", "error") // Quiet logs during tests
        .env_remove("GEOSEED_CONFIG")
        .kill_on_drop(true);
    for (key, value) in envs {
        command.env(key, value);
    }
    command.output().await.expect("Failed to run geoseed")
}

async fn mount_geoserver(server: &MockServer) {
    let routes: [(&str, &str, u16, &str); 9] = [
        ("GET", "/geoserver/rest/about/version.xml", 200, "<about/>"),
        ("POST", "/geoserver/rest/workspaces", 201, ""),
        ("POST", "/geoserver/rest/workspaces/tiles/datastores", 201, ""),
        (
            "POST",
            "/geoserver/rest/workspaces/tiles/datastores/vector_tiles/featuretypes",
            201,
            "",
        ),
        ("POST", "/geoserver/rest/workspaces/tiles/styles", 201, ""),
        ("PUT", "/geoserver/rest/workspaces/tiles/styles/tiles_style", 200, ""),
        ("POST", "/geoserver/rest/workspaces/tiles/layergroups", 201, ""),
        (
            "GET",
            "/geoserver/rest/services/wms/settings.xml",
            200,
            "<wms><maxRequestMemory>65536</maxRequestMemory></wms>",
        ),
        ("PUT", "/geoserver/rest/services/wms/settings", 200, ""),
    ];

    for (verb, route, status, body) in routes {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path(
            "/geoserver/rest/workspaces/tiles/datastores/vector_tiles/featuretypes.xml",
        ))
        .and(query_param("list", "available"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<list><featureTypeName>roads</featureTypeName>\
             <featureTypeName>buildings</featureTypeName></list>",
        ))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_run_reports_summary_and_exits_zero() {
    let server = MockServer::start().await;
    mount_geoserver(&server).await;

    let mut style = NamedTempFile::new().unwrap();
    style.write_all(br#"{"version":8,"layers":[]}"#).unwrap();

    let output = run_geoseed(
        &[],
        &[
            ("GEOSEED_SERVER__URL", format!("{}/geoserver", server.uri())),
            ("GEOSEED_READINESS__INTERVAL_MS", "1".to_string()),
            ("GEOSEED_STYLE__FILE", style.path().display().to_string()),
        ],
    )
    .await;

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("published: 2, failed: 0"), "stdout: {}", stdout);
    assert!(stdout.contains("/geoserver/web/"));
    assert!(!stdout.contains("Steps that need attention"));
}

#[tokio::test]
async fn test_json_report() {
    let server = MockServer::start().await;
    mount_geoserver(&server).await;

    let output = run_geoseed(
        &["--json"],
        &[
            ("GEOSEED_SERVER__URL", format!("{}/geoserver", server.uri())),
            ("GEOSEED_READINESS__INTERVAL_MS", "1".to_string()),
        ],
    )
    .await;

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["published"], 2);
    assert_eq!(report["failed"], 0);
    assert_eq!(report["discovered"], serde_json::json!(["roads", "buildings"]));
}

#[tokio::test]
async fn test_unreachable_server_exits_one() {
    let port = get_unused_port();

    let output = run_geoseed(
        &[],
        &[
            (
                "GEOSEED_SERVER__URL",
                format!("http://127.0.0.1:{}/geoserver", port),
            ),
            ("GEOSEED_READINESS__MAX_ATTEMPTS", "2".to_string()),
            ("GEOSEED_READINESS__INTERVAL_MS", "1".to_string()),
        ],
    )
    .await;

    assert_eq!(output.status.code(), Some(1));
    assert!(!String::from_utf8_lossy(&output.stdout).contains("published:"));
}

#[tokio::test]
async fn test_missing_explicit_config_exits_one() {
    let output = run_geoseed(&["--config", "/nonexistent/geoseed.toml"], &[]).await;
    assert_eq!(output.status.code(), Some(1));
}

#[tokio::test]
async fn test_show_config_redacts_password() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(
        config,
        r#"
[server]
url = "http://maps.local/geoserver"
password = "hunter2"

[workspace]
name = "osm"
"#
    )
    .unwrap();

    let config_path = config.path().display().to_string();
    let output = run_geoseed(&["--show-config", "--config", &config_path], &[]).await;

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("hunter2"));
    let sanitized: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(sanitized["workspace"]["name"], "osm");
    assert_eq!(sanitized["server"]["password_configured"], true);
}
