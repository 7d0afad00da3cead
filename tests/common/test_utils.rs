use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use render_relay::{
    config::{Config, LogsConfig, ServerConfig, StabilityConfig},
    render::{ImageClient, StabilityClient},
    server::{handlers::AppState, router},
};
use serde_json::Value;
use std::{path::Path, sync::Arc};
use tempfile::TempDir;

pub const TEST_API_KEY: &str = "test-api-key";

/// Base64 of a 1x1 RGBA PNG.
pub const PNG_1X1_B64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

pub const LANDING_HTML: &str = "<!doctype html><title>Render Relay</title>";

const BOUNDARY: &str = "render-relay-test-boundary";

pub fn png_bytes() -> Vec<u8> {
    BASE64.decode(PNG_1X1_B64).expect("valid base64 fixture")
}

/// Create a test configuration rooted in `dir`, with the working directories in place
pub fn create_test_config(dir: &TempDir, api_key: Option<&str>, base_url: &str) -> Config {
    let path = |name: &str| dir.path().join(name).to_string_lossy().to_string();

    for name in ["results", "uploads", "public"] {
        std::fs::create_dir_all(dir.path().join(name)).unwrap();
    }
    std::fs::write(dir.path().join("public").join("index.html"), LANDING_HTML).unwrap();

    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 10000,
            logs: LogsConfig {
                level: "debug".to_string(),
            },
            results_dir: path("results"),
            uploads_dir: path("uploads"),
            public_dir: path("public"),
            max_upload_bytes: 8 * 1024 * 1024,
        },
        stability: StabilityConfig {
            api_key: api_key.map(str::to_string),
            engine: "core".to_string(),
            base_url: base_url.to_string(),
            timeout_secs: 5,
        },
    }
}

/// Router backed by the given image client
pub fn create_app_with_client(config: Config, client: Arc<dyn ImageClient>) -> Router {
    router(AppState::new(Arc::new(config), client))
}

/// Router backed by a real Stability client pointed at `config.stability.base_url`
pub fn create_app(config: Config) -> Router {
    let client = StabilityClient::new(&config.stability).unwrap();
    create_app_with_client(config, Arc::new(client))
}

/// Build a multipart/form-data body. Returns the content type and the body.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> (String, Vec<u8>) {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    if let Some((name, file_name, bytes)) = file {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                name, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

pub fn render_request(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Request<Body> {
    let (content_type, body) = multipart_body(fields, file);

    Request::builder()
        .method("POST")
        .uri("/render")
        .header("content-type", content_type)
        .body(Body::from(body))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn response_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn count_entries(dir: impl AsRef<Path>) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

/// Path of a stored result given the `imageUrl` returned by `/render`
pub fn result_path(dir: &TempDir, image_url: &str) -> std::path::PathBuf {
    let file_name = image_url
        .strip_prefix("/results/")
        .expect("imageUrl under /results/");
    dir.path().join("results").join(file_name)
}

pub fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}
