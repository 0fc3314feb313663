#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, Response};
use axum::Router;
use catalog_core::assets::{AssetStore, LocalAssetStore, DEFAULT_MAX_ASSET_BYTES};
use catalog_db::store::{CatalogStore, MemoryCatalogStore};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use catalog_api::config::ServerConfig;
use catalog_api::router::build_app_router;
use catalog_api::service::CatalogService;
use catalog_api::state::AppState;

/// Smallest payloads that sniff as the given image format.
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01\x08\x06\0\0\0";
pub const JPEG: &[u8] = b"\xff\xd8\xff\xe0\0\x10JFIF\0\x01\x01\0\0\x01\0\x01\0\0";

/// Build a test `ServerConfig` with safe defaults, serving uploads from `upload_dir`.
pub fn test_config(upload_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        database_url: "postgres://unused".to_string(),
        db_max_connections: 1,
        upload_dir: upload_dir.display().to_string(),
        upload_public_path: "/uploads".to_string(),
        max_upload_bytes: DEFAULT_MAX_ASSET_BYTES,
    }
}

/// A fully wired application backed by the in-memory store and a
/// temporary upload directory.
pub struct TestApp {
    pub router: Router,
    pub service: Arc<CatalogService>,
    pub assets: Arc<LocalAssetStore>,
    /// Kept alive for the lifetime of the test.
    pub upload_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let upload_dir = tempfile::tempdir().unwrap();
        let assets = Arc::new(
            LocalAssetStore::open(upload_dir.path(), "/uploads", DEFAULT_MAX_ASSET_BYTES)
                .await
                .unwrap(),
        );
        Self::with_stores(
            upload_dir,
            Arc::new(MemoryCatalogStore::new()),
            assets.clone(),
            assets,
        )
    }

    /// Wire the app with an explicit asset store (e.g. a failure-injecting wrapper
    /// around `local`).
    pub fn with_stores(
        upload_dir: TempDir,
        store: Arc<dyn CatalogStore>,
        asset_store: Arc<dyn AssetStore>,
        local: Arc<LocalAssetStore>,
    ) -> Self {
        let config = test_config(upload_dir.path());
        let service = Arc::new(CatalogService::new(store, asset_store));
        let state = AppState {
            catalog: Arc::clone(&service),
        };
        let router = build_app_router(state, &config);
        Self {
            router,
            service,
            assets: local,
            upload_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str) -> Response<Body> {
        self.send(Request::delete(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response<Body> {
        self.send_json("POST", uri, body).await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> Response<Body> {
        self.send_json("PUT", uri, body).await
    }

    async fn send_json(&self, method: &str, uri: &str, body: Value) -> Response<Body> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_form(&self, uri: &str, form: Form) -> Response<Body> {
        self.send(form.into_request("POST", uri)).await
    }

    pub async fn put_form(&self, uri: &str, form: Form) -> Response<Body> {
        self.send(form.into_request("PUT", uri)).await
    }

    /// Create a category through the API and return its id.
    pub async fn create_category(&self, name: &str, slug: &str) -> i64 {
        let resp = self
            .post_json(
                "/api/categories",
                serde_json::json!({ "name": name, "slug": slug }),
            )
            .await;
        assert_eq!(resp.status(), 201);
        body_json(resp).await["data"]["id"].as_i64().unwrap()
    }

    /// Create a product through the API and return the response body.
    pub async fn create_product(&self, form: Form) -> Value {
        let resp = self.post_form("/api/products", form).await;
        assert_eq!(resp.status(), 201);
        body_json(resp).await
    }

    /// Number of stored objects in the upload directory.
    pub fn stored_files(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path()).unwrap().count()
    }
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as raw bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Builder for `multipart/form-data` request bodies.
#[derive(Default)]
pub struct Form {
    parts: Vec<Vec<u8>>,
}

const BOUNDARY: &str = "catalog-test-boundary";

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        let part = format!(
            "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}"
        );
        self.parts.push(part.into_bytes());
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        let mut part = format!(
            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        part.extend_from_slice(data);
        self.parts.push(part);
        self
    }

    pub fn png(self) -> Self {
        self.file("image", "photo.png", "image/png", PNG)
    }

    pub fn jpeg(self) -> Self {
        self.file("image", "photo.jpg", "image/jpeg", JPEG)
    }

    /// The usual valid product fields.
    pub fn product(name: &str, slug: &str, price: &str, category_id: i64) -> Self {
        Self::new()
            .text("name", name)
            .text("slug", slug)
            .text("price", price)
            .text("categoryId", &category_id.to_string())
    }

    pub fn into_request(self, method: &str, uri: &str) -> Request<Body> {
        let mut body = Vec::new();
        for part in self.parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            body.extend_from_slice(&part);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method(method)
            .uri(uri)
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }
}

/// File name of the stored object behind an `imageUrl` such as `/uploads/1-2.png`.
pub fn asset_name(image_url: &str) -> &str {
    image_url.rsplit('/').next().unwrap()
}
