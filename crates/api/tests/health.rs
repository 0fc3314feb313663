mod common;

use axum::http::StatusCode;
use common::{body_json, TestApp};

#[tokio::test]
async fn health_reports_ok_with_reachable_store() {
    let app = TestApp::new().await;

    let resp = app.get("/health").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["db_healthy"], true);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
