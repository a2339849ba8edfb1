use crate::common::{TestClient, TestStateBuilder};
use axum::http::StatusCode;
use dsa_api::router;

#[tokio::test]
async fn test_health_and_readiness() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");

    let client = TestClient::new(router::router().with_state(state));

    client.get("/health").await.assert_status(StatusCode::OK);
    client.get("/health/ready").await.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");

    let client = TestClient::new(router::router().with_state(state));

    let response = client.get("/api/does-not-exist").await;
    response.assert_status(StatusCode::NOT_FOUND);
}
