use axum::{body::Body, http::Request, http::StatusCode};
use tower::ServiceExt;

#[tokio::test]
async fn livez_healthy_and_matching_routes_require_auth() {
    let state = jm_api::test_state("test-key");
    let app = jm_api::create_router(state);

    let livez_response = app
        .clone()
        .oneshot(Request::builder().uri("/livez").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(livez_response.status(), StatusCode::OK);

    let unauthorized = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/jobs/1/candidates")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);

    let wrong_key = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/applications/1/score")
                .header("x-api-key", "other")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(wrong_key.status(), StatusCode::UNAUTHORIZED);
}
