mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use axum::routing::get;
use tower::ServiceExt;

use classconnect::middleware::pipeline;
use classconnect::middleware::security_headers::SECURITY_HEADERS;
use classconnect::router::with_pipeline;
use common::{build_state, get_request, setup_test_app, test_config};

fn assert_security_headers(response: &axum::response::Response) {
    for (name, value) in SECURITY_HEADERS.iter() {
        assert_eq!(
            response.headers().get(name).map(|v| v.to_str().unwrap()),
            Some(*value),
            "{name} missing on {} response",
            response.status()
        );
    }
}

fn report_app() -> Router {
    let mut config = test_config();
    config.auth.excluded_paths = vec!["/report".to_string()];
    let (state, _, _) = build_state(&config);

    let routes = Router::new().route(
        "/report",
        get(|| async { "attendance ".repeat(200) }),
    );
    with_pipeline(&state, routes)
}

#[tokio::test]
async fn test_security_headers_on_every_outcome() {
    let mut config = test_config();
    config.rate_limit.max_requests = 3;
    let app = setup_test_app(config);

    let ok = app.router.clone().oneshot(get_request("/health")).await.unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    assert_security_headers(&ok);

    let unauthorized = app.router.clone().oneshot(get_request("/auth/me")).await.unwrap();
    assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);
    assert_security_headers(&unauthorized);

    let forbidden = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, "https://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
    assert_security_headers(&forbidden);

    let limited = app.router.clone().oneshot(get_request("/health")).await.unwrap();
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_security_headers(&limited);
}

#[tokio::test]
async fn test_large_bodies_are_gzipped_on_request() {
    let app = report_app();

    let request = Request::builder()
        .uri("/report")
        .header(header::ACCEPT_ENCODING, "gzip")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_ENCODING).unwrap(),
        "gzip"
    );
    assert_security_headers(&response);

    let plain = app.oneshot(get_request("/report")).await.unwrap();
    assert!(plain.headers().get(header::CONTENT_ENCODING).is_none());
}

#[tokio::test]
async fn test_timing_headers_are_set() {
    let app = report_app();

    let response = app.oneshot(get_request("/report")).await.unwrap();

    let request_id = response.headers().get("x-request-id").unwrap();
    assert!(uuid::Uuid::parse_str(request_id.to_str().unwrap()).is_ok());

    let elapsed = response
        .headers()
        .get("x-response-time")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(elapsed.ends_with("ms"));
    assert!(elapsed.trim_end_matches("ms").parse::<f64>().is_ok());
}

#[tokio::test]
async fn test_unknown_route_behind_session_is_not_found() {
    let app = setup_test_app(test_config());
    let account = common::create_test_account(&app, "21", "jane", "pw-jane", "admin").await;
    let token = app
        .state
        .tokens
        .sign(&account.id, &account.username, &account.role)
        .unwrap();

    let request = common::with_session(
        Request::builder()
            .method(Method::GET)
            .uri("/timetables")
            .body(Body::empty())
            .unwrap(),
        &token,
    );
    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_security_headers(&response);
}

#[test]
fn test_pipeline_runs_stages_in_order() {
    let (state, _, _) = build_state(&test_config());

    assert_eq!(
        pipeline(&state).request_order(),
        vec![
            "security_headers",
            "compression",
            "rate_limit",
            "authenticate",
            "response_time",
            "cors"
        ]
    );
}
