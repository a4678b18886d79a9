mod common;

use std::io;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::json;
use tower::ServiceExt;
use tracing::Level;

use common::{create_test_account, get_request, json_request, setup_test_app, test_config};

/// Collects formatted log lines in memory.
#[derive(Clone, Default)]
struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl BufferWriter {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_reset_token_stays_out_of_logs_and_metrics() {
    let logs = BufferWriter::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let recorder = PrometheusBuilder::new().build_recorder();
    let metrics = recorder.handle();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    let token = metrics::with_local_recorder(&recorder, || {
        tracing::subscriber::with_default(subscriber, || {
            runtime.block_on(async {
                let app = setup_test_app(test_config());
                create_test_account(&app, "40", "nora", "forgotten", "teacher").await;

                let response = app
                    .router
                    .clone()
                    .oneshot(json_request(
                        "POST",
                        "/auth/forgot-password",
                        json!({ "email": "nora@school.test" }),
                    ))
                    .await
                    .unwrap();
                assert_eq!(response.status(), StatusCode::OK);

                let token = app.sender.last_token().expect("reset link was sent");

                let response = app
                    .router
                    .clone()
                    .oneshot(json_request(
                        "POST",
                        &format!("/auth/reset-password/{token}"),
                        json!({ "new_password": "remembered", "confirm_password": "remembered" }),
                    ))
                    .await
                    .unwrap();
                assert_eq!(response.status(), StatusCode::OK);

                token
            })
        })
    });

    let logs = logs.contents();
    assert!(logs.contains("Request completed"), "request logs were captured");
    assert!(logs.contains("/auth/reset-password/{token}"));
    assert!(!logs.contains(&token), "reset token leaked into logs");

    let rendered = metrics.render();
    assert!(rendered.contains(r#"path="/auth/reset-password/{token}""#));
    assert!(!rendered.contains(&token), "reset token leaked into metrics");
}

#[test]
fn test_unknown_paths_share_one_metric_series() {
    let recorder = PrometheusBuilder::new().build_recorder();
    let metrics = recorder.handle();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    metrics::with_local_recorder(&recorder, || {
        runtime.block_on(async {
            let mut config = test_config();
            config
                .auth
                .excluded_paths
                .extend(["/wp-admin".to_string(), "/.env".to_string()]);
            let app = setup_test_app(config);
            for path in ["/wp-admin", "/.env", "/auth/reset-password/a/b"] {
                let response = app
                    .router
                    .clone()
                    .oneshot(get_request(path))
                    .await
                    .unwrap();
                assert_eq!(response.status(), StatusCode::NOT_FOUND);
            }
        })
    });

    let rendered = metrics.render();
    assert!(rendered.contains(r#"path="unmatched""#));
    assert!(!rendered.contains("wp-admin"));
    assert!(!rendered.contains(".env"));
}
