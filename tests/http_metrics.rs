mod support;

use std::collections::HashSet;

use axum::http::{Method, StatusCode};
use metrics_util::debugging::DebuggingRecorder;

use support::{send, sqlite_app};

#[tokio::test]
async fn rejected_requests_are_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let app = sqlite_app().await;
    let (status, _) = send(&app.router, Method::GET, "/api/admin/posts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app.router, Method::GET, "/api/posts", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let snapshot = snapshotter.snapshot().into_vec();
    let names: HashSet<String> = snapshot
        .iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    for expected in [
        "kiroku_admin_auth_rejected_total",
        "kiroku_http_request_failures_total",
        "kiroku_http_request_duration_ms",
    ] {
        assert!(names.contains(expected), "missing metric {expected}");
    }

    let failure_labels: Vec<String> = snapshot
        .iter()
        .filter(|(key, _, _, _)| key.key().name() == "kiroku_http_request_failures_total")
        .flat_map(|(key, _, _, _)| {
            key.key()
                .labels()
                .map(|label| format!("{}={}", label.key(), label.value()))
                .collect::<Vec<_>>()
        })
        .collect();
    assert_eq!(failure_labels, ["status=401"]);
}
