//! Integration test: drive the real HTTP transport against an in-process
//! fake of the detection service that keeps sigma and threshold as shared
//! mutable state, exactly like the real one.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use edgeview_io::{ClientConfig, Session, Upload};
use edgeview_protocol::{AnalysisRequest, ConfigError, DispatchError, NetworkError};
use parking_lot::Mutex;
use serde_json::{Value, json};

/// Time each algorithm takes to "process" an image.
const PROCESSING: Duration = Duration::from_millis(25);

#[derive(Debug)]
struct Params {
    sigma: f32,
    threshold: f32,
}

#[derive(Clone)]
struct Remote {
    params: Arc<Mutex<Params>>,
    log: Arc<Mutex<Vec<String>>>,
}

impl Remote {
    fn new() -> Self {
        Self {
            params: Arc::new(Mutex::new(Params {
                sigma: 1.0,
                threshold: 0.3,
            })),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// What `name` would compute with the parameters in effect right now.
    fn observe(&self, name: &str, image: &Bytes) -> String {
        let params = self.params.lock();
        format!(
            "{name} sigma={} threshold={} bytes={}",
            params.sigma,
            params.threshold,
            image.len()
        )
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }
}

async fn set_sigma(State(remote): State<Remote>, body: String) -> StatusCode {
    remote.log.lock().push(format!("/setSigma {body}"));
    match body.trim().parse::<f32>() {
        Ok(sigma) => {
            remote.params.lock().sigma = sigma;
            StatusCode::OK
        }
        Err(_) => StatusCode::BAD_REQUEST,
    }
}

async fn set_threshold(State(remote): State<Remote>, body: String) -> StatusCode {
    remote.log.lock().push(format!("/setThreshold {body}"));
    match body.trim().parse::<f32>() {
        Ok(threshold) => {
            remote.params.lock().threshold = threshold;
            StatusCode::OK
        }
        Err(_) => StatusCode::BAD_REQUEST,
    }
}

async fn single(remote: Remote, name: &'static str, image: Bytes) -> (StatusCode, Json<Value>) {
    remote.log.lock().push(format!("/{name}"));
    let seen = remote.observe(name, &image);
    tokio::time::sleep(PROCESSING).await;
    (
        StatusCode::ACCEPTED,
        Json(json!({ "data": { "base64": STANDARD.encode(seen) } })),
    )
}

async fn all(State(remote): State<Remote>, image: Bytes) -> (StatusCode, Json<Value>) {
    remote.log.lock().push("/all".to_owned());
    let data: serde_json::Map<String, Value> = ["shi", "harris", "sobel", "canny"]
        .into_iter()
        .map(|name| {
            let seen = STANDARD.encode(remote.observe(name, &image));
            (name.to_owned(), Value::String(seen))
        })
        .collect();
    tokio::time::sleep(PROCESSING).await;
    (StatusCode::ACCEPTED, Json(json!({ "data": data })))
}

/// Serve the fake on an ephemeral port. `/shi` is left out unless
/// `with_shi` is set, matching deployments that never shipped it.
async fn serve(with_shi: bool) -> (String, Remote) {
    let remote = Remote::new();
    let mut app = Router::new()
        .route("/setSigma", post(set_sigma))
        .route("/setThreshold", post(set_threshold))
        .route(
            "/canny",
            post(|State(r): State<Remote>, b: Bytes| single(r, "canny", b)),
        )
        .route(
            "/sobel",
            post(|State(r): State<Remote>, b: Bytes| single(r, "sobel", b)),
        )
        .route(
            "/harris",
            post(|State(r): State<Remote>, b: Bytes| single(r, "harris", b)),
        )
        .route("/all", post(all));
    if with_shi {
        app = app.route(
            "/shi",
            post(|State(r): State<Remote>, b: Bytes| single(r, "shi", b)),
        );
    }
    let app = app.with_state(remote.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), remote)
}

fn connect(server_url: String) -> Session {
    Session::connect(&ClientConfig {
        server_url,
        timeout: Duration::from_secs(5),
        ..ClientConfig::default()
    })
    .unwrap()
}

fn decode(base64: &str) -> String {
    String::from_utf8(STANDARD.decode(base64).unwrap()).unwrap()
}

#[tokio::test]
async fn sobel_round_trip() {
    let (url, remote) = serve(true).await;
    let session = connect(url);

    let upload = Upload::new("photo.png", vec![7; 10]).unwrap();
    let outcome = session
        .analyze(upload.into_request("sobel").with_sigma(3.5))
        .await
        .unwrap();

    assert_eq!(
        decode(&outcome.results()[0].image_base64),
        "sobel sigma=3.5 threshold=0.3 bytes=10"
    );
    assert_eq!(remote.log(), ["/setSigma 3.5", "/sobel"]);

    let history = session.history();
    let labels: Vec<_> = history.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, ["Original", "sobel"]);
    assert!(history[1].image_source.starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn aggregate_round_trip() {
    let (url, remote) = serve(true).await;
    let session = connect(url);

    let outcome = session
        .analyze(
            AnalysisRequest::new(vec![1, 2], "all")
                .with_sigma(2.0)
                .with_threshold(0.75),
        )
        .await
        .unwrap();

    let decoded: Vec<_> = outcome
        .results()
        .iter()
        .map(|r| decode(&r.image_base64))
        .collect();
    assert_eq!(
        decoded,
        [
            "canny sigma=2 threshold=0.75 bytes=2",
            "sobel sigma=2 threshold=0.75 bytes=2",
            "harris sigma=2 threshold=0.75 bytes=2",
            "shi sigma=2 threshold=0.75 bytes=2",
        ]
    );
    assert_eq!(remote.log(), ["/setSigma 2", "/setThreshold 0.75", "/all"]);
    assert_eq!(session.history().len(), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_uploads_keep_their_own_parameters() {
    let (url, remote) = serve(true).await;
    let session = connect(url);

    let jobs = [("canny", 2.0), ("sobel", 5.0), ("canny", 9.0), ("sobel", 0.5)];
    let handles: Vec<_> = jobs
        .into_iter()
        .map(|(selector, sigma)| {
            let session = session.clone();
            tokio::spawn(async move {
                let request = AnalysisRequest::new(vec![0; 3], selector)
                    .with_sigma(sigma)
                    .with_threshold(0.3);
                (selector, sigma, session.analyze(request).await)
            })
        })
        .collect();

    for handle in handles {
        let (selector, sigma, outcome) = handle.await.unwrap();
        let seen = decode(&outcome.unwrap().results()[0].image_base64);
        assert_eq!(seen, format!("{selector} sigma={sigma} threshold=0.3 bytes=3"));
    }

    // No configuration call ever lands between another dispatch's
    // configuration and its invocation.
    let log = remote.log();
    assert_eq!(log.len(), 10);
    let mut rest = log.as_slice();
    while let Some((first, tail)) = rest.split_first() {
        let sets_threshold = tail.first().is_some_and(|s| s.starts_with("/setThreshold"));
        let group = if first.starts_with("/setSigma") && sets_threshold {
            3
        } else {
            2
        };
        let (head, tail) = rest.split_at(group);
        assert!(
            head.last().is_some_and(|s| s == "/canny" || s == "/sobel"),
            "configuration group {head:?} not followed by its invocation"
        );
        rest = tail;
    }
    assert_eq!(session.history().len(), 8);
}

#[tokio::test]
async fn missing_endpoint_is_an_invocation_failure() {
    let (url, remote) = serve(false).await;
    let session = connect(url);

    let err = session
        .analyze(AnalysisRequest::new(vec![1], "shi").with_threshold(0.3))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DispatchError::InvocationFailed(NetworkError::Rejected {
            endpoint: "/shi",
            status: 404,
        })
    );
    assert_eq!(remote.log(), ["/setThreshold 0.3"]);
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn unreachable_service_fails_configuration() {
    // Bind and immediately release a port so nothing is listening on it.
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let session = connect(format!("http://{addr}"));

    let err = session
        .analyze(
            AnalysisRequest::new(vec![1], "canny")
                .with_sigma(1.0)
                .with_threshold(0.3),
        )
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            DispatchError::ConfigurationFailed(ConfigError::Unreachable { .. })
        ),
        "unexpected error: {err:?}"
    );
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn slow_service_times_out() {
    let (url, _remote) = serve(true).await;
    let session = Session::connect(&ClientConfig {
        server_url: url,
        timeout: Duration::from_millis(5),
        ..ClientConfig::default()
    })
    .unwrap();

    let err = session
        .analyze(AnalysisRequest::new(vec![1], "harris"))
        .await
        .unwrap_err();
    match err {
        DispatchError::InvocationFailed(NetworkError::Unreachable { endpoint, reason }) => {
            assert_eq!(endpoint, "/harris");
            assert!(reason.contains("timed out"), "unexpected reason: {reason}");
        }
        other => panic!("expected a timeout, got {other:?}"),
    }
}
