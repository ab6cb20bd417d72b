//! HTTP tests for execapi
//!
//! Each test starts the real server on an ephemeral loopback port and talks
//! to it with reqwest. Commands assume a POSIX userland.

#![cfg(unix)]

use execapi::config::Config;
use execapi::server;
use reqwest::StatusCode;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct TestServer {
    base: String,
    client: reqwest::Client,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    async fn start() -> Self {
        Self::start_with("/exec", "/health").await
    }

    async fn start_with(route: &str, health: &str) -> Self {
        let config = Config {
            addr: "127.0.0.1:0".to_string(),
            route: route.to_string(),
            health: health.to_string(),
            version: false,
        };
        config.validate().expect("valid config");

        let listener = TcpListener::bind(config.bind_addr())
            .await
            .expect("Failed to bind loopback listener");
        let base = format!("http://{}", listener.local_addr().unwrap());

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            server::serve(listener, &config, async {
                let _ = rx.await;
            })
            .await
        });

        Self {
            base,
            client: reqwest::Client::new(),
            shutdown: tx,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn post(&self, path: &str, body: &str) -> (StatusCode, String) {
        let response = self
            .client
            .post(self.url(path))
            .body(body.to_string())
            .send()
            .await
            .expect("request failed");
        let status = response.status();
        (status, response.text().await.expect("body read failed"))
    }

    async fn get(&self, path: &str) -> (StatusCode, String) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("request failed");
        let status = response.status();
        (status, response.text().await.expect("body read failed"))
    }

    /// Close client connections, then wait for graceful shutdown to finish
    async fn stop(self) {
        let TestServer {
            client,
            shutdown,
            handle,
            ..
        } = self;
        drop(client);
        let _ = shutdown.send(());
        handle
            .await
            .expect("server task panicked")
            .expect("server returned an error");
    }
}

// ============================================================================
// Execution endpoint
// ============================================================================

#[tokio::test]
async fn exec_echo_returns_output() {
    let server = TestServer::start().await;

    let (status, body) = server.post("/exec", "cmd:\n  - echo\n  - hello\n").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "hello\n");

    server.stop().await;
}

#[tokio::test]
async fn exec_accepts_get_with_body_and_json() {
    let server = TestServer::start().await;

    let response = server
        .client
        .get(server.url("/exec"))
        .body(r#"{"cmd": ["echo", "from", "get"]}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/plain; charset=utf-8"
    );
    assert_eq!(response.text().await.unwrap(), "from get\n");

    server.stop().await;
}

#[tokio::test]
async fn exec_combines_stdout_and_stderr() {
    let server = TestServer::start().await;

    let (status, body) = server
        .post("/exec", "cmd: [sh, -c, 'echo out; echo err >&2']")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("out\n"), "{}", body);
    assert!(body.contains("err\n"), "{}", body);
    assert_eq!(body.len(), "out\nerr\n".len());

    server.stop().await;
}

#[tokio::test]
async fn exec_identical_requests_identical_responses() {
    let server = TestServer::start().await;

    let first = server.post("/exec", "cmd: [echo, x]").await;
    for _ in 0..3 {
        assert_eq!(server.post("/exec", "cmd: [echo, x]").await, first);
    }
    assert_eq!(first, (StatusCode::OK, "x\n".to_string()));

    server.stop().await;
}

#[tokio::test]
async fn exec_reads_bodies_larger_than_two_mib() {
    let server = TestServer::start().await;

    let body = format!("cmd: [echo, ok]\npad: {}\n", "a".repeat(3 * 1024 * 1024));
    let (status, response) = server.post("/exec", &body).await;
    assert_eq!(status, StatusCode::OK, "{}", response);
    assert_eq!(response, "ok\n");

    server.stop().await;
}

#[tokio::test]
async fn exec_concurrent_requests_all_complete() {
    let server = TestServer::start().await;

    let tasks: Vec<_> = (0..4)
        .map(|i| {
            let client = server.client.clone();
            let url = server.url("/exec");
            tokio::spawn(async move {
                let response = client
                    .post(url)
                    .body(format!("cmd: [sh, -c, 'sleep 0.2; echo {}']", i))
                    .send()
                    .await
                    .expect("request failed");
                let status = response.status();
                (status, response.text().await.expect("body read failed"))
            })
        })
        .collect();

    for (i, task) in tasks.into_iter().enumerate() {
        let (status, body) = task.await.expect("request task panicked");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, format!("{}\n", i));
    }

    server.stop().await;
}

// ============================================================================
// Failure mapping
// ============================================================================

#[tokio::test]
async fn exec_empty_body_is_bad_request() {
    let server = TestServer::start().await;

    let (status, body) = server.post("/exec", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "missing command in request\n");

    let (status, body) = server.post("/exec", "cmd: []").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "missing command in request\n");

    server.stop().await;
}

#[tokio::test]
async fn exec_malformed_body_is_bad_request() {
    let server = TestServer::start().await;

    let (status, body) = server.post("/exec", "cmd: [echo, hello").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with("body yaml error: "), "{}", body);

    server.stop().await;
}

#[tokio::test]
async fn exec_missing_binary_is_server_error() {
    let server = TestServer::start().await;

    let (status, body) = server
        .post("/exec", "cmd: [/nonexistent/no-such-binary, arg]")
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body.starts_with("exec error: exit_status=0: spawn /nonexistent/no-such-binary:"),
        "{}",
        body
    );
    assert_eq!(body.lines().count(), 1);

    server.stop().await;
}

#[tokio::test]
async fn exec_nonzero_exit_discards_output() {
    let server = TestServer::start().await;

    let (status, body) = server
        .post("/exec", "cmd: [sh, -c, 'echo visible; exit 7']")
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.starts_with("exec error: exit_status=7:"), "{}", body);
    assert!(!body.contains("visible"), "{}", body);

    server.stop().await;
}

#[tokio::test]
async fn server_keeps_serving_after_failures() {
    let server = TestServer::start().await;

    assert_eq!(server.post("/exec", "{{{").await.0, StatusCode::BAD_REQUEST);
    assert_eq!(
        server.post("/exec", "cmd: [/nonexistent]").await.0,
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        server.post("/exec", "cmd: [echo, ok]").await,
        (StatusCode::OK, "ok\n".to_string())
    );

    server.stop().await;
}

// ============================================================================
// Stub endpoints and routing
// ============================================================================

#[tokio::test]
async fn health_ok_for_any_method() {
    let server = TestServer::start().await;

    assert_eq!(
        server.get("/health").await,
        (StatusCode::OK, "health ok\n".to_string())
    );
    assert_eq!(
        server.post("/health", "ignored").await,
        (StatusCode::OK, "health ok\n".to_string())
    );

    server.stop().await;
}

#[tokio::test]
async fn root_and_unknown_paths_not_found() {
    let server = TestServer::start().await;

    assert_eq!(
        server.get("/").await,
        (StatusCode::NOT_FOUND, "not found\n".to_string())
    );
    assert_eq!(
        server.get("/nope").await,
        (StatusCode::NOT_FOUND, "not found\n".to_string())
    );

    server.stop().await;
}

#[tokio::test]
async fn custom_paths_are_honored() {
    let server = TestServer::start_with("/run", "/alive").await;

    assert_eq!(
        server.post("/run", "cmd: [echo, custom]").await,
        (StatusCode::OK, "custom\n".to_string())
    );
    assert_eq!(server.get("/alive").await.0, StatusCode::OK);
    assert_eq!(
        server.post("/exec", "cmd: [echo, custom]").await.0,
        StatusCode::NOT_FOUND
    );

    server.stop().await;
}
