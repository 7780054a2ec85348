// Wire-contract tests: boot the service on an ephemeral port and exercise
// the endpoints the way an external UI would.

use std::path::PathBuf;
use std::sync::Arc;
use termnav_daemon::registry::TerminalRegistry;
use termnav_daemon::server::{router, AppState};
use termnav_proc::backend::{CwdBackend, CwdError};
use termnav_proc::CwdResolver;

struct FixedBackend(&'static str);

impl CwdBackend for FixedBackend {
    fn read_cwd(&self, _pid: i32) -> Result<PathBuf, CwdError> {
        Ok(PathBuf::from(self.0))
    }
}

struct DeniedBackend;

impl CwdBackend for DeniedBackend {
    fn read_cwd(&self, _pid: i32) -> Result<PathBuf, CwdError> {
        Err(CwdError::PermissionDenied)
    }
}

async fn spawn_server(backend: Box<dyn CwdBackend>) -> String {
    let state = AppState {
        registry: Arc::new(TerminalRegistry::new()),
        resolver: Arc::new(CwdResolver::with_backend(backend)),
    };
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{addr}")
}

async fn register(base: &str, name: &str, pid: i32) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{base}/api/terminals"))
        .json(&serde_json::json!({ "name": name, "pid": pid }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_terminal_cwd_success_shape() {
    let base = spawn_server(Box::new(FixedBackend("/work/proj"))).await;
    assert!(register(&base, "term1", 4242).await.status().is_success());

    let resp = reqwest::get(format!("{base}/api/terminal-cwd/term1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["terminal_name"], "term1");
    assert_eq!(body["cwd"], "/work/proj");
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_unknown_terminal_is_404_with_error() {
    let base = spawn_server(Box::new(FixedBackend("/work"))).await;

    let resp = reqwest::get(format!("{base}/api/terminal-cwd/ghost"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["terminal_name"], "ghost");
    assert_eq!(body["cwd"], "");
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_resolution_failure_is_500_with_reason() {
    let base = spawn_server(Box::new(DeniedBackend)).await;
    register(&base, "term1", 4242).await;

    let resp = reqwest::get(format!("{base}/api/terminal-cwd/term1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["cwd"], "");
    assert!(body["error"].as_str().unwrap().contains("permission denied"));
}

#[tokio::test]
async fn test_register_validation() {
    let base = spawn_server(Box::new(FixedBackend("/work"))).await;

    assert_eq!(register(&base, "", 42).await.status(), 400);
    assert_eq!(register(&base, "term1", 0).await.status(), 400);
}

#[tokio::test]
async fn test_unregister_and_list() {
    let base = spawn_server(Box::new(FixedBackend("/work"))).await;
    register(&base, "b", 2).await;
    register(&base, "a", 1).await;

    let client = reqwest::Client::new();
    let list: serde_json::Value = client
        .get(format!("{base}/api/terminals"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.as_array().unwrap().len(), 2);
    assert_eq!(list[0]["name"], "a");

    let resp = client
        .delete(format!("{base}/api/terminals/a"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .delete(format!("{base}/api/terminals/a"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let list: serde_json::Value = client
        .get(format!("{base}/api/terminals"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["name"], "b");
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_end_to_end_with_real_backend() {
    // Register this test process as the "terminal"; the real /proc backend
    // should resolve its actual cwd.
    let state = AppState {
        registry: Arc::new(TerminalRegistry::new()),
        resolver: Arc::new(CwdResolver::new()),
    };
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    let base = format!("http://{addr}");

    register(&base, "self", std::process::id() as i32).await;
    let body: serde_json::Value = reqwest::get(format!("{base}/api/terminal-cwd/self"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        body["cwd"].as_str().unwrap(),
        std::env::current_dir().unwrap().to_string_lossy()
    );
}
