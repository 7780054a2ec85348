// Integration smoke test: verify the daemon binary starts, listens on its
// address, and can be stopped cleanly.

use std::process::Command;
use std::time::Duration;

#[tokio::test]
async fn test_termnavd_starts_and_stops() {
    let port = 20000 + (std::process::id() % 20000) as u16;
    let addr = format!("127.0.0.1:{port}");

    let mut child = Command::new(env!("CARGO_BIN_EXE_termnavd"))
        .env("TERMNAV_ADDR", &addr)
        .spawn()
        .expect("failed to start termnavd");

    tokio::time::sleep(Duration::from_millis(500)).await;

    let resp = reqwest::get(format!("http://{addr}/api/terminals"))
        .await
        .expect("daemon should be listening");
    assert_eq!(resp.status(), 200);

    child.kill().ok();
    child.wait().ok();
}
