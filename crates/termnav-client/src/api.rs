use anyhow::{bail, Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TerminalEntry {
    pub name: String,
    pub root_pid: i32,
    pub registered_at: String,
}

#[derive(Debug, Deserialize)]
struct CwdResponse {
    cwd: String,
    #[serde(default)]
    error: Option<String>,
}

/// Thin HTTP client for the termnavd API.
pub struct DaemonClient {
    base_url: String,
    http: reqwest::Client,
}

impl DaemonClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub async fn register(&self, name: &str, pid: i32) -> Result<TerminalEntry> {
        let resp = self
            .http
            .post(format!("{}/api/terminals", self.base_url))
            .json(&serde_json::json!({ "name": name, "pid": pid }))
            .send()
            .await
            .context("cannot reach termnavd (is it running?)")?;
        if !resp.status().is_success() {
            bail!("daemon rejected registration: {}", resp.status());
        }
        Ok(resp.json().await?)
    }

    pub async fn unregister(&self, name: &str) -> Result<()> {
        let resp = self
            .http
            .delete(format!("{}/api/terminals/{}", self.base_url, name))
            .send()
            .await
            .context("cannot reach termnavd (is it running?)")?;
        if !resp.status().is_success() {
            bail!("terminal '{}' is not registered", name);
        }
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<TerminalEntry>> {
        let resp = self
            .http
            .get(format!("{}/api/terminals", self.base_url))
            .send()
            .await
            .context("cannot reach termnavd (is it running?)")?;
        Ok(resp.json().await?)
    }

    /// Absolute cwd of a terminal's shell, per the daemon's resolution.
    pub async fn terminal_cwd(&self, name: &str) -> Result<String> {
        let resp = self
            .http
            .get(format!("{}/api/terminal-cwd/{}", self.base_url, name))
            .send()
            .await
            .context("cannot reach termnavd (is it running?)")?;
        let status = resp.status();
        let body: CwdResponse = resp.json().await?;
        if !status.is_success() {
            bail!(
                "could not determine cwd for terminal '{}': {}",
                name,
                body.error.unwrap_or_else(|| status.to_string())
            );
        }
        Ok(body.cwd)
    }
}
