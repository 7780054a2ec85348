use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

/// Returns the termnav base directory: `~/.termnav`, fallback `/tmp/termnav`.
pub fn termnav_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".termnav"))
        .unwrap_or_else(|| PathBuf::from("/tmp/termnav"))
}

fn default_listen_addr() -> String {
    "127.0.0.1:8643".to_string()
}

fn default_daemon_url() -> String {
    format!("http://{}", default_listen_addr())
}

fn default_workspace_root() -> String {
    "~".to_string()
}

// ---------------------------------------------------------------------------
// Client config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the termnav daemon.
    #[serde(default = "default_daemon_url")]
    pub daemon_url: String,
    /// Workspace root that bounds navigation targets. May start with `~`,
    /// which is expanded against the resolved cwd at translation time.
    #[serde(default = "default_workspace_root")]
    pub workspace_root: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            daemon_url: default_daemon_url(),
            workspace_root: default_workspace_root(),
        }
    }
}

pub fn load_client_config() -> Result<ClientConfig> {
    let path = std::env::var("TERMNAV_CLIENT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| termnav_dir().join("client.toml"));
    if path.exists() {
        let contents = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        Ok(ClientConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Daemon config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

pub fn load_daemon_config() -> Result<DaemonConfig> {
    let path = std::env::var("TERMNAV_DAEMON_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| termnav_dir().join("daemon.toml"));
    if path.exists() {
        let contents = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        Ok(DaemonConfig::default())
    }
}
