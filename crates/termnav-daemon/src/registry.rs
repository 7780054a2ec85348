use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Serialize)]
pub struct TerminalEntry {
    pub name: String,
    pub root_pid: i32,
    pub registered_at: String,
}

/// Maps terminal names to the root pid of their pty process.
///
/// In-memory only: terminal processes are transient, so registrations die
/// with the daemon. Re-registering a name replaces its pid (reconnect).
pub struct TerminalRegistry {
    terminals: RwLock<HashMap<String, TerminalEntry>>,
}

impl TerminalRegistry {
    pub fn new() -> Self {
        Self {
            terminals: RwLock::new(HashMap::new()),
        }
    }

    pub async fn register(&self, name: &str, root_pid: i32) -> TerminalEntry {
        let entry = TerminalEntry {
            name: name.to_string(),
            root_pid,
            registered_at: chrono::Utc::now().to_rfc3339(),
        };
        let mut terminals = self.terminals.write().await;
        if terminals.insert(name.to_string(), entry.clone()).is_some() {
            tracing::info!("terminal {} re-registered with pid {}", name, root_pid);
        } else {
            tracing::info!("terminal {} registered with pid {}", name, root_pid);
        }
        entry
    }

    pub async fn unregister(&self, name: &str) -> bool {
        let removed = self.terminals.write().await.remove(name).is_some();
        if removed {
            tracing::info!("terminal {} unregistered", name);
        }
        removed
    }

    /// Root pid for a terminal name, if registered.
    pub async fn lookup(&self, name: &str) -> Option<i32> {
        self.terminals.read().await.get(name).map(|e| e.root_pid)
    }

    pub async fn list(&self) -> Vec<TerminalEntry> {
        let mut entries: Vec<TerminalEntry> =
            self.terminals.read().await.values().cloned().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }
}

impl Default for TerminalRegistry {
    fn default() -> Self {
        Self::new()
    }
}
