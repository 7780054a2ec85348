use crate::shell::is_shell;
use std::collections::{HashSet, VecDeque};

/// Hard cap on processes visited per traversal, bounding worst-case latency
/// against pathological process tables.
pub const MAX_TREE_NODES: usize = 4096;

/// One process in a collected tree. Immutable once built; `depth` is the
/// distance from the traversal root (root = 0).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessNode {
    pub pid: i32,
    /// Pid of the parent within the tree; 0 for the root.
    pub parent_pid: i32,
    pub command: String,
    pub depth: u32,
    pub is_shell: bool,
}

/// Process-table queries needed to walk a tree. One instance per resolution
/// request; implementations may snapshot the table on first use, so a source
/// is never reused across requests.
pub trait ProcessSource {
    /// Direct children of `pid`. Unknown or vanished pids yield an empty list.
    fn children(&self, pid: i32) -> Vec<i32>;
    /// Base command name of `pid`, or None if the process is gone.
    fn command(&self, pid: i32) -> Option<String>;
}

/// Collects all live descendants of `root_pid`, breadth-first.
///
/// A visited-pid set guards against pid reuse and enumeration races making
/// the table look cyclic; each pid is visited at most once. Processes that
/// disappear mid-walk are dropped together with their subtrees. Output
/// ordering is unspecified; depth and parent linkage are the contract.
pub fn collect_tree(source: &dyn ProcessSource, root_pid: i32) -> Vec<ProcessNode> {
    let mut nodes = Vec::new();
    let mut visited: HashSet<i32> = HashSet::new();
    let mut queue: VecDeque<(i32, i32, u32)> = VecDeque::new();
    queue.push_back((root_pid, 0, 0));

    while let Some((pid, parent_pid, depth)) = queue.pop_front() {
        if !visited.insert(pid) {
            continue;
        }
        if nodes.len() >= MAX_TREE_NODES {
            tracing::warn!(
                "process tree under {} exceeded {} nodes, truncating",
                root_pid,
                MAX_TREE_NODES
            );
            break;
        }

        let Some(command) = source.command(pid) else {
            // Exited between enumeration and inspection; not an error.
            continue;
        };

        let shell = is_shell(&command);
        nodes.push(ProcessNode {
            pid,
            parent_pid,
            command,
            depth,
            is_shell: shell,
        });

        for child in source.children(pid) {
            if !visited.contains(&child) {
                queue.push_back((child, pid, depth + 1));
            }
        }
    }

    nodes
}

// ---------------------------------------------------------------------------
// Platform sources
// ---------------------------------------------------------------------------

#[cfg(target_os = "linux")]
pub use procfs_source::ProcfsSource;

#[cfg(target_os = "linux")]
pub fn platform_source() -> ProcfsSource {
    ProcfsSource::new()
}

#[cfg(target_os = "macos")]
pub use ps_source::PsSource;

#[cfg(target_os = "macos")]
pub fn platform_source() -> PsSource {
    PsSource::new()
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub struct NullSource;

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
impl ProcessSource for NullSource {
    fn children(&self, _pid: i32) -> Vec<i32> {
        Vec::new()
    }
    fn command(&self, _pid: i32) -> Option<String> {
        None
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub fn platform_source() -> NullSource {
    NullSource
}

#[cfg(target_os = "linux")]
mod procfs_source {
    use super::ProcessSource;
    use std::collections::HashMap;
    use std::sync::OnceLock;

    /// Linux process table via `/proc`. Children come from
    /// `/proc/<pid>/task/<pid>/children`; on kernels built without that file
    /// the source falls back to a ppid index scanned once from `/proc/*/stat`.
    pub struct ProcfsSource {
        child_index: OnceLock<HashMap<i32, Vec<i32>>>,
    }

    impl ProcfsSource {
        pub fn new() -> Self {
            Self {
                child_index: OnceLock::new(),
            }
        }

        fn fallback_index(&self) -> &HashMap<i32, Vec<i32>> {
            self.child_index.get_or_init(scan_ppid_index)
        }
    }

    impl Default for ProcfsSource {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ProcessSource for ProcfsSource {
        fn children(&self, pid: i32) -> Vec<i32> {
            let path = format!("/proc/{pid}/task/{pid}/children");
            match std::fs::read_to_string(&path) {
                Ok(contents) => contents
                    .split_whitespace()
                    .filter_map(|t| t.parse().ok())
                    .collect(),
                Err(_) => self
                    .fallback_index()
                    .get(&pid)
                    .cloned()
                    .unwrap_or_default(),
            }
        }

        fn command(&self, pid: i32) -> Option<String> {
            let comm = std::fs::read_to_string(format!("/proc/{pid}/comm")).ok()?;
            Some(comm.trim().to_string())
        }
    }

    /// Builds pid -> children by scanning every `/proc/<pid>/stat`.
    /// Stat format is `pid (comm) state ppid ...`; comm may contain spaces
    /// and parentheses, so parse from the last `)`.
    fn scan_ppid_index() -> HashMap<i32, Vec<i32>> {
        let mut index: HashMap<i32, Vec<i32>> = HashMap::new();
        let entries = match std::fs::read_dir("/proc") {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("cannot scan /proc for child index: {}", e);
                return index;
            }
        };
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(pid) = name.to_str().and_then(|s| s.parse::<i32>().ok()) else {
                continue;
            };
            let Ok(stat) = std::fs::read_to_string(format!("/proc/{pid}/stat")) else {
                continue;
            };
            let Some(rest) = stat.rfind(')').map(|i| &stat[i + 1..]) else {
                continue;
            };
            // rest: " state ppid ..."
            if let Some(ppid) = rest.split_whitespace().nth(1).and_then(|s| s.parse().ok()) {
                index.entry(ppid).or_default().push(pid);
            }
        }
        index
    }
}

#[cfg(target_os = "macos")]
mod ps_source {
    use super::ProcessSource;
    use std::collections::HashMap;
    use std::sync::OnceLock;

    #[derive(Default)]
    struct PsSnapshot {
        children: HashMap<i32, Vec<i32>>,
        commands: HashMap<i32, String>,
    }

    /// macOS process table via one `ps -axo pid=,ppid=,comm=` snapshot,
    /// taken lazily on first query.
    pub struct PsSource {
        snapshot: OnceLock<PsSnapshot>,
    }

    impl PsSource {
        pub fn new() -> Self {
            Self {
                snapshot: OnceLock::new(),
            }
        }

        fn snapshot(&self) -> &PsSnapshot {
            self.snapshot.get_or_init(take_snapshot)
        }
    }

    impl Default for PsSource {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ProcessSource for PsSource {
        fn children(&self, pid: i32) -> Vec<i32> {
            self.snapshot()
                .children
                .get(&pid)
                .cloned()
                .unwrap_or_default()
        }

        fn command(&self, pid: i32) -> Option<String> {
            self.snapshot().commands.get(&pid).cloned()
        }
    }

    fn take_snapshot() -> PsSnapshot {
        let output = match std::process::Command::new("ps")
            .args(["-axo", "pid=,ppid=,comm="])
            .output()
        {
            Ok(o) if o.status.success() => o,
            Ok(o) => {
                tracing::warn!("ps exited with {}", o.status);
                return PsSnapshot::default();
            }
            Err(e) => {
                tracing::warn!("failed to run ps: {}", e);
                return PsSnapshot::default();
            }
        };

        let mut snapshot = PsSnapshot::default();
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            let mut parts = line.split_whitespace();
            let (Some(pid), Some(ppid)) = (
                parts.next().and_then(|s| s.parse::<i32>().ok()),
                parts.next().and_then(|s| s.parse::<i32>().ok()),
            ) else {
                continue;
            };
            let comm = parts.collect::<Vec<_>>().join(" ");
            if comm.is_empty() {
                continue;
            }
            // ps reports the full executable path; classify by basename.
            let base = comm.rsplit('/').next().unwrap_or(&comm).to_string();
            snapshot.commands.insert(pid, base);
            snapshot.children.entry(ppid).or_default().push(pid);
        }
        snapshot
    }
}
