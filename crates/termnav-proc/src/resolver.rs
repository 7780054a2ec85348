use crate::backend::{select_backend, CwdBackend, CwdError};
use crate::tree::{collect_tree, platform_source, ProcessNode, ProcessSource};
use std::path::PathBuf;

/// Resolves the cwd of the "real" interactive shell under a terminal's root
/// process. Holds only the backend chosen at startup; every resolution walks
/// the process table fresh.
pub struct CwdResolver {
    backend: Box<dyn CwdBackend>,
}

impl CwdResolver {
    pub fn new() -> Self {
        Self {
            backend: select_backend(),
        }
    }

    pub fn with_backend(backend: Box<dyn CwdBackend>) -> Self {
        Self { backend }
    }

    /// Resolve against the host process table.
    pub fn resolve(&self, root_pid: i32) -> Result<PathBuf, CwdError> {
        let source = platform_source();
        self.resolve_with(&source, root_pid)
    }

    /// Resolve against an explicit process source.
    ///
    /// Candidate order is the root pid first (no intermediate wrapper means
    /// it may already be the shell), then every other node by depth
    /// descending, shells before non-shells at equal depth. A shell nested
    /// inside a wrapper program (a file manager's subshell, a multiplexer
    /// pane) is where the user actually is, so the deepest shell wins.
    pub fn resolve_with(
        &self,
        source: &dyn ProcessSource,
        root_pid: i32,
    ) -> Result<PathBuf, CwdError> {
        let tree = collect_tree(source, root_pid);

        let mut failure: Option<CwdError> = None;
        for pid in candidate_order(&tree, root_pid) {
            match self.backend.read_cwd(pid) {
                Ok(cwd) => {
                    tracing::debug!("resolved cwd of {} via pid {}: {:?}", root_pid, pid, cwd);
                    return Ok(cwd);
                }
                Err(e) => {
                    failure = Some(match failure {
                        Some(prev) if rank(prev) >= rank(e) => prev,
                        _ => e,
                    });
                }
            }
        }

        // Every candidate failed; the PWD recorded for the root process is
        // the one remaining signal, and only an absolute one is trustworthy.
        if let Some(pwd) = self.backend.read_pwd_env(root_pid) {
            if pwd.is_absolute() {
                tracing::debug!("resolved cwd of {} from PWD environment", root_pid);
                return Ok(pwd);
            }
        }

        Err(failure.unwrap_or(CwdError::ProcessNotFound))
    }
}

impl Default for CwdResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn candidate_order(tree: &[ProcessNode], root_pid: i32) -> Vec<i32> {
    let mut rest: Vec<&ProcessNode> = tree.iter().filter(|n| n.pid != root_pid).collect();
    rest.sort_by(|a, b| b.depth.cmp(&a.depth).then(b.is_shell.cmp(&a.is_shell)));

    let mut order = Vec::with_capacity(rest.len() + 1);
    order.push(root_pid);
    order.extend(rest.iter().map(|n| n.pid));
    order
}

/// Diagnostic value of a failure reason. Permission failures are usually
/// systemic rather than per-process, so they are the most useful to surface.
fn rank(e: CwdError) -> u8 {
    match e {
        CwdError::PermissionDenied => 3,
        CwdError::ProcessNotFound => 2,
        CwdError::Unreadable => 1,
        CwdError::PlatformUnsupported => 0,
    }
}
