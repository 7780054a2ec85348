use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a cwd read failed. The resolver's fallback policy branches on the
/// reason, so backends must keep `ProcessNotFound` and `PermissionDenied`
/// distinct instead of collapsing everything into one error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CwdError {
    #[error("process not found")]
    ProcessNotFound,
    #[error("permission denied inspecting process")]
    PermissionDenied,
    #[error("could not read process cwd")]
    Unreadable,
    #[error("no cwd backend for this platform")]
    PlatformUnsupported,
}

/// Platform primitive for reading a process' current working directory.
/// Exactly one implementation is active per running process, chosen once by
/// [`select_backend`].
pub trait CwdBackend: Send + Sync {
    fn read_cwd(&self, pid: i32) -> Result<PathBuf, CwdError>;

    /// Last-resort fallback: the `PWD` recorded in the process environment,
    /// where the platform exposes it.
    fn read_pwd_env(&self, _pid: i32) -> Option<PathBuf> {
        None
    }
}

/// Picks the backend for the host platform. Called once at startup; the
/// resolver never re-detects per call.
#[cfg(target_os = "linux")]
pub fn select_backend() -> Box<dyn CwdBackend> {
    Box::new(ProcFsBackend)
}

#[cfg(target_os = "macos")]
pub fn select_backend() -> Box<dyn CwdBackend> {
    Box::new(LsofBackend)
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub fn select_backend() -> Box<dyn CwdBackend> {
    Box::new(UnsupportedBackend)
}

fn map_io_error(e: &io::Error) -> CwdError {
    match e.kind() {
        io::ErrorKind::NotFound => CwdError::ProcessNotFound,
        io::ErrorKind::PermissionDenied => CwdError::PermissionDenied,
        _ => match e.raw_os_error() {
            Some(code) if code == nix::libc::ESRCH => CwdError::ProcessNotFound,
            _ => CwdError::Unreadable,
        },
    }
}

// ---------------------------------------------------------------------------
// Linux: /proc symlink reading
// ---------------------------------------------------------------------------

/// Reads `/proc/<pid>/cwd`. The environ fallback parses the NUL-separated
/// `/proc/<pid>/environ` for a `PWD=` entry.
pub struct ProcFsBackend;

impl CwdBackend for ProcFsBackend {
    fn read_cwd(&self, pid: i32) -> Result<PathBuf, CwdError> {
        match std::fs::read_link(format!("/proc/{pid}/cwd")) {
            Ok(path) => Ok(path),
            Err(e) => {
                tracing::debug!("readlink /proc/{}/cwd failed: {}", pid, e);
                Err(map_io_error(&e))
            }
        }
    }

    fn read_pwd_env(&self, pid: i32) -> Option<PathBuf> {
        let environ = std::fs::read(format!("/proc/{pid}/environ")).ok()?;
        for entry in environ.split(|b| *b == 0) {
            if let Some(value) = entry.strip_prefix(b"PWD=") {
                let pwd = String::from_utf8_lossy(value);
                if !pwd.is_empty() {
                    return Some(PathBuf::from(pwd.as_ref()));
                }
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// macOS: lsof lookup
// ---------------------------------------------------------------------------

/// Queries `lsof -a -p <pid> -d cwd -Fn` and takes the first `n`-prefixed
/// field line. lsof cannot distinguish a dead pid from an unreadable one, so
/// the process is probed with signal 0 first.
pub struct LsofBackend;

impl CwdBackend for LsofBackend {
    fn read_cwd(&self, pid: i32) -> Result<PathBuf, CwdError> {
        probe_alive(pid)?;

        let output = std::process::Command::new("lsof")
            .args(["-a", "-p", &pid.to_string(), "-d", "cwd", "-Fn"])
            .output()
            .map_err(|e| {
                tracing::debug!("failed to run lsof for {}: {}", pid, e);
                CwdError::Unreadable
            })?;
        if !output.status.success() {
            tracing::debug!("lsof for {} exited with {}", pid, output.status);
            return Err(CwdError::Unreadable);
        }

        String::from_utf8_lossy(&output.stdout)
            .lines()
            .find_map(|line| line.strip_prefix('n').map(PathBuf::from))
            .ok_or(CwdError::Unreadable)
    }
}

fn probe_alive(pid: i32) -> Result<(), CwdError> {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    match kill(Pid::from_raw(pid), None) {
        Ok(()) => Ok(()),
        Err(Errno::ESRCH) => Err(CwdError::ProcessNotFound),
        Err(Errno::EPERM) => Err(CwdError::PermissionDenied),
        Err(_) => Err(CwdError::Unreadable),
    }
}

// ---------------------------------------------------------------------------
// Everything else
// ---------------------------------------------------------------------------

pub struct UnsupportedBackend;

impl CwdBackend for UnsupportedBackend {
    fn read_cwd(&self, _pid: i32) -> Result<PathBuf, CwdError> {
        Err(CwdError::PlatformUnsupported)
    }
}
