/// Outcome of mapping an absolute cwd into the workspace.
///
/// `OutsideWorkspace` is a normal result, not an error: callers are expected
/// to fall back to navigating to the workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// Path relative to the workspace root. Empty means the root itself.
    Relative(String),
    OutsideWorkspace,
}

/// Maps `absolute_cwd` onto a path relative to `workspace_root`.
///
/// A root starting with `~` is expanded against the home-directory prefix of
/// the cwd itself, so the translation works for whichever user owns the
/// shell. Only `/home/<user>` and `/Users/<user>` shapes are recognized;
/// other home conventions leave the root unexpanded and the cwd reports as
/// outside the workspace, which is the conservative outcome.
///
/// Pure function: no filesystem access, no hidden state.
pub fn translate(absolute_cwd: &str, workspace_root: &str) -> Translation {
    let cwd = absolute_cwd.trim_end_matches('/');

    let root = if workspace_root.starts_with('~') {
        expand_root(workspace_root, cwd)
    } else {
        workspace_root.to_string()
    };
    let root = root.trim_end_matches('/');

    if cwd == root {
        return Translation::Relative(String::new());
    }
    match cwd.strip_prefix(&format!("{root}/")) {
        Some(suffix) => Translation::Relative(suffix.to_string()),
        None => {
            tracing::debug!("cwd {:?} outside workspace root {:?}", cwd, root);
            Translation::OutsideWorkspace
        }
    }
}

fn expand_root(root: &str, cwd: &str) -> String {
    let Some(home) = home_prefix(cwd) else {
        return root.to_string();
    };
    if root == "~" {
        home
    } else if let Some(rest) = root.strip_prefix("~/") {
        format!("{home}/{rest}")
    } else {
        // "~user" forms are not expanded.
        root.to_string()
    }
}

/// First path component under a recognized home base, e.g.
/// `/home/alice/proj` -> `/home/alice`.
fn home_prefix(cwd: &str) -> Option<String> {
    for base in ["/home/", "/Users/"] {
        if let Some(rest) = cwd.strip_prefix(base) {
            let user = rest.split('/').next().unwrap_or("");
            if !user.is_empty() {
                return Some(format!("{base}{user}"));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subdirectory_inside_workspace() {
        assert_eq!(
            translate("/home/alice/proj/sub", "/home/alice"),
            Translation::Relative("proj/sub".to_string())
        );
    }

    #[test]
    fn test_workspace_root_itself() {
        assert_eq!(
            translate("/home/alice", "/home/alice"),
            Translation::Relative(String::new())
        );
    }

    #[test]
    fn test_outside_workspace() {
        assert_eq!(translate("/etc", "/home/alice"), Translation::OutsideWorkspace);
    }

    #[test]
    fn test_tilde_root_expands_against_cwd() {
        assert_eq!(
            translate("/home/alice/proj/sub", "~"),
            Translation::Relative("proj/sub".to_string())
        );
        assert_eq!(
            translate("/Users/bob/work/app", "~/work"),
            Translation::Relative("app".to_string())
        );
    }

    #[test]
    fn test_tilde_root_on_home_itself() {
        assert_eq!(translate("/home/alice", "~"), Translation::Relative(String::new()));
    }

    #[test]
    fn test_tilde_unexpandable_is_outside() {
        // No home shape in the cwd: the root stays "~" and nothing matches.
        assert_eq!(translate("/etc", "~"), Translation::OutsideWorkspace);
        assert_eq!(translate("/srv/data", "~/work"), Translation::OutsideWorkspace);
    }

    #[test]
    fn test_trailing_separators_normalized() {
        assert_eq!(
            translate("/home/alice/proj/", "/home/alice/"),
            Translation::Relative("proj".to_string())
        );
    }

    #[test]
    fn test_prefix_must_be_a_component_boundary() {
        assert_eq!(
            translate("/home/alicex", "/home/alice"),
            Translation::OutsideWorkspace
        );
    }

    #[test]
    fn test_translation_is_pure() {
        let a = translate("/home/alice/proj", "~");
        let b = translate("/home/alice/proj", "~");
        assert_eq!(a, b);
    }
}
