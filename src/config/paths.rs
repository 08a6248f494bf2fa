//! Installation paths
//!
//! Where the server is installed and where themes live, plus lexical path
//! resolution used when normalizing configured directories.

use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub base_dir: PathBuf,
    pub themes: PathBuf,
}

impl Paths {
    /// Installation rooted at `base_dir`; themes default to `node_modules`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = resolve_path(Path::new("/"), &base_dir.into());
        let themes = base_dir.join("node_modules");
        Self { base_dir, themes }
    }

    /// Installation rooted at the process working directory.
    pub fn discover() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        Self::new(cwd)
    }
}

/// Resolve `path` against `base` without touching the filesystem. An
/// absolute `path` wins; `.` and `..` segments are collapsed.
pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else if base.is_absolute() {
        base.join(path)
    } else {
        std::path::absolute(base)
            .unwrap_or_else(|_| base.to_path_buf())
            .join(path)
    };
    normalize(&joined)
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never climb above the root.
                if !matches!(
                    out.components().next_back(),
                    Some(Component::RootDir | Component::Prefix(_)) | None
                ) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
