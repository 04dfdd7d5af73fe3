//! Executable resolver
//!
//! Maps a command name to the file that will be executed:
//! 1. A name containing `/` is used as-is and must be an executable regular file
//! 2. Otherwise each directory of a colon-separated search list is tried in
//!    order (an empty entry means the current directory)
//!
//! Resolution happens before spawning, so the file system may change between
//! the check and the exec.

use std::path::{Path, PathBuf};

/// Resolves command names against a search list
#[derive(Debug, Clone)]
pub struct ExecutableResolver {
    /// Directories from the search list, in lookup order
    search_dirs: Vec<PathBuf>,
}

impl ExecutableResolver {
    /// Build a resolver from a colon-separated list such as `$PATH`
    pub fn from_search_path(search_path: &str) -> Self {
        let search_dirs = search_path
            .split(':')
            .map(|dir| {
                if dir.is_empty() {
                    PathBuf::from(".")
                } else {
                    PathBuf::from(dir)
                }
            })
            .collect();

        ExecutableResolver { search_dirs }
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Find the executable for `name`, or `None` if nothing matches
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }

        if name.contains('/') {
            let path = PathBuf::from(name);
            return is_executable_file(&path).then_some(path);
        }

        let found = self
            .search_dirs
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| is_executable_file(candidate));

        log::trace!("resolve {} -> {:?}", name, found);
        found
    }
}

/// A regular file the current user may execute
pub fn is_executable_file(path: &Path) -> bool {
    let is_file = path.metadata().map(|m| m.is_file()).unwrap_or(false);
    is_file && has_exec_access(path)
}

#[cfg(unix)]
fn has_exec_access(path: &Path) -> bool {
    use nix::unistd::{access, AccessFlags};
    access(path, AccessFlags::X_OK).is_ok()
}

#[cfg(not(unix))]
fn has_exec_access(_path: &Path) -> bool {
    true
}
