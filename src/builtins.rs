//! Built-in commands that run inside the shell process

use crate::state::ShellState;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CdError {
    #[error("cd: too many arguments")]
    TooManyArguments,
    #[error("cd: {target}: {source}")]
    Change { target: String, source: io::Error },
}

/// `cd [dir]`: change the real working directory, then update the logical
/// one by resolving `dir` against the previous logical path.
///
/// With no argument the home directory is used. On failure neither the real
/// nor the logical directory changes.
pub fn cd(state: &mut ShellState, args: &[String]) -> Result<PathBuf, CdError> {
    let target = match args {
        [] => state.home().to_string(),
        [dir] => dir.clone(),
        _ => return Err(CdError::TooManyArguments),
    };

    std::env::set_current_dir(&target).map_err(|source| CdError::Change {
        target: target.clone(),
        source,
    })?;

    let logical = normalize_logical(state.logical_pwd(), Path::new(&target));
    log::debug!("cd {} -> {}", target, logical.display());
    state.set_logical_pwd(&logical);
    Ok(logical)
}

/// Resolve `arg` against `base` purely lexically: `.` is dropped and `..`
/// removes the previous component. The file system is never consulted, so
/// symlinks stay as written.
pub fn normalize_logical(base: &Path, arg: &Path) -> PathBuf {
    let joined = if arg.is_absolute() {
        arg.to_path_buf()
    } else {
        base.join(arg)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }

    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(base: &str, arg: &str) -> PathBuf {
        normalize_logical(Path::new(base), Path::new(arg))
    }

    #[test]
    fn parent_of_logical_path() {
        assert_eq!(norm("/home/user/projects", ".."), PathBuf::from("/home/user"));
    }

    #[test]
    fn parent_of_root_is_root() {
        assert_eq!(norm("/", ".."), PathBuf::from("/"));
        assert_eq!(norm("/a", "../../.."), PathBuf::from("/"));
    }

    #[test]
    fn relative_join_and_cleanup() {
        assert_eq!(norm("/a/b", "../c/./d/"), PathBuf::from("/a/c/d"));
        assert_eq!(norm("/a", "./b//c"), PathBuf::from("/a/b/c"));
    }

    #[test]
    fn absolute_argument_replaces_base() {
        assert_eq!(norm("/a/b", "/x/../y"), PathBuf::from("/y"));
    }

    #[test]
    fn symlink_names_are_kept() {
        // `..` after a symlinked component goes back lexically
        assert_eq!(norm("/tmp/link", "../link/sub"), PathBuf::from("/tmp/link/sub"));
    }

    #[test]
    fn cd_missing_dir_leaves_state_unchanged() {
        let mut state = ShellState::with_env([("PWD".to_string(), "/logical/here".to_string())]);
        let before = std::env::current_dir().unwrap();

        let err = cd(&mut state, &["/nonexistent/pipesh/dir".to_string()]).unwrap_err();
        assert!(matches!(err, CdError::Change { .. }));
        assert!(err.to_string().starts_with("cd: /nonexistent/pipesh/dir: "));

        assert_eq!(std::env::current_dir().unwrap(), before);
        assert_eq!(state.logical_pwd(), Path::new("/logical/here"));
    }

    #[test]
    fn cd_too_many_arguments() {
        let mut state = ShellState::with_env([("PWD".to_string(), "/x".to_string())]);
        let err = cd(&mut state, &["a".to_string(), "b".to_string()]).unwrap_err();
        assert!(matches!(err, CdError::TooManyArguments));
        assert_eq!(state.logical_pwd(), Path::new("/x"));
    }
}
