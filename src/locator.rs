use std::path::{Component, Path, PathBuf};

use crate::error::Error;

/// Find `filename` in the current directory or up to `max_depth` of its parents.
pub fn find_env_file(filename: impl AsRef<Path>, max_depth: usize) -> Result<PathBuf, Error> {
    let cwd = std::env::current_dir().map_err(Error::CurrentDir)?;
    find_env_file_from(&cwd, filename, max_depth)
}

/// Find `filename` in `start` or up to `max_depth` of its parents.
///
/// A relative `start` is resolved against the current directory and `..`
/// components are folded away before walking. The nearest match wins. The walk
/// stops early at the filesystem root.
pub fn find_env_file_from(
    start: &Path,
    filename: impl AsRef<Path>,
    max_depth: usize,
) -> Result<PathBuf, Error> {
    let filename = filename.as_ref();
    let start = absolute_dir(start)?;

    let candidate = start.join(filename);
    if candidate.is_file() {
        return Ok(candidate);
    }

    let mut dir = start.as_path();
    for _ in 0..max_depth {
        let Some(parent) = dir.parent() else {
            break;
        };
        dir = parent;

        let candidate = dir.join(filename);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    Err(Error::NotFound {
        filename: filename.to_path_buf(),
    })
}

fn absolute_dir(path: &Path) -> Result<PathBuf, Error> {
    let absolute = std::path::absolute(path).map_err(Error::CurrentDir)?;

    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    Ok(resolved)
}
