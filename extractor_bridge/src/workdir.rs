//! Invocation-scoped working directory.

use crate::{ErrorKind, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The single mutable resource of an invocation. A temporary directory is
/// removed on drop (all exit paths, including errors); an operator-supplied
/// directory is created if needed and kept afterwards for inspection.
#[derive(Debug)]
pub enum WorkDir {
    Temp(TempDir),
    Persistent(PathBuf),
}

impl WorkDir {
    pub fn new(user_dir: Option<&Path>) -> Result<WorkDir> {
        match user_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)
                    .map_err(|e| ErrorKind::WorkDirCreation(dir.to_owned(), e))?;
                Ok(WorkDir::Persistent(dir.to_owned()))
            }
            None => {
                let temp = tempfile::Builder::new()
                    .prefix("bios2gpio_")
                    .tempdir()
                    .map_err(|e| ErrorKind::WorkDirCreation(PathBuf::from("<temp>"), e))?;
                Ok(WorkDir::Temp(temp))
            }
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            WorkDir::Temp(temp) => temp.path(),
            WorkDir::Persistent(path) => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_dir_is_removed_on_drop() {
        let work = WorkDir::new(None).unwrap();
        let path = work.path().to_owned();
        assert!(path.is_dir());
        drop(work);
        assert!(!path.exists());
    }

    #[test]
    fn persistent_dir_is_created_and_kept() {
        let base = tempfile::tempdir().unwrap();
        let target = base.path().join("work");
        let work = WorkDir::new(Some(&target)).unwrap();
        assert!(work.path().is_dir());
        drop(work);
        assert!(target.is_dir());
    }
}
