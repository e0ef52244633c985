//! Stable "latest" alias next to the rotated files.
//!
//! The link target is the bare rotated filename, so the alias keeps working
//! if the whole log directory is moved or mounted elsewhere.

use fs_err as fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::pattern::validate_file_name;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symlink {
    dir: PathBuf,
    name: String,
}

impl Symlink {
    pub fn new(dir: impl Into<PathBuf>, name: &str) -> Result<Self> {
        validate_file_name("alias name", name)?;
        Ok(Self {
            dir: dir.into(),
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.name)
    }

    /// Re-points the alias at `target`, a filename inside the same directory.
    ///
    /// Whatever sits at the alias path is removed first; some filesystems
    /// refuse to create a link over an existing entry.
    pub fn refresh(&self, target: &str) -> Result<()> {
        let link = self.path();
        let wrap = |source: io::Error| Error::Symlink {
            link: link.clone(),
            target: target.to_string(),
            source,
        };

        match fs::remove_file(&link) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(wrap(e)),
        }

        create_link(Path::new(target), &link).map_err(wrap)
    }
}

#[cfg(unix)]
fn create_link(target: &Path, link: &Path) -> io::Result<()> {
    fs::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_link(target: &Path, link: &Path) -> io::Result<()> {
    fs::os::windows::fs::symlink_file(target, link)
}

#[cfg(not(any(unix, windows)))]
fn create_link(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symlinks are not supported on this platform",
    ))
}
