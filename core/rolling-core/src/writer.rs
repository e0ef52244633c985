//! Lazily rotating file writer.
//!
//! Every [`RotatingWriter::write`] asks the clock which bucket "now" falls in.
//! When that bucket's filename differs from the open one the writer closes
//! the old handle, makes sure the directory exists, opens the new file for
//! append and re-points the alias. Nothing runs between writes: after a quiet
//! period the previous file stays open until the next record arrives.
//!
//! # Failure policy
//!
//! - Directory creation and open failures are returned; that record is lost
//!   and the next write tries again.
//! - Closing the superseded handle and refreshing the alias are best effort.
//!   Their failures are logged, never returned.
//!
//! # Locking
//!
//! One mutex per writer covers the whole check, swap and append sequence, so
//! concurrent callers never see two open handles or interleaved records.
//! Diagnostics are emitted only after the mutex is released, because the
//! subscriber that receives them may route them straight back into this
//! writer.

use fs_err::{self as fs, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing_subscriber::fmt::MakeWriter;

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::pattern::FilenamePattern;
use crate::symlink::Symlink;

struct ActiveFile {
    name: String,
    path: PathBuf,
    file: File,
}

impl ActiveFile {
    fn close(self) -> Result<()> {
        self.file
            .sync_all()
            .map_err(|source| Error::Close {
                path: self.path,
                source,
            })
    }
}

#[derive(Default)]
struct WriterState {
    active: Option<ActiveFile>,
    closed: bool,
}

/// Best-effort outcomes recorded under the lock, logged after it.
enum Notice {
    Rotated { from: Option<String>, to: PathBuf },
    Failed(Error),
}

pub struct RotatingWriter {
    pattern: FilenamePattern,
    alias: Option<Symlink>,
    clock: Arc<dyn Clock>,
    state: Mutex<WriterState>,
}

impl RotatingWriter {
    /// Creates a writer. No file is touched until the first write.
    pub fn new(pattern: FilenamePattern, alias: Option<Symlink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            pattern,
            alias,
            clock,
            state: Mutex::new(WriterState::default()),
        }
    }

    pub fn pattern(&self) -> &FilenamePattern {
        &self.pattern
    }

    /// Appends `buf` to the file for the current bucket, rotating first if
    /// the bucket changed since the previous write.
    ///
    /// The whole buffer is written or an error is returned.
    pub fn write(&self, buf: &[u8]) -> Result<usize> {
        let mut notices = Vec::new();
        let result = self.write_locked(buf, &mut notices);
        report(notices);
        result
    }

    fn write_locked(&self, buf: &[u8], notices: &mut Vec<Notice>) -> Result<usize> {
        let mut guard = self.lock();
        let state = &mut *guard;
        if state.closed {
            return Err(Error::Closed);
        }

        // Read the clock under the lock so rotation order follows write order.
        let filename = self.pattern.filename_for(self.clock.now());

        let active = match &mut state.active {
            Some(active) if active.name == filename => active,
            slot => self.rotate(slot, filename, notices)?,
        };

        active.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn rotate<'s>(
        &self,
        slot: &'s mut Option<ActiveFile>,
        filename: String,
        notices: &mut Vec<Notice>,
    ) -> Result<&'s mut ActiveFile> {
        let from = slot.as_ref().map(|old| old.name.clone());
        if let Some(old) = slot.take() {
            if let Err(e) = old.close() {
                notices.push(Notice::Failed(e));
            }
        }

        let opened = self.open(filename)?;
        notices.push(Notice::Rotated {
            from,
            to: opened.path.clone(),
        });

        if let Some(alias) = &self.alias {
            if let Err(e) = alias.refresh(&opened.name) {
                notices.push(Notice::Failed(e));
            }
        }

        Ok(slot.insert(opened))
    }

    fn open(&self, name: String) -> Result<ActiveFile> {
        let dir = self.pattern.dir();
        fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = self.pattern.path_of(&name);
        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use fs_err::os::unix::fs::OpenOptionsExt;
            options.mode(0o644);
        }
        let file = options.open(&path).map_err(|source| Error::FileOpen {
            path: path.clone(),
            source,
        })?;

        Ok(ActiveFile { name, path, file })
    }

    pub fn flush(&self) -> Result<()> {
        let mut state = self.lock();
        if let Some(active) = state.active.as_mut() {
            active.file.flush()?;
        }
        Ok(())
    }

    /// Closes the open handle. Later writes fail with [`Error::Closed`].
    ///
    /// Calling this again is a no-op.
    pub fn close(&self) -> Result<()> {
        let mut state = self.lock();
        if state.closed {
            return Ok(());
        }
        state.closed = true;
        match state.active.take() {
            Some(active) => active.close(),
            None => Ok(()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Filename of the open file, relative to the log directory.
    pub fn current_filename(&self) -> Option<String> {
        self.lock().active.as_ref().map(|a| a.name.clone())
    }

    pub fn current_path(&self) -> Option<PathBuf> {
        self.lock().active.as_ref().map(|a| a.path.clone())
    }

    pub fn alias_path(&self) -> Option<PathBuf> {
        self.alias.as_ref().map(Symlink::path)
    }

    fn lock(&self) -> MutexGuard<'_, WriterState> {
        // Every mutation is a single replace, so a poisoned state is still coherent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RotatingWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingWriter")
            .field("pattern", &self.pattern)
            .field("alias", &self.alias)
            .field("current", &self.current_filename())
            .finish()
    }
}

fn report(notices: Vec<Notice>) {
    for notice in notices {
        match notice {
            Notice::Rotated { from, to } => {
                tracing::debug!(from = ?from, to = %to.display(), "Rotated log file");
            }
            Notice::Failed(e) => {
                tracing::warn!(error = %e, "Log file maintenance failed, continuing");
            }
        }
    }
}

impl Write for &RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        RotatingWriter::write(*self, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        RotatingWriter::flush(*self).map_err(io::Error::from)
    }
}

impl<'a> MakeWriter<'a> for RotatingWriter {
    type Writer = &'a RotatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self
    }
}
