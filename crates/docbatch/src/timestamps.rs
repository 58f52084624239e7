use std::io;
use std::path::Path;
use std::time::SystemTime;

use filetime::FileTime;

/// File system timestamps captured from a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTimestamps {
    pub created: Option<SystemTime>,
    pub modified: FileTime,
    pub accessed: FileTime,
}

impl FileTimestamps {
    pub fn capture(path: &Path) -> io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        Ok(Self {
            created: metadata.created().ok(),
            modified: FileTime::from_last_modification_time(&metadata),
            accessed: FileTime::from_last_access_time(&metadata),
        })
    }

    /// Stamp `path` with the captured times.
    ///
    /// Creation time can only be set on Windows; elsewhere it is left alone.
    pub fn apply(&self, path: &Path) -> io::Result<()> {
        filetime::set_file_times(path, self.accessed, self.modified)?;
        if let Some(created) = self.created {
            set_created(path, created)?;
        }
        Ok(())
    }
}

#[cfg(windows)]
fn set_created(path: &Path, created: SystemTime) -> io::Result<()> {
    use std::fs::{FileTimes, OpenOptions};
    use std::os::windows::fs::FileTimesExt;

    let file = OpenOptions::new().write(true).open(path)?;
    file.set_times(FileTimes::new().set_created(created))
}

#[cfg(not(windows))]
fn set_created(path: &Path, _created: SystemTime) -> io::Result<()> {
    tracing::trace!(path = %path.display(), "creation time is not settable on this platform");
    Ok(())
}
