use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

#[derive(Debug, Clone)]
pub struct IoOptions {
    /// Copy the existing file aside before overwriting it.
    pub backup: bool,
    pub backup_ext: String,
}

impl Default for IoOptions {
    fn default() -> Self {
        Self {
            backup: true,
            backup_ext: ".bak".to_string(),
        }
    }
}

/// A text file read and written as a whole, with optional backups.
#[derive(Debug, Clone)]
pub struct FileIo {
    path: PathBuf,
    options: IoOptions,
}

impl FileIo {
    pub fn new(path: impl AsRef<Path>, options: IoOptions) -> Self {
        Self {
            path: untilde(path),
            options,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &IoOptions {
        &self.options
    }

    pub fn read(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }

    /// Writes `data`, first copying an existing file to a timestamped
    /// sibling when backups are on. Returns the backup path if one was made.
    pub fn write(&self, data: &str) -> io::Result<Option<PathBuf>> {
        let mut backup = None;
        if self.options.backup && self.path.exists() {
            let dest = self.timestamped_backup_path();
            fs::copy(&self.path, &dest)?;
            debug!(from = %self.path.display(), to = %dest.display(), "backup created");
            backup = Some(dest);
        }
        fs::write(&self.path, data)?;
        debug!(path = %self.path.display(), bytes = data.len(), "file written");
        Ok(backup)
    }

    /// `<file><backup_ext>`, the fixed backup location.
    pub fn backup_path(&self) -> PathBuf {
        with_suffix(&self.path, &self.options.backup_ext)
    }

    /// `<file>.<YYYY-MM-DD>.<HHMMSS><backup_ext>` in local time.
    pub fn timestamped_backup_path(&self) -> PathBuf {
        let ts = chrono::Local::now().format("%Y-%m-%d.%H%M%S");
        with_suffix(&self.path, &format!(".{}{}", ts, self.options.backup_ext))
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_os_string();
    s.push(suffix);
    PathBuf::from(s)
}

/// Expands a leading `~` component to the home directory.
pub fn untilde(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) if rest.as_os_str().is_empty() => home,
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
