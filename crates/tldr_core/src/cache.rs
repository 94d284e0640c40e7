use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Time since `path` was last modified.
pub fn file_age(path: &Path) -> io::Result<Duration> {
    let modified = fs::metadata(path)?.modified()?;
    // A timestamp in the future counts as brand new.
    Ok(SystemTime::now()
        .duration_since(modified)
        .unwrap_or(Duration::ZERO))
}

/// Missing or unreadable files are expired so the caller refreshes them.
pub fn is_expired(path: &Path, max_age: Duration) -> bool {
    match file_age(path) {
        Ok(age) => age > max_age,
        Err(_) => true,
    }
}

/// A single cached file inside an existing directory.
#[derive(Debug, Clone)]
pub struct CacheFile {
    path: PathBuf,
}

impl CacheFile {
    pub fn new(dir: &Path, file: &str) -> Self {
        Self {
            path: dir.join(file),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn age(&self) -> io::Result<Duration> {
        file_age(&self.path)
    }

    pub fn expired(&self, max_age: Duration) -> bool {
        is_expired(&self.path, max_age)
    }

    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}
