use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;
use thiserror::Error;

/// The last external IP we saw, kept in a plain text file between runs so that
/// the DNS provider is only bothered when the address actually changes.
///
/// The file holds nothing but the address. A missing or empty file means no
/// address is known yet, which is represented as the empty string and never
/// equals a real address.
#[derive(Debug, Clone)]
pub struct IpCache {
    path: PathBuf,
}

#[derive(Debug, Error)]
#[error("unable to write IP cache {path}, reason: {source}")]
pub struct CachePersistError {
    path: Box<str>,
    #[source]
    source: io::Error,
}

impl IpCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the trimmed first line of the cache file, or an empty string if
    /// there is nothing usable in it. Never fails: an unreadable cache only
    /// means the next comparison will see a change.
    pub fn load(&self) -> Box<str> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return "".into(),
            Err(e) => {
                warn!(
                    "Couldn't read IP cache {}, treating it as empty: {}",
                    self.path.display(),
                    e
                );
                return "".into();
            }
        };

        contents.lines().next().unwrap_or("").trim().into()
    }

    /// Replaces the cache file contents with `ip`.
    pub fn save(&self, ip: &str) -> Result<(), CachePersistError> {
        fs::write(&self.path, ip).map_err(|source| CachePersistError {
            path: self.path.display().to_string().into(),
            source,
        })
    }
}
