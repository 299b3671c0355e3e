//! Cached login session.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SESSION_FILE: &str = "session.json";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to access session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Session file {path} is corrupt: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Reads and writes `session.json` in a data directory.
#[derive(Debug, Clone)]
pub struct SessionCache {
    path: PathBuf,
}

impl SessionCache {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the cached session, or `None` if nobody is logged in.
    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SessionError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| SessionError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    pub fn store(&self, session: &Session) -> Result<(), SessionError> {
        let io_err = |source| SessionError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(session).map_err(|source| SessionError::Parse {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(io_err)
    }

    /// Removes the cached session. Returns false if there was none.
    pub fn clear(&self) -> Result<bool, SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(SessionError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_session() {
        let dir = tempdir().unwrap();
        let cache = SessionCache::new(dir.path());
        assert!(cache.load().unwrap().is_none());
    }

    #[test]
    fn test_store_load_clear() {
        let dir = tempdir().unwrap();
        let cache = SessionCache::new(dir.path().join("nested"));
        let session = Session {
            user_id: 7,
            token: Some("secret".to_string()),
        };
        cache.store(&session).unwrap();
        assert_eq!(cache.load().unwrap(), Some(session));

        let raw = fs::read_to_string(cache.path()).unwrap();
        assert!(raw.contains("\"userId\": 7"));

        assert!(cache.clear().unwrap());
        assert!(!cache.clear().unwrap());
        assert!(cache.load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_session() {
        let dir = tempdir().unwrap();
        let cache = SessionCache::new(dir.path());
        fs::write(cache.path(), "not json").unwrap();
        assert!(matches!(cache.load(), Err(SessionError::Parse { .. })));
    }
}
