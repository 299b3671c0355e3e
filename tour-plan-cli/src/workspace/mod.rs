//! The working itinerary kept between CLI invocations.
//!
//! One JSON file, `itinerary.json`, in the data directory. Commands load it
//! into an [`ItineraryStore`] and write the store's snapshot back after a
//! successful mutation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tour_plan_core::store::{ItineraryState, ItineraryStore, SystemClock};

pub const ITINERARY_FILE: &str = "itinerary.json";

#[derive(Debug)]
pub enum WorkspaceError {
    Read(PathBuf, io::Error),
    Write(PathBuf, io::Error),
    Parse(PathBuf, serde_json::Error),
    Encode(serde_json::Error),
}

impl std::fmt::Display for WorkspaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkspaceError::Read(path, e) => {
                write!(f, "Failed to read itinerary '{}': {}", path.display(), e)
            }
            WorkspaceError::Write(path, e) => {
                write!(f, "Failed to write itinerary '{}': {}", path.display(), e)
            }
            WorkspaceError::Parse(path, e) => {
                write!(f, "Itinerary '{}' is corrupt: {}", path.display(), e)
            }
            WorkspaceError::Encode(e) => write!(f, "Failed to encode itinerary: {}", e),
        }
    }
}

impl std::error::Error for WorkspaceError {}

/// File-backed home of the working itinerary.
#[derive(Debug, Clone)]
pub struct Workspace {
    data_dir: PathBuf,
}

impl Workspace {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path(&self) -> PathBuf {
        self.data_dir.join(ITINERARY_FILE)
    }

    /// Opens a store over the saved itinerary, or an empty one.
    pub fn open(&self) -> Result<ItineraryStore, WorkspaceError> {
        let state = self.load()?.unwrap_or_default();
        Ok(ItineraryStore::from_state(state, Arc::new(SystemClock)))
    }

    pub fn load(&self) -> Result<Option<ItineraryState>, WorkspaceError> {
        let path = self.path();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(WorkspaceError::Read(path, e)),
        };
        let state = serde_json::from_str(&contents).map_err(|e| WorkspaceError::Parse(path, e))?;
        Ok(Some(state))
    }

    pub fn save(&self, store: &ItineraryStore) -> Result<(), WorkspaceError> {
        let json = store
            .read(serde_json::to_string_pretty)
            .map_err(WorkspaceError::Encode)?;
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| WorkspaceError::Write(self.data_dir.clone(), e))?;
        let path = self.path();
        fs::write(&path, json).map_err(|e| WorkspaceError::Write(path.clone(), e))?;
        tracing::debug!(path = %path.display(), "saved itinerary");
        Ok(())
    }
}
