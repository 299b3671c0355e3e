//! Sync error types.

use thiserror::Error;

use super::session::SessionError;
use crate::models::TourId;

/// Errors that can occur during remote sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("No tour to save")]
    NoTour,

    #[error("Authentication required. Run `tour login` first.")]
    AuthenticationRequired,

    #[error("Save already in progress for tour {0}")]
    SaveInProgress(TourId),

    #[error("Persistence server not configured. Set server.base_url in config.")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Server returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode server response: {0}")]
    Decode(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SyncError::Decode(e.to_string())
        } else {
            SyncError::Http(e.to_string())
        }
    }
}
