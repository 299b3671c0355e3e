use std::io;
use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while producing or saving an itinerary PDF.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No schedule entries to export")]
    EmptySchedule,

    #[error("No schedule data. Add entries to the plan first.")]
    NoScheduleData,

    #[error("No schedule for {0}")]
    NoScheduleForDate(NaiveDate),

    #[error("Font file {path} could not be read: {source}")]
    FontUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Font could not be parsed: {0}")]
    FontParse(String),

    #[error("PDF encoding failed: {0}")]
    Encode(String),

    #[error("Rendering task failed: {0}")]
    Join(String),

    #[error("Failed to write artifact: {0}")]
    Io(#[from] io::Error),
}

impl From<lopdf::Error> for ExportError {
    fn from(e: lopdf::Error) -> Self {
        ExportError::Encode(e.to_string())
    }
}
