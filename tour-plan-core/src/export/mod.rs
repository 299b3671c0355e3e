//! PDF export of itineraries.
//!
//! [`select_schedules`] picks the entries to print and rejects empty
//! selections. [`DocumentExporter::generate_artifact`] lays the document
//! out on A4 pages and encodes it. The resulting [`Artifact`] can then be
//! saved with [`download_artifact`] or shown with [`preview_artifact`].

mod error;
mod exporter;
mod font;
pub mod layout;
mod pdf;

pub use error::ExportError;
pub use exporter::{
    download_artifact, preview_artifact, select_schedules, Artifact, ArtifactCache, ArtifactKey,
    DocumentExporter, Preview, ScheduleSelection,
};
pub use font::{win_ansi_bytes, FontSource};
pub use pdf::render;
