//! Tour Plan Core Library
//!
//! Itinerary model, in-memory store, server sync and PDF export shared by
//! Tour Plan applications.

pub mod document;
pub mod export;
pub mod models;
pub mod sample;
pub mod store;
pub mod sync;

pub use document::{build_document, Document};
pub use export::{Artifact, DocumentExporter, ExportError, FontSource};
pub use models::{
    Attachment, BudgetTier, LocationData, MapEntity, NewSchedule, RouteResult, Schedule,
    SchedulePatch, TimeOfDay, Tour, TourId, TourPatch, Traffic, Weather,
};
pub use store::{ItineraryState, ItineraryStore, PlanBundle};
pub use sync::{HttpTourBackend, RemoteSync, SyncError, TourBackend};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
