//! Itinerary to printable document.
//!
//! [`build_document`] turns a tour and its schedule entries into a
//! [`Document`]: a summary section followed by one section per day. The
//! tree carries text and a [`LineStyle`] per line; page geometry is left to
//! the exporter.

mod transform;
mod tree;

pub use transform::{build_document, format_thousands};
pub use tree::{Document, Line, LineGroup, LineStyle, Section};
