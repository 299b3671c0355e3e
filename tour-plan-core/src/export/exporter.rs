use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDate;

use super::error::ExportError;
use super::font::FontSource;
use super::pdf;
use crate::document::build_document;
use crate::models::{Schedule, Tour, TourId};

const PDF_MIME: &str = "application/pdf";

/// Schedule entries chosen for one export.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSelection {
    /// `None` for the whole plan.
    pub date: Option<NaiveDate>,
    pub schedules: Vec<Schedule>,
}

/// Picks the entries to export, either all of them or those on `date`.
///
/// Fails when the plan has no entries at all, or when `date` matches none.
pub fn select_schedules(
    schedules: &[Schedule],
    date: Option<NaiveDate>,
) -> Result<ScheduleSelection, ExportError> {
    if schedules.is_empty() {
        return Err(ExportError::NoScheduleData);
    }
    let schedules: Vec<Schedule> = match date {
        Some(day) => schedules.iter().filter(|s| s.date == day).cloned().collect(),
        None => schedules.to_vec(),
    };
    match date {
        Some(day) if schedules.is_empty() => Err(ExportError::NoScheduleForDate(day)),
        _ => Ok(ScheduleSelection { date, schedules }),
    }
}

/// Identifies an artifact: `{tourId}` for the whole plan, `{tourId}_{date}`
/// for a single day.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactKey(String);

impl ArtifactKey {
    pub fn new(tour_id: TourId, date: Option<NaiveDate>) -> Self {
        match date {
            Some(day) => ArtifactKey(format!("{}_{}", tour_id, day)),
            None => ArtifactKey(tour_id.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A rendered PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub key: ArtifactKey,
    pub title: String,
    pub date: Option<NaiveDate>,
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// `{title}_{date}_일정.pdf` for a day, `{title}_전체_일정.pdf` for the
    /// whole plan.
    pub fn default_filename(&self) -> String {
        let title = sanitize_filename(&self.title);
        match self.date {
            Some(day) => format!("{}_{}_일정.pdf", title, day),
            None => format!("{}_전체_일정.pdf", title),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// What an embedded viewer needs to show an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub data_uri: String,
    pub html: String,
}

/// Generated artifacts by key. Storing an artifact replaces only the entry
/// with the same key.
#[derive(Debug, Default)]
pub struct ArtifactCache {
    entries: HashMap<ArtifactKey, Artifact>,
}

impl ArtifactCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `artifact`, returning the one it replaced.
    pub fn insert(&mut self, artifact: Artifact) -> Option<Artifact> {
        self.entries.insert(artifact.key.clone(), artifact)
    }

    pub fn get(&self, key: &ArtifactKey) -> Option<&Artifact> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &ArtifactKey) -> Option<Artifact> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Renders itinerary PDFs.
#[derive(Debug, Clone, Default)]
pub struct DocumentExporter {
    font: FontSource,
}

impl DocumentExporter {
    /// Exporter using the built-in Helvetica font.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(font: FontSource) -> Self {
        Self { font }
    }

    /// Exporter embedding the TrueType font at `path`.
    pub fn with_font_file(path: &Path) -> Result<Self, ExportError> {
        Ok(Self::with_font(FontSource::from_file(path)?))
    }

    /// Builds the document for `selection` and encodes it on the blocking
    /// pool.
    pub async fn generate_artifact(
        &self,
        tour: &Tour,
        selection: ScheduleSelection,
    ) -> Result<Artifact, ExportError> {
        if selection.schedules.is_empty() {
            return Err(ExportError::EmptySchedule);
        }
        let key = ArtifactKey::new(tour.id, selection.date);
        let document = build_document(tour, &selection.schedules);
        let font = self.font.clone();

        let bytes = tokio::task::spawn_blocking(move || pdf::render(&document, &font))
            .await
            .map_err(|e| ExportError::Join(e.to_string()))?
            .map_err(|e| {
                tracing::error!("Failed to render artifact {}: {}", key, e);
                e
            })?;

        tracing::info!("Generated artifact {} ({} bytes)", key, bytes.len());
        Ok(Artifact {
            key,
            title: tour.title.clone(),
            date: selection.date,
            bytes,
        })
    }
}

/// Writes `artifact` into `dir` as `filename`, or under its default name.
/// Returns the written path.
pub fn download_artifact(
    artifact: &Artifact,
    dir: &Path,
    filename: Option<&str>,
) -> Result<PathBuf, ExportError> {
    let name = match filename {
        Some(name) => {
            let name = sanitize_filename(name);
            if name.to_ascii_lowercase().ends_with(".pdf") {
                name
            } else {
                format!("{}.pdf", name)
            }
        }
        None => artifact.default_filename(),
    };
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    fs::write(&path, &artifact.bytes)?;
    tracing::info!("Wrote {}", path.display());
    Ok(path)
}

/// Exposes `artifact` as a data URI and an HTML page embedding it.
pub fn preview_artifact(artifact: &Artifact) -> Preview {
    let data_uri = format!("data:{};base64,{}", PDF_MIME, STANDARD.encode(&artifact.bytes));
    let html = format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n\
         <body style=\"margin:0\">\n<embed src=\"{}\" type=\"{}\" width=\"100%\" height=\"100%\" \
         style=\"position:absolute;top:0;left:0;height:100vh\">\n</body>\n</html>\n",
        escape_html(&artifact.default_filename()),
        data_uri,
        PDF_MIME
    );
    Preview { data_uri, html }
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}
