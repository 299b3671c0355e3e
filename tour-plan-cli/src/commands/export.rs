use clap::Args;
use std::path::{Path, PathBuf};
use tour_plan_core::export::{
    download_artifact, preview_artifact, select_schedules, Artifact, DocumentExporter,
    ScheduleSelection,
};
use tour_plan_core::models::Tour;
use tour_plan_core::store::{ItineraryState, ItineraryStore};

use super::{opt, parse_date};
use crate::config::Config;
use crate::workspace::Workspace;

/// Render the working plan as a PDF
#[derive(Args)]
pub struct ExportCommand {
    /// Only this day (YYYY-MM-DD); the whole plan otherwise
    #[arg(long, short)]
    pub date: Option<String>,

    /// Output directory, defaults to export.output_dir
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// File name, defaults to "{title}_{date}_일정.pdf"
    #[arg(long)]
    pub filename: Option<String>,

    /// Also write an HTML page embedding the PDF
    #[arg(long)]
    pub preview: bool,
}

impl ExportCommand {
    pub fn run(&self, workspace: &Workspace, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let store = workspace.open()?;
        let state = store.snapshot();
        let (tour, selection) = self.select(&state)?;

        let exporter = match &config.export.font_path.value {
            Some(path) => DocumentExporter::with_font_file(path)?,
            None => DocumentExporter::new(),
        };

        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| format!("Failed to create runtime: {}", e))?;
        let artifact = rt.block_on(exporter.generate_artifact(tour, selection))?;

        let dir = self
            .output
            .clone()
            .unwrap_or_else(|| config.export.output_dir.value.clone());
        let path = self.write(&artifact, &dir)?;
        println!("Wrote {} ({} bytes)", path.display(), artifact.len());
        Ok(())
    }

    /// The tour and the entries to render. Rejects an empty plan or day
    /// before anything else is loaded.
    fn select<'a>(
        &self,
        state: &'a ItineraryState,
    ) -> Result<(&'a Tour, ScheduleSelection), Box<dyn std::error::Error>> {
        let tour = state
            .tour
            .as_ref()
            .ok_or("No tour. Create one with 'tour tour new'.")?;
        let selection = select_schedules(&state.schedules, opt(&self.date, parse_date)?)?;
        Ok((tour, selection))
    }

    async fn generate(
        &self,
        store: &ItineraryStore,
        exporter: &DocumentExporter,
    ) -> Result<Artifact, Box<dyn std::error::Error>> {
        let state = store.snapshot();
        let (tour, selection) = self.select(&state)?;
        Ok(exporter.generate_artifact(tour, selection).await?)
    }

    fn write(&self, artifact: &Artifact, dir: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let path = download_artifact(artifact, dir, self.filename.as_deref())?;
        if self.preview {
            let page = path.with_extension("html");
            std::fs::write(&page, preview_artifact(artifact).html)?;
            println!("Preview: {}", page.display());
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tour_plan_core::sample::seoul_sample;

    fn command(date: Option<&str>, filename: Option<&str>, preview: bool) -> ExportCommand {
        ExportCommand {
            date: date.map(str::to_string),
            output: None,
            filename: filename.map(str::to_string),
            preview,
        }
    }

    fn sample_store() -> ItineraryStore {
        let store = ItineraryStore::new();
        store.replace_plan(seoul_sample());
        store
    }

    #[tokio::test]
    async fn test_generate_whole_plan() {
        let store = sample_store();
        let artifact = command(None, None, false)
            .generate(&store, &DocumentExporter::new())
            .await
            .unwrap();
        assert!(artifact.bytes.starts_with(b"%PDF"));
        assert_eq!(artifact.default_filename(), "Seoul 3-Day Trip_전체_일정.pdf");
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_day() {
        let store = sample_store();
        let err = command(Some("2025-07-17"), None, false)
            .generate(&store, &DocumentExporter::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("2025-07-17"));
    }

    #[tokio::test]
    async fn test_generate_without_tour() {
        let err = command(None, None, false)
            .generate(&ItineraryStore::new(), &DocumentExporter::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No tour"));
    }

    #[tokio::test]
    async fn test_write_with_preview() {
        let temp_dir = tempdir().unwrap();
        let store = sample_store();
        let export = command(Some("2025-07-15"), Some("day-one"), true);
        let artifact = export
            .generate(&store, &DocumentExporter::new())
            .await
            .unwrap();

        let path = export.write(&artifact, temp_dir.path()).unwrap();
        assert_eq!(path, temp_dir.path().join("day-one.pdf"));
        let html = std::fs::read_to_string(temp_dir.path().join("day-one.html")).unwrap();
        assert!(html.contains("data:application/pdf;base64,"));
    }

    #[test]
    fn test_empty_plan_rejected_before_font_load() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "export:\n  font_path: missing.ttf\n").unwrap();
        let config = Config::load(Some(config_path)).unwrap();

        let workspace = Workspace::new(temp_dir.path().join("data"));
        let store = ItineraryStore::new();
        store.reset_tour();
        workspace.save(&store).unwrap();

        let err = command(None, None, false)
            .run(&workspace, &config)
            .unwrap_err();
        assert!(err.to_string().contains("No schedule data"));

        store.replace_plan(seoul_sample());
        workspace.save(&store).unwrap();
        let err = command(None, None, false)
            .run(&workspace, &config)
            .unwrap_err();
        assert!(err.to_string().contains("Font file"));
    }
}
