use clap::Args;
use tour_plan_core::sample::seoul_sample;

use crate::workspace::Workspace;

/// Replace the working plan with a three day Seoul itinerary
#[derive(Args)]
pub struct SampleCommand {
    /// Overwrite a working plan that already has entries
    #[arg(long, short)]
    pub force: bool,
}

impl SampleCommand {
    pub fn run(&self, workspace: &Workspace) -> Result<(), Box<dyn std::error::Error>> {
        let store = workspace.open()?;
        let has_entries = store.read(|s| !s.schedules.is_empty());
        if has_entries && !self.force {
            return Err("The working plan has entries. Pass --force to replace it.".into());
        }
        store.replace_plan(seoul_sample());
        workspace.save(&store)?;
        if let Some(tour) = store.snapshot().tour {
            print!("{}", tour);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sample_written_to_workspace() {
        let temp_dir = tempdir().unwrap();
        let workspace = Workspace::new(temp_dir.path());

        SampleCommand { force: false }.run(&workspace).unwrap();
        let state = workspace.open().unwrap().snapshot();
        assert_eq!(state.schedules.len(), 5);

        assert!(SampleCommand { force: false }.run(&workspace).is_err());
        SampleCommand { force: true }.run(&workspace).unwrap();
    }
}
