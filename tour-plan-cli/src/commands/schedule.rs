use clap::{Args, Subcommand};
use tour_plan_core::models::{NewSchedule, Schedule, SchedulePatch};
use tour_plan_core::store::{filter_by_date, ItineraryStore};

use super::{opt, parse_date, parse_time, schedule_line, OutputFormat};
use crate::workspace::Workspace;

#[derive(Args)]
pub struct ScheduleCommand {
    #[command(subcommand)]
    pub command: ScheduleSubcommand,
}

#[derive(Subcommand)]
pub enum ScheduleSubcommand {
    /// Add an entry to the working tour
    Add {
        title: String,

        /// Day of the entry (YYYY-MM-DD), defaults to the tour's first day
        #[arg(long, short)]
        date: Option<String>,

        /// Start time (HH:MM)
        #[arg(long)]
        start: String,

        /// End time (HH:MM)
        #[arg(long)]
        end: String,

        /// Notes
        #[arg(long)]
        content: Option<String>,
    },

    /// Change an entry
    Update {
        id: i64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,

        /// New day (YYYY-MM-DD)
        #[arg(long, short)]
        date: Option<String>,

        /// New start time (HH:MM)
        #[arg(long)]
        start: Option<String>,

        /// New end time (HH:MM)
        #[arg(long)]
        end: Option<String>,
    },

    /// Remove an entry and whatever is attached to it
    Remove { id: i64 },

    /// List entries in the order they were added
    List {
        /// Only entries on this day (YYYY-MM-DD), ordered by start time
        #[arg(long, short)]
        date: Option<String>,

        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Move the entry at one list position to another
    Move { from: usize, to: usize },
}

impl ScheduleSubcommand {
    pub fn is_write(&self) -> bool {
        !matches!(self, ScheduleSubcommand::List { .. })
    }
}

impl ScheduleCommand {
    pub fn run(&self, workspace: &Workspace) -> Result<(), Box<dyn std::error::Error>> {
        let store = workspace.open()?;
        self.execute(&store)?;
        if self.command.is_write() {
            workspace.save(&store)?;
        }
        Ok(())
    }

    fn execute(&self, store: &ItineraryStore) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ScheduleSubcommand::Add {
                title,
                date,
                start,
                end,
                content,
            } => {
                let tour = store
                    .snapshot()
                    .tour
                    .ok_or("No tour. Create one with 'tour tour new'.")?;
                let date = opt(date, parse_date)?.unwrap_or(tour.start_date);
                let mut data = NewSchedule::new(
                    tour.id,
                    title.as_str(),
                    date,
                    parse_time(start)?,
                    parse_time(end)?,
                );
                if let Some(content) = content {
                    data = data.with_content(content.as_str());
                }
                let id = store.add_schedule(data);
                println!("Added schedule {}", id);
                Ok(())
            }

            ScheduleSubcommand::Update {
                id,
                title,
                content,
                date,
                start,
                end,
            } => {
                let patch = SchedulePatch {
                    title: title.clone(),
                    content: content.clone(),
                    date: opt(date, parse_date)?,
                    start_time: opt(start, parse_time)?,
                    end_time: opt(end, parse_time)?,
                };
                if patch.is_empty() {
                    return Err("Nothing to update. Pass at least one field.".into());
                }
                if !store.update_schedule(*id, &patch) {
                    return Err(format!("Schedule not found: {}", id).into());
                }
                println!("Updated schedule {}", id);
                Ok(())
            }

            ScheduleSubcommand::Remove { id } => {
                if !store.remove_schedule(*id) {
                    return Err(format!("Schedule not found: {}", id).into());
                }
                println!("Removed schedule {}", id);
                Ok(())
            }

            ScheduleSubcommand::List { date, format } => {
                let state = store.snapshot();
                let listed: Vec<Schedule> = match opt(date, parse_date)? {
                    Some(date) => {
                        let mut day = filter_by_date(&state.schedules, date);
                        day.sort_by_key(|s| s.start_time);
                        day
                    }
                    None => state.schedules.clone(),
                };
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&listed)?);
                    }
                    OutputFormat::Text => {
                        if listed.is_empty() {
                            println!("No schedule entries.");
                        }
                        for (position, schedule) in listed.iter().enumerate() {
                            println!("{:>3}. {}", position, schedule_line(schedule));
                        }
                    }
                }
                Ok(())
            }

            ScheduleSubcommand::Move { from, to } => {
                if !store.reorder_schedules(*from, *to) {
                    return Err(format!("Cannot move entry {} to {}", from, to).into());
                }
                println!("Moved entry {} to {}", from, to);
                Ok(())
            }
        }
    }
}
