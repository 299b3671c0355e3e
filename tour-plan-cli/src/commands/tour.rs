use clap::{Args, Subcommand};
use tour_plan_core::models::{BudgetTier, Tour, TourId, TourPatch};
use tour_plan_core::store::{ItineraryState, ItineraryStore, PlanBundle};

use super::{opt, parse_date, schedule_line, OutputFormat};
use crate::workspace::Workspace;

#[derive(Args)]
pub struct TourCommand {
    #[command(subcommand)]
    pub command: TourSubcommand,
}

#[derive(Subcommand)]
pub enum TourSubcommand {
    /// Start a new plan, discarding the working one
    New {
        /// Tour title
        title: String,

        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Number of travelers
        #[arg(long)]
        travelers: Option<u32>,

        /// Budget tier (low, medium, high)
        #[arg(long)]
        budget: Option<String>,
    },

    /// Show the working tour and its entries
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Change fields on the working tour
    Set {
        #[arg(long)]
        title: Option<String>,

        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        #[arg(long)]
        travelers: Option<u32>,

        /// Budget tier (low, medium, high)
        #[arg(long)]
        budget: Option<String>,
    },

    /// Drop the working tour
    Clear {
        /// Also drop entries, weather and selections
        #[arg(long)]
        all: bool,
    },
}

impl TourSubcommand {
    pub fn is_write(&self) -> bool {
        !matches!(self, TourSubcommand::Show { .. })
    }
}

impl TourCommand {
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
            TourSubcommand::New {
                title,
                start,
                end,
                travelers,
                budget,
            } => {
                let mut tour = Tour::new(
                    TourId::Draft(store.next_id()),
                    title.as_str(),
                    parse_date(start)?,
                    parse_date(end)?,
                );
                if let Some(travelers) = travelers {
                    tour = tour.with_travelers(*travelers);
                }
                if let Some(budget) = budget {
                    tour = tour.with_budget(budget.parse()?);
                }
                store.replace_plan(PlanBundle {
                    tour: Some(tour),
                    ..Default::default()
                });
                println!("Started new tour:");
                if let Some(tour) = store.snapshot().tour {
                    print!("{}", tour);
                }
                Ok(())
            }

            TourSubcommand::Show { format } => {
                let state = store.snapshot();
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&plan_json(&state))?);
                    }
                    OutputFormat::Text => {
                        let Some(tour) = &state.tour else {
                            println!("No tour. Create one with 'tour tour new'.");
                            return Ok(());
                        };
                        print!("{}", tour);
                        println!();
                        let sorted = state.sorted_schedules();
                        if sorted.is_empty() {
                            println!("No schedule entries.");
                        }
                        for schedule in sorted {
                            println!("{}", schedule_line(schedule));
                        }
                        let budget = state.estimated_budget();
                        if budget > 0 {
                            println!();
                            println!("Estimated transit cost: {} KRW", budget);
                        }
                    }
                }
                Ok(())
            }

            TourSubcommand::Set {
                title,
                start,
                end,
                travelers,
                budget,
            } => {
                let patch = TourPatch {
                    title: title.clone(),
                    start_date: opt(start, parse_date)?,
                    end_date: opt(end, parse_date)?,
                    travelers: *travelers,
                    budget: opt(budget, |b| b.parse::<BudgetTier>())?,
                    ..Default::default()
                };
                if patch.is_empty() {
                    return Err("Nothing to update. Pass at least one field.".into());
                }
                let id = store.update_tour_fields(patch);
                println!("Updated tour {}", id);
                Ok(())
            }

            TourSubcommand::Clear { all } => {
                if *all {
                    store.reset();
                    println!("Cleared the working plan.");
                } else {
                    store.clear_tour();
                    println!("Cleared the working tour.");
                }
                Ok(())
            }
        }
    }
}

fn plan_json(state: &ItineraryState) -> serde_json::Value {
    serde_json::json!({
        "tour": state.tour,
        "schedules": state.sorted_schedules(),
        "weather": state.weather,
    })
}
