use clap::{Args, Subcommand};
use tour_plan_core::models::{RouteResult, RouteStep, SchedulePatch, TimeOfDay, TransitMode};
use tour_plan_core::store::ItineraryStore;

use super::{opt, parse_date, parse_time};
use crate::workspace::Workspace;

const MINUTES_PER_DAY: i64 = 24 * 60;

#[derive(Args)]
pub struct RouteCommand {
    #[command(subcommand)]
    pub command: RouteSubcommand,
}

#[derive(Subcommand)]
pub enum RouteSubcommand {
    /// Add a single-leg transit ride as a new schedule entry
    Add {
        /// Departure stop
        from: String,

        /// Arrival stop
        to: String,

        /// Departure time (HH:MM)
        #[arg(long)]
        depart: String,

        /// Arrival time (HH:MM)
        #[arg(long)]
        arrive: String,

        /// Line name, e.g. "Line 3"
        #[arg(long)]
        line: String,

        /// Vehicle (bus, subway, train, tram, walking, ...)
        #[arg(long, default_value = "subway")]
        mode: String,

        /// Fare in won
        #[arg(long, default_value_t = 0)]
        price: u64,

        #[arg(long, default_value_t = 0)]
        transfers: u32,

        /// Day (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,

        /// Entry title, defaults to "{from} → {to}"
        #[arg(long)]
        title: Option<String>,
    },

    /// Detach a route, keeping its entry
    Remove {
        /// Route id
        id: i64,
    },
}

/// Minutes from `depart` to `arrive`, crossing midnight if needed.
fn ride_minutes(depart: TimeOfDay, arrive: TimeOfDay) -> u32 {
    let minutes = (arrive.as_naive() - depart.as_naive()).num_minutes();
    u32::try_from(minutes.rem_euclid(MINUTES_PER_DAY)).unwrap_or(0)
}

impl RouteCommand {
    pub fn run(&self, workspace: &Workspace) -> Result<(), Box<dyn std::error::Error>> {
        let store = workspace.open()?;
        self.execute(&store)?;
        workspace.save(&store)?;
        Ok(())
    }

    fn execute(&self, store: &ItineraryStore) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            RouteSubcommand::Add {
                from,
                to,
                depart,
                arrive,
                line,
                mode,
                price,
                transfers,
                date,
                title,
            } => {
                let departure_time = parse_time(depart)?;
                let arrival_time = parse_time(arrive)?;
                let mode: TransitMode = mode.parse()?;
                let route = RouteResult {
                    departure: from.clone(),
                    destination: to.clone(),
                    departure_time,
                    arrival_time,
                    duration: ride_minutes(departure_time, arrival_time),
                    transfers: *transfers,
                    price: *price,
                    route: vec![RouteStep {
                        mode,
                        line: line.clone(),
                        departure: from.clone(),
                        arrival: to.clone(),
                        departure_time,
                        arrival_time,
                    }],
                };
                let overrides = SchedulePatch {
                    title: title.clone(),
                    date: opt(date, parse_date)?,
                    ..Default::default()
                };
                let added = store.add_route_to_schedule(route, overrides);
                println!(
                    "Added route {} as schedule {} on tour {}",
                    added.attachment_id, added.schedule_id, added.tour_id
                );
                Ok(())
            }

            RouteSubcommand::Remove { id } => {
                if !store.remove_traffic(*id) {
                    return Err(format!("Route not found: {}", id).into());
                }
                println!("Removed route {}", id);
                Ok(())
            }
        }
    }
}
