mod auth;
mod config_cmd;
mod export;
mod location;
mod route;
mod sample;
mod schedule;
mod sync_cmd;
mod tour;
mod weather;

pub use auth::{LoginCommand, LogoutCommand};
pub use config_cmd::ConfigCommand;
pub use export::ExportCommand;
pub use location::LocationCommand;
pub use route::RouteCommand;
pub use sample::SampleCommand;
pub use schedule::ScheduleCommand;
pub use sync_cmd::SyncCommand;
pub use tour::TourCommand;
pub use weather::WeatherCommand;

use chrono::NaiveDate;
use clap::ValueEnum;
use tour_plan_core::models::{Schedule, TimeOfDay};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", value))
}

pub(crate) fn parse_time(value: &str) -> Result<TimeOfDay, String> {
    value.parse()
}

pub(crate) fn opt<T>(
    value: &Option<String>,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<Option<T>, String> {
    value.as_deref().map(parse).transpose()
}

/// One line per entry: `[id] date start-end title`.
pub(crate) fn schedule_line(schedule: &Schedule) -> String {
    let marker = match (schedule.location(), schedule.traffic()) {
        (Some(_), _) => " @",
        (_, Some(_)) => " ~",
        _ => "",
    };
    format!(
        "[{}] {} {}-{} {}{}",
        schedule.id,
        schedule.date,
        schedule.start_time,
        schedule.end_time,
        schedule.title,
        marker
    )
}
