mod location;
mod schedule;
mod time_of_day;
mod tour;
mod traffic;
mod weather;

pub use location::{Coordinates, LocationData, MapEntity};
pub use schedule::{Attachment, NewSchedule, Schedule, SchedulePatch};
pub use time_of_day::TimeOfDay;
pub use tour::{BudgetTier, PlanMetadata, Tour, TourId, TourPatch, PLAN_SCHEMA_VERSION};
pub use traffic::{RouteResult, RouteStep, Traffic, TransitMode, VehicleData};
pub use weather::Weather;
