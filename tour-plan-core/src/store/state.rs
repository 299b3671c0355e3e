use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    Attachment, LocationData, MapEntity, PlanMetadata, RouteResult, Schedule, Tour, Traffic,
    Weather, PLAN_SCHEMA_VERSION,
};

/// A tour together with everything planned for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanBundle {
    pub tour: Option<Tour>,
    pub schedules: Vec<Schedule>,
    pub weather: Vec<Weather>,
}

/// Snapshot of the itinerary being edited.
///
/// Loading flag, error message and revision are session-only and are not
/// serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItineraryState {
    pub tour: Option<Tour>,
    pub schedules: Vec<Schedule>,
    pub weather: Vec<Weather>,
    pub selected_location: Option<LocationData>,
    pub route_results: Vec<RouteResult>,
    pub route_panel_open: bool,
    pub selected_day_index: usize,
    #[serde(skip)]
    pub loading: bool,
    #[serde(skip)]
    pub error: Option<String>,
    /// Incremented once per committed transition.
    #[serde(skip)]
    pub revision: u64,
}

impl ItineraryState {
    pub fn map_entities(&self) -> Vec<&MapEntity> {
        self.schedules.iter().filter_map(Schedule::location).collect()
    }

    pub fn traffic(&self) -> Vec<&Traffic> {
        self.schedules.iter().filter_map(Schedule::traffic).collect()
    }

    pub fn schedule(&self, id: i64) -> Option<&Schedule> {
        self.schedules.iter().find(|s| s.id == id)
    }

    /// Entries on `date`, ordered by start time.
    pub fn schedules_on(&self, date: NaiveDate) -> Vec<&Schedule> {
        let mut day: Vec<&Schedule> = self.schedules.iter().filter(|s| s.date == date).collect();
        day.sort_by_key(|s| s.start_time);
        day
    }

    /// Every entry ordered by date, then start time.
    pub fn sorted_schedules(&self) -> Vec<&Schedule> {
        let mut all: Vec<&Schedule> = self.schedules.iter().collect();
        all.sort_by_key(|s| (s.date, s.start_time));
        all
    }

    /// The tour's dates from start to end inclusive.
    pub fn trip_dates(&self) -> Vec<NaiveDate> {
        let Some(tour) = &self.tour else {
            return Vec::new();
        };
        tour.start_date
            .iter_days()
            .take_while(|day| *day <= tour.end_date)
            .collect()
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.trip_dates().get(self.selected_day_index).copied()
    }

    pub fn selected_day_schedules(&self) -> Vec<&Schedule> {
        match self.selected_date() {
            Some(date) => self.schedules_on(date),
            None => Vec::new(),
        }
    }

    /// Sum of attached fares.
    pub fn estimated_budget(&self) -> u64 {
        self.traffic().iter().map(|t| t.price).sum()
    }

    /// Metadata recomputed from the current collections.
    pub fn plan_metadata(&self, now: DateTime<Utc>) -> PlanMetadata {
        let version = self
            .tour
            .as_ref()
            .and_then(|t| t.metadata.as_ref())
            .map(|m| m.version.clone())
            .unwrap_or_else(|| PLAN_SCHEMA_VERSION.to_string());
        PlanMetadata {
            version,
            last_updated: now,
            total_days: self.tour.as_ref().map(Tour::total_days).unwrap_or(0),
            estimated_budget: self.estimated_budget(),
        }
    }

    /// Largest schedule or attachment id held.
    pub fn max_entity_id(&self) -> Option<i64> {
        self.schedules
            .iter()
            .flat_map(|s| {
                let attached = match &s.attachment {
                    Some(Attachment::Location(m)) => Some(m.id),
                    Some(Attachment::Route(t)) => Some(t.id),
                    None => None,
                };
                std::iter::once(s.id).chain(attached)
            })
            .max()
    }

    pub fn bundle(&self) -> PlanBundle {
        PlanBundle {
            tour: self.tour.clone(),
            schedules: self.schedules.clone(),
            weather: self.weather.clone(),
        }
    }
}
