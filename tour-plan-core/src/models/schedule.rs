use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::location::MapEntity;
use super::time_of_day::TimeOfDay;
use super::tour::TourId;
use super::traffic::Traffic;

/// Detail attached to a schedule entry: a place or a transit route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Attachment {
    Location(MapEntity),
    Route(Traffic),
}

/// An itinerary entry.
///
/// Start and end times are not validated against each other; an entry whose
/// end precedes its start is kept as entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: i64,
    pub tour_id: TourId,
    pub title: String,
    pub content: String,
    pub date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub attachment: Option<Attachment>,
}

impl Schedule {
    pub fn location(&self) -> Option<&MapEntity> {
        match &self.attachment {
            Some(Attachment::Location(entity)) => Some(entity),
            _ => None,
        }
    }

    pub fn traffic(&self) -> Option<&Traffic> {
        match &self.attachment {
            Some(Attachment::Route(traffic)) => Some(traffic),
            _ => None,
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}-{} {}",
            self.date, self.start_time, self.end_time, self.title
        )?;
        match &self.attachment {
            Some(Attachment::Location(entity)) => write!(f, " @ {}", entity.location.name),
            Some(Attachment::Route(traffic)) => write!(f, " via {}", traffic.route),
            None => Ok(()),
        }
    }
}

/// Data for a schedule entry that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSchedule {
    pub tour_id: TourId,
    pub title: String,
    pub content: String,
    pub date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

impl NewSchedule {
    pub fn new(
        tour_id: TourId,
        title: impl Into<String>,
        date: NaiveDate,
        start_time: TimeOfDay,
        end_time: TimeOfDay,
    ) -> Self {
        Self {
            tour_id,
            title: title.into(),
            content: String::new(),
            date,
            start_time,
            end_time,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub(crate) fn into_schedule(self, id: i64) -> Schedule {
        Schedule {
            id,
            tour_id: self.tour_id,
            title: self.title,
            content: self.content,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            attachment: None,
        }
    }
}

/// Partial update for a [`Schedule`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchedulePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<TimeOfDay>,
    pub end_time: Option<TimeOfDay>,
}

impl SchedulePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, schedule: &mut Schedule) {
        if let Some(title) = &self.title {
            schedule.title = title.clone();
        }
        if let Some(content) = &self.content {
            schedule.content = content.clone();
        }
        if let Some(date) = self.date {
            schedule.date = date;
        }
        if let Some(start) = self.start_time {
            schedule.start_time = start;
        }
        if let Some(end) = self.end_time {
            schedule.end_time = end;
        }
    }
}
