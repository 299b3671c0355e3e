use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Forecast for one day of the trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub date: NaiveDate,
    /// Degrees Celsius.
    pub temperature: f64,
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
}

impl Weather {
    pub fn new(date: NaiveDate, temperature: f64, description: impl Into<String>) -> Self {
        Self {
            date,
            temperature,
            description: description.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}
