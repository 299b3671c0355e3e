use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::time_of_day::TimeOfDay;
use super::tour::TourId;

/// Vehicle mode reported for a single transit step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitMode {
    Bus,
    Subway,
    Train,
    Tram,
    HeavyRail,
    CommuterTrain,
    HighSpeedTrain,
    Walking,
}

impl fmt::Display for TransitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransitMode::Bus => "BUS",
            TransitMode::Subway => "SUBWAY",
            TransitMode::Train => "TRAIN",
            TransitMode::Tram => "TRAM",
            TransitMode::HeavyRail => "HEAVY_RAIL",
            TransitMode::CommuterTrain => "COMMUTER_TRAIN",
            TransitMode::HighSpeedTrain => "HIGH_SPEED_TRAIN",
            TransitMode::Walking => "WALKING",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TransitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "BUS" => Ok(TransitMode::Bus),
            "SUBWAY" => Ok(TransitMode::Subway),
            "TRAIN" => Ok(TransitMode::Train),
            "TRAM" => Ok(TransitMode::Tram),
            "HEAVY_RAIL" => Ok(TransitMode::HeavyRail),
            "COMMUTER_TRAIN" => Ok(TransitMode::CommuterTrain),
            "HIGH_SPEED_TRAIN" => Ok(TransitMode::HighSpeedTrain),
            "WALKING" => Ok(TransitMode::Walking),
            _ => Err(format!("Invalid transit mode '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
    pub mode: TransitMode,
    pub line: String,
    pub departure: String,
    pub arrival: String,
    pub departure_time: TimeOfDay,
    pub arrival_time: TimeOfDay,
}

impl RouteStep {
    /// `"{line} ({departure} → {arrival})"`
    pub fn summary(&self) -> String {
        format!("{} ({} → {})", self.line, self.departure, self.arrival)
    }
}

/// A transit route returned by the route search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    pub departure: String,
    pub destination: String,
    pub departure_time: TimeOfDay,
    pub arrival_time: TimeOfDay,
    /// Minutes.
    pub duration: u32,
    pub transfers: u32,
    #[serde(default)]
    pub price: u64,
    pub route: Vec<RouteStep>,
}

impl RouteResult {
    /// One `"{line} ({departure} → {arrival})"` entry per step, joined by `", "`.
    pub fn summary(&self) -> String {
        self.route
            .iter()
            .map(RouteStep::summary)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Transit details stored on a [`Traffic`] record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleData {
    pub mode: String,
    #[serde(default)]
    pub steps: Vec<RouteStep>,
    pub total_duration: String,
    pub transfers: u32,
    pub departure: String,
    pub destination: String,
}

impl VehicleData {
    pub fn from_route(route: &RouteResult) -> Self {
        Self {
            mode: "TRANSIT".to_string(),
            steps: route.route.clone(),
            total_duration: format!("{} min", route.duration),
            transfers: route.transfers,
            departure: route.departure.clone(),
            destination: route.destination.clone(),
        }
    }
}

/// A route attached to a schedule entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Traffic {
    pub id: i64,
    pub tour_id: TourId,
    pub vehicle: VehicleData,
    pub spend_time: DateTime<Utc>,
    /// Fare in won.
    pub price: u64,
    pub departure_time: TimeOfDay,
    pub arrival_time: TimeOfDay,
    /// Human-readable route summary.
    pub route: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(line: &str, from: &str, to: &str) -> RouteStep {
        RouteStep {
            mode: TransitMode::Subway,
            line: line.to_string(),
            departure: from.to_string(),
            arrival: to.to_string(),
            departure_time: "11:15".parse().unwrap(),
            arrival_time: "11:20".parse().unwrap(),
        }
    }

    fn route(steps: Vec<RouteStep>) -> RouteResult {
        RouteResult {
            departure: "A".to_string(),
            destination: "B".to_string(),
            departure_time: "11:15".parse().unwrap(),
            arrival_time: "11:20".parse().unwrap(),
            duration: 5,
            transfers: 0,
            price: 1500,
            route: steps,
        }
    }

    #[test]
    fn test_single_step_summary() {
        let route = route(vec![step("Line 3", "A", "B")]);
        assert_eq!(route.summary(), "Line 3 (A → B)");
    }

    #[test]
    fn test_multi_step_summary() {
        let route = route(vec![step("Line 3", "A", "X"), step("Bus 101", "X", "B")]);
        assert_eq!(route.summary(), "Line 3 (A → X), Bus 101 (X → B)");
    }

    #[test]
    fn test_vehicle_from_route() {
        let route = route(vec![step("Line 3", "A", "B")]);
        let vehicle = VehicleData::from_route(&route);
        assert_eq!(vehicle.mode, "TRANSIT");
        assert_eq!(vehicle.total_duration, "5 min");
        assert_eq!(vehicle.steps.len(), 1);
    }

    #[test]
    fn test_transit_mode_wire_names() {
        let json = serde_json::to_string(&TransitMode::HighSpeedTrain).unwrap();
        assert_eq!(json, "\"HIGH_SPEED_TRAIN\"");
        assert_eq!(
            "commuter-train".parse::<TransitMode>().unwrap(),
            TransitMode::CommuterTrain
        );
    }

    #[test]
    fn test_route_result_from_json() {
        let json = r#"{
            "departure": "A", "destination": "B",
            "departureTime": "11:15", "arrivalTime": "11:20",
            "duration": 5, "transfers": 0,
            "route": [{"mode": "SUBWAY", "line": "Line 3", "departure": "A",
                       "arrival": "B", "departureTime": "11:15", "arrivalTime": "11:20"}]
        }"#;
        let route: RouteResult = serde_json::from_str(json).unwrap();
        assert_eq!(route.price, 0);
        assert_eq!(route.route[0].mode, TransitMode::Subway);
    }
}
