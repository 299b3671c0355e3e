use serde::{Deserialize, Serialize};

use super::tour::TourId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A place picked from the mapping service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationData {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub place_id: String,
    /// Shareable map link.
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

impl LocationData {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            coordinates: None,
            place_id: String::new(),
            link: String::new(),
            photo_url: None,
            rating: None,
        }
    }

    pub fn with_coordinates(mut self, lat: f64, lng: f64) -> Self {
        self.coordinates = Some(Coordinates { lat, lng });
        self
    }

    /// Sets the place id and derives the map link from it when no link is set.
    pub fn with_place_id(mut self, place_id: impl Into<String>) -> Self {
        self.place_id = place_id.into();
        if self.link.is_empty() && !self.place_id.is_empty() {
            self.link = format!("https://maps.google.com/maps?place_id={}", self.place_id);
        }
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_photo_url(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }
}

/// A location attached to a schedule entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEntity {
    pub id: i64,
    pub schedule_id: i64,
    pub tour_id: TourId,
    pub location: LocationData,
}
