//! JSON shapes exchanged with the persistence server.
//!
//! A tour travels as one document with its whole plan nested under
//! `planData`. Each schedule item carries its attachment inline, tagged by
//! `type`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::error::SyncError;
use crate::models::{
    Attachment, BudgetTier, Coordinates, LocationData, MapEntity, PlanMetadata, Schedule,
    TimeOfDay, Tour, TourId, Traffic, VehicleData, Weather, PLAN_SCHEMA_VERSION,
};
use crate::store::PlanBundle;

const TYPE_LOCATION: &str = "location";
const TYPE_TRAFFIC: &str = "traffic";

/// Server responses arrive either wrapped as `{"data": ...}` or bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(value) => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tour_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travelers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(default)]
    pub plan_data: Option<PlanDataDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDataDto {
    #[serde(default)]
    pub schedules: Vec<ScheduleItemDto>,
    #[serde(default)]
    pub weather_data: Vec<Weather>,
    #[serde(default)]
    pub metadata: Option<MetadataDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataDto {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_days: u32,
    #[serde(default)]
    pub estimated_budget: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItemDto {
    /// Sent as a string by the server.
    pub schedule_id: String,
    pub date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_data: Option<LocationDataDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_data: Option<TrafficDataDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDataDto {
    #[serde(default)]
    pub map_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub place_id: String,
    /// The server names the map link `googleMapLink`.
    #[serde(default, rename = "googleMapLink", alias = "link")]
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

/// Only the vehicle summary and price are required. Missing times fall back
/// to the owning schedule's slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficDataDto {
    #[serde(default)]
    pub traffic_id: Option<i64>,
    #[serde(flatten)]
    pub vehicle: VehicleData,
    #[serde(default)]
    pub price: u64,
    #[serde(default)]
    pub spend_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub departure_time: Option<TimeOfDay>,
    #[serde(default)]
    pub arrival_time: Option<TimeOfDay>,
    #[serde(default)]
    pub route: String,
}

/// Body of the nested plan endpoint: the tour header beside its plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourPlanDto {
    pub tour: TourDto,
    #[serde(flatten)]
    pub plan: PlanDataDto,
}

impl TourPlanDto {
    /// Folds the plan into the tour document. A plan response with no
    /// content defers to whatever plan the header itself embeds.
    pub fn into_tour_dto(self) -> TourDto {
        let mut tour = self.tour;
        if !self.plan.is_empty() || tour.plan_data.is_none() {
            tour.plan_data = Some(self.plan);
        }
        tour
    }
}

impl PlanDataDto {
    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty() && self.weather_data.is_empty() && self.metadata.is_none()
    }
}

impl From<&LocationData> for LocationDataDto {
    fn from(location: &LocationData) -> Self {
        Self {
            map_id: None,
            name: location.name.clone(),
            address: location.address.clone(),
            coordinates: location.coordinates,
            place_id: location.place_id.clone(),
            link: location.link.clone(),
            photo_url: location.photo_url.clone(),
            rating: location.rating,
        }
    }
}

impl From<LocationDataDto> for LocationData {
    fn from(dto: LocationDataDto) -> Self {
        Self {
            name: dto.name,
            address: dto.address,
            coordinates: dto.coordinates,
            place_id: dto.place_id,
            link: dto.link,
            photo_url: dto.photo_url,
            rating: dto.rating,
        }
    }
}

impl From<&PlanMetadata> for MetadataDto {
    fn from(meta: &PlanMetadata) -> Self {
        Self {
            version: Some(meta.version.clone()),
            last_updated: Some(meta.last_updated),
            total_days: meta.total_days,
            estimated_budget: meta.estimated_budget,
        }
    }
}

impl MetadataDto {
    fn into_metadata(self, fallback_time: DateTime<Utc>) -> PlanMetadata {
        PlanMetadata {
            version: self
                .version
                .unwrap_or_else(|| PLAN_SCHEMA_VERSION.to_string()),
            last_updated: self.last_updated.unwrap_or(fallback_time),
            total_days: self.total_days,
            estimated_budget: self.estimated_budget,
        }
    }
}

impl From<&Schedule> for ScheduleItemDto {
    fn from(schedule: &Schedule) -> Self {
        let mut item = ScheduleItemDto {
            schedule_id: schedule.id.to_string(),
            date: schedule.date,
            start_time: schedule.start_time,
            end_time: schedule.end_time,
            title: schedule.title.clone(),
            content: schedule.content.clone(),
            kind: None,
            location_data: None,
            traffic_data: None,
        };
        match &schedule.attachment {
            Some(Attachment::Location(entity)) => {
                item.kind = Some(TYPE_LOCATION.to_string());
                item.location_data = Some(LocationDataDto {
                    map_id: Some(entity.id),
                    ..LocationDataDto::from(&entity.location)
                });
            }
            Some(Attachment::Route(traffic)) => {
                item.kind = Some(TYPE_TRAFFIC.to_string());
                item.traffic_data = Some(TrafficDataDto {
                    traffic_id: Some(traffic.id),
                    vehicle: traffic.vehicle.clone(),
                    price: traffic.price,
                    spend_time: Some(traffic.spend_time),
                    departure_time: Some(traffic.departure_time),
                    arrival_time: Some(traffic.arrival_time),
                    route: traffic.route.clone(),
                });
            }
            None => {}
        }
        item
    }
}

impl ScheduleItemDto {
    /// Converts to a schedule owned by `tour_id`. Ids the server did not
    /// send, or sent in a form that is not numeric, are drawn from `next_id`.
    fn into_schedule(self, tour_id: TourId, next_id: &mut impl FnMut() -> i64) -> Schedule {
        let id = match self.schedule_id.trim().parse::<i64>() {
            Ok(id) => id,
            Err(_) => {
                let id = next_id();
                tracing::warn!(
                    "Schedule id '{}' is not numeric, assigned {}",
                    self.schedule_id,
                    id
                );
                id
            }
        };

        let kind = self.kind.as_deref().map(str::to_ascii_lowercase);
        let wants_location = kind.as_deref().map_or(true, |k| k == TYPE_LOCATION);
        let wants_traffic = kind.as_deref().map_or(true, |k| k == TYPE_TRAFFIC);

        let attachment = match (self.location_data, self.traffic_data) {
            (Some(data), _) if wants_location => Some(Attachment::Location(MapEntity {
                id: data.map_id.unwrap_or_else(&mut *next_id),
                schedule_id: id,
                tour_id,
                location: data.into(),
            })),
            (_, Some(data)) if wants_traffic => Some(Attachment::Route(Traffic {
                id: data.traffic_id.unwrap_or_else(&mut *next_id),
                tour_id,
                vehicle: data.vehicle,
                spend_time: data.spend_time.unwrap_or_else(|| {
                    self.date.and_time(self.start_time.as_naive()).and_utc()
                }),
                price: data.price,
                departure_time: data.departure_time.unwrap_or(self.start_time),
                arrival_time: data.arrival_time.unwrap_or(self.end_time),
                route: data.route,
            })),
            _ => None,
        };

        Schedule {
            id,
            tour_id,
            title: self.title,
            content: self.content,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            attachment,
        }
    }
}

impl TourDto {
    /// Projects a tour and its plan into the wire format.
    pub fn from_plan(
        tour: &Tour,
        schedules: &[Schedule],
        weather: &[Weather],
        metadata: &PlanMetadata,
    ) -> Self {
        Self {
            tour_id: tour.persisted_id(),
            user_id: tour.owner_id,
            title: tour.title.clone(),
            start_date: tour.start_date,
            end_date: tour.end_date,
            travelers: tour.travelers,
            budget: tour.budget.map(|b| b.to_string()),
            plan_data: Some(PlanDataDto {
                schedules: schedules.iter().map(ScheduleItemDto::from).collect(),
                weather_data: weather.to_vec(),
                metadata: Some(MetadataDto::from(metadata)),
            }),
            created_at: tour.created_at,
            updated_at: tour.updated_at,
        }
    }

    /// The tour header without its plan. `fallback_id` is used when the
    /// server omitted `tourId`.
    pub fn to_tour(&self, fallback_id: Option<i64>) -> Result<Tour, SyncError> {
        let id = self
            .tour_id
            .or(fallback_id)
            .ok_or_else(|| SyncError::Decode("tour is missing tourId".to_string()))?;
        let budget = self.budget.as_deref().and_then(|raw| match raw.parse::<BudgetTier>() {
            Ok(tier) => Some(tier),
            Err(_) => {
                tracing::warn!("Ignoring unknown budget tier '{}' on tour {}", raw, id);
                None
            }
        });
        let fallback_time = self.updated_at.or(self.created_at).unwrap_or_else(Utc::now);
        Ok(Tour {
            id: TourId::Persisted(id),
            title: self.title.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            owner_id: self.user_id,
            travelers: self.travelers,
            budget,
            metadata: self
                .plan_data
                .as_ref()
                .and_then(|plan| plan.metadata.clone())
                .map(|meta| meta.into_metadata(fallback_time)),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }

    /// Splits the document into the tour and its plan collections.
    pub fn into_bundle(self, mut next_id: impl FnMut() -> i64) -> Result<PlanBundle, SyncError> {
        let tour = self.to_tour(None)?;
        let plan = self.plan_data.unwrap_or_default();
        let schedules = plan
            .schedules
            .into_iter()
            .map(|item| item.into_schedule(tour.id, &mut next_id))
            .collect();
        Ok(PlanBundle {
            tour: Some(tour),
            schedules,
            weather: plan.weather_data,
        })
    }
}
