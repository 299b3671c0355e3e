use clap::{Args, Subcommand};
use tour_plan_core::models::{LocationData, SchedulePatch};
use tour_plan_core::store::ItineraryStore;

use super::{opt, parse_date, parse_time};
use crate::workspace::Workspace;

#[derive(Args)]
pub struct LocationCommand {
    #[command(subcommand)]
    pub command: LocationSubcommand,
}

#[derive(Args, Clone, Default)]
pub struct PlaceArgs {
    /// Street address
    #[arg(long)]
    pub address: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub lng: Option<f64>,

    /// Place id from the maps provider
    #[arg(long)]
    pub place_id: Option<String>,

    /// Map link
    #[arg(long)]
    pub link: Option<String>,

    /// Rating out of 5
    #[arg(long)]
    pub rating: Option<f64>,
}

impl PlaceArgs {
    fn apply(&self, mut location: LocationData) -> Result<LocationData, String> {
        if let Some(address) = &self.address {
            location.address = address.clone();
        }
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => location = location.with_coordinates(lat, lng),
            (None, None) => {}
            _ => return Err("Pass both --lat and --lng.".to_string()),
        }
        if let Some(link) = &self.link {
            location = location.with_link(link.as_str());
        }
        if let Some(place_id) = &self.place_id {
            location = location.with_place_id(place_id.as_str());
        }
        if let Some(rating) = self.rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err(format!("Invalid rating {}. Use 0 to 5.", rating));
            }
            location = location.with_rating(rating);
        }
        Ok(location)
    }
}

#[derive(Subcommand)]
pub enum LocationSubcommand {
    /// Add a place as a new schedule entry
    Add {
        /// Place name
        name: String,

        #[command(flatten)]
        place: PlaceArgs,

        /// Entry title, defaults to the place name
        #[arg(long)]
        title: Option<String>,

        /// Day (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,

        /// Start time (HH:MM), defaults to now
        #[arg(long)]
        start: Option<String>,

        /// End time (HH:MM), defaults to two hours after now
        #[arg(long)]
        end: Option<String>,
    },

    /// Change the place attached to an entry
    Update {
        /// Location id
        id: i64,

        /// New place name
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        place: PlaceArgs,
    },

    /// Detach a place, keeping its entry
    Remove {
        /// Location id
        id: i64,
    },
}

impl LocationCommand {
    pub fn run(&self, workspace: &Workspace) -> Result<(), Box<dyn std::error::Error>> {
        let store = workspace.open()?;
        self.execute(&store)?;
        workspace.save(&store)?;
        Ok(())
    }

    fn execute(&self, store: &ItineraryStore) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            LocationSubcommand::Add {
                name,
                place,
                title,
                date,
                start,
                end,
            } => {
                let location = place.apply(LocationData::new(name.as_str(), ""))?;
                let overrides = SchedulePatch {
                    title: title.clone(),
                    date: opt(date, parse_date)?,
                    start_time: opt(start, parse_time)?,
                    end_time: opt(end, parse_time)?,
                    ..Default::default()
                };
                let added = store.add_location_to_schedule(location, overrides);
                println!(
                    "Added location {} as schedule {} on tour {}",
                    added.attachment_id, added.schedule_id, added.tour_id
                );
                Ok(())
            }

            LocationSubcommand::Update { id, name, place } => {
                let current = store
                    .read(|s| {
                        s.map_entities()
                            .into_iter()
                            .find(|m| m.id == *id)
                            .map(|m| m.location.clone())
                    })
                    .ok_or_else(|| format!("Location not found: {}", id))?;
                let mut location = place.apply(current)?;
                if let Some(name) = name {
                    location.name = name.clone();
                }
                store.update_map_entity(*id, location);
                println!("Updated location {}", id);
                Ok(())
            }

            LocationSubcommand::Remove { id } => {
                if !store.remove_map_entity(*id) {
                    return Err(format!("Location not found: {}", id).into());
                }
                println!("Removed location {}", id);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exec(store: &ItineraryStore, command: LocationSubcommand) -> Result<(), String> {
        LocationCommand { command }
            .execute(store)
            .map_err(|e| e.to_string())
    }

    fn add_gyeongbokgung(store: &ItineraryStore) -> i64 {
        exec(
            store,
            LocationSubcommand::Add {
                name: "Gyeongbokgung".to_string(),
                place: PlaceArgs {
                    address: Some("161 Sajik-ro".to_string()),
                    lat: Some(37.5796),
                    lng: Some(126.977),
                    rating: Some(4.3),
                    ..Default::default()
                },
                title: None,
                date: Some("2025-07-15".to_string()),
                start: Some("09:00".to_string()),
                end: Some("11:00".to_string()),
            },
        )
        .unwrap();
        store.snapshot().map_entities()[0].id
    }

    #[test]
    fn test_add_creates_entry_and_tour() {
        let store = ItineraryStore::new();
        add_gyeongbokgung(&store);

        let state = store.snapshot();
        assert!(state.tour.is_some());
        assert_eq!(state.schedules.len(), 1);
        let entity = state.map_entities()[0];
        assert_eq!(entity.location.address, "161 Sajik-ro");
        assert_eq!(entity.location.rating, Some(4.3));
        assert_eq!(state.schedules[0].start_time.to_string(), "09:00");
    }

    #[test]
    fn test_half_coordinates_rejected() {
        let store = ItineraryStore::new();
        let err = exec(
            &store,
            LocationSubcommand::Add {
                name: "Nowhere".to_string(),
                place: PlaceArgs {
                    lat: Some(1.0),
                    ..Default::default()
                },
                title: None,
                date: None,
                start: None,
                end: None,
            },
        )
        .unwrap_err();
        assert!(err.contains("--lat and --lng"));
        assert!(store.snapshot().tour.is_none());
    }

    #[test]
    fn test_update_keeps_unchanged_fields() {
        let store = ItineraryStore::new();
        let id = add_gyeongbokgung(&store);

        exec(
            &store,
            LocationSubcommand::Update {
                id,
                name: Some("Gyeongbokgung Palace".to_string()),
                place: PlaceArgs::default(),
            },
        )
        .unwrap();

        let state = store.snapshot();
        let location = state.map_entities()[0].location.clone();
        assert_eq!(location.name, "Gyeongbokgung Palace");
        assert_eq!(location.address, "161 Sajik-ro");
    }

    #[test]
    fn test_remove_keeps_entry() {
        let store = ItineraryStore::new();
        let id = add_gyeongbokgung(&store);

        exec(&store, LocationSubcommand::Remove { id }).unwrap();
        let state = store.snapshot();
        assert!(state.map_entities().is_empty());
        assert_eq!(state.schedules.len(), 1);

        assert!(exec(&store, LocationSubcommand::Remove { id }).is_err());
    }
}
