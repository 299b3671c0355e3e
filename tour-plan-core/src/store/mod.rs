//! In-memory itinerary store.
//!
//! [`ItineraryStore`] is a cloneable handle around a single
//! [`ItineraryState`] snapshot. Every action computes its change under the
//! snapshot's lock and then notifies subscribers, so observers only ever see
//! whole transitions. Compound actions such as
//! [`ItineraryStore::add_location_to_schedule`] commit every record they
//! create in that one transition.
//!
//! # Usage
//!
//! ```
//! use tour_plan_core::models::LocationData;
//! use tour_plan_core::store::ItineraryStore;
//!
//! let store = ItineraryStore::new();
//! let added = store.add_location_to_schedule(
//!     LocationData::new("Gyeongbokgung", "161 Sajik-ro"),
//!     Default::default(),
//! );
//! let state = store.snapshot();
//! assert_eq!(state.tour.unwrap().id, added.tour_id);
//! ```

mod clock;
mod state;

pub use clock::{Clock, IdGenerator, ManualClock, SystemClock};
pub use state::{ItineraryState, PlanBundle};

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tokio::sync::watch;

use crate::models::{
    Attachment, BudgetTier, LocationData, MapEntity, NewSchedule, RouteResult, Schedule,
    SchedulePatch, TimeOfDay, Tour, TourId, TourPatch, Traffic, VehicleData, Weather,
};

/// Title given to a tour synthesized on first use.
pub const DEFAULT_TOUR_TITLE: &str = "My Travel Plan";
/// Length of a synthesized tour, in days after today.
const DEFAULT_TOUR_SPAN_DAYS: i64 = 7;
/// Length of a location entry created without explicit times.
const DEFAULT_VISIT_MINUTES: i64 = 120;
const DEFAULT_TRAVELERS: u32 = 2;

/// Ids produced by a compound add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddedEntry {
    pub tour_id: TourId,
    pub schedule_id: i64,
    /// Id of the created map entity or traffic record.
    pub attachment_id: i64,
}

struct Inner {
    state: watch::Sender<ItineraryState>,
    ids: IdGenerator,
    clock: Arc<dyn Clock>,
}

/// Shared handle to the itinerary being edited.
#[derive(Clone)]
pub struct ItineraryStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ItineraryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItineraryStore")
            .field("state", &*self.inner.state.borrow())
            .finish()
    }
}

impl Default for ItineraryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ItineraryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::from_state(ItineraryState::default(), clock)
    }

    /// Creates a store holding `state`, e.g. one restored from disk.
    pub fn from_state(state: ItineraryState, clock: Arc<dyn Clock>) -> Self {
        let ids = IdGenerator::new();
        observe_ids(&ids, &state);
        let (sender, _) = watch::channel(state);
        Self {
            inner: Arc::new(Inner {
                state: sender,
                ids,
                clock,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn snapshot(&self) -> ItineraryState {
        self.inner.state.borrow().clone()
    }

    /// Runs `f` against the current snapshot without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&ItineraryState) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    /// Receiver notified after every committed transition.
    pub fn subscribe(&self) -> watch::Receiver<ItineraryState> {
        self.inner.state.subscribe()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.inner.clock.as_ref()
    }

    pub fn today(&self) -> NaiveDate {
        self.inner.clock.now().date()
    }

    /// Allocates a fresh entity id.
    pub fn next_id(&self) -> i64 {
        let millis = self.inner.clock.now().and_utc().timestamp_millis();
        self.inner.ids.next(millis)
    }

    // ------------------------------------------------------------------
    // Tour
    // ------------------------------------------------------------------

    pub fn set_tour(&self, tour: Tour) {
        tracing::debug!("set_tour: {}", tour.id);
        self.commit(|state| state.tour = Some(tour));
    }

    /// Merges `patch` into the held tour, creating a default one first if
    /// nothing is held.
    pub fn update_tour_fields(&self, patch: TourPatch) -> TourId {
        let mut tour_id = TourId::Draft(0);
        self.commit(|state| {
            let tour = state.tour.get_or_insert_with(|| self.empty_tour());
            patch.apply(tour);
            tour_id = tour.id;
        });
        tour_id
    }

    pub fn clear_tour(&self) {
        tracing::debug!("clear_tour");
        self.commit(|state| state.tour = None);
    }

    /// Replaces the held tour with an empty template.
    pub fn reset_tour(&self) -> TourId {
        let tour = self.empty_tour();
        let id = tour.id;
        tracing::debug!("reset_tour: {}", id);
        self.commit(|state| state.tour = Some(tour));
        id
    }

    /// Returns the whole state to its initial value.
    pub fn reset(&self) {
        tracing::debug!("reset");
        self.commit(|state| {
            let revision = state.revision;
            *state = ItineraryState {
                revision,
                ..Default::default()
            };
        });
    }

    /// Replaces tour, schedules and weather wholesale.
    pub fn replace_plan(&self, bundle: PlanBundle) {
        tracing::debug!(
            "replace_plan: {} schedule(s), {} weather record(s)",
            bundle.schedules.len(),
            bundle.weather.len()
        );
        self.commit(|state| {
            state.tour = bundle.tour;
            state.schedules = bundle.schedules;
            state.weather = bundle.weather;
            state.selected_day_index = 0;
            state.loading = false;
            state.error = None;
            observe_ids(&self.inner.ids, state);
        });
    }

    /// Adopts identity and timestamps from a tour returned by the server.
    ///
    /// `saved_from` is the id the tour had when the save started. The merge
    /// only lands if the store still holds that tour (or already holds the
    /// server's id). When the ids differ, every schedule and attachment
    /// pointing at `saved_from` is re-pointed at the server's id. A store that
    /// has moved on to another tour keeps it untouched.
    pub fn apply_saved_tour(&self, saved_from: TourId, saved: Tour) -> Tour {
        let mut merged = saved.clone();
        self.commit(|state| {
            let adopted = match &mut state.tour {
                Some(held) if held.id == saved_from || held.id == saved.id => {
                    held.id = saved.id;
                    held.created_at = saved.created_at.or(held.created_at);
                    held.updated_at = saved.updated_at.or(held.updated_at);
                    if saved.owner_id.is_some() {
                        held.owner_id = saved.owner_id;
                    }
                    if saved.metadata.is_some() {
                        held.metadata = saved.metadata.clone();
                    }
                    merged = held.clone();
                    true
                }
                _ => {
                    tracing::debug!(
                        "apply_saved_tour: store no longer holds {}, leaving it as is",
                        saved_from
                    );
                    false
                }
            };
            if adopted && saved_from != saved.id {
                retarget_tour(state, saved_from, saved.id);
            }
            state.loading = false;
            state.error = None;
        });
        tracing::debug!("apply_saved_tour: {}", merged.id);
        merged
    }

    // ------------------------------------------------------------------
    // Schedules
    // ------------------------------------------------------------------

    /// Appends an entry with a freshly assigned id and returns the id.
    pub fn add_schedule(&self, data: NewSchedule) -> i64 {
        let id = self.next_id();
        tracing::debug!("add_schedule: {}", id);
        self.commit(|state| state.schedules.push(data.into_schedule(id)));
        id
    }

    /// Merges `patch` into the entry with `id`. Returns false if absent.
    pub fn update_schedule(&self, id: i64, patch: &SchedulePatch) -> bool {
        self.commit_if(|state| match state.schedules.iter_mut().find(|s| s.id == id) {
            Some(schedule) => {
                patch.apply(schedule);
                true
            }
            None => false,
        })
    }

    /// Removes the entry and any location attached to it.
    pub fn remove_schedule(&self, id: i64) -> bool {
        self.commit_if(|state| {
            let before = state.schedules.len();
            state.schedules.retain(|s| s.id != id);
            before != state.schedules.len()
        })
    }

    /// Moves the entry at `from` to `to` in insertion order.
    pub fn reorder_schedules(&self, from: usize, to: usize) -> bool {
        self.commit_if(|state| {
            let len = state.schedules.len();
            if from >= len || to >= len {
                return false;
            }
            let moved = state.schedules.remove(from);
            state.schedules.insert(to, moved);
            from != to
        })
    }

    /// Creates an entry for `location`, synthesizing a tour if none is held.
    ///
    /// Defaults: title and content from the place, today's date, a two hour
    /// window starting now. `overrides` is applied on top.
    pub fn add_location_to_schedule(
        &self,
        location: LocationData,
        overrides: SchedulePatch,
    ) -> AddedEntry {
        let now = self.inner.clock.now();
        let start = TimeOfDay::from_naive(now.time());
        let schedule_id = self.next_id();
        let map_id = self.next_id();

        let mut tour_id = TourId::Draft(0);
        self.commit(|state| {
            tour_id = state.tour.get_or_insert_with(|| self.default_tour()).id;
            let mut schedule = NewSchedule::new(
                tour_id,
                location.name.clone(),
                now.date(),
                start,
                start.plus_minutes(DEFAULT_VISIT_MINUTES),
            )
            .with_content(location.address.clone())
            .into_schedule(schedule_id);
            overrides.apply(&mut schedule);
            schedule.attachment = Some(Attachment::Location(MapEntity {
                id: map_id,
                schedule_id,
                tour_id,
                location,
            }));
            state.schedules.push(schedule);
        });
        let added = AddedEntry {
            tour_id,
            schedule_id,
            attachment_id: map_id,
        };
        tracing::debug!(
            "add_location_to_schedule: schedule {} map {}",
            added.schedule_id,
            added.attachment_id
        );
        added
    }

    /// Creates an entry for `route`, synthesizing a tour if none is held.
    ///
    /// The entry spans the route's own departure and arrival times and is
    /// titled `"{departure} → {destination}"`.
    pub fn add_route_to_schedule(&self, route: RouteResult, overrides: SchedulePatch) -> AddedEntry {
        let now = self.inner.clock.now();
        let spend_time = self.inner.clock.now_utc();
        let schedule_id = self.next_id();
        let traffic_id = self.next_id();

        let mut tour_id = TourId::Draft(0);
        self.commit(|state| {
            tour_id = state.tour.get_or_insert_with(|| self.default_tour()).id;
            let mut schedule = NewSchedule::new(
                tour_id,
                format!("{} → {}", route.departure, route.destination),
                now.date(),
                route.departure_time,
                route.arrival_time,
            )
            .with_content(format!(
                "{} min, {} transfer(s)",
                route.duration, route.transfers
            ))
            .into_schedule(schedule_id);
            overrides.apply(&mut schedule);
            schedule.attachment = Some(Attachment::Route(Traffic {
                id: traffic_id,
                tour_id,
                vehicle: VehicleData::from_route(&route),
                spend_time,
                price: route.price,
                departure_time: route.departure_time,
                arrival_time: route.arrival_time,
                route: route.summary(),
            }));
            state.schedules.push(schedule);
        });
        let added = AddedEntry {
            tour_id,
            schedule_id,
            attachment_id: traffic_id,
        };
        tracing::debug!(
            "add_route_to_schedule: schedule {} traffic {}",
            added.schedule_id,
            added.attachment_id
        );
        added
    }

    // ------------------------------------------------------------------
    // Attachments
    // ------------------------------------------------------------------

    /// Detaches the location with `id`. The schedule entry is kept.
    pub fn remove_map_entity(&self, id: i64) -> bool {
        self.commit_if(|state| {
            detach(state, |a| matches!(a, Attachment::Location(m) if m.id == id))
        })
    }

    pub fn update_map_entity(&self, id: i64, location: LocationData) -> bool {
        self.commit_if(|state| {
            for schedule in &mut state.schedules {
                if let Some(Attachment::Location(entity)) = &mut schedule.attachment {
                    if entity.id == id {
                        entity.location = location;
                        return true;
                    }
                }
            }
            false
        })
    }

    /// Detaches the route with `id`. The schedule entry is kept.
    pub fn remove_traffic(&self, id: i64) -> bool {
        self.commit_if(|state| {
            detach(state, |a| matches!(a, Attachment::Route(t) if t.id == id))
        })
    }

    // ------------------------------------------------------------------
    // Weather and UI state
    // ------------------------------------------------------------------

    pub fn set_weather(&self, weather: Vec<Weather>) {
        self.commit(|state| state.weather = weather);
    }

    pub fn set_selected_location(&self, location: Option<LocationData>) {
        self.commit(|state| state.selected_location = location);
    }

    pub fn set_route_results(&self, results: Vec<RouteResult>) {
        self.commit(|state| state.route_results = results);
    }

    pub fn set_route_panel_open(&self, open: bool) {
        self.commit(|state| state.route_panel_open = open);
    }

    pub fn toggle_route_panel(&self) -> bool {
        let mut open = false;
        self.commit(|state| {
            state.route_panel_open = !state.route_panel_open;
            open = state.route_panel_open;
        });
        open
    }

    pub fn set_selected_day_index(&self, index: usize) {
        self.commit(|state| state.selected_day_index = index);
    }

    pub fn set_loading(&self, loading: bool) {
        self.commit(|state| state.loading = loading);
    }

    pub fn set_error(&self, error: Option<String>) {
        self.commit(|state| state.error = error);
    }

    /// Records a failed operation: error message set, loading cleared.
    pub fn fail(&self, message: impl Into<String>) {
        let message = message.into();
        self.commit(|state| {
            state.error = Some(message);
            state.loading = false;
        });
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn commit(&self, f: impl FnOnce(&mut ItineraryState)) {
        self.inner.state.send_modify(|state| {
            f(state);
            state.revision += 1;
        });
    }

    fn commit_if(&self, f: impl FnOnce(&mut ItineraryState) -> bool) -> bool {
        self.inner.state.send_if_modified(|state| {
            let changed = f(state);
            if changed {
                state.revision += 1;
            }
            changed
        })
    }

    fn empty_tour(&self) -> Tour {
        let today = self.today();
        Tour::new(TourId::Draft(self.next_id()), "", today, today)
            .with_budget(BudgetTier::Medium)
            .with_travelers(DEFAULT_TRAVELERS)
    }

    fn default_tour(&self) -> Tour {
        let today = self.today();
        let tour = Tour::new(
            TourId::Draft(self.next_id()),
            DEFAULT_TOUR_TITLE,
            today,
            today + Duration::days(DEFAULT_TOUR_SPAN_DAYS),
        );
        tracing::info!("Created default tour {}", tour.id);
        tour
    }
}

fn detach(state: &mut ItineraryState, is_target: impl Fn(&Attachment) -> bool) -> bool {
    for schedule in &mut state.schedules {
        if schedule.attachment.as_ref().is_some_and(&is_target) {
            schedule.attachment = None;
            return true;
        }
    }
    false
}

fn retarget_tour(state: &mut ItineraryState, old: TourId, new: TourId) {
    for schedule in &mut state.schedules {
        if schedule.tour_id == old {
            schedule.tour_id = new;
        }
        match &mut schedule.attachment {
            Some(Attachment::Location(entity)) if entity.tour_id == old => entity.tour_id = new,
            Some(Attachment::Route(traffic)) if traffic.tour_id == old => traffic.tour_id = new,
            _ => {}
        }
    }
}

fn observe_ids(ids: &IdGenerator, state: &ItineraryState) {
    if let Some(max) = state.max_entity_id() {
        ids.observe(max);
    }
    if let Some(tour) = &state.tour {
        if tour.id.is_draft() {
            ids.observe(tour.id.value());
        }
    }
}

/// Schedules in `schedules` that fall on `date`.
pub fn filter_by_date(schedules: &[Schedule], date: NaiveDate) -> Vec<Schedule> {
    schedules.iter().filter(|s| s.date == date).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RouteStep, TransitMode};
    use chrono::NaiveDateTime;
    use std::collections::HashSet;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn store_at(h: u32, m: u32) -> (ItineraryStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(at(h, m)));
        (ItineraryStore::with_clock(clock.clone()), clock)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, d).unwrap()
    }

    fn new_entry(tour_id: TourId, title: &str) -> NewSchedule {
        NewSchedule::new(
            tour_id,
            title,
            date(15),
            "09:00".parse().unwrap(),
            "10:00".parse().unwrap(),
        )
    }

    fn route_a_to_b() -> RouteResult {
        RouteResult {
            departure: "A".to_string(),
            destination: "B".to_string(),
            departure_time: "11:15".parse().unwrap(),
            arrival_time: "11:20".parse().unwrap(),
            duration: 5,
            transfers: 0,
            price: 1500,
            route: vec![RouteStep {
                mode: TransitMode::Subway,
                line: "Line 3".to_string(),
                departure: "A".to_string(),
                arrival: "B".to_string(),
                departure_time: "11:15".parse().unwrap(),
                arrival_time: "11:20".parse().unwrap(),
            }],
        }
    }

    #[test]
    fn test_add_schedule_ids_distinct_at_distinct_timestamps() {
        let (store, clock) = store_at(9, 0);
        let mut seen = HashSet::new();
        for _ in 0..20 {
            let id = store.add_schedule(new_entry(TourId::Draft(1), "x"));
            assert!(seen.insert(id));
            clock.advance(Duration::milliseconds(1));
        }
        assert_eq!(store.snapshot().schedules.len(), 20);
    }

    #[test]
    fn test_add_schedule_ids_distinct_within_one_millisecond() {
        let (store, _clock) = store_at(9, 0);
        let a = store.add_schedule(new_entry(TourId::Draft(1), "a"));
        let b = store.add_schedule(new_entry(TourId::Draft(1), "b"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_update_schedule() {
        let (store, _clock) = store_at(9, 0);
        let id = store.add_schedule(new_entry(TourId::Draft(1), "Palace"));
        let patch = SchedulePatch {
            title: Some("Palace tour".to_string()),
            ..Default::default()
        };
        assert!(store.update_schedule(id, &patch));
        assert!(!store.update_schedule(id + 1_000, &patch));
        assert_eq!(store.snapshot().schedule(id).unwrap().title, "Palace tour");
    }

    #[test]
    fn test_update_missing_schedule_is_not_a_transition() {
        let (store, _clock) = store_at(9, 0);
        let before = store.snapshot().revision;
        assert!(!store.update_schedule(42, &SchedulePatch::default()));
        assert_eq!(store.snapshot().revision, before);
    }

    #[test]
    fn test_remove_schedule_cascades_location() {
        let (store, _clock) = store_at(9, 0);
        let added = store.add_location_to_schedule(
            LocationData::new("Gyeongbokgung", "161 Sajik-ro"),
            SchedulePatch::default(),
        );
        assert_eq!(store.snapshot().map_entities().len(), 1);

        assert!(store.remove_schedule(added.schedule_id));
        let state = store.snapshot();
        assert!(state
            .map_entities()
            .iter()
            .all(|m| m.schedule_id != added.schedule_id));
        assert!(state.map_entities().is_empty());
    }

    #[test]
    fn test_add_location_synthesizes_single_tour() {
        let (store, _clock) = store_at(9, 0);
        let mut rx = store.subscribe();
        let before = store.snapshot().revision;

        let added = store.add_location_to_schedule(
            LocationData::new("Gyeongbokgung", "161 Sajik-ro"),
            SchedulePatch::default(),
        );

        let state = store.snapshot();
        assert_eq!(state.revision, before + 1);
        let tour = state.tour.as_ref().unwrap();
        assert_eq!(tour.title, DEFAULT_TOUR_TITLE);
        assert_eq!(tour.start_date, date(15));
        assert_eq!(tour.end_date, date(22));
        assert_eq!(tour.id, added.tour_id);
        assert!(tour.id.is_draft());

        let schedule = state.schedule(added.schedule_id).unwrap();
        assert_eq!(schedule.tour_id, tour.id);
        assert_eq!(schedule.title, "Gyeongbokgung");
        assert_eq!(schedule.content, "161 Sajik-ro");
        assert_eq!(schedule.start_time.to_string(), "09:00");
        assert_eq!(schedule.end_time.to_string(), "11:00");
        let entity = schedule.location().unwrap();
        assert_eq!(entity.id, added.attachment_id);
        assert_eq!(entity.schedule_id, schedule.id);
        assert_eq!(entity.tour_id, tour.id);

        assert!(rx.has_changed().unwrap());
        let observed = rx.borrow_and_update();
        assert!(observed.tour.is_some());
        assert_eq!(observed.map_entities().len(), 1);
    }

    #[test]
    fn test_second_add_reuses_held_tour() {
        let (store, _clock) = store_at(9, 0);
        let first = store.add_location_to_schedule(
            LocationData::new("Gyeongbokgung", "161 Sajik-ro"),
            SchedulePatch::default(),
        );
        let second = store.add_route_to_schedule(route_a_to_b(), SchedulePatch::default());
        assert_eq!(first.tour_id, second.tour_id);
        assert_eq!(store.snapshot().schedules.len(), 2);
    }

    #[test]
    fn test_add_location_overrides() {
        let (store, _clock) = store_at(9, 0);
        let added = store.add_location_to_schedule(
            LocationData::new("Cafe", "1 Main St"),
            SchedulePatch {
                date: Some(date(16)),
                start_time: Some("15:00".parse().unwrap()),
                end_time: Some("16:00".parse().unwrap()),
                ..Default::default()
            },
        );
        let state = store.snapshot();
        let schedule = state.schedule(added.schedule_id).unwrap();
        assert_eq!(schedule.date, date(16));
        assert_eq!(schedule.start_time.to_string(), "15:00");
        assert_eq!(schedule.title, "Cafe");
    }

    #[test]
    fn test_add_route_builds_title_and_summary() {
        let (store, _clock) = store_at(8, 0);
        let added = store.add_route_to_schedule(route_a_to_b(), SchedulePatch::default());

        let state = store.snapshot();
        assert_eq!(state.tour.as_ref().unwrap().id, added.tour_id);
        let schedule = state.schedule(added.schedule_id).unwrap();
        assert_eq!(schedule.title, "A → B");
        assert_eq!(schedule.start_time.to_string(), "11:15");
        assert_eq!(schedule.end_time.to_string(), "11:20");
        assert_eq!(schedule.tour_id, added.tour_id);
        let traffic = schedule.traffic().unwrap();
        assert_eq!(traffic.route, "Line 3 (A → B)");
        assert_eq!(traffic.price, 1500);
        assert_eq!(traffic.vehicle.total_duration, "5 min");
        assert_eq!(state.estimated_budget(), 1500);
    }

    #[test]
    fn test_remove_traffic_keeps_schedule() {
        let (store, _clock) = store_at(8, 0);
        let added = store.add_route_to_schedule(route_a_to_b(), SchedulePatch::default());
        assert!(store.remove_traffic(added.attachment_id));
        assert!(!store.remove_traffic(added.attachment_id));
        let state = store.snapshot();
        assert!(state.traffic().is_empty());
        assert!(state.schedule(added.schedule_id).is_some());
    }

    #[test]
    fn test_remove_and_update_map_entity() {
        let (store, _clock) = store_at(9, 0);
        let added = store.add_location_to_schedule(
            LocationData::new("Cafe", "1 Main St"),
            SchedulePatch::default(),
        );
        assert!(store.update_map_entity(
            added.attachment_id,
            LocationData::new("Cafe Two", "2 Main St")
        ));
        assert_eq!(
            store.snapshot().map_entities()[0].location.name,
            "Cafe Two"
        );
        assert!(store.remove_map_entity(added.attachment_id));
        assert!(store.snapshot().map_entities().is_empty());
        assert_eq!(store.snapshot().schedules.len(), 1);
    }

    #[test]
    fn test_update_tour_fields_initializes_defaults() {
        let (store, _clock) = store_at(9, 0);
        store.update_tour_fields(TourPatch {
            title: Some("Seoul".to_string()),
            ..Default::default()
        });
        let tour = store.snapshot().tour.unwrap();
        assert_eq!(tour.title, "Seoul");
        assert_eq!(tour.budget, Some(BudgetTier::Medium));
        assert_eq!(tour.travelers, Some(2));
    }

    #[test]
    fn test_update_tour_fields_merges_existing() {
        let (store, _clock) = store_at(9, 0);
        store.set_tour(Tour::new(TourId::Persisted(4), "Busan", date(1), date(3)));
        let id = store.update_tour_fields(TourPatch {
            travelers: Some(5),
            ..Default::default()
        });
        let tour = store.snapshot().tour.unwrap();
        assert_eq!(id, TourId::Persisted(4));
        assert_eq!(tour.title, "Busan");
        assert_eq!(tour.travelers, Some(5));
        assert!(tour.budget.is_none());
    }

    #[test]
    fn test_clear_and_reset_tour() {
        let (store, _clock) = store_at(9, 0);
        store.set_tour(Tour::new(TourId::Persisted(4), "Busan", date(1), date(3)));
        store.clear_tour();
        assert!(store.snapshot().tour.is_none());

        let id = store.reset_tour();
        let tour = store.snapshot().tour.unwrap();
        assert_eq!(tour.id, id);
        assert!(tour.title.is_empty());
        assert_eq!(tour.travelers, Some(2));
    }

    #[test]
    fn test_reset_clears_everything() {
        let (store, _clock) = store_at(9, 0);
        store.add_route_to_schedule(route_a_to_b(), SchedulePatch::default());
        store.set_error(Some("x".to_string()));
        store.reset();
        let state = store.snapshot();
        assert!(state.tour.is_none());
        assert!(state.schedules.is_empty());
        assert!(state.error.is_none());
    }

    #[test]
    fn test_apply_saved_tour_rewrites_draft_references() {
        let (store, _clock) = store_at(9, 0);
        let added = store.add_location_to_schedule(
            LocationData::new("Cafe", "1 Main St"),
            SchedulePatch::default(),
        );
        store.set_loading(true);

        let mut saved = store.snapshot().tour.unwrap();
        saved.id = TourId::Persisted(77);
        saved.created_at = Some(store.clock().now_utc());
        let merged = store.apply_saved_tour(added.tour_id, saved);

        let state = store.snapshot();
        assert_eq!(merged.id, TourId::Persisted(77));
        assert_eq!(state.tour.as_ref().unwrap().id, TourId::Persisted(77));
        let schedule = state.schedule(added.schedule_id).unwrap();
        assert_eq!(schedule.tour_id, TourId::Persisted(77));
        assert_eq!(schedule.location().unwrap().tour_id, TourId::Persisted(77));
        assert!(!state.loading);
    }

    #[test]
    fn test_apply_saved_tour_ignores_other_draft() {
        let (store, clock) = store_at(9, 0);
        let first = store.add_location_to_schedule(
            LocationData::new("Cafe", "1 Main St"),
            SchedulePatch::default(),
        );
        let mut saved = store.snapshot().tour.unwrap();
        saved.id = TourId::Persisted(77);

        store.reset();
        clock.advance(Duration::milliseconds(5));
        let second = store.add_location_to_schedule(
            LocationData::new("Park", "2 Main St"),
            SchedulePatch::default(),
        );
        assert_ne!(first.tour_id, second.tour_id);
        store.set_loading(true);

        let merged = store.apply_saved_tour(first.tour_id, saved);
        assert_eq!(merged.id, TourId::Persisted(77));

        let state = store.snapshot();
        assert_eq!(state.tour.as_ref().unwrap().id, second.tour_id);
        assert!(state.schedules.iter().all(|s| s.tour_id == second.tour_id));
        assert!(!state.loading);
    }

    #[test]
    fn test_reorder_schedules() {
        let (store, clock) = store_at(9, 0);
        let a = store.add_schedule(new_entry(TourId::Draft(1), "a"));
        clock.advance(Duration::milliseconds(5));
        let b = store.add_schedule(new_entry(TourId::Draft(1), "b"));
        assert!(store.reorder_schedules(1, 0));
        let ids: Vec<i64> = store.snapshot().schedules.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![b, a]);
        assert!(!store.reorder_schedules(0, 5));
    }

    #[test]
    fn test_ui_state_setters() {
        let (store, _clock) = store_at(9, 0);
        assert!(store.toggle_route_panel());
        assert!(!store.toggle_route_panel());
        store.set_route_panel_open(true);
        store.set_selected_day_index(2);
        store.set_route_results(vec![route_a_to_b()]);
        store.set_selected_location(Some(LocationData::new("Cafe", "1 Main St")));
        store.set_weather(vec![Weather::new(date(15), 29.5, "Sunny")]);
        store.fail("network down");
        let state = store.snapshot();
        assert!(state.route_panel_open);
        assert_eq!(state.selected_day_index, 2);
        assert_eq!(state.route_results.len(), 1);
        assert!(state.selected_location.is_some());
        assert_eq!(state.weather.len(), 1);
        assert_eq!(state.error.as_deref(), Some("network down"));
        assert!(!state.loading);
    }

    #[test]
    fn test_restored_state_ids_do_not_collide() {
        let (store, _clock) = store_at(9, 0);
        let first = store.add_schedule(new_entry(TourId::Draft(1), "a"));
        let restored = ItineraryStore::from_state(
            store.snapshot(),
            Arc::new(ManualClock::new(at(8, 0))),
        );
        let second = restored.add_schedule(new_entry(TourId::Draft(1), "b"));
        assert!(second > first);
    }

    #[test]
    fn test_filter_by_date() {
        let (store, _clock) = store_at(9, 0);
        store.add_schedule(new_entry(TourId::Draft(1), "a"));
        let schedules = store.snapshot().schedules;
        assert_eq!(filter_by_date(&schedules, date(15)).len(), 1);
        assert!(filter_by_date(&schedules, date(16)).is_empty());
    }
}
