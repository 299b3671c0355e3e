use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use super::backend::TourBackend;
use super::error::SyncError;
use super::session::SessionCache;
use super::wire::TourDto;
use crate::models::{PlanMetadata, Tour, TourId};
use crate::store::{ItineraryStore, PlanBundle};

/// Keeps the store's tour in step with the persistence server.
///
/// Failures from the server are logged and recorded as the store's error
/// message with the loading flag cleared. Nothing else in the store is
/// changed by a failed call.
pub struct RemoteSync<B> {
    store: ItineraryStore,
    backend: B,
    session: Option<SessionCache>,
    saving: Mutex<HashSet<TourId>>,
}

/// Marks a tour as being saved until dropped.
struct SaveGuard<'a> {
    saving: &'a Mutex<HashSet<TourId>>,
    id: TourId,
}

impl Drop for SaveGuard<'_> {
    fn drop(&mut self) {
        lock(self.saving).remove(&self.id);
    }
}

fn lock(saving: &Mutex<HashSet<TourId>>) -> MutexGuard<'_, HashSet<TourId>> {
    saving.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<B: TourBackend> RemoteSync<B> {
    pub fn new(store: ItineraryStore, backend: B) -> Self {
        Self {
            store,
            backend,
            session: None,
            saving: Mutex::new(HashSet::new()),
        }
    }

    /// Uses `session` to find the owner of tours that do not name one.
    pub fn with_session(mut self, session: SessionCache) -> Self {
        self.session = Some(session);
        self
    }

    pub fn store(&self) -> &ItineraryStore {
        &self.store
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn begin_save(&self, id: TourId) -> Option<SaveGuard<'_>> {
        lock(&self.saving).insert(id).then_some(SaveGuard {
            saving: &self.saving,
            id,
        })
    }

    fn resolve_owner(&self, tour: &Tour) -> Result<Option<i64>, SyncError> {
        if let Some(owner) = tour.owner_id {
            return Ok(Some(owner));
        }
        match &self.session {
            Some(cache) => Ok(cache.load()?.map(|s| s.user_id)),
            None => Ok(None),
        }
    }

    fn record_failure(&self, action: &str, err: &SyncError) {
        tracing::error!("Failed to {}: {}", action, err);
        self.store.fail(err.to_string());
    }

    /// Creates or updates the held tour on the server, then writes its plan
    /// through the nested plan endpoint. The server's identity and
    /// timestamps are merged back into the store.
    ///
    /// If the tour header is stored but the plan write fails, the server's
    /// identity is still adopted so that a retry updates rather than
    /// creating a duplicate.
    pub async fn save_tour(&self) -> Result<Tour, SyncError> {
        let state = self.store.snapshot();
        let mut tour = state.tour.clone().ok_or(SyncError::NoTour)?;
        let saved_from = tour.id;

        let owner = match self.resolve_owner(&tour) {
            Ok(Some(owner)) => owner,
            Ok(None) => {
                let err = SyncError::AuthenticationRequired;
                tracing::warn!("Cannot save tour {}: {}", tour.id, err);
                self.store.fail(err.to_string());
                return Err(err);
            }
            Err(err) => {
                self.record_failure("read session", &err);
                return Err(err);
            }
        };
        tour.owner_id = Some(owner);

        let _guard = self
            .begin_save(saved_from)
            .ok_or(SyncError::SaveInProgress(saved_from))?;

        self.store.set_loading(true);
        let metadata = state.plan_metadata(self.store.clock().now_utc());
        let dto = TourDto::from_plan(&tour, &state.schedules, &state.weather, &metadata);
        let plan = dto.plan_data.clone().unwrap_or_default();

        let result = match tour.persisted_id() {
            Some(id) => self.backend.update_tour(id, &dto).await,
            None => self.backend.create_tour(&dto).await,
        };

        let saved = result.and_then(|response| {
            let mut saved = response.to_tour(tour.persisted_id())?;
            saved.owner_id.get_or_insert(owner);
            if saved.metadata.is_none() {
                saved.metadata = Some(metadata);
            }
            Ok(saved)
        });
        let saved = match saved {
            Ok(saved) => saved,
            Err(err) => {
                self.record_failure("save tour", &err);
                return Err(err);
            }
        };

        let plan_result = self.backend.save_plan(saved.id.value(), &plan).await;
        let merged = self.store.apply_saved_tour(saved_from, saved);
        match plan_result {
            Ok(()) => {
                tracing::info!(
                    "Saved tour {} ({}) with {} schedule(s)",
                    merged.id,
                    merged.title,
                    plan.schedules.len()
                );
                Ok(merged)
            }
            Err(err) => {
                self.record_failure("save tour plan", &err);
                Err(err)
            }
        }
    }

    /// Replaces the store's plan with the server's copy of tour `id`, read
    /// through the nested plan endpoint.
    pub async fn load_tour(&self, id: i64) -> Result<Tour, SyncError> {
        self.store.set_loading(true);
        let store = &self.store;
        let loaded = self
            .backend
            .fetch_plan(id)
            .await
            .and_then(|plan| plan.into_tour_dto().into_bundle(|| store.next_id()));

        match loaded {
            Ok(bundle) => {
                let tour = bundle.tour.clone().ok_or(SyncError::NoTour)?;
                tracing::info!(
                    "Loaded tour {} with {} schedule(s)",
                    tour.id,
                    bundle.schedules.len()
                );
                self.store.replace_plan(bundle);
                Ok(tour)
            }
            Err(err) => {
                self.record_failure("load tour", &err);
                Err(err)
            }
        }
    }

    /// Every tour the server holds, regardless of owner.
    pub async fn list_all_tours(&self) -> Result<Vec<Tour>, SyncError> {
        self.store.set_loading(true);
        let listed = self.backend.list_all_tours().await.and_then(|dtos| {
            dtos.iter()
                .map(|dto| dto.to_tour(None))
                .collect::<Result<Vec<_>, _>>()
        });
        match listed {
            Ok(tours) => {
                self.store.set_loading(false);
                tracing::info!("Listed {} tour(s)", tours.len());
                Ok(tours)
            }
            Err(err) => {
                self.record_failure("list tours", &err);
                Err(err)
            }
        }
    }

    pub async fn list_tours(&self, owner_id: i64) -> Result<Vec<Tour>, SyncError> {
        self.store.set_loading(true);
        let listed = self.backend.list_tours(owner_id).await.and_then(|dtos| {
            dtos.iter()
                .map(|dto| dto.to_tour(None))
                .collect::<Result<Vec<_>, _>>()
        });
        match listed {
            Ok(tours) => {
                self.store.set_loading(false);
                tracing::info!("Listed {} tour(s) for user {}", tours.len(), owner_id);
                Ok(tours)
            }
            Err(err) => {
                self.record_failure("list tours", &err);
                Err(err)
            }
        }
    }

    /// Creates `template` on the server with an empty plan and holds the
    /// result as the current tour.
    pub async fn create_tour(&self, owner_id: i64, template: Tour) -> Result<Tour, SyncError> {
        self.store.set_loading(true);
        let mut tour = template.with_owner(owner_id);
        let metadata = PlanMetadata::empty(self.store.clock().now_utc());
        tour.metadata = Some(metadata.clone());
        let dto = TourDto::from_plan(&tour, &[], &[], &metadata);

        let created = self
            .backend
            .create_tour(&dto)
            .await
            .and_then(|response| response.to_tour(None));

        match created {
            Ok(mut created) => {
                created.owner_id.get_or_insert(owner_id);
                if created.metadata.is_none() {
                    created.metadata = Some(metadata);
                }
                tracing::info!("Created tour {} ({})", created.id, created.title);
                self.store.replace_plan(PlanBundle {
                    tour: Some(created.clone()),
                    ..Default::default()
                });
                Ok(created)
            }
            Err(err) => {
                self.record_failure("create tour", &err);
                Err(err)
            }
        }
    }

    /// Deletes tour `id` on the server. The store's plan is cleared if it
    /// held that tour.
    pub async fn delete_tour(&self, id: i64) -> Result<(), SyncError> {
        self.store.set_loading(true);
        match self.backend.delete_tour(id).await {
            Ok(()) => {
                let held = self
                    .store
                    .read(|s| s.tour.as_ref().and_then(Tour::persisted_id));
                if held == Some(id) {
                    self.store.replace_plan(PlanBundle::default());
                } else {
                    self.store.set_loading(false);
                }
                tracing::info!("Deleted tour {}", id);
                Ok(())
            }
            Err(err) => {
                self.record_failure("delete tour", &err);
                Err(err)
            }
        }
    }
}
