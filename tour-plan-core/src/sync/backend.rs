//! Persistence server access.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::error::SyncError;
use super::wire::{Envelope, PlanDataDto, TourDto, TourPlanDto};

/// Tour storage operations offered by the persistence server.
#[async_trait]
pub trait TourBackend: Send + Sync {
    async fn fetch_tour(&self, id: i64) -> Result<TourDto, SyncError>;

    /// Every tour on the server, regardless of owner.
    async fn list_all_tours(&self) -> Result<Vec<TourDto>, SyncError>;

    async fn list_tours(&self, owner_id: i64) -> Result<Vec<TourDto>, SyncError>;

    /// Creates a tour and returns it with its server-assigned id.
    async fn create_tour(&self, tour: &TourDto) -> Result<TourDto, SyncError>;

    async fn update_tour(&self, id: i64, tour: &TourDto) -> Result<TourDto, SyncError>;

    async fn delete_tour(&self, id: i64) -> Result<(), SyncError>;

    /// Reads tour `id` together with its whole plan.
    async fn fetch_plan(&self, id: i64) -> Result<TourPlanDto, SyncError>;

    /// Replaces the plan stored for tour `id`.
    async fn save_plan(&self, id: i64, plan: &PlanDataDto) -> Result<(), SyncError>;
}

/// [`TourBackend`] over the server's JSON HTTP API.
#[derive(Debug, Clone)]
pub struct HttpTourBackend {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpTourBackend {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the URL for `path`, defaulting to `http://` when the configured
    /// base has no scheme.
    fn build_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.starts_with("http://") || base.starts_with("https://") {
            format!("{}{}", base, path)
        } else {
            format!("http://{}{}", base, path)
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = self.build_url(path);
        tracing::debug!("{} {}", method, url);
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<String, SyncError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SyncError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, SyncError> {
        let body = self.send(builder).await?;
        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| SyncError::Decode(e.to_string()))?;
        Ok(envelope.into_inner())
    }
}

#[async_trait]
impl TourBackend for HttpTourBackend {
    async fn fetch_tour(&self, id: i64) -> Result<TourDto, SyncError> {
        let path = format!("/tours/{}", id);
        self.send_json(self.request(reqwest::Method::GET, &path))
            .await
    }

    async fn list_all_tours(&self) -> Result<Vec<TourDto>, SyncError> {
        self.send_json(self.request(reqwest::Method::GET, "/tours"))
            .await
    }

    async fn list_tours(&self, owner_id: i64) -> Result<Vec<TourDto>, SyncError> {
        let path = format!("/tours/user/{}", owner_id);
        self.send_json(self.request(reqwest::Method::GET, &path))
            .await
    }

    async fn create_tour(&self, tour: &TourDto) -> Result<TourDto, SyncError> {
        self.send_json(self.request(reqwest::Method::POST, "/tours").json(tour))
            .await
    }

    async fn update_tour(&self, id: i64, tour: &TourDto) -> Result<TourDto, SyncError> {
        let path = format!("/tours/{}", id);
        self.send_json(self.request(reqwest::Method::PUT, &path).json(tour))
            .await
    }

    async fn delete_tour(&self, id: i64) -> Result<(), SyncError> {
        let path = format!("/tours/{}", id);
        self.send(self.request(reqwest::Method::DELETE, &path))
            .await
            .map(|_| ())
    }

    async fn fetch_plan(&self, id: i64) -> Result<TourPlanDto, SyncError> {
        let path = format!("/tours/{}/plan", id);
        self.send_json(self.request(reqwest::Method::GET, &path))
            .await
    }

    async fn save_plan(&self, id: i64, plan: &PlanDataDto) -> Result<(), SyncError> {
        let path = format!("/tours/{}/plan", id);
        self.send(self.request(reqwest::Method::POST, &path).json(plan))
            .await
            .map(|_| ())
    }
}
