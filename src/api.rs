use crate::error::ApiError;
use crate::fields;
use crate::models::{AssignRequest, Cluster, ClusterDetail, ClusterPage, Model};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub const HOME_CLUSTER_LIMIT: u32 = 20;
pub const ASSIGN_CLUSTER_LIMIT: u32 = 50;
pub const MODEL_LIMIT: u32 = 100;

/// Filter and paging for the cluster listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterQuery {
    pub status: Option<&'static str>,
    pub offset: u32,
    pub limit: u32,
}

impl ClusterQuery {
    /// What the chat home shows: active clusters only.
    pub const fn home() -> Self {
        Self { status: Some("Active"), offset: 0, limit: HOME_CLUSTER_LIMIT }
    }

    /// What the assignment form loads; filtered to ready clusters client-side.
    pub const fn assignable() -> Self {
        Self { status: None, offset: 0, limit: ASSIGN_CLUSTER_LIMIT }
    }
}

// Trait defining the services the UI talks to
#[async_trait]
pub trait DepinApi: Send + Sync {
    async fn list_clusters(&self, query: ClusterQuery) -> Result<Vec<Cluster>, ApiError>;

    async fn cluster_detail(&self, cluster_id: &str) -> Result<ClusterDetail, ApiError>;

    async fn list_models(&self) -> Result<Vec<Model>, ApiError>;

    async fn assign_model(&self, request: &AssignRequest) -> Result<(), ApiError>;

    /// Posts a prompt to `<endpoint>/chat` and returns the raw response body.
    async fn send_chat(&self, endpoint: &str, prompt: &str) -> Result<Value, ApiError>;
}

#[derive(Serialize, Debug)]
struct ChatRequestBody<'a> {
    prompt: &'a str,
}

// --- reqwest implementation ---

pub struct HttpDepinApi {
    client: Client,
    base_url: String,
}

impl HttpDepinApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("GET {} {:?}", url, query);
        let response = self.client.get(&url).query(query).send().await?;
        let body = ensure_success(response, &url).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn post_json<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<Response, ApiError> {
        log::debug!("POST {}", url);
        let response = self.client.post(url).json(body).send().await?;
        ensure_success(response, url).await
    }
}

async fn ensure_success(response: Response, url: &str) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error_body = response.text().await.unwrap_or_else(|_| "<Failed to read error body>".to_string());
    log::error!("Request to {} failed with status {}: {}", url, status, error_body);
    Err(ApiError::Status(status.as_u16()))
}

#[async_trait]
impl DepinApi for HttpDepinApi {
    async fn list_clusters(&self, query: ClusterQuery) -> Result<Vec<Cluster>, ApiError> {
        let mut params = Vec::with_capacity(3);
        if let Some(status) = query.status {
            params.push(("status", status.to_string()));
        }
        params.push(("offset", query.offset.to_string()));
        params.push(("limit", query.limit.to_string()));

        let page: ClusterPage = self.get_json("/api/v1/cluster/list", &params).await?;
        let clusters = page.data.unwrap_or_default();
        log::info!("Fetched {} clusters", clusters.len());
        Ok(clusters)
    }

    async fn cluster_detail(&self, cluster_id: &str) -> Result<ClusterDetail, ApiError> {
        let path = format!("/api/v1/cluster/prompt/{}", cluster_id);
        self.get_json(&path, &[]).await
    }

    async fn list_models(&self) -> Result<Vec<Model>, ApiError> {
        let params = [("offset", "0".to_string()), ("limit", MODEL_LIMIT.to_string())];
        let body: Value = self.get_json("/api/v1/model/list", &params).await?;
        let models = fields::normalize_models(&body);
        log::info!("Fetched {} models", models.len());
        Ok(models)
    }

    async fn assign_model(&self, request: &AssignRequest) -> Result<(), ApiError> {
        let url = format!("{}/api/v1/model/assign", self.base_url);
        log::info!("Assigning model {} to cluster {}", request.model_id, request.cluster_id);
        self.post_json(&url, request).await?;
        Ok(())
    }

    async fn send_chat(&self, endpoint: &str, prompt: &str) -> Result<Value, ApiError> {
        let url = format!("{}/chat", endpoint.trim_end_matches('/'));
        let response = self.post_json(&url, &ChatRequestBody { prompt }).await?;
        let body = response.text().await?;
        // Non-JSON replies are kept as a plain string value
        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}
