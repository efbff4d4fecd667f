//! HTTP implementation of the queue API

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::{ApiResponse, ClosedLanes, EntryStatus, Lane, QueueEntry, SyncStatus};

use crate::api::QueueApi;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// HTTP client for making network requests to the Waitline backend
#[derive(Debug, Clone)]
pub struct HttpQueueApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpQueueApi {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Build authorization header value
    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    /// Make a GET request
    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.get(&url);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.post(&url).json(body);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a PUT request without body
    async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.put(&url);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, text));
        }

        response.json().await.map_err(Into::into)
    }

    fn unwrap_data<T>(resp: ApiResponse<T>, what: &str) -> ClientResult<T> {
        resp.data
            .ok_or_else(|| ClientError::InvalidResponse(format!("Missing {what} data")))
    }
}

/// Map an error status code onto a client error
fn error_for_status(status: StatusCode, text: String) -> ClientError {
    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::FORBIDDEN => ClientError::Forbidden(text),
        StatusCode::NOT_FOUND => ClientError::NotFound(text),
        StatusCode::BAD_REQUEST => ClientError::Validation(text),
        _ => ClientError::Internal(text),
    }
}

#[async_trait]
impl QueueApi for HttpQueueApi {
    async fn closed_lanes(&self) -> ClientResult<ClosedLanes> {
        let resp = self
            .get::<ApiResponse<ClosedLanes>>("/api/lanes/closed")
            .await?;
        Self::unwrap_data(resp, "closed lanes")
    }

    async fn lanes_with_counts(&self) -> ClientResult<Vec<Lane>> {
        let resp = self.get::<ApiResponse<Vec<Lane>>>("/api/lanes").await?;
        Self::unwrap_data(resp, "lane list")
    }

    async fn queue_entries(&self, lane_id: &str) -> ClientResult<Vec<QueueEntry>> {
        let path = format!("/api/entries?status=waiting,called&lane_id={lane_id}");
        let resp = self.get::<ApiResponse<Vec<QueueEntry>>>(&path).await?;
        Self::unwrap_data(resp, "queue entries")
    }

    async fn swap_order(&self, entry_a: &str, entry_b: &str) -> ClientResult<()> {
        let path = format!("/api/entries/reorder/{entry_a}/{entry_b}");
        self.put_empty::<ApiResponse<()>>(&path).await?;
        Ok(())
    }

    async fn close_lane(&self, lane_id: &str) -> ClientResult<()> {
        #[derive(serde::Serialize)]
        struct CloseLaneRequest<'a> {
            lane_id: &'a str,
        }

        self.post::<ApiResponse<()>, _>("/api/lanes/close", &CloseLaneRequest { lane_id })
            .await?;
        Ok(())
    }

    async fn call_entry(&self, entry_id: &str) -> ClientResult<()> {
        let path = format!("/api/entries/{entry_id}/call");
        self.put_empty::<ApiResponse<()>>(&path).await?;
        Ok(())
    }

    async fn update_status(&self, entry_id: &str, status: EntryStatus) -> ClientResult<()> {
        #[derive(serde::Serialize)]
        struct StatusRequest {
            status: EntryStatus,
        }

        let path = format!("/api/entries/{entry_id}/status");
        self.post::<ApiResponse<()>, _>(&path, &StatusRequest { status })
            .await?;
        Ok(())
    }

    async fn move_entry(&self, entry_id: &str, target_lane_id: &str) -> ClientResult<()> {
        #[derive(serde::Serialize)]
        struct MoveRequest<'a> {
            lane_id: &'a str,
        }

        let path = format!("/api/entries/{entry_id}/move");
        self.post::<ApiResponse<()>, _>(
            &path,
            &MoveRequest {
                lane_id: target_lane_id,
            },
        )
        .await?;
        Ok(())
    }

    async fn insert_empty_seat(&self, lane_id: &str) -> ClientResult<()> {
        #[derive(serde::Serialize)]
        struct EmptySeatRequest<'a> {
            lane_id: &'a str,
        }

        self.post::<ApiResponse<()>, _>("/api/entries/empty-seat", &EmptySeatRequest { lane_id })
            .await?;
        Ok(())
    }

    async fn sync_status(&self, tenant_id: &str) -> ClientResult<SyncStatus> {
        let path = format!("/api/sync/token/{tenant_id}");
        let resp = self.get::<ApiResponse<SyncStatus>>(&path).await?;
        Self::unwrap_data(resp, "sync status")
    }
}
