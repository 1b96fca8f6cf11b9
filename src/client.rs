//! Data service client.
//!
//! [`DataService`] is the seam between the dispatcher and the backend;
//! [`HttpService`] is the real implementation. Tests swap in a stub.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{ConsoleError, ConsoleResult};
use crate::protocol::{
    AggregateRequest, ClearResponse, ErrorResponse, FilterRequest, FrameInfo, FramesResponse,
    GroupByRequest, JoinRequest, JoinResponse, LoadRequest, LoadResponse, ScalarResponse,
    SelectRequest, TableResponse,
};

/// Everything the console asks of the backend.
#[async_trait]
pub trait DataService: Send + Sync {
    async fn load(&self, request: LoadRequest) -> ConsoleResult<LoadResponse>;
    async fn filter(&self, request: FilterRequest) -> ConsoleResult<TableResponse>;
    async fn select(&self, request: SelectRequest) -> ConsoleResult<TableResponse>;
    async fn aggregate_simple(&self, request: AggregateRequest) -> ConsoleResult<ScalarResponse>;
    async fn aggregate(&self, request: GroupByRequest) -> ConsoleResult<TableResponse>;
    async fn join(&self, request: JoinRequest) -> ConsoleResult<JoinResponse>;
    async fn clear(&self) -> ConsoleResult<ClearResponse>;
    async fn frames(&self) -> ConsoleResult<FramesResponse>;
    async fn frame_info(&self, name: &str) -> ConsoleResult<FrameInfo>;
}

/// HTTP client for the data service.
pub struct HttpService {
    client: Client,
    base_url: String,
}

impl HttpService {
    /// Build a client against `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ConsoleResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> ConsoleResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        decode(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ConsoleResult<T> {
        let response = self.client.get(self.url(path)).send().await?;
        decode(response).await
    }
}

/// Read a success body, or turn a failure status into a backend error
/// carrying the server's `error` message when it sent one.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ConsoleResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }
    let message = match response.json::<ErrorResponse>().await {
        Ok(ErrorResponse {
            error: Some(message),
        }) => message,
        _ => format!("Service returned {}", status),
    };
    Err(ConsoleError::backend(message))
}

#[async_trait]
impl DataService for HttpService {
    async fn load(&self, request: LoadRequest) -> ConsoleResult<LoadResponse> {
        self.post_json("/api/load", &request).await
    }

    async fn filter(&self, request: FilterRequest) -> ConsoleResult<TableResponse> {
        self.post_json("/api/filter", &request).await
    }

    async fn select(&self, request: SelectRequest) -> ConsoleResult<TableResponse> {
        self.post_json("/api/select", &request).await
    }

    async fn aggregate_simple(&self, request: AggregateRequest) -> ConsoleResult<ScalarResponse> {
        self.post_json("/api/aggregate-simple", &request).await
    }

    async fn aggregate(&self, request: GroupByRequest) -> ConsoleResult<TableResponse> {
        self.post_json("/api/aggregate", &request).await
    }

    async fn join(&self, request: JoinRequest) -> ConsoleResult<JoinResponse> {
        self.post_json("/api/join", &request).await
    }

    async fn clear(&self) -> ConsoleResult<ClearResponse> {
        self.post_json("/api/clear", &serde_json::json!({})).await
    }

    async fn frames(&self) -> ConsoleResult<FramesResponse> {
        self.get_json("/api/dataframes").await
    }

    async fn frame_info(&self, name: &str) -> ConsoleResult<FrameInfo> {
        self.get_json(&format!("/api/info/{}", name)).await
    }
}
