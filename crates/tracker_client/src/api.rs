use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracker_logging::tracker_debug;
use url::Url;

use crate::types::{MissingBody, RefreshResponse, SubmitRequest, SubmitResponse, TaskStatusBody};
use crate::{
    ApiError, ChapterEntry, FailureKind, MissingChapters, NewNovelRequest, Novel, NovelId,
    TaskStatus,
};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVER_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// The tracker server's JSON API.
#[async_trait::async_trait]
pub trait NovelApi: Send + Sync {
    async fn list_novels(&self) -> Result<Vec<Novel>, ApiError>;
    async fn create_novel(&self, novel: &NewNovelRequest) -> Result<Novel, ApiError>;
    async fn delete_novel(&self, novel_id: NovelId) -> Result<(), ApiError>;
    /// Starts a server-side refresh and returns the task id to poll.
    async fn start_refresh(&self, novel_id: NovelId) -> Result<String, ApiError>;
    async fn task_status(&self, task_id: &str) -> Result<TaskStatus, ApiError>;
    async fn missing_chapters(&self, novel_id: NovelId) -> Result<MissingChapters, ApiError>;
    /// Queues chapters for submission; returns how many the server queued.
    async fn submit_chapters(
        &self,
        novel_id: NovelId,
        chapters: &[ChapterEntry],
    ) -> Result<usize, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    base_url: Url,
    client: reqwest::Client,
}

impl ReqwestApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let base_url = parse_base_url(&settings.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.endpoint(path)?;
        tracker_debug!("{} {}", method, url);
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        request.send().await.map_err(map_reqwest_error)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let response = self.send(method, path, body).await?;
        let response = ensure_success(response)?;
        decode(response).await
    }
}

#[async_trait::async_trait]
impl NovelApi for ReqwestApi {
    async fn list_novels(&self) -> Result<Vec<Novel>, ApiError> {
        self.send_json(Method::GET, "api/novels", None).await
    }

    async fn create_novel(&self, novel: &NewNovelRequest) -> Result<Novel, ApiError> {
        self.send_json(Method::POST, "api/novels", Some(to_body(novel)?))
            .await
    }

    async fn delete_novel(&self, novel_id: NovelId) -> Result<(), ApiError> {
        let response = self
            .send(Method::DELETE, &format!("api/novels/{novel_id}"), None)
            .await?;
        ensure_success(response).map(|_| ())
    }

    async fn start_refresh(&self, novel_id: NovelId) -> Result<String, ApiError> {
        let body: RefreshResponse = self
            .send_json(Method::POST, &format!("api/novels/{novel_id}/refresh"), None)
            .await?;
        Ok(body.task_id)
    }

    async fn task_status(&self, task_id: &str) -> Result<TaskStatus, ApiError> {
        let response = self
            .send(Method::GET, &format!("api/tasks/{task_id}"), None)
            .await?;
        // Unknown tasks come back as 404 with a regular status body.
        if response.status() == StatusCode::NOT_FOUND {
            return match decode::<TaskStatusBody>(response).await {
                Ok(body) => Ok(body.into()),
                Err(_) => Err(ApiError::new(
                    FailureKind::HttpStatus(StatusCode::NOT_FOUND.as_u16()),
                    "task not found",
                )),
            };
        }
        let response = ensure_success(response)?;
        let body: TaskStatusBody = decode(response).await?;
        Ok(body.into())
    }

    async fn missing_chapters(&self, novel_id: NovelId) -> Result<MissingChapters, ApiError> {
        let body: MissingBody = self
            .send_json(Method::GET, &format!("api/novels/{novel_id}/missing"), None)
            .await?;
        Ok(body.into())
    }

    async fn submit_chapters(
        &self,
        novel_id: NovelId,
        chapters: &[ChapterEntry],
    ) -> Result<usize, ApiError> {
        let request = to_body(&SubmitRequest { chapters })?;
        let body: SubmitResponse = self
            .send_json(
                Method::POST,
                &format!("api/novels/{novel_id}/submit"),
                Some(request),
            )
            .await?;
        Ok(body.queued)
    }
}

/// Parses the server URL and makes sure relative joins land under its path.
fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::new(
            FailureKind::InvalidUrl,
            format!("not an http(s) base url: {raw}"),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn to_body<T: Serialize>(body: &T) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ))
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
