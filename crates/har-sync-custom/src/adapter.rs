use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use har_sync_core::{config_keys, InitOutcome, RemoteItemInfo, RemoteStorageClient, SyncError};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Bound on every wire call; expiry surfaces as a transport error.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Item descriptor returned by `GET /api/items`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemDto {
    id: String,
    name: String,
    #[serde(default)]
    is_folder: bool,
    #[serde(default)]
    last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    size: u64,
}

impl From<ItemDto> for RemoteItemInfo {
    fn from(dto: ItemDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            is_folder: dto.is_folder,
            last_modified: dto.last_modified,
            size: dto.size,
        }
    }
}

/// Request body for item creation and update.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemPayload<'a> {
    name: &'a str,
    content: &'a str,
    parent_id: Option<&'a str>,
}

struct State {
    http: Client,
    base_url: String,
    token: Option<String>,
}

/// `RemoteStorageClient` implementation against a bearer-token REST endpoint.
///
/// Remote ids are server-assigned opaque identifiers, extracted from the
/// response body of every write.
#[derive(Default)]
pub struct CustomApiAdapter {
    state: Option<State>,
}

impl CustomApiAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<&State, SyncError> {
        self.state.as_ref().ok_or(SyncError::NotInitialized)
    }

    fn request(&self, state: &State, method: Method, path: &str) -> RequestBuilder {
        let builder = state.http.request(method, format!("{}{path}", state.base_url));
        match &state.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[async_trait]
impl RemoteStorageClient for CustomApiAdapter {
    fn name(&self) -> &'static str {
        "Custom Server"
    }

    #[instrument(skip(self, config), level = "debug")]
    async fn initialize(
        &mut self,
        config: &HashMap<String, String>,
    ) -> Result<InitOutcome, SyncError> {
        let base_url = config
            .get(config_keys::BASE_URL)
            .map(|s| s.trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SyncError::Configuration("BaseUrl is required".to_string()))?;

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(transport)?;

        self.state = Some(State {
            http,
            base_url,
            token: config
                .get(config_keys::TOKEN)
                .filter(|t| !t.is_empty())
                .cloned(),
        });
        Ok(InitOutcome::Ready)
    }

    #[instrument(skip(self), level = "debug")]
    async fn list_items(
        &self,
        parent_id: Option<&str>,
    ) -> Result<Vec<RemoteItemInfo>, SyncError> {
        let state = self.state()?;
        let mut path = "/api/items".to_string();
        if let Some(parent) = parent_id.filter(|p| !p.is_empty()) {
            path.push_str(&format!("?parentId={}", urlencoding::encode(parent)));
        }

        let resp = self
            .request(state, Method::GET, &path)
            .send()
            .await
            .map_err(transport)?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !resp.status().is_success() {
            return Err(error_for(resp).await);
        }

        let items: Vec<ItemDto> = resp
            .json()
            .await
            .map_err(|e| SyncError::Serialization(format!("item listing: {e}")))?;
        debug!("listed {} items", items.len());
        Ok(items.into_iter().map(RemoteItemInfo::from).collect())
    }

    #[instrument(skip(self), level = "debug")]
    async fn download_item(&self, remote_id: &str) -> Result<Option<String>, SyncError> {
        let state = self.state()?;
        let path = format!("/api/items/{}/content", urlencoding::encode(remote_id));
        let resp = self
            .request(state, Method::GET, &path)
            .send()
            .await
            .map_err(transport)?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(error_for(resp).await);
        }
        resp.text().await.map(Some).map_err(transport)
    }

    #[instrument(skip(self, content), level = "debug", fields(content_len = content.len()))]
    async fn upload_item(
        &self,
        name: &str,
        content: &str,
        remote_id: Option<&str>,
        parent_id: Option<&str>,
    ) -> Result<String, SyncError> {
        let state = self.state()?;
        let payload = ItemPayload {
            name,
            content,
            parent_id,
        };

        let resp = match remote_id.filter(|id| !id.is_empty()) {
            Some(id) => {
                let path = format!("/api/items/{}", urlencoding::encode(id));
                self.request(state, Method::PUT, &path)
            }
            None => self.request(state, Method::POST, "/api/items"),
        }
        .json(&payload)
        .send()
        .await
        .map_err(transport)?;

        if !resp.status().is_success() {
            return Err(error_for(resp).await);
        }

        // The server reports the written item's id in the response body; a
        // success response we cannot parse is an error, not a guess.
        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| SyncError::Serialization(format!("upload response: {e}")))?;
        match body.get("id") {
            Some(serde_json::Value::String(id)) => Ok(id.clone()),
            Some(serde_json::Value::Number(id)) => Ok(id.to_string()),
            _ => Err(SyncError::Serialization(
                "upload response is missing the item id".to_string(),
            )),
        }
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete_item(&self, remote_id: &str) -> Result<(), SyncError> {
        let state = self.state()?;
        let path = format!("/api/items/{}", urlencoding::encode(remote_id));
        let resp = self
            .request(state, Method::DELETE, &path)
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(error_for(resp).await)
        }
    }
}

fn transport(e: reqwest::Error) -> SyncError {
    SyncError::network(e.to_string())
}

async fn error_for(resp: Response) -> SyncError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let description = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body
    };
    SyncError::status(status.as_u16(), description)
}
