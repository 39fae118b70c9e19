use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use har_sync_core::{config_keys, InitOutcome, RemoteItemInfo, RemoteStorageClient, SyncError};
use reqwest::{Client, Method, Response, StatusCode, Url};
use tracing::{debug, instrument, warn};

use crate::multistatus::parse_multistatus;

/// Fixed collection under the base URL that holds all synced documents.
pub const ROOT_COLLECTION: &str = "HarSync";

/// Bound on every wire call; expiry surfaces as a transport error.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const PROPFIND_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<D:propfind xmlns:D="DAV:"><D:allprop/></D:propfind>"#;

struct State {
    http: Client,
    base: Url,
    username: String,
    password: String,
}

/// `RemoteStorageClient` implementation against a WebDAV endpoint.
///
/// Remote ids are paths: uploads return paths relative to the base URL
/// (`HarSync/Project/Group/file.har`), listings return the server's hrefs.
/// Both forms resolve against the configured base.
#[derive(Default)]
pub struct WebDavAdapter {
    state: Option<State>,
}

impl WebDavAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<&State, SyncError> {
        self.state.as_ref().ok_or(SyncError::NotInitialized)
    }

    /// Create one collection. 405 means it already exists, which is fine.
    async fn mkcol(&self, state: &State, path: &str) -> Result<(), SyncError> {
        let method = Method::from_bytes(b"MKCOL").expect("static method token");
        let resp = state
            .http
            .request(method, url_for(state, &encode_path(path))?)
            .basic_auth(&state.username, Some(&state.password))
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if status.is_success() || status == StatusCode::METHOD_NOT_ALLOWED {
            Ok(())
        } else {
            Err(error_for(resp).await)
        }
    }
}

#[async_trait]
impl RemoteStorageClient for WebDavAdapter {
    fn name(&self) -> &'static str {
        "WebDAV"
    }

    #[instrument(skip(self, config), level = "debug")]
    async fn initialize(
        &mut self,
        config: &HashMap<String, String>,
    ) -> Result<InitOutcome, SyncError> {
        let base_url = config
            .get(config_keys::BASE_URL)
            .map(|s| s.trim_end_matches('/'))
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SyncError::Configuration("BaseUrl is required".to_string()))?;
        let base = Url::parse(&format!("{base_url}/"))
            .map_err(|e| SyncError::Configuration(format!("BaseUrl: {e}")))?;

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(transport)?;

        let state = State {
            http,
            base,
            username: config
                .get(config_keys::USERNAME)
                .cloned()
                .unwrap_or_default(),
            password: config
                .get(config_keys::PASSWORD)
                .cloned()
                .unwrap_or_default(),
        };

        // Provision the root collection, but never block configuration on a
        // transient failure; the first real operation reports it instead.
        let outcome = match self.mkcol(&state, ROOT_COLLECTION).await {
            Ok(()) => InitOutcome::Ready,
            Err(e) => {
                warn!("deferred root collection creation: {e}");
                InitOutcome::Degraded(format!(
                    "could not create remote folder {ROOT_COLLECTION}: {e}"
                ))
            }
        };

        self.state = Some(state);
        Ok(outcome)
    }

    #[instrument(skip(self), level = "debug")]
    async fn list_items(
        &self,
        parent_id: Option<&str>,
    ) -> Result<Vec<RemoteItemInfo>, SyncError> {
        let state = self.state()?;
        let path = parent_id.unwrap_or(ROOT_COLLECTION);
        let method = Method::from_bytes(b"PROPFIND").expect("static method token");

        let resp = state
            .http
            .request(method, url_for(state, &encode_path(path))?)
            .basic_auth(&state.username, Some(&state.password))
            .header("Depth", "1")
            .body(PROPFIND_BODY)
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(error_for(resp).await);
        }

        let body = resp.text().await.map_err(transport)?;
        let items = parse_multistatus(&body, path)?;
        debug!("listed {} items under {path}", items.len());
        Ok(items)
    }

    #[instrument(skip(self), level = "debug")]
    async fn download_item(&self, remote_id: &str) -> Result<Option<String>, SyncError> {
        let state = self.state()?;
        let resp = state
            .http
            .get(url_for(state, remote_id)?)
            .basic_auth(&state.username, Some(&state.password))
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

        // Walk the parent path outermost-to-innermost; each segment must
        // exist before a child collection can be created inside it.
        let mut folder = ROOT_COLLECTION.to_string();
        if let Some(parent) = parent_id.filter(|p| !p.is_empty()) {
            for part in parent.split(['/', '\\']).filter(|p| !p.is_empty()) {
                folder = format!("{folder}/{part}");
                self.mkcol(state, &folder).await?;
            }
        }

        let file_name = remote_id.filter(|id| !id.is_empty()).unwrap_or(name);
        let full_path = format!("{folder}/{file_name}");

        let resp = state
            .http
            .put(url_for(state, &encode_path(&full_path))?)
            .basic_auth(&state.username, Some(&state.password))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(content.to_string())
            .send()
            .await
            .map_err(transport)?;

        if !resp.status().is_success() {
            return Err(error_for(resp).await);
        }
        debug!("uploaded {full_path}");
        Ok(full_path)
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete_item(&self, remote_id: &str) -> Result<(), SyncError> {
        let state = self.state()?;
        let resp = state
            .http
            .delete(url_for(state, remote_id)?)
            .basic_auth(&state.username, Some(&state.password))
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

/// Resolve a remote id against the base URL. Ids that start with `/` are
/// server-absolute hrefs (as returned by PROPFIND); everything else is a
/// path relative to the base.
fn url_for(state: &State, id_or_path: &str) -> Result<Url, SyncError> {
    state
        .base
        .join(id_or_path)
        .map_err(|e| SyncError::Configuration(format!("remote path {id_or_path}: {e}")))
}

/// Percent-encode each segment of a locally built path.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
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
