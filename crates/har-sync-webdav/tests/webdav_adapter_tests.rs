use std::collections::HashMap;

use har_sync_core::{config_keys, InitOutcome, RemoteStorageClient, SyncError};
use har_sync_webdav::WebDavAdapter;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> HashMap<String, String> {
    HashMap::from([
        (config_keys::BASE_URL.to_string(), server.uri()),
        (config_keys::USERNAME.to_string(), "alice".to_string()),
        (config_keys::PASSWORD.to_string(), "secret".to_string()),
    ])
}

async fn initialized_adapter(server: &MockServer) -> WebDavAdapter {
    let mut adapter = WebDavAdapter::new();
    adapter.initialize(&config_for(server)).await.unwrap();
    adapter
}

#[tokio::test]
async fn initialize_creates_the_root_collection() {
    let server = MockServer::start().await;
    Mock::given(method("MKCOL"))
        .and(path("/HarSync"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let mut adapter = WebDavAdapter::new();
    let outcome = adapter.initialize(&config_for(&server)).await.unwrap();
    assert_eq!(outcome, InitOutcome::Ready);
}

#[tokio::test]
async fn initialize_treats_405_as_existing_root() {
    let server = MockServer::start().await;
    Mock::given(method("MKCOL"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;

    let mut adapter = WebDavAdapter::new();
    let outcome = adapter.initialize(&config_for(&server)).await.unwrap();
    assert_eq!(outcome, InitOutcome::Ready);
}

#[tokio::test]
async fn initialize_defers_root_creation_failures() {
    let server = MockServer::start().await;
    Mock::given(method("MKCOL"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut adapter = WebDavAdapter::new();
    let outcome = adapter.initialize(&config_for(&server)).await.unwrap();
    assert!(outcome.warning().is_some());

    // Still configured: operations run and report their own failures.
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    adapter.delete_item("HarSync/x.har").await.unwrap();
}

#[tokio::test]
async fn initialize_requires_a_base_url() {
    let mut adapter = WebDavAdapter::new();
    let err = adapter.initialize(&HashMap::new()).await.unwrap_err();
    assert!(matches!(err, SyncError::Configuration(_)));
}

#[tokio::test]
async fn operations_before_initialize_fail() {
    let adapter = WebDavAdapter::new();
    assert!(matches!(
        adapter.list_items(None).await.unwrap_err(),
        SyncError::NotInitialized
    ));
    assert!(matches!(
        adapter.download_item("HarSync/x.har").await.unwrap_err(),
        SyncError::NotInitialized
    ));
}

#[tokio::test]
async fn upload_walks_parent_collections_outermost_first() {
    let server = MockServer::start().await;
    Mock::given(method("MKCOL"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let adapter = initialized_adapter(&server).await;
    let id = adapter
        .upload_item("entry.har", "{}", None, Some("A/B/C"))
        .await
        .unwrap();
    assert_eq!(id, "HarSync/A/B/C/entry.har");

    let requests = server.received_requests().await.unwrap();
    let paths: Vec<(String, String)> = requests
        .iter()
        .map(|r| (r.method.to_string(), r.url.path().to_string()))
        .collect();
    assert_eq!(
        paths,
        vec![
            ("MKCOL".to_string(), "/HarSync".to_string()),
            ("MKCOL".to_string(), "/HarSync/A".to_string()),
            ("MKCOL".to_string(), "/HarSync/A/B".to_string()),
            ("MKCOL".to_string(), "/HarSync/A/B/C".to_string()),
            ("PUT".to_string(), "/HarSync/A/B/C/entry.har".to_string()),
        ]
    );
}

#[tokio::test]
async fn upload_ignores_already_existing_collections() {
    let server = MockServer::start().await;
    Mock::given(method("MKCOL"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let adapter = initialized_adapter(&server).await;
    let id = adapter
        .upload_item("entry.har", "{}", None, Some("Proj/Group"))
        .await
        .unwrap();
    assert_eq!(id, "HarSync/Proj/Group/entry.har");
}

#[tokio::test]
async fn upload_percent_encodes_path_segments() {
    let server = MockServer::start().await;
    Mock::given(method("MKCOL"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let adapter = initialized_adapter(&server).await;
    adapter
        .upload_item("Cart Page.har", "{}", None, Some("My Proj"))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let put = requests.iter().find(|r| r.method.to_string() == "PUT").unwrap();
    assert_eq!(put.url.path(), "/HarSync/My%20Proj/Cart%20Page.har");
}

#[tokio::test]
async fn upload_prefers_remote_id_as_file_name() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let adapter = initialized_adapter(&server).await;
    let id = adapter
        .upload_item("new-name.har", "{}", Some("existing.har"), None)
        .await
        .unwrap();
    assert_eq!(id, "HarSync/existing.har");
}

#[tokio::test]
async fn upload_failure_surfaces_the_status() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(507).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let adapter = initialized_adapter(&server).await;
    let err = adapter
        .upload_item("entry.har", "{}", None, None)
        .await
        .unwrap_err();
    match err {
        SyncError::Transport {
            status,
            description,
        } => {
            assert_eq!(status, Some(507));
            assert_eq!(description, "quota exceeded");
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn list_sends_propfind_with_depth_one() {
    let server = MockServer::start().await;
    let body = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/HarSync/Proj/</D:href>
    <D:propstat><D:prop>
      <D:resourcetype><D:collection/></D:resourcetype>
    </D:prop></D:propstat>
  </D:response>
  <D:response>
    <D:href>/HarSync/Proj/Login_.har</D:href>
    <D:propstat><D:prop>
      <D:resourcetype/>
      <D:getcontentlength>42</D:getcontentlength>
      <D:getlastmodified>Fri, 01 Mar 2024 10:15:30 GMT</D:getlastmodified>
    </D:prop></D:propstat>
  </D:response>
</D:multistatus>"#;
    Mock::given(method("PROPFIND"))
        .and(path("/HarSync/Proj"))
        .and(header("Depth", "1"))
        .respond_with(ResponseTemplate::new(207).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = initialized_adapter(&server).await;
    let items = adapter.list_items(Some("HarSync/Proj")).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Login_.har");
    assert_eq!(items[0].size, 42);
    assert!(!items[0].is_folder);
}

#[tokio::test]
async fn list_on_missing_container_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("PROPFIND"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let adapter = initialized_adapter(&server).await;
    let items = adapter.list_items(Some("HarSync/Nope")).await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn download_maps_404_to_absence() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/HarSync/gone.har"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/HarSync/here.har"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"log\":{}}"))
        .mount(&server)
        .await;

    let adapter = initialized_adapter(&server).await;
    assert_eq!(adapter.download_item("HarSync/gone.har").await.unwrap(), None);
    assert_eq!(
        adapter.download_item("HarSync/here.har").await.unwrap(),
        Some("{\"log\":{}}".to_string())
    );
}

#[tokio::test]
async fn delete_is_idempotent() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/HarSync/gone.har"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/HarSync/here.har"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let adapter = initialized_adapter(&server).await;
    adapter.delete_item("HarSync/gone.har").await.unwrap();
    adapter.delete_item("HarSync/here.har").await.unwrap();
}

#[tokio::test]
async fn requests_carry_basic_auth() {
    let server = MockServer::start().await;
    // "alice:secret" base64
    Mock::given(method("DELETE"))
        .and(header("authorization", "Basic YWxpY2U6c2VjcmV0"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = initialized_adapter(&server).await;
    adapter.delete_item("HarSync/x.har").await.unwrap();
}
