// Integration tests for `DeviceStore` against a wiremock backend.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use devman_core::{
    CoreError, DeviceDraft, DeviceId, DeviceInput, DeviceStatus, DeviceStore, NotificationLevel,
    StoreConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DeviceStore) {
    let server = MockServer::start().await;
    let config = StoreConfig {
        base_url: format!("{}/api/v1", server.uri()),
        ..StoreConfig::default()
    };
    let store = DeviceStore::new(config).unwrap();
    (server, store)
}

fn record(id: u32, name: &str, status: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "ip_address": format!("10.0.0.{id}"),
        "type": "router",
        "location": "Rack A",
        "status": status,
    })
}

async fn mount_list(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/api/v1/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn input(name: &str) -> DeviceInput {
    DeviceDraft {
        name: name.into(),
        ip_address: "192.168.10.5".into(),
        device_type: "switch".into(),
        location: "Closet".into(),
        status: "online".into(),
    }
    .into_input()
    .unwrap()
}

fn names(store: &DeviceStore) -> Vec<String> {
    store.snapshot().iter().map(|d| d.name.clone()).collect()
}

async fn request_count(server: &MockServer, verb: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == verb)
        .count()
}

// ── Refresh ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_replaces_collection() {
    let (server, store) = setup().await;
    mount_list(&server, json!({ "data": [record(1, "a", "online"), record(2, "b", "offline")] })).await;

    assert!(store.last_refresh().is_none());
    let count = store.refresh().await.unwrap();

    assert_eq!(count, 2);
    assert_eq!(names(&store), vec!["a", "b"]);
    assert!(store.is_available());
    assert!(!store.is_loading());
    assert!(store.last_refresh().is_some());
}

#[tokio::test]
async fn test_failed_refresh_keeps_devices_and_blocks_writes() {
    let (server, store) = setup().await;
    let mut notes = store.notifications();

    Mock::given(method("GET"))
        .and(path("/api/v1/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([record(1, "a", "online")])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/devices"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({ "error": "Database unavailable" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/devices"))
        .respond_with(ResponseTemplate::new(201).set_body_json(record(9, "x", "online")))
        .expect(0)
        .mount(&server)
        .await;

    store.refresh().await.unwrap();
    let err = store.refresh().await.unwrap_err();

    assert_eq!(err.to_string(), "Database unavailable");
    assert!(!store.is_available());
    assert_eq!(names(&store), vec!["a"]);

    let note = notes.recv().await.unwrap();
    assert_eq!(note.level, NotificationLevel::Error);
    assert_eq!(note.message, "Database unavailable");

    let err = store.create(&input("new")).await.unwrap_err();
    assert!(matches!(err, CoreError::BackendUnavailable));
    assert!(matches!(
        store.update(&DeviceId::from("1"), &input("x")).await,
        Err(CoreError::BackendUnavailable)
    ));
    assert!(matches!(
        store.delete(&DeviceId::from("1")).await,
        Err(CoreError::BackendUnavailable)
    ));
    assert_eq!(request_count(&server, "POST").await, 0);
    assert_eq!(request_count(&server, "PUT").await, 0);
    assert_eq!(request_count(&server, "DELETE").await, 0);
    assert_eq!(names(&store), vec!["a"]);
}

#[tokio::test]
async fn test_successful_refresh_restores_availability() {
    let (server, store) = setup().await;
    let mut availability = store.availability();

    Mock::given(method("GET"))
        .and(path("/api/v1/devices"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_list(&server, json!([])).await;

    let err = store.refresh().await.unwrap_err();
    assert_eq!(err.to_string(), "Request failed: 500");
    assert!(availability.has_changed().unwrap());
    assert!(!*availability.borrow_and_update());

    store.refresh().await.unwrap();
    assert!(*availability.borrow_and_update());
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_prepends_returned_record() {
    let (server, store) = setup().await;
    let mut notes = store.notifications();
    mount_list(&server, json!([record(1, "a", "online"), record(2, "b", "online")])).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/devices"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "data": record(3, "new", "online") })))
        .expect(1)
        .mount(&server)
        .await;

    store.refresh().await.unwrap();
    let created = store.create(&input("new")).await.unwrap();

    assert_eq!(created.id, DeviceId::from("3"));
    assert_eq!(names(&store), vec!["new", "a", "b"]);
    assert_eq!(notes.recv().await.unwrap().message, "Device created");
}

#[tokio::test]
async fn test_update_replaces_only_target() {
    let (server, store) = setup().await;
    mount_list(
        &server,
        json!([record(1, "a", "online"), record(2, "b", "online"), record(3, "c", "online")]),
    )
    .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/devices/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(record(2, "b-renamed", "offline")))
        .mount(&server)
        .await;

    store.refresh().await.unwrap();
    let before = store.snapshot();
    store.update(&DeviceId::from("2"), &input("b-renamed")).await.unwrap();
    let after = store.snapshot();

    assert_eq!(names(&store), vec!["a", "b-renamed", "c"]);
    assert_eq!(after[1].status, DeviceStatus::Offline);
    assert_eq!(before[0], after[0]);
    assert_eq!(before[2], after[2]);
}

#[tokio::test]
async fn test_update_of_unknown_local_id_is_a_no_op() {
    let (server, store) = setup().await;
    mount_list(&server, json!([record(1, "a", "online")])).await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/devices/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(record(42, "ghost", "online")))
        .mount(&server)
        .await;

    store.refresh().await.unwrap();
    let updated = store.update(&DeviceId::from("42"), &input("ghost")).await.unwrap();

    assert_eq!(updated.name, "ghost");
    assert_eq!(names(&store), vec!["a"]);
}

#[tokio::test]
async fn test_delete_removes_device() {
    let (server, store) = setup().await;
    mount_list(&server, json!([record(1, "a", "online"), record(2, "b", "online")])).await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/devices/1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    store.refresh().await.unwrap();
    store.delete(&DeviceId::from("1")).await.unwrap();

    assert_eq!(names(&store), vec!["b"]);
    assert!(store.device(&DeviceId::from("1")).is_none());
}

#[tokio::test]
async fn test_failed_write_notifies_and_keeps_collection() {
    let (server, store) = setup().await;
    let mut notes = store.notifications();
    mount_list(&server, json!([record(1, "a", "online")])).await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/devices/1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "Device not found" })))
        .mount(&server)
        .await;

    store.refresh().await.unwrap();
    let err = store.delete(&DeviceId::from("1")).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(names(&store), vec!["a"]);
    assert!(store.is_available());
    assert_eq!(notes.recv().await.unwrap().message, "Device not found");
}

// ── Status ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_check_status_patches_only_status() {
    let (server, store) = setup().await;
    let mut notes = store.notifications();
    mount_list(&server, json!([record(1, "a", "online"), record(2, "b", "online")])).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/devices/2/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "status": "offline" } })))
        .mount(&server)
        .await;

    store.refresh().await.unwrap();
    let status = store.check_status(&DeviceId::from("2")).await.unwrap();

    assert_eq!(status, DeviceStatus::Offline);
    let device = store.device(&DeviceId::from("2")).unwrap();
    assert_eq!(device.status, DeviceStatus::Offline);
    assert_eq!(device.name, "b");
    assert_eq!(store.device(&DeviceId::from("1")).unwrap().status, DeviceStatus::Online);
    assert_eq!(notes.recv().await.unwrap().message, "Status: offline");
}

#[tokio::test]
async fn test_check_status_without_status_is_unknown_and_ignores_availability() {
    let (server, store) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/devices"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/devices/5/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let _ = store.refresh().await;
    assert!(!store.is_available());

    let status = store.check_status(&DeviceId::from("5")).await.unwrap();
    assert_eq!(status, DeviceStatus::Unknown);
}

// ── Polling ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_polling_refreshes_immediately_and_repeatedly() {
    let (server, store) = setup().await;
    mount_list(&server, json!([record(1, "a", "online")])).await;
    let mut stream = store.devices();

    store.start_polling(Duration::from_millis(50));
    assert!(store.is_polling());

    let snap = tokio::time::timeout(Duration::from_secs(2), stream.changed())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snap.len(), 1);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(request_count(&server, "GET").await >= 3);

    assert!(store.stop_polling());
    assert!(!store.stop_polling());
    tokio::time::sleep(Duration::from_millis(30)).await;
    let stopped_at = request_count(&server, "GET").await;
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(request_count(&server, "GET").await, stopped_at);
}

#[tokio::test]
async fn test_restarting_polling_replaces_task() {
    let (server, store) = setup().await;
    mount_list(&server, json!([])).await;

    store.start_polling(Duration::from_millis(40));
    store.start_polling(Duration::from_secs(60));
    tokio::time::sleep(Duration::from_millis(200)).await;

    // Only the immediate first tick of each task; the fast one is gone.
    assert!(request_count(&server, "GET").await <= 2);
    store.shutdown();
    assert!(!store.is_polling());
}

#[tokio::test]
async fn test_dropping_store_stops_polling() {
    let (server, store) = setup().await;
    mount_list(&server, json!([])).await;

    store.start_polling(Duration::from_millis(30));
    tokio::time::sleep(Duration::from_millis(80)).await;
    drop(store);

    tokio::time::sleep(Duration::from_millis(40)).await;
    let after_drop = request_count(&server, "GET").await;
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(request_count(&server, "GET").await, after_drop);
}

#[tokio::test]
async fn test_loading_flag_tracks_refresh() {
    let (server, store) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/devices"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;

    let mut loading = store.loading();
    let task = {
        let store = store.clone();
        tokio::spawn(async move { store.refresh().await })
    };

    loading.changed().await.unwrap();
    assert!(*loading.borrow_and_update());
    loading.changed().await.unwrap();
    assert!(!*loading.borrow_and_update());
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_device_stream_yields_current_then_changes() {
    use futures::StreamExt;

    let (server, store) = setup().await;
    mount_list(&server, json!([record(1, "a", "online"), record(2, "b", "online")])).await;

    let mut stream = store.devices().into_stream();
    let first = stream.next().await.unwrap();
    assert!(first.is_empty());

    tokio_test::assert_ok!(store.refresh().await);
    let next = tokio::time::timeout(Duration::from_secs(2), stream.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(next.len(), 2);
}
