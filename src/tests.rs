//! Integration tests for the Tokidex backend.

use std::path::PathBuf;
use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::{Config, DEFAULT_MAX_UPLOAD_BYTES};
use crate::db::init_store;
use crate::models::Card;
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    data_path: PathBuf,
    images_dir: PathBuf,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_path = temp_dir.path().join("tokimon.json");
        let images_dir = temp_dir.path().join("images");

        // Fresh seed state for every test
        let store = init_store(&data_path, true)
            .await
            .expect("Failed to init store");

        let config = Config {
            data_path: data_path.clone(),
            images_dir: images_dir.clone(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            reset_on_start: true,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        };

        let state = AppState {
            store: Arc::new(store),
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            data_path,
            images_dir,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn create(&self, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/cards"))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn upload(&self, part: Part) -> reqwest::Response {
        self.client
            .post(self.url("/cards/photo"))
            .multipart(Form::new().part("file", part))
            .send()
            .await
            .unwrap()
    }
}

fn image_part(bytes: &[u8], file_name: &str, mime: &str) -> Part {
    Part::bytes(bytes.to_vec())
        .file_name(file_name.to_string())
        .mime_str(mime)
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_list_returns_seed_cards() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/cards"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!([
            {"id": 1, "name": "Tokimander", "category": "FIRE", "image_reference": "charmander.png", "health": 100, "attack": 50},
            {"id": 2, "name": "Tokiurtle", "category": "WATER", "image_reference": "squirtle.png", "health": 100, "attack": 50},
            {"id": 3, "name": "Tokisaur", "category": "GRASS", "image_reference": "bulbasaur.png", "health": 100, "attack": 50}
        ])
    );
}

#[tokio::test]
async fn test_get_card() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/cards/1"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["id"], 1);
    assert_eq!(body["name"], "Tokimander");
    assert_eq!(body["category"], "FIRE");
}

#[tokio::test]
async fn test_get_card_not_found() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/cards/4"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    assert!(resp.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_card_rejects_non_numeric_id() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/cards/abc"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_create_card() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .create(json!({
            "name": "Tokitto",
            "category": "NORMAL",
            "health": 150,
            "attack": 20
        }))
        .await;

    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["id"], 4);
    assert_eq!(body["name"], "Tokitto");
    assert_eq!(body["category"], "NORMAL");
    assert_eq!(body["image_reference"], "unown.png");
    assert_eq!(body["health"], 150);
    assert_eq!(body["attack"], 20);

    // Persisted to the backing file
    let on_disk: Vec<Card> =
        serde_json::from_slice(&tokio::fs::read(&fixture.data_path).await.unwrap()).unwrap();
    assert_eq!(on_disk.len(), 4);
    assert_eq!(on_disk[3].name, "Tokitto");

    let get_resp = fixture
        .client
        .get(fixture.url("/cards/4"))
        .send()
        .await
        .unwrap();
    assert_eq!(get_resp.status(), 200);
}

#[tokio::test]
async fn test_create_card_invalid_category() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .create(json!({"name": "X", "category": "INVALID"}))
        .await;

    assert_eq!(resp.status(), 400);
    assert!(resp.text().await.unwrap().is_empty());

    let missing = fixture.create(json!({"name": "X"})).await;
    assert_eq!(missing.status(), 400);

    // Rejected requests do not consume ids
    let ok = fixture
        .create(json!({"name": "Y", "category": "ICE"}))
        .await;
    let body: Value = ok.json().await.unwrap();
    assert_eq!(body["id"], 4);
}

#[tokio::test]
async fn test_create_card_normalizes_category_case() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .create(json!({"name": "Tokichu", "category": "electric"}))
        .await;

    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["category"], "ELECTRIC");
}

#[tokio::test]
async fn test_create_card_accepts_legacy_field_names() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .create(json!({
            "name": "Tokitto",
            "elementType": "NORMAL",
            "imageName": "ditto.png",
            "healthPoints": 150,
            "attackPoints": 20
        }))
        .await;

    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["image_reference"], "ditto.png");
    assert_eq!(body["health"], 150);
    assert_eq!(body["attack"], 20);
}

#[tokio::test]
async fn test_created_ids_strictly_increase() {
    let fixture = TestFixture::new().await;

    let mut ids = Vec::new();
    for name in ["A", "B", "C"] {
        let resp = fixture
            .create(json!({"name": name, "category": "ROCK"}))
            .await;
        let body: Value = resp.json().await.unwrap();
        ids.push(body["id"].as_u64().unwrap());
    }

    assert_eq!(ids, vec![4, 5, 6]);
}

#[tokio::test]
async fn test_update_card() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .put(fixture.url("/cards/1"))
        .json(&json!({"name": "Tokimeleon", "category": "fire", "health": 0}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["id"], 1);
    assert_eq!(body["name"], "Tokimeleon");
    assert_eq!(body["category"], "FIRE");
    // Zero leaves the stat alone; a missing image resets to the placeholder
    assert_eq!(body["health"], 100);
    assert_eq!(body["attack"], 50);
    assert_eq!(body["image_reference"], "unown.png");

    let get_resp = fixture
        .client
        .get(fixture.url("/cards/1"))
        .send()
        .await
        .unwrap();
    let stored: Value = get_resp.json().await.unwrap();
    assert_eq!(stored, body);
}

#[tokio::test]
async fn test_update_card_invalid_category() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .put(fixture.url("/cards/1"))
        .json(&json!({"tid": 1, "name": "Tokimander", "elementType": "INVALID"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    assert!(resp.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_card_not_found() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .put(fixture.url("/cards/99"))
        .json(&json!({"name": "Ghost"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_update_card_id_conflict() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .put(fixture.url("/cards/1"))
        .json(&json!({"id": 2}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 409);
}

#[tokio::test]
async fn test_delete_card() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .delete(fixture.url("/cards/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let get_resp = fixture
        .client
        .get(fixture.url("/cards/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(get_resp.status(), 404);

    let list: Value = fixture
        .client
        .get(fixture.url("/cards"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_delete_card_not_found() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .delete(fixture.url("/cards/4"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_upload_photo() {
    let fixture = TestFixture::new().await;
    let content = b"\x89PNG test image content";

    let resp = fixture
        .upload(image_part(content, "ditto.png", "image/png"))
        .await;

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "File uploaded successfully");
    let stored = tokio::fs::read(fixture.images_dir.join("ditto.png"))
        .await
        .unwrap();
    assert_eq!(stored, content);

    // Same name overwrites
    let resp = fixture
        .upload(image_part(b"second", "ditto.png", "image/png"))
        .await;
    assert_eq!(resp.status(), 200);
    let stored = tokio::fs::read(fixture.images_dir.join("ditto.png"))
        .await
        .unwrap();
    assert_eq!(stored, b"second");
}

#[tokio::test]
async fn test_upload_photo_invalid_type() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .upload(image_part(b"test image content", "notes.txt", "text/plain"))
        .await;

    assert_eq!(resp.status(), 400);
    assert_eq!(
        resp.text().await.unwrap(),
        "Invalid file type. Only PNG and JPEG files are allowed"
    );
    assert!(!fixture.images_dir.join("notes.txt").exists());
}

#[tokio::test]
async fn test_upload_photo_empty_file() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .upload(image_part(b"", "empty.png", "image/png"))
        .await;

    assert_eq!(resp.status(), 404);
    assert_eq!(resp.text().await.unwrap(), "File is not found");
}

#[tokio::test]
async fn test_upload_photo_without_file_field() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/cards/photo"))
        .multipart(Form::new().text("note", "no file here"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    assert_eq!(resp.text().await.unwrap(), "File is not found");
}

#[tokio::test]
async fn test_get_photo() {
    let fixture = TestFixture::new().await;
    let content = b"\x89PNG charmander";

    fixture
        .upload(image_part(content, "charmander.png", "image/png"))
        .await;

    let resp = fixture
        .client
        .get(fixture.url("/cards/photos/charmander.png"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()[reqwest::header::CONTENT_TYPE],
        "image/png"
    );
    assert_eq!(resp.bytes().await.unwrap().as_ref(), content);
}

#[tokio::test]
async fn test_get_photo_not_found() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/cards/photos/missing.png"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = fixture
        .client
        .get(fixture.url("/cards/photos/readme.txt"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_card_body_with_wrong_types_is_bad_request() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .create(json!({"name": "X", "category": 5}))
        .await;
    assert_eq!(resp.status(), 400);
    assert!(resp.text().await.unwrap().is_empty());

    let resp = fixture
        .client
        .put(fixture.url("/cards/1"))
        .json(&json!({"category": 7}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert!(resp.text().await.unwrap().is_empty());

    let resp = fixture
        .client
        .post(fixture.url("/cards"))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_update_card_to_max_id_is_bad_request() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .put(fixture.url("/cards/1"))
        .json(&json!({"id": u64::MAX}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let get_resp = fixture
        .client
        .get(fixture.url("/cards/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(get_resp.status(), 200);
}

#[tokio::test]
async fn test_delete_card_twice() {
    let fixture = TestFixture::new().await;

    let first = fixture
        .client
        .delete(fixture.url("/cards/2"))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), 204);

    let second = fixture
        .client
        .delete(fixture.url("/cards/2"))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), 404);
    assert!(second.text().await.unwrap().is_empty());
}
