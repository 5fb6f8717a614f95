use axum::{Json, Router, extract::Multipart, http::StatusCode, routing::post};
use once_cell::sync::Lazy;
use reqwest::{
    Client,
    multipart::{Form, Part},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    plate_number: String,
    status: String,
    timestamp: String,
}

#[derive(Debug, Deserialize)]
struct TextResponse {
    message: String,
    timestamp: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

struct TestServer {
    api_url: String,
    web_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

const UPLOAD_LIMIT: usize = 4096;
static OVERSIZED_IMAGE: [u8; 4 * UPLOAD_LIMIT] = [b'A'; 4 * UPLOAD_LIMIT];

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));
static RECOGNIZER_URL: Lazy<String> = Lazy::new(spawn_mock_recognizer);

#[cfg(unix)]
mod cleanup {
    use std::sync::Once;
    use std::sync::atomic::{AtomicI32, Ordering};

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> std::path::PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("parksense_http_{}_{}.json", std::process::id(), nanos));
    path
}

/// Echoes the uploaded bytes back as the recognized plate. `FAIL` makes it
/// answer 503 and `BLANK` makes it report no plate.
async fn recognize(mut multipart: Multipart) -> Result<Json<Value>, StatusCode> {
    while let Some(field) = multipart.next_field().await.map_err(|_| StatusCode::BAD_REQUEST)? {
        if field.name() != Some("file") {
            continue;
        }
        let bytes = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
        let text = String::from_utf8_lossy(&bytes).to_string();
        return match text.as_str() {
            "FAIL" => Err(StatusCode::SERVICE_UNAVAILABLE),
            "BLANK" => Ok(Json(json!({ "plate_number": null }))),
            _ => Ok(Json(json!({ "plate_number": text }))),
        };
    }
    Err(StatusCode::BAD_REQUEST)
}

/// Runs on its own thread so it outlives each test's runtime.
fn spawn_mock_recognizer() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind recognizer port");
    let port = listener.local_addr().unwrap().port();
    listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("recognizer runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            let app = Router::new().route("/recognize", post(recognize));
            axum::serve(listener, app).await.unwrap();
        });
    });

    format!("http://127.0.0.1:{port}/recognize")
}

fn seed_store() -> std::path::PathBuf {
    let path = unique_data_path();
    let seed = json!({
        "car_logs": [
            { "_id": "t2", "image": "aGVsbG8=", "plate_number": "MH12DE1433", "status": "Unauthorized", "timestamp": "2024-05-02 09:00:00" },
            { "_id": "t1", "image": "aGVsbG8=", "plate_number": "KA01AB1234", "status": "Authorized", "timestamp": "2024-05-01 09:00:00" },
            { "_id": "t3", "image": "aGVsbG8=", "plate_number": "KA01AB1234", "status": "Authorized", "timestamp": "2024-05-03 09:00:00" }
        ],
        "authorized_plates": [
            { "_id": "p1", "plate_number": "KA01AB1234" }
        ],
        "visitors": [
            { "_id": "v1", "name": "Delivery van", "timestamp": "2024-04-30 17:45:00" }
        ],
        "slots": [
            { "_id": "s1", "slot": "A1", "occupied": false },
            { "_id": "s2", "slot": "A2", "occupied": true }
        ]
    });
    std::fs::write(&path, serde_json::to_vec_pretty(&seed).unwrap()).expect("seed store");
    path
}

async fn wait_until_ready(urls: &[String]) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    for url in urls {
        loop {
            if let Ok(resp) = client.get(url).send().await {
                if resp.status().is_success() {
                    break;
                }
            }
            if Instant::now() > deadline {
                panic!("server did not become ready");
            }
            sleep(Duration::from_millis(100)).await;
        }
    }
}

async fn spawn_server() -> TestServer {
    let api_port = pick_free_port();
    let web_port = pick_free_port();
    let api_url = format!("http://127.0.0.1:{api_port}");
    let web_url = format!("http://127.0.0.1:{web_port}");

    let child = Command::new(env!("CARGO_BIN_EXE_parksense"))
        .env("PORT", api_port.to_string())
        .env("WEB_PORT", web_port.to_string())
        .env("PARKSENSE_DATA_PATH", seed_store())
        .env("PARKSENSE_API_BASE_URL", &api_url)
        .env("PARKSENSE_RECOGNIZER_URL", RECOGNIZER_URL.as_str())
        .env("PARKSENSE_UPLOAD_LIMIT", UPLOAD_LIMIT.to_string())
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    wait_until_ready(&[format!("{api_url}/api/health"), format!("{web_url}/")]).await;

    TestServer {
        api_url,
        web_url,
        child,
    }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn get_json(client: &Client, url: String) -> Value {
    client.get(url).send().await.unwrap().json().await.unwrap()
}

async fn entry_count(client: &Client, server: &TestServer) -> usize {
    get_json(client, format!("{}/api/entries", server.api_url))
        .await
        .as_array()
        .expect("entries array")
        .len()
}

async fn upload_bytes(client: &Client, server: &TestServer, bytes: &'static [u8]) -> reqwest::Response {
    let part = Part::bytes(bytes)
        .file_name("captured-image.jpg")
        .mime_str("image/jpeg")
        .unwrap();
    client
        .post(format!("{}/upload", server.api_url))
        .multipart(Form::new().part("file", part))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_root_returns_diagnostic_payload() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let home = get_json(&client, format!("{}/", server.api_url)).await;
    assert_eq!(home["message"], "Welcome to ParkSense");
    assert_eq!(home["links"]["upload"], "/upload");
    assert_eq!(home["links"]["dashboard"], "/dashboard");
}

#[tokio::test]
async fn http_upload_known_plate_is_authorized() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let before = entry_count(&client, &server).await;

    let response = upload_bytes(&client, &server, b"ka01-ab 1234").await;
    assert!(response.status().is_success());
    let body: UploadResponse = response.json().await.unwrap();
    assert_eq!(body.plate_number, "KA01AB1234");
    assert_eq!(body.status, "Authorized");
    assert!(!body.timestamp.is_empty());

    let entries = get_json(&client, format!("{}/api/entries", server.api_url)).await;
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), before + 1);
    let logged = entries.last().unwrap();
    assert_eq!(logged["plate_number"], "KA01AB1234");
    assert_eq!(logged["status"], "Authorized");
    assert_eq!(logged["timestamp"], body.timestamp.as_str());
    assert_eq!(logged["image"], "a2EwMS1hYiAxMjM0");
    assert!(logged["_id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn http_upload_unknown_plate_is_unauthorized() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = upload_bytes(&client, &server, b"ZZ99ZZ9999").await;
    assert!(response.status().is_success());
    let body: UploadResponse = response.json().await.unwrap();
    assert_eq!(body.plate_number, "ZZ99ZZ9999");
    assert_eq!(body.status, "Unauthorized");
}

#[tokio::test]
async fn http_upload_without_detection_is_logged_as_not_detected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = upload_bytes(&client, &server, b"BLANK").await;
    assert!(response.status().is_success());
    let body: UploadResponse = response.json().await.unwrap();
    assert_eq!(body.plate_number, "Not detected");
    assert_eq!(body.status, "Unauthorized");
}

#[tokio::test]
async fn http_upload_without_file_part_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let before = entry_count(&client, &server).await;

    let response = client
        .post(format!("{}/upload", server.api_url))
        .multipart(Form::new().text("note", "no image here"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.error, "No file part");

    assert_eq!(entry_count(&client, &server).await, before);
}

#[tokio::test]
async fn http_upload_recognizer_failure_leaves_store_untouched() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let before = entry_count(&client, &server).await;

    let response = upload_bytes(&client, &server, b"FAIL").await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);
    let body: ErrorResponse = response.json().await.unwrap();
    assert!(body.error.contains("503"));

    assert_eq!(entry_count(&client, &server).await, before);
}

#[tokio::test]
async fn http_upload_over_body_limit_is_payload_too_large() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let before = entry_count(&client, &server).await;

    let response = upload_bytes(&client, &server, &OVERSIZED_IMAGE).await;
    assert_eq!(response.status(), reqwest::StatusCode::PAYLOAD_TOO_LARGE);
    let body: ErrorResponse = response.json().await.unwrap();
    assert!(!body.error.is_empty());

    assert_eq!(entry_count(&client, &server).await, before);
}

#[tokio::test]
async fn http_text_submission_validates_and_persists() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let before = entry_count(&client, &server).await;

    let blank = client
        .post(format!("{}/text", server.api_url))
        .json(&json!({ "text": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(blank.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: ErrorResponse = blank.json().await.unwrap();
    assert_eq!(body.error, "No text provided");
    assert_eq!(entry_count(&client, &server).await, before);

    let response = client
        .post(format!("{}/text", server.api_url))
        .json(&json!({ "text": "Red sedan, visitor for flat 4B" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: TextResponse = response.json().await.unwrap();
    assert_eq!(body.message, "Text submitted successfully");
    assert!(!body.timestamp.is_empty());

    let entries = get_json(&client, format!("{}/api/entries", server.api_url)).await;
    let logged = entries.as_array().unwrap().last().unwrap().clone();
    assert_eq!(logged["text"], "Red sedan, visitor for flat 4B");
    assert_eq!(logged["type"], "text");
}

#[tokio::test]
async fn http_read_endpoints_serve_their_collections() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let visitors = get_json(&client, format!("{}/api/previous-logs", server.api_url)).await;
    assert_eq!(visitors.as_array().unwrap().len(), 1);
    assert_eq!(visitors[0]["name"], "Delivery van");

    let slots = get_json(&client, format!("{}/api/slots", server.api_url)).await;
    assert_eq!(slots.as_array().unwrap().len(), 2);

    let entries = get_json(&client, format!("{}/api/entries", server.api_url)).await;
    let current = get_json(&client, format!("{}/api/current-logs", server.api_url)).await;
    assert_eq!(entries, current);
}

#[tokio::test]
async fn http_api_allows_cross_origin_pages() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/api/entries", server.api_url))
        .header("origin", server.web_url.as_str())
        .send()
        .await
        .unwrap();
    assert!(response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn http_dashboard_first_paint_sorts_and_filters() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let html = client
        .get(format!("{}/dashboard", server.web_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    let position = |id: &str| html.find(&format!(r#"data-id="{id}""#)).expect("row present");
    assert!(position("t3") < position("t2"));
    assert!(position("t2") < position("t1"));

    let filtered = client
        .get(format!("{}/dashboard?status=Unauthorized", server.web_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(filtered.contains(r#"data-id="t2""#));
    assert!(!filtered.contains(r#"data-id="t1""#));
    assert!(!filtered.contains(r#"data-id="t3""#));

    let unknown = client
        .get(format!("{}/dashboard?status=Suspended", server.web_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    for id in ["t1", "t2", "t3"] {
        assert!(unknown.contains(&format!(r#"data-id="{id}""#)), "row {id} hidden by unknown status");
    }
    assert!(unknown.contains(r#"<option value="all" selected>All</option>"#));
    assert!(!unknown.contains("Suspended"));
}

#[tokio::test]
async fn http_pages_point_at_configured_api() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let expected = format!(r#"const API_BASE = "{}";"#, server.api_url);

    for path in ["/", "/upload", "/dashboard"] {
        let html = client
            .get(format!("{}{path}", server.web_url))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(html.contains(&expected), "page {path} missing api base");
    }
}
