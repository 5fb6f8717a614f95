use crate::dashboard::{self, SortOrder, StatusFilter};
use crate::errors::AppError;
use crate::models::{
    HealthResponse, HomeLinks, HomeResponse, PLATE_NOT_DETECTED, Status, TextResponse, TextSubmission,
    UploadResponse, now_timestamp,
};
use crate::state::AppState;
use crate::storage::{AUTHORIZED_PLATES, CAR_LOGS, Document, SLOTS, VISITORS};
use crate::ui;
use axum::{
    Json,
    body::Bytes,
    extract::{
        Multipart, Query, State,
        multipart::MultipartRejection,
        rejection::JsonRejection,
    },
    response::Html,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

pub async fn home() -> Json<HomeResponse> {
    Json(HomeResponse {
        message: "Welcome to ParkSense".to_string(),
        links: HomeLinks {
            upload: "/upload".to_string(),
            dashboard: "/dashboard".to_string(),
        },
    })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        collections: state.store.collection_counts().await,
    })
}

pub async fn list_entries(State(state): State<AppState>) -> Json<Vec<Document>> {
    Json(state.store.find_all(CAR_LOGS).await)
}

pub async fn list_current_logs(State(state): State<AppState>) -> Json<Vec<Document>> {
    Json(state.store.find_all(CAR_LOGS).await)
}

pub async fn list_previous_logs(State(state): State<AppState>) -> Json<Vec<Document>> {
    Json(state.store.find_all(VISITORS).await)
}

pub async fn list_slots(State(state): State<AppState>) -> Json<Vec<Document>> {
    Json(state.store.find_all(SLOTS).await)
}

pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart.map_err(|_| AppError::bad_request("No file part"))?;
    let (file_name, image) = read_file_field(&mut multipart).await?;

    let recognized = state.recognizer.recognize(image.to_vec(), &file_name).await?;
    let (plate_number, status) = match recognized {
        Some(plate) => {
            let known = state
                .store
                .find_one_ci(AUTHORIZED_PLATES, "plate_number", &plate)
                .await
                .is_some();
            let status = if known { Status::Authorized } else { Status::Unauthorized };
            (plate, status)
        }
        None => (PLATE_NOT_DETECTED.to_string(), Status::Unauthorized),
    };

    let timestamp = now_timestamp();
    let mut document = Document::new();
    document.insert("image".to_string(), Value::String(STANDARD.encode(&image)));
    document.insert("plate_number".to_string(), Value::String(plate_number.clone()));
    document.insert("status".to_string(), Value::String(status.as_str().to_string()));
    document.insert("timestamp".to_string(), Value::String(timestamp.clone()));

    let id = state.store.insert_one(CAR_LOGS, document).await?;
    info!(%id, plate = %plate_number, status = status.as_str(), "car entry logged");

    Ok(Json(UploadResponse {
        plate_number,
        status,
        timestamp,
    }))
}

async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Bytes), AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().trim().to_string();
        if file_name.is_empty() {
            return Err(AppError::bad_request("No selected file"));
        }

        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(AppError::bad_request("Empty file"));
        }

        return Ok((file_name, bytes));
    }

    Err(AppError::bad_request("No file part"))
}

pub async fn submit_text(
    State(state): State<AppState>,
    payload: Result<Json<TextSubmission>, JsonRejection>,
) -> Result<Json<TextResponse>, AppError> {
    let text = payload
        .ok()
        .and_then(|Json(submission)| submission.text)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("No text provided"))?;

    let timestamp = now_timestamp();
    let mut document = Document::new();
    document.insert("text".to_string(), Value::String(text));
    document.insert("type".to_string(), Value::String("text".to_string()));
    document.insert("timestamp".to_string(), Value::String(timestamp.clone()));

    let id = state.store.insert_one(CAR_LOGS, document).await?;
    info!(%id, "text entry logged");

    Ok(Json(TextResponse {
        message: "Text submitted successfully".to_string(),
        timestamp,
    }))
}

pub async fn home_page(State(state): State<AppState>) -> Html<String> {
    Html(ui::home::render(&state.config.api_base_url))
}

pub async fn upload_page(State(state): State<AppState>) -> Html<String> {
    Html(ui::upload::render(&state.config.api_base_url))
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub sort: Option<String>,
    pub status: Option<String>,
}

pub async fn dashboard_page(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Html<String> {
    let order = SortOrder::parse(query.sort.as_deref());
    let filter = StatusFilter::parse(query.status.as_deref());
    let snapshot = dashboard::entries_from_documents(state.store.find_all(CAR_LOGS).await);
    let rows = dashboard::visible_entries(&snapshot, order, &filter);

    Html(ui::dashboard::render(&state.config.api_base_url, order, &filter, &rows))
}
