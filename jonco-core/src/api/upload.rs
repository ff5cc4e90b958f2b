//! `POST /api/upload`: media uploads through the server, or a signed URL for
//! uploading straight to storage.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use jonco_common::upload_policy::{self, PreflightError};
use jonco_common::MediaType;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::{ApiError, ApiJson, AppState, CONFIG_MISSING};
use crate::media;
use crate::media_store::MediaStore;

const WEBP_CONTENT_TYPE: &str = "image/webp";

#[derive(Serialize)]
struct UploadResponse {
    success: bool,
    url: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SignedUploadRequest {
    #[serde(default)]
    folder: Option<String>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    content_type: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignedUploadResponse {
    signed_url: String,
    public_url: String,
}

struct UploadedFile {
    name: String,
    content_type: String,
    data: Bytes,
}

pub(super) async fn upload(
    State(state): State<Arc<AppState>>,
    req: Request,
) -> Result<Response, ApiError> {
    let Some(store) = state.media.clone() else {
        error!("Upload rejected: no service-role key configured");
        return Err(ApiError::Internal(CONFIG_MISSING.to_string()));
    };

    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(req, &state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        let resp = store_file(store.as_ref(), multipart).await?;
        Ok(resp.into_response())
    } else if content_type.starts_with("application/json") {
        let ApiJson(body) = ApiJson::<SignedUploadRequest>::from_request(req, &state).await?;
        let resp = sign_upload(store.as_ref(), body).await?;
        Ok(resp.into_response())
    } else {
        Err(ApiError::bad_request("Unsupported content type"))
    }
}

fn form_error(err: MultipartError) -> ApiError {
    warn!("Unreadable upload form: {err}");
    ApiError::bad_request(err.body_text())
}

async fn read_form(
    mut multipart: Multipart,
) -> Result<(Option<UploadedFile>, Option<String>), ApiError> {
    let mut file = None;
    let mut folder = None;
    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        match field.name().map(str::to_string).as_deref() {
            Some("file") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(form_error)?;
                file = Some(UploadedFile {
                    name,
                    content_type,
                    data,
                });
            }
            Some("folder") => folder = Some(field.text().await.map_err(form_error)?),
            _ => {}
        }
    }
    Ok((file, folder))
}

/// Validate, transcode images, store, and answer with the public URL.
async fn store_file(
    store: &dyn MediaStore,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let (file, folder) = read_form(multipart).await?;
    let file = file.ok_or_else(|| ApiError::bad_request("No file provided"))?;
    let folder = folder.unwrap_or_default();
    upload_policy::validate_folder(&folder).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let media_type = upload_policy::preflight(&file.content_type, file.data.len() as u64)
        .map_err(|e| match e {
            PreflightError::UnsupportedType(_) => ApiError::bad_request("File type not allowed"),
            PreflightError::TooLarge { .. } => ApiError::bad_request("File too large"),
        })?;

    let path = upload_policy::object_path(
        &folder,
        &file.name,
        media_type,
        Utc::now().timestamp_millis(),
    );

    if media_type.is_video() {
        let size = file.data.len();
        store
            .put(&path, file.data.to_vec(), media_type.as_str())
            .await
            .map_err(|e| {
                error!("Video upload error for {path}: {e}");
                ApiError::Internal("Failed to upload video".to_string())
            })?;
        info!("Stored video {path} ({size} bytes)");
        return Ok(Json(UploadResponse {
            success: true,
            url: store.public_url(&path),
            kind: None,
        }));
    }

    let original = file.data;
    let webp = tokio::task::spawn_blocking(move || media::transcode_to_webp(&original))
        .await
        .map_err(|e| {
            error!("Transcode task for {path} failed: {e}");
            ApiError::Internal("Failed to upload file".to_string())
        })?
        .map_err(|e| {
            error!("Upload error for {path}: {e}");
            ApiError::Internal("Failed to upload file".to_string())
        })?;

    let size = webp.len();
    store.put(&path, webp, WEBP_CONTENT_TYPE).await.map_err(|e| {
        error!("Image upload error for {path}: {e}");
        ApiError::Internal("Failed to upload image".to_string())
    })?;
    info!("Stored image {path} ({size} bytes)");

    Ok(Json(UploadResponse {
        success: true,
        url: store.public_url(&path),
        kind: Some("image"),
    }))
}

/// Issue a signed URL for a direct browser-to-storage upload.
///
/// The size cap cannot be checked here; the bytes never pass through us.
async fn sign_upload(
    store: &dyn MediaStore,
    body: SignedUploadRequest,
) -> Result<Json<SignedUploadResponse>, ApiError> {
    fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
        value
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::bad_request(message))
    }

    let folder = required(body.folder, "No folder provided")?;
    let filename = required(body.filename, "No filename provided")?;
    let content_type = required(body.content_type, "No content type provided")?;

    upload_policy::validate_folder(&folder).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let media_type = MediaType::from_mime(&content_type)
        .ok_or_else(|| ApiError::bad_request("File type not allowed"))?;

    let path = upload_policy::direct_object_path(
        &folder,
        &filename,
        media_type,
        Utc::now().timestamp_millis(),
    );

    let signed_url = store.signed_upload_url(&path).await.map_err(|e| {
        error!("Signed upload URL error for {path}: {e}");
        ApiError::Internal("Failed to create signed upload URL".to_string())
    })?;
    info!("Issued signed upload URL for {path}");

    Ok(Json(SignedUploadResponse {
        signed_url,
        public_url: store.public_url(&path),
    }))
}
