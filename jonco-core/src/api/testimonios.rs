use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::{ApiError, ApiJson, AppState, Success};
use crate::site::{NewTestimonio, Testimonio};

#[derive(Deserialize)]
pub(super) struct TestimonioBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    experience: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct DeleteBody {
    #[serde(default)]
    id: Option<i64>,
}

pub(super) async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Testimonio>>, ApiError> {
    let rows = state
        .repo
        .list_testimonios()
        .await
        .map_err(|e| ApiError::backend("Failed to fetch testimonios", e))?;
    Ok(Json(rows))
}

pub(super) async fn create(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<TestimonioBody>,
) -> Result<Json<Testimonio>, ApiError> {
    let (Some(name), Some(text)) = (
        body.name.filter(|n| !n.is_empty()),
        body.text.filter(|t| !t.is_empty()),
    ) else {
        return Err(ApiError::bad_request("name and text are required"));
    };
    let testimonio = NewTestimonio {
        name,
        location: body.location,
        experience: body.experience,
        date: body.date,
        text,
    };
    let row = state
        .repo
        .create_testimonio(testimonio)
        .await
        .map_err(|e| ApiError::backend("Failed to create testimonio", e))?;
    Ok(Json(row))
}

/// Soft delete: the row stays but disappears from listings.
pub(super) async fn remove(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<DeleteBody>,
) -> Result<Json<Success>, ApiError> {
    let id = body.id.ok_or_else(|| ApiError::bad_request("id is required"))?;
    state
        .repo
        .deactivate_testimonio(id)
        .await
        .map_err(|e| ApiError::backend("Failed to delete testimonio", e))?;
    Ok(Success::ok())
}
