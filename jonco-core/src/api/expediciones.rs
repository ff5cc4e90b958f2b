use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::{ApiError, ApiJson, AppState, Success};
use crate::site::{Expedicion, ExpedicionFields, ExpedicionUpdate};

/// Body of POST, PUT and DELETE. Which fields are required depends on the verb.
#[derive(Deserialize)]
pub(super) struct ExpedicionBody {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    gallery: Option<String>,
    #[serde(default)]
    activo: Option<i32>,
}

impl ExpedicionBody {
    fn id(&self) -> Result<i64, ApiError> {
        self.id.ok_or_else(|| ApiError::bad_request("id is required"))
    }

    fn validate(&self) -> Result<(), ApiError> {
        if self.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Err(ApiError::bad_request("title is required"));
        }
        if let Some(price) = self.price {
            if !price.is_finite() || price < 0.0 {
                return Err(ApiError::bad_request("price must be a non-negative number"));
            }
        }
        Ok(())
    }

    fn fields(self) -> Result<ExpedicionFields, ApiError> {
        self.validate()?;
        Ok(ExpedicionFields {
            title: self.title.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            price: self.price,
            image: self.image.unwrap_or_default(),
            gallery: self.gallery.unwrap_or_default(),
        })
    }

    /// Columns missing from the body are left alone, except `price`, `gallery`
    /// and `activo`, which fall back to null, `""` and 1.
    fn update(self) -> Result<(i64, ExpedicionUpdate), ApiError> {
        let id = self.id()?;
        self.validate()?;
        let update = ExpedicionUpdate {
            title: self.title.unwrap_or_default(),
            category: self.category,
            description: self.description,
            price: self.price,
            image: self.image,
            gallery: self.gallery.unwrap_or_default(),
            activo: self.activo.unwrap_or(1),
        };
        Ok((id, update))
    }
}

pub(super) async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Expedicion>>, ApiError> {
    let rows = state
        .repo
        .list_expediciones()
        .await
        .map_err(|e| ApiError::backend("Error fetching expediciones", e))?;
    Ok(Json(rows))
}

pub(super) async fn create(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<ExpedicionBody>,
) -> Result<(StatusCode, Json<Expedicion>), ApiError> {
    let fields = body.fields()?;
    let row = state
        .repo
        .create_expedicion(fields)
        .await
        .map_err(|e| ApiError::backend("Error creating expedicion", e))?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub(super) async fn update(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<ExpedicionBody>,
) -> Result<Json<Expedicion>, ApiError> {
    let (id, update) = body.update()?;
    let row = state
        .repo
        .update_expedicion(id, update)
        .await
        .map_err(|e| ApiError::backend("Error updating expedicion", e))?;
    Ok(Json(row))
}

pub(super) async fn remove(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<ExpedicionBody>,
) -> Result<Json<Success>, ApiError> {
    let id = body.id()?;
    state
        .repo
        .delete_expedicion(id)
        .await
        .map_err(|e| ApiError::backend("Error deleting expedicion", e))?;
    Ok(Success::ok())
}
