use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::{ApiError, ApiJson, AppState, Success};
use crate::site::{ConfigEntry, NewConfigEntry};

#[derive(Deserialize)]
pub(super) struct ConfigBody {
    #[serde(default)]
    clave: Option<String>,
    #[serde(default)]
    valor: Option<String>,
    #[serde(default)]
    descripcion: Option<String>,
}

impl ConfigBody {
    /// `clave` must be non-empty; `valor` may be empty but must be present.
    fn key_and_value(self) -> Result<(String, String, Option<String>), ApiError> {
        match (self.clave, self.valor) {
            (Some(clave), Some(valor)) if !clave.is_empty() => Ok((clave, valor, self.descripcion)),
            _ => Err(ApiError::bad_request("clave and valor are required")),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct DeleteBody {
    #[serde(default)]
    clave: Option<String>,
}

pub(super) async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ConfigEntry>>, ApiError> {
    let rows = state
        .repo
        .list_config()
        .await
        .map_err(|e| ApiError::backend("Failed to fetch configuracion", e))?;
    Ok(Json(rows))
}

pub(super) async fn upsert(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<ConfigBody>,
) -> Result<Json<ConfigEntry>, ApiError> {
    let (clave, valor, _) = body.key_and_value()?;
    let row = state
        .repo
        .upsert_config(&clave, &valor)
        .await
        .map_err(|e| ApiError::backend("Failed to update configuracion", e))?;
    Ok(Json(row))
}

pub(super) async fn create(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<ConfigBody>,
) -> Result<Json<ConfigEntry>, ApiError> {
    let (clave, valor, descripcion) = body.key_and_value()?;
    let entry = NewConfigEntry {
        clave,
        valor,
        descripcion: descripcion.unwrap_or_default(),
    };
    let row = state
        .repo
        .create_config(entry)
        .await
        .map_err(|e| ApiError::backend("Failed to create configuracion", e))?;
    Ok(Json(row))
}

pub(super) async fn remove(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<DeleteBody>,
) -> Result<Json<Success>, ApiError> {
    let clave = body
        .clave
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::bad_request("clave is required"))?;
    state
        .repo
        .delete_config(&clave)
        .await
        .map_err(|e| ApiError::backend("Failed to delete configuracion", e))?;
    Ok(Success::ok())
}
