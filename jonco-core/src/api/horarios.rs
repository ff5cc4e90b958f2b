use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::{ApiError, ApiJson, AppState, Success};
use crate::site::{Horario, HorarioFields, HorarioUpdate, DEFAULT_CUPOS};

#[derive(Deserialize)]
pub(super) struct HorarioFilter {
    #[serde(default)]
    expedicion_id: Option<i64>,
}

#[derive(Deserialize)]
pub(super) struct HorarioBody {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    expedicion_id: Option<i64>,
    #[serde(default)]
    dias: Option<String>,
    #[serde(default)]
    hora_salida: Option<String>,
    #[serde(default)]
    hora_regreso: Option<String>,
    #[serde(default)]
    cupos: Option<i32>,
    #[serde(default)]
    activo: Option<i32>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl HorarioBody {
    fn id(&self) -> Result<i64, ApiError> {
        self.id.ok_or_else(|| ApiError::bad_request("id is required"))
    }

    /// The columns both create and update require.
    fn required(&mut self) -> Result<(i64, String, String, String), ApiError> {
        let expedicion_id = self
            .expedicion_id
            .ok_or_else(|| ApiError::bad_request("expedicion_id is required"))?;
        let (Some(dias), Some(hora_salida), Some(hora_regreso)) = (
            non_blank(self.dias.take()),
            non_blank(self.hora_salida.take()),
            non_blank(self.hora_regreso.take()),
        ) else {
            return Err(ApiError::bad_request(
                "dias, hora_salida and hora_regreso are required",
            ));
        };
        if self.cupos.is_some_and(|c| c < 0) {
            return Err(ApiError::bad_request("cupos must not be negative"));
        }
        Ok((expedicion_id, dias, hora_salida, hora_regreso))
    }

    fn fields(mut self) -> Result<HorarioFields, ApiError> {
        let (expedicion_id, dias, hora_salida, hora_regreso) = self.required()?;
        Ok(HorarioFields {
            expedicion_id,
            dias,
            hora_salida,
            hora_regreso,
            cupos: self.cupos.unwrap_or(DEFAULT_CUPOS),
        })
    }

    /// Seats keep their stored value unless the body sets them.
    fn update(mut self) -> Result<(i64, HorarioUpdate), ApiError> {
        let id = self.id()?;
        let (expedicion_id, dias, hora_salida, hora_regreso) = self.required()?;
        let update = HorarioUpdate {
            expedicion_id,
            dias,
            hora_salida,
            hora_regreso,
            cupos: self.cupos,
            activo: self.activo.unwrap_or(1),
        };
        Ok((id, update))
    }
}

pub(super) async fn list(
    State(state): State<Arc<AppState>>,
    filter: Result<Query<HorarioFilter>, QueryRejection>,
) -> Result<Json<Vec<Horario>>, ApiError> {
    let Query(filter) = filter?;
    let rows = state
        .repo
        .list_horarios(filter.expedicion_id)
        .await
        .map_err(|e| ApiError::backend("Error fetching horarios", e))?;
    Ok(Json(rows))
}

pub(super) async fn create(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<HorarioBody>,
) -> Result<(StatusCode, Json<Horario>), ApiError> {
    let fields = body.fields()?;
    let row = state
        .repo
        .create_horario(fields)
        .await
        .map_err(|e| ApiError::backend("Error creating horario", e))?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub(super) async fn update(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<HorarioBody>,
) -> Result<Json<Horario>, ApiError> {
    let (id, update) = body.update()?;
    let row = state
        .repo
        .update_horario(id, update)
        .await
        .map_err(|e| ApiError::backend("Error updating horario", e))?;
    Ok(Json(row))
}

pub(super) async fn remove(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<HorarioBody>,
) -> Result<Json<Success>, ApiError> {
    let id = body.id()?;
    state
        .repo
        .delete_horario(id)
        .await
        .map_err(|e| ApiError::backend("Error deleting horario", e))?;
    Ok(Success::ok())
}
