use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::Value;

use super::{ApiError, ApiJson, AppState, Success};
use crate::site::ContactMap;

pub(super) async fn get(State(state): State<Arc<AppState>>) -> Result<Json<ContactMap>, ApiError> {
    let contact = state
        .repo
        .contact()
        .await
        .map_err(|e| ApiError::backend("Error fetching contacto", e))?;
    Ok(Json(contact))
}

/// Keys present in the body replace their stored values; other keys stay.
pub(super) async fn update(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<BTreeMap<String, Value>>,
) -> Result<Json<Success>, ApiError> {
    let fields = contact_fields(body)?;
    state
        .repo
        .merge_contact(fields)
        .await
        .map_err(|e| ApiError::backend("Error updating contacto", e))?;
    Ok(Success::ok())
}

fn contact_fields(body: BTreeMap<String, Value>) -> Result<ContactMap, ApiError> {
    body.into_iter()
        .map(|(clave, valor)| {
            if clave.is_empty() {
                return Err(ApiError::bad_request("Contact keys must not be empty"));
            }
            match valor {
                Value::String(valor) => Ok((clave, valor)),
                _ => Err(ApiError::bad_request(format!("Value of {clave} must be a string"))),
            }
        })
        .collect()
}
