use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{async_trait, Json};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::site::BackendError;

/// Shown when a privileged route runs without the service-role key.
pub const CONFIG_MISSING: &str = "Supabase configuration missing";

/// Every handler error ends up as `{"error": "<message>"}`.
///
/// Backend detail is logged where the error is built and never sent to the
/// client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Not found")]
    NotFound,
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Map a row-store failure to the route's generic `message`.
    pub fn backend(message: &str, err: BackendError) -> Self {
        match err {
            BackendError::NotConfigured(what) => {
                error!("{message}: {what} needs the service-role key, none configured");
                Self::Internal(CONFIG_MISSING.to_string())
            }
            BackendError::NotFound => {
                warn!("{message}: row not found");
                Self::NotFound
            }
            err => {
                error!("{message}: {err}");
                Self::Internal(message.to_string())
            }
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// `Json` extractor whose rejections are JSON `{error}` bodies.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
