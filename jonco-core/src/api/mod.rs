//! HTTP API for the public site and the admin panel.
//!
//! Handlers validate their input and pass straight through to the
//! `SiteRepository` and `MediaStore`; nothing is cached.

mod configuracion;
mod contacto;
mod error;
mod expediciones;
mod horarios;
mod keepalive;
mod testimonios;
mod upload;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use jonco_common::upload_policy::MAX_UPLOAD_BYTES;
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::media_store::MediaStore;
use crate::site::SiteRepository;

pub use error::{ApiError, ApiJson, CONFIG_MISSING};

/// Largest request body on the upload route: the file plus form overhead.
pub const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES as usize + 1024 * 1024;

pub struct AppState {
    pub repo: Arc<dyn SiteRepository>,
    /// Absent when no service-role key is configured.
    pub media: Option<Arc<dyn MediaStore>>,
}

/// `{"success": true}`, the answer of every write that returns no row.
#[derive(Serialize)]
struct Success {
    success: bool,
}

impl Success {
    fn ok() -> axum::Json<Self> {
        axum::Json(Self { success: true })
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/configuracion",
            get(configuracion::list)
                .put(configuracion::upsert)
                .post(configuracion::create)
                .delete(configuracion::remove),
        )
        .route("/api/contacto", get(contacto::get).put(contacto::update))
        .route(
            "/api/expediciones",
            get(expediciones::list)
                .post(expediciones::create)
                .put(expediciones::update)
                .delete(expediciones::remove),
        )
        .route(
            "/api/horarios",
            get(horarios::list)
                .post(horarios::create)
                .put(horarios::update)
                .delete(horarios::remove),
        )
        .route(
            "/api/testimonios",
            get(testimonios::list)
                .post(testimonios::create)
                .delete(testimonios::remove),
        )
        .route("/api/keepalive", get(keepalive::ping))
        .route(
            "/api/upload",
            post(upload::upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
