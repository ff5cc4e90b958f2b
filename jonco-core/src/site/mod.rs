//! Site content: catalog, schedules, testimonials, settings and contact data.
//!
//! `SiteRepository` is the seam between the HTTP handlers and the hosted row
//! store. Implementations do no caching; every call goes straight through.

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod models;

use async_trait::async_trait;

pub use models::{
    ConfigEntry, ContactMap, ContactRow, Expedicion, ExpedicionFields, ExpedicionUpdate, Horario,
    HorarioFields, HorarioUpdate, NewConfigEntry, NewTestimonio, Testimonio, DEFAULT_CUPOS,
};

/// Errors from the row store.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("row not found")]
    NotFound,
    #[error("{0} requires the service-role key")]
    NotConfigured(&'static str),
}

#[async_trait]
pub trait SiteRepository: Send + Sync {
    /// All settings, ordered by key.
    async fn list_config(&self) -> Result<Vec<ConfigEntry>, BackendError>;

    /// Insert or replace a setting by key, stamping `updated_at`.
    async fn upsert_config(&self, clave: &str, valor: &str) -> Result<ConfigEntry, BackendError>;

    async fn create_config(&self, entry: NewConfigEntry) -> Result<ConfigEntry, BackendError>;

    /// Delete a setting. Not an error if the key does not exist.
    async fn delete_config(&self, clave: &str) -> Result<(), BackendError>;

    async fn contact(&self) -> Result<ContactMap, BackendError>;

    /// Replace the given contact fields key by key.
    async fn merge_contact(&self, fields: ContactMap) -> Result<(), BackendError>;

    /// Active experiences ordered by id.
    async fn list_expediciones(&self) -> Result<Vec<Expedicion>, BackendError>;

    async fn create_expedicion(&self, fields: ExpedicionFields) -> Result<Expedicion, BackendError>;

    /// Write the given columns of one experience. `NotFound` if `id` is unknown.
    async fn update_expedicion(
        &self,
        id: i64,
        update: ExpedicionUpdate,
    ) -> Result<Expedicion, BackendError>;

    async fn delete_expedicion(&self, id: i64) -> Result<(), BackendError>;

    /// Schedules ordered by experience, optionally for one experience only.
    async fn list_horarios(&self, expedicion_id: Option<i64>) -> Result<Vec<Horario>, BackendError>;

    async fn create_horario(&self, fields: HorarioFields) -> Result<Horario, BackendError>;

    async fn update_horario(
        &self,
        id: i64,
        update: HorarioUpdate,
    ) -> Result<Horario, BackendError>;

    async fn delete_horario(&self, id: i64) -> Result<(), BackendError>;

    /// Active testimonials, newest first.
    async fn list_testimonios(&self) -> Result<Vec<Testimonio>, BackendError>;

    async fn create_testimonio(
        &self,
        testimonio: NewTestimonio,
    ) -> Result<Testimonio, BackendError>;

    /// Hide a testimonial without deleting it.
    async fn deactivate_testimonio(&self, id: i64) -> Result<(), BackendError>;

    /// Cheapest possible round trip, to keep the hosted database awake.
    async fn ping(&self) -> Result<(), BackendError>;
}
