//! Rows of the site content tables and the typed inputs used to write them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A `configuracion` row: one named setting of the public site
/// (story section text, hero image URL, ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub clave: String,
    pub valor: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewConfigEntry {
    pub clave: String,
    pub valor: String,
    pub descripcion: String,
}

/// A `contacto` row. The API exposes the whole table as a single map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContactRow {
    pub clave: String,
    pub valor: String,
}

/// Contact fields keyed by name. Writes replace values key by key and leave
/// keys that are not mentioned untouched.
pub type ContactMap = BTreeMap<String, String>;

/// An `expediciones` row: a bookable experience in the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expedicion {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub gallery: Option<String>,
    #[serde(default = "active_flag")]
    pub activo: i32,
}

fn active_flag() -> i32 {
    1
}

/// Writable columns of an experience.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExpedicionFields {
    pub title: String,
    pub category: String,
    pub description: String,
    pub price: Option<f64>,
    pub image: String,
    pub gallery: String,
}

/// Columns written by an experience update. Columns left as `None` keep their
/// stored value; `price` is always written and clears to null.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExpedicionUpdate {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub gallery: String,
    pub activo: i32,
}

/// A `horarios` row joined with the title of its experience.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Horario {
    pub id: i64,
    pub expedicion_id: i64,
    #[serde(default)]
    pub dias: Option<String>,
    #[serde(default)]
    pub hora_salida: Option<String>,
    #[serde(default)]
    pub hora_regreso: Option<String>,
    #[serde(default)]
    pub cupos: Option<i32>,
    #[serde(default = "active_flag")]
    pub activo: i32,
    #[serde(default)]
    pub expedicion_title: Option<String>,
}

/// Seats per departure when the admin does not say otherwise.
pub const DEFAULT_CUPOS: i32 = 6;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HorarioFields {
    pub expedicion_id: i64,
    pub dias: String,
    pub hora_salida: String,
    pub hora_regreso: String,
    pub cupos: i32,
}

/// Columns written by a schedule update. Seats are only written when given.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HorarioUpdate {
    pub expedicion_id: i64,
    pub dias: String,
    pub hora_salida: String,
    pub hora_regreso: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cupos: Option<i32>,
    pub activo: i32,
}

/// A `testimonios` row. Deleting only clears `activo`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Testimonio {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    pub text: String,
    #[serde(default = "default_true")]
    pub activo: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewTestimonio {
    pub name: String,
    pub location: Option<String>,
    pub experience: Option<String>,
    pub date: Option<String>,
    pub text: String,
}
