use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::postgrest::{PostgrestClient, Query};
use crate::site::{
    BackendError, ConfigEntry, ContactMap, ContactRow, Expedicion, ExpedicionFields,
    ExpedicionUpdate, Horario, HorarioFields, HorarioUpdate, NewConfigEntry, NewTestimonio,
    SiteRepository, Testimonio,
};

const HORARIO_COLUMNS: &str = "*,expediciones(title)";

/// `horarios` row as returned with the embedded experience title.
#[derive(Deserialize)]
struct HorarioRow {
    #[serde(flatten)]
    horario: Horario,
    #[serde(default)]
    expediciones: Option<EmbeddedTitle>,
}

#[derive(Deserialize)]
struct EmbeddedTitle {
    title: Option<String>,
}

impl From<HorarioRow> for Horario {
    fn from(row: HorarioRow) -> Self {
        Horario {
            expedicion_title: row.expediciones.and_then(|e| e.title),
            ..row.horario
        }
    }
}

/// Row-store access through the hosted backend.
///
/// Public tables go through the anonymous key. Schedules, testimonials and the
/// keepalive ping need the service-role client.
pub struct SupabaseSiteRepository {
    public: PostgrestClient,
    privileged: Option<PostgrestClient>,
}

impl SupabaseSiteRepository {
    pub fn new(public: PostgrestClient, privileged: Option<PostgrestClient>) -> Self {
        Self { public, privileged }
    }

    fn privileged(&self, what: &'static str) -> Result<&PostgrestClient, BackendError> {
        self.privileged
            .as_ref()
            .ok_or(BackendError::NotConfigured(what))
    }
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[async_trait]
impl SiteRepository for SupabaseSiteRepository {
    async fn list_config(&self) -> Result<Vec<ConfigEntry>, BackendError> {
        self.public
            .select("configuracion", &Query::new().select("*").order("clave", true))
            .await
    }

    async fn upsert_config(&self, clave: &str, valor: &str) -> Result<ConfigEntry, BackendError> {
        self.public
            .upsert_one(
                "configuracion",
                &Query::new().on_conflict("clave").select("*"),
                &json!({ "clave": clave, "valor": valor, "updated_at": now_rfc3339() }),
            )
            .await
    }

    async fn create_config(&self, entry: NewConfigEntry) -> Result<ConfigEntry, BackendError> {
        self.public
            .insert_one("configuracion", &Query::new().select("*"), &entry)
            .await
    }

    async fn delete_config(&self, clave: &str) -> Result<(), BackendError> {
        self.public
            .delete("configuracion", &Query::new().eq("clave", clave))
            .await
    }

    async fn contact(&self) -> Result<ContactMap, BackendError> {
        let rows: Vec<ContactRow> = self
            .public
            .select("contacto", &Query::new().select("*"))
            .await?;
        Ok(rows.into_iter().map(|r| (r.clave, r.valor)).collect())
    }

    async fn merge_contact(&self, fields: ContactMap) -> Result<(), BackendError> {
        if fields.is_empty() {
            return Ok(());
        }
        let rows: Vec<ContactRow> = fields
            .into_iter()
            .map(|(clave, valor)| ContactRow { clave, valor })
            .collect();
        self.public
            .upsert_many("contacto", &Query::new().on_conflict("clave"), &rows)
            .await
    }

    async fn list_expediciones(&self) -> Result<Vec<Expedicion>, BackendError> {
        self.public
            .select(
                "expediciones",
                &Query::new().select("*").eq("activo", 1).order("id", true),
            )
            .await
    }

    async fn create_expedicion(
        &self,
        fields: ExpedicionFields,
    ) -> Result<Expedicion, BackendError> {
        self.public
            .insert_one("expediciones", &Query::new().select("*"), &fields)
            .await
    }

    async fn update_expedicion(
        &self,
        id: i64,
        update: ExpedicionUpdate,
    ) -> Result<Expedicion, BackendError> {
        self.public
            .update_one(
                "expediciones",
                &Query::new().eq("id", id).select("*"),
                &update,
            )
            .await
    }

    async fn delete_expedicion(&self, id: i64) -> Result<(), BackendError> {
        self.public
            .delete("expediciones", &Query::new().eq("id", id))
            .await
    }

    async fn list_horarios(
        &self,
        expedicion_id: Option<i64>,
    ) -> Result<Vec<Horario>, BackendError> {
        let mut query = Query::new().select(HORARIO_COLUMNS);
        if let Some(id) = expedicion_id {
            query = query.eq("expedicion_id", id);
        }
        let rows: Vec<HorarioRow> = self
            .privileged("horarios")?
            .select("horarios", &query.order("expedicion_id", true))
            .await?;
        Ok(rows.into_iter().map(Horario::from).collect())
    }

    async fn create_horario(&self, fields: HorarioFields) -> Result<Horario, BackendError> {
        let row: HorarioRow = self
            .privileged("horarios")?
            .insert_one("horarios", &Query::new().select(HORARIO_COLUMNS), &fields)
            .await?;
        Ok(row.into())
    }

    async fn update_horario(
        &self,
        id: i64,
        update: HorarioUpdate,
    ) -> Result<Horario, BackendError> {
        let row: HorarioRow = self
            .privileged("horarios")?
            .update_one(
                "horarios",
                &Query::new().eq("id", id).select(HORARIO_COLUMNS),
                &update,
            )
            .await?;
        Ok(row.into())
    }

    async fn delete_horario(&self, id: i64) -> Result<(), BackendError> {
        self.privileged("horarios")?
            .delete("horarios", &Query::new().eq("id", id))
            .await
    }

    async fn list_testimonios(&self) -> Result<Vec<Testimonio>, BackendError> {
        self.privileged("testimonios")?
            .select(
                "testimonios",
                &Query::new()
                    .select("*")
                    .eq("activo", true)
                    .order("created_at", false),
            )
            .await
    }

    async fn create_testimonio(
        &self,
        testimonio: NewTestimonio,
    ) -> Result<Testimonio, BackendError> {
        let body = json!({
            "name": testimonio.name,
            "location": testimonio.location,
            "experience": testimonio.experience,
            "date": testimonio.date,
            "text": testimonio.text,
            "activo": true,
        });
        self.privileged("testimonios")?
            .insert_one("testimonios", &Query::new().select("*"), &body)
            .await
    }

    async fn deactivate_testimonio(&self, id: i64) -> Result<(), BackendError> {
        self.privileged("testimonios")?
            .update(
                "testimonios",
                &Query::new().eq("id", id),
                &json!({ "activo": false }),
            )
            .await
    }

    async fn ping(&self) -> Result<(), BackendError> {
        let _: Vec<serde_json::Value> = self
            .privileged("keepalive")?
            .select("expediciones", &Query::new().select("id").limit(1))
            .await?;
        Ok(())
    }
}
