//! In-memory `SiteRepository` for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{
    BackendError, ConfigEntry, ContactMap, Expedicion, ExpedicionFields, ExpedicionUpdate, Horario,
    HorarioFields, HorarioUpdate, NewConfigEntry, NewTestimonio, SiteRepository, Testimonio,
};

#[derive(Default)]
struct Tables {
    config: Vec<ConfigEntry>,
    contact: ContactMap,
    expediciones: Vec<Expedicion>,
    horarios: Vec<Horario>,
    testimonios: Vec<Testimonio>,
    next_id: i64,
    clock: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Monotonic fake timestamps so "newest first" ordering is deterministic.
    fn tick(&mut self) -> String {
        self.clock += 1;
        format!("2024-01-01T00:00:00.{:06}Z", self.clock)
    }

    fn title_of(&self, expedicion_id: i64) -> Option<String> {
        self.expediciones
            .iter()
            .find(|e| e.id == expedicion_id)
            .map(|e| e.title.clone())
    }
}

/// Behaves like the hosted store, including the service-role split.
/// `failing()` turns every call into a backend error.
#[derive(Default)]
pub struct MemorySiteRepository {
    tables: Mutex<Tables>,
    fail: bool,
    without_service_role: bool,
}

impl MemorySiteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Privileged tables answer `NotConfigured`, as with no service-role key.
    pub fn without_service_role() -> Self {
        Self {
            without_service_role: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), BackendError> {
        if self.fail {
            return Err(BackendError::Api {
                status: 503,
                body: "backend unavailable".into(),
            });
        }
        Ok(())
    }

    fn check_privileged(&self, what: &'static str) -> Result<(), BackendError> {
        self.check()?;
        if self.without_service_role {
            return Err(BackendError::NotConfigured(what));
        }
        Ok(())
    }

    /// Insert an experience directly, bypassing the API.
    pub fn seed_expedicion(&self, title: &str, price: Option<f64>, activo: i32) -> Expedicion {
        let mut tables = self.tables.lock().unwrap();
        let row = Expedicion {
            id: tables.next_id(),
            title: title.to_string(),
            category: None,
            description: None,
            price,
            image: None,
            gallery: Some(String::new()),
            activo,
        };
        tables.expediciones.push(row.clone());
        row
    }

    /// All testimonials including inactive ones.
    pub fn all_testimonios(&self) -> Vec<Testimonio> {
        self.tables.lock().unwrap().testimonios.clone()
    }
}

#[async_trait]
impl SiteRepository for MemorySiteRepository {
    async fn list_config(&self) -> Result<Vec<ConfigEntry>, BackendError> {
        self.check()?;
        let mut rows = self.tables.lock().unwrap().config.clone();
        rows.sort_by(|a, b| a.clave.cmp(&b.clave));
        Ok(rows)
    }

    async fn upsert_config(&self, clave: &str, valor: &str) -> Result<ConfigEntry, BackendError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let updated_at = Some(tables.tick());
        if let Some(row) = tables.config.iter_mut().find(|c| c.clave == clave) {
            row.valor = valor.to_string();
            row.updated_at = updated_at;
            return Ok(row.clone());
        }
        let row = ConfigEntry {
            clave: clave.to_string(),
            valor: valor.to_string(),
            descripcion: None,
            updated_at,
        };
        tables.config.push(row.clone());
        Ok(row)
    }

    async fn create_config(&self, entry: NewConfigEntry) -> Result<ConfigEntry, BackendError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if tables.config.iter().any(|c| c.clave == entry.clave) {
            return Err(BackendError::Api {
                status: 409,
                body: format!("duplicate key {}", entry.clave),
            });
        }
        let row = ConfigEntry {
            clave: entry.clave,
            valor: entry.valor,
            descripcion: Some(entry.descripcion),
            updated_at: Some(tables.tick()),
        };
        tables.config.push(row.clone());
        Ok(row)
    }

    async fn delete_config(&self, clave: &str) -> Result<(), BackendError> {
        self.check()?;
        self.tables
            .lock()
            .unwrap()
            .config
            .retain(|c| c.clave != clave);
        Ok(())
    }

    async fn contact(&self) -> Result<ContactMap, BackendError> {
        self.check()?;
        Ok(self.tables.lock().unwrap().contact.clone())
    }

    async fn merge_contact(&self, fields: ContactMap) -> Result<(), BackendError> {
        self.check()?;
        self.tables.lock().unwrap().contact.extend(fields);
        Ok(())
    }

    async fn list_expediciones(&self) -> Result<Vec<Expedicion>, BackendError> {
        self.check()?;
        let mut rows: Vec<Expedicion> = self
            .tables
            .lock()
            .unwrap()
            .expediciones
            .iter()
            .filter(|e| e.activo == 1)
            .cloned()
            .collect();
        rows.sort_by_key(|e| e.id);
        Ok(rows)
    }

    async fn create_expedicion(
        &self,
        fields: ExpedicionFields,
    ) -> Result<Expedicion, BackendError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let row = Expedicion {
            id: tables.next_id(),
            title: fields.title,
            category: Some(fields.category),
            description: Some(fields.description),
            price: fields.price,
            image: Some(fields.image),
            gallery: Some(fields.gallery),
            activo: 1,
        };
        tables.expediciones.push(row.clone());
        Ok(row)
    }

    async fn update_expedicion(
        &self,
        id: i64,
        update: ExpedicionUpdate,
    ) -> Result<Expedicion, BackendError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let row = tables
            .expediciones
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(BackendError::NotFound)?;
        row.title = update.title;
        if let Some(category) = update.category {
            row.category = Some(category);
        }
        if let Some(description) = update.description {
            row.description = Some(description);
        }
        row.price = update.price;
        if let Some(image) = update.image {
            row.image = Some(image);
        }
        row.gallery = Some(update.gallery);
        row.activo = update.activo;
        Ok(row.clone())
    }

    async fn delete_expedicion(&self, id: i64) -> Result<(), BackendError> {
        self.check()?;
        self.tables
            .lock()
            .unwrap()
            .expediciones
            .retain(|e| e.id != id);
        Ok(())
    }

    async fn list_horarios(
        &self,
        expedicion_id: Option<i64>,
    ) -> Result<Vec<Horario>, BackendError> {
        self.check_privileged("horarios")?;
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<Horario> = tables
            .horarios
            .iter()
            .filter(|h| expedicion_id.map_or(true, |id| h.expedicion_id == id))
            .map(|h| Horario {
                expedicion_title: tables.title_of(h.expedicion_id),
                ..h.clone()
            })
            .collect();
        rows.sort_by_key(|h| h.expedicion_id);
        Ok(rows)
    }

    async fn create_horario(&self, fields: HorarioFields) -> Result<Horario, BackendError> {
        self.check_privileged("horarios")?;
        let mut tables = self.tables.lock().unwrap();
        let row = Horario {
            id: tables.next_id(),
            expedicion_id: fields.expedicion_id,
            dias: Some(fields.dias),
            hora_salida: Some(fields.hora_salida),
            hora_regreso: Some(fields.hora_regreso),
            cupos: Some(fields.cupos),
            activo: 1,
            expedicion_title: tables.title_of(fields.expedicion_id),
        };
        tables.horarios.push(row.clone());
        Ok(row)
    }

    async fn update_horario(
        &self,
        id: i64,
        update: HorarioUpdate,
    ) -> Result<Horario, BackendError> {
        self.check_privileged("horarios")?;
        let mut tables = self.tables.lock().unwrap();
        let title = tables.title_of(update.expedicion_id);
        let row = tables
            .horarios
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or(BackendError::NotFound)?;
        row.expedicion_id = update.expedicion_id;
        row.dias = Some(update.dias);
        row.hora_salida = Some(update.hora_salida);
        row.hora_regreso = Some(update.hora_regreso);
        if let Some(cupos) = update.cupos {
            row.cupos = Some(cupos);
        }
        row.activo = update.activo;
        row.expedicion_title = title;
        Ok(row.clone())
    }

    async fn delete_horario(&self, id: i64) -> Result<(), BackendError> {
        self.check_privileged("horarios")?;
        self.tables.lock().unwrap().horarios.retain(|h| h.id != id);
        Ok(())
    }

    async fn list_testimonios(&self) -> Result<Vec<Testimonio>, BackendError> {
        self.check_privileged("testimonios")?;
        let mut rows: Vec<Testimonio> = self
            .tables
            .lock()
            .unwrap()
            .testimonios
            .iter()
            .filter(|t| t.activo)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn create_testimonio(
        &self,
        testimonio: NewTestimonio,
    ) -> Result<Testimonio, BackendError> {
        self.check_privileged("testimonios")?;
        let mut tables = self.tables.lock().unwrap();
        let row = Testimonio {
            id: tables.next_id(),
            name: testimonio.name,
            location: testimonio.location,
            experience: testimonio.experience,
            date: testimonio.date,
            text: testimonio.text,
            activo: true,
            created_at: Some(tables.tick()),
        };
        tables.testimonios.push(row.clone());
        Ok(row)
    }

    async fn deactivate_testimonio(&self, id: i64) -> Result<(), BackendError> {
        self.check_privileged("testimonios")?;
        let mut tables = self.tables.lock().unwrap();
        if let Some(row) = tables.testimonios.iter_mut().find(|t| t.id == id) {
            row.activo = false;
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), BackendError> {
        self.check_privileged("keepalive")
    }
}
