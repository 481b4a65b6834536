// ============================================================================
// SAVED FILTER STORE - Filtros guardados (localStorage o API del usuario)
// ============================================================================
// Nunca sobrescribe en silencio: guardar sobre un nombre existente requiere
// `overwrite = true`. Una operación fallida deja el store como estaba.
// ============================================================================

use std::collections::BTreeMap;
use std::rc::Rc;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::error::{DashboardError, DashboardResult};
use crate::models::filter::{
    validate_filter_name, FilterExport, FilterStats, ImportReport, SavedFilter, FILTER_FORMAT_VERSION,
};
use crate::models::grid::{encode_component, GridState};
use crate::services::http::{ApiRequest, HttpBackend};
use crate::services::synchronizer::Clock;
use crate::utils::storage::{load_json, save_json, KeyValueStorage};

#[allow(async_fn_in_trait)]
pub trait SavedFilterStore {
    async fn save(&self, name: &str, state: &GridState, overwrite: bool) -> DashboardResult<SavedFilter>;

    async fn load(&self, name: &str) -> DashboardResult<SavedFilter>;

    /// Borrar un nombre inexistente es `NotFound` (también la segunda vez)
    async fn delete(&self, name: &str) -> DashboardResult<()>;

    /// Todos los filtros, por nombre
    async fn entries(&self) -> DashboardResult<Vec<SavedFilter>>;

    async fn clear_all(&self) -> DashboardResult<usize>;

    fn now(&self) -> DateTime<Utc>;

    async fn list(&self) -> DashboardResult<Vec<String>> {
        Ok(self.entries().await?.into_iter().map(|f| f.name).collect())
    }

    async fn stats(&self) -> DashboardResult<FilterStats> {
        Ok(FilterStats {
            total_filters: self.entries().await?.len(),
        })
    }

    async fn export(&self) -> DashboardResult<FilterExport> {
        Ok(FilterExport::new(self.entries().await?, self.now()))
    }

    async fn export_json(&self) -> DashboardResult<String> {
        Ok(serde_json::to_string_pretty(&self.export().await?)?)
    }

    /// La forma `{ filters: { nombre: ... } }` se valida antes de tocar nada;
    /// después cada entrada falla o entra por separado.
    async fn import(&self, snapshot_json: &str) -> DashboardResult<ImportReport> {
        let entries = parse_import_snapshot(snapshot_json)?;
        let mut existing = self.list().await?;
        let mut report = ImportReport::default();

        for (raw_name, body) in entries {
            let state = match parse_import_entry(body) {
                Ok(state) => state,
                Err(e) => {
                    report.record_failure(&raw_name, e.to_string());
                    continue;
                }
            };
            match self.save(&raw_name, &state, true).await {
                Ok(saved) if existing.contains(&saved.name) => report.overwritten += 1,
                Ok(saved) => {
                    report.added += 1;
                    existing.push(saved.name);
                }
                Err(e) => report.record_failure(&raw_name, e.to_string()),
            }
        }

        log::info!("📥 [FILTERS] Import: {}", report.summary());
        Ok(report)
    }

    async fn duplicate(&self, original: &str, new_name: &str) -> DashboardResult<SavedFilter> {
        let source = self.load(original).await?;
        self.save(new_name, &source.state, false).await
    }
}

/// Validación común antes de guardar; devuelve el nombre normalizado
fn prepare_save(name: &str, state: &GridState) -> DashboardResult<String> {
    let name = validate_filter_name(name)?;
    if state.is_empty() {
        return Err(DashboardError::Validation(
            "No filters to save. Apply some filters first.".to_string(),
        ));
    }
    Ok(name)
}

fn filter_not_found(name: &str) -> DashboardError {
    DashboardError::NotFound(format!("Filter \"{}\"", name.trim()))
}

fn parse_import_snapshot(snapshot_json: &str) -> DashboardResult<serde_json::Map<String, Value>> {
    let mut root: Value = serde_json::from_str(snapshot_json)?;
    match root.get_mut("filters").map(Value::take) {
        Some(Value::Object(filters)) => Ok(filters),
        _ => Err(DashboardError::Format(
            "Invalid file format. Expected saved filters data.".to_string(),
        )),
    }
}

/// Acepta la forma exportada (`{ name, state, savedAt }`) y la plana de las
/// páginas JS (`{ filters, sorting, columns, savedAt }`)
fn parse_import_entry(body: Value) -> DashboardResult<GridState> {
    match body {
        Value::Object(mut obj) => match obj.remove("state") {
            Some(state) => Ok(serde_json::from_value(state)?),
            None => Ok(serde_json::from_value(Value::Object(obj))?),
        },
        _ => Err(DashboardError::Format("filter entry is not an object".to_string())),
    }
}

// ============================================================================
// LOCAL - todo el mapa bajo una clave de localStorage
// ============================================================================

pub struct LocalFilterStore<S> {
    storage: S,
    key: String,
    clock: Clock,
}

impl<S: KeyValueStorage> LocalFilterStore<S> {
    pub fn new(storage: S, key: &str) -> Self {
        Self::with_clock(storage, key, Rc::new(Utc::now))
    }

    pub fn with_clock(storage: S, key: &str, clock: Clock) -> Self {
        Self {
            storage,
            key: key.to_string(),
            clock,
        }
    }

    /// Un valor corrupto cuenta como store vacío; el siguiente guardado lo reemplaza
    fn read_all(&self) -> DashboardResult<BTreeMap<String, SavedFilter>> {
        match load_json(&self.storage, &self.key) {
            Ok(filters) => Ok(filters.unwrap_or_default()),
            Err(DashboardError::Format(e)) => {
                log::warn!("⚠️ [FILTERS] \"{}\" corrupto, se ignora: {}", self.key, e);
                Ok(BTreeMap::new())
            }
            Err(e) => Err(e),
        }
    }

    fn write_all(&self, filters: &BTreeMap<String, SavedFilter>) -> DashboardResult<()> {
        save_json(&self.storage, &self.key, filters)
    }
}

impl<S: KeyValueStorage> SavedFilterStore for LocalFilterStore<S> {
    async fn save(&self, name: &str, state: &GridState, overwrite: bool) -> DashboardResult<SavedFilter> {
        let name = prepare_save(name, state)?;
        let mut filters = self.read_all()?;
        if filters.contains_key(&name) && !overwrite {
            return Err(DashboardError::AlreadyExists(name));
        }

        let saved = SavedFilter::new(name.clone(), state.clone(), self.now());
        filters.insert(name.clone(), saved.clone());
        self.write_all(&filters)?;
        log::info!("💾 [FILTERS] \"{}\" guardado ({})", name, state.describe());
        Ok(saved)
    }

    async fn load(&self, name: &str) -> DashboardResult<SavedFilter> {
        self.read_all()?
            .remove(name.trim())
            .ok_or_else(|| filter_not_found(name))
    }

    async fn delete(&self, name: &str) -> DashboardResult<()> {
        let mut filters = self.read_all()?;
        if filters.remove(name.trim()).is_none() {
            return Err(filter_not_found(name));
        }
        self.write_all(&filters)?;
        log::info!("🗑️ [FILTERS] \"{}\" eliminado", name.trim());
        Ok(())
    }

    async fn entries(&self) -> DashboardResult<Vec<SavedFilter>> {
        Ok(self.read_all()?.into_values().collect())
    }

    async fn clear_all(&self) -> DashboardResult<usize> {
        let count = self.read_all()?.len();
        self.storage.remove(&self.key)?;
        log::info!("🧹 [FILTERS] {} filtros eliminados", count);
        Ok(count)
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

// ============================================================================
// REMOTO - API de filtros por usuario
// ============================================================================

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteFilterData {
    #[serde(flatten)]
    state: GridState,
    #[serde(default)]
    active_filter_count: usize,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Serialize)]
struct SaveFilterRequest<'a> {
    name: &'a str,
    filter_data: RemoteFilterData,
}

#[derive(Deserialize)]
struct RemoteFilterRecord {
    name: String,
    filter_data: RemoteFilterData,
    created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct FiltersListResponse {
    #[serde(default)]
    filters: Vec<RemoteFilterRecord>,
}

impl From<RemoteFilterRecord> for SavedFilter {
    fn from(record: RemoteFilterRecord) -> Self {
        SavedFilter {
            name: record.name,
            state: record.filter_data.state,
            saved_at: record.created_at,
            version: record
                .filter_data
                .version
                .unwrap_or_else(|| FILTER_FORMAT_VERSION.to_string()),
        }
    }
}

pub struct RemoteFilterStore<H> {
    http: H,
    clock: Clock,
}

impl<H: HttpBackend> RemoteFilterStore<H> {
    pub fn new(http: H) -> Self {
        Self::with_clock(http, Rc::new(Utc::now))
    }

    pub fn with_clock(http: H, clock: Clock) -> Self {
        Self { http, clock }
    }

    fn by_name_path(name: &str) -> String {
        format!("/filters/by-name/{}", encode_component(name.trim()))
    }

    async fn fetch_record(&self, name: &str) -> DashboardResult<SavedFilter> {
        let response = self.http.send(ApiRequest::get(Self::by_name_path(name))).await?;
        if response.status == 404 {
            return Err(filter_not_found(name));
        }
        let record: RemoteFilterRecord = response.into_result()?.json()?;
        Ok(record.into())
    }
}

impl<H: HttpBackend> SavedFilterStore for RemoteFilterStore<H> {
    async fn save(&self, name: &str, state: &GridState, overwrite: bool) -> DashboardResult<SavedFilter> {
        let name = prepare_save(name, state)?;
        if !overwrite {
            match self.fetch_record(&name).await {
                Ok(_) => return Err(DashboardError::AlreadyExists(name)),
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }
        }

        // El backend hace upsert por nombre
        let request = ApiRequest::post("/filters").with_json(&SaveFilterRequest {
            name: &name,
            filter_data: RemoteFilterData {
                state: state.clone(),
                active_filter_count: state.active_filter_count(),
                version: Some(FILTER_FORMAT_VERSION.to_string()),
            },
        })?;
        self.http.send(request).await?.into_result()?;
        log::info!("💾 [FILTERS] \"{}\" guardado en el servidor", name);
        Ok(SavedFilter::new(name, state.clone(), self.now()))
    }

    async fn load(&self, name: &str) -> DashboardResult<SavedFilter> {
        self.fetch_record(name).await
    }

    async fn delete(&self, name: &str) -> DashboardResult<()> {
        let response = self
            .http
            .send(ApiRequest::delete(Self::by_name_path(name)))
            .await?;
        if response.status == 404 {
            return Err(filter_not_found(name));
        }
        response.into_result()?;
        log::info!("🗑️ [FILTERS] \"{}\" eliminado del servidor", name.trim());
        Ok(())
    }

    /// Sin sesión (401) la lista es vacía, no un error
    async fn entries(&self) -> DashboardResult<Vec<SavedFilter>> {
        let response = self.http.send(ApiRequest::get("/filters")).await?;
        if response.status == 401 {
            log::info!("🔒 [FILTERS] Usuario no autenticado, sin filtros");
            return Ok(Vec::new());
        }
        let list: FiltersListResponse = response.into_result()?.json()?;
        let mut filters: Vec<SavedFilter> = list.filters.into_iter().map(SavedFilter::from).collect();
        filters.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(filters)
    }

    async fn clear_all(&self) -> DashboardResult<usize> {
        let names = self.list().await?;
        for name in &names {
            self.delete(name).await?;
        }
        log::info!("🧹 [FILTERS] {} filtros eliminados del servidor", names.len());
        Ok(names.len())
    }

    async fn stats(&self) -> DashboardResult<FilterStats> {
        self.http
            .send(ApiRequest::get("/filters/stats"))
            .await?
            .into_result()?
            .json()
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

// ============================================================================
// SELECCIÓN POR CONFIGURACIÓN
// ============================================================================

/// Backend de filtros elegido en la configuración
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterBackend {
    Local,
    Remote,
}

impl FilterBackend {
    /// Cualquier valor que no sea "remote" es local
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("remote") {
            FilterBackend::Remote
        } else {
            FilterBackend::Local
        }
    }
}

pub enum FilterStoreKind<S, H> {
    Local(LocalFilterStore<S>),
    Remote(RemoteFilterStore<H>),
}

impl<S: KeyValueStorage, H: HttpBackend> FilterStoreKind<S, H> {
    pub fn from_backend(backend: FilterBackend, storage: S, storage_key: &str, http: H) -> Self {
        match backend {
            FilterBackend::Local => FilterStoreKind::Local(LocalFilterStore::new(storage, storage_key)),
            FilterBackend::Remote => FilterStoreKind::Remote(RemoteFilterStore::new(http)),
        }
    }

    pub fn backend(&self) -> FilterBackend {
        match self {
            FilterStoreKind::Local(_) => FilterBackend::Local,
            FilterStoreKind::Remote(_) => FilterBackend::Remote,
        }
    }
}

impl<S: KeyValueStorage, H: HttpBackend> SavedFilterStore for FilterStoreKind<S, H> {
    async fn save(&self, name: &str, state: &GridState, overwrite: bool) -> DashboardResult<SavedFilter> {
        match self {
            FilterStoreKind::Local(store) => store.save(name, state, overwrite).await,
            FilterStoreKind::Remote(store) => store.save(name, state, overwrite).await,
        }
    }

    async fn load(&self, name: &str) -> DashboardResult<SavedFilter> {
        match self {
            FilterStoreKind::Local(store) => store.load(name).await,
            FilterStoreKind::Remote(store) => store.load(name).await,
        }
    }

    async fn delete(&self, name: &str) -> DashboardResult<()> {
        match self {
            FilterStoreKind::Local(store) => store.delete(name).await,
            FilterStoreKind::Remote(store) => store.delete(name).await,
        }
    }

    async fn entries(&self) -> DashboardResult<Vec<SavedFilter>> {
        match self {
            FilterStoreKind::Local(store) => store.entries().await,
            FilterStoreKind::Remote(store) => store.entries().await,
        }
    }

    async fn clear_all(&self) -> DashboardResult<usize> {
        match self {
            FilterStoreKind::Local(store) => store.clear_all().await,
            FilterStoreKind::Remote(store) => store.clear_all().await,
        }
    }

    async fn stats(&self) -> DashboardResult<FilterStats> {
        match self {
            FilterStoreKind::Local(store) => store.stats().await,
            FilterStoreKind::Remote(store) => store.stats().await,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        match self {
            FilterStoreKind::Local(store) => store.now(),
            FilterStoreKind::Remote(store) => store.now(),
        }
    }
}
