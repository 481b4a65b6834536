// ============================================================================
// SHIPMENT DASHBOARD - Sincronización grid/mapa entre pestañas (RUST + WASM)
// ============================================================================
// Capas:
// - Models: estructuras compartidas con backend y con el canal
// - State: estado local de la pestaña con Rc<RefCell>
// - Services: canal, synchronizer, filtros guardados, API REST
// - ViewModels: preparación pura de datos para grid y mapa
// - Views: adaptadores que empujan JSON al JS de la página
// ============================================================================

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;
pub mod viewmodels;
pub mod views;

#[cfg(target_arch = "wasm32")]
pub mod app;
#[cfg(target_arch = "wasm32")]
pub mod components;
#[cfg(target_arch = "wasm32")]
pub mod hooks;

pub use error::{DashboardError, DashboardResult};

#[cfg(target_arch = "wasm32")]
mod web {
    use serde::de::DeserializeOwned;
    use serde_json::json;
    use uuid::Uuid;
    use wasm_bindgen::prelude::*;
    use wasm_logger::Config;

    use crate::app::DashboardApp;
    use crate::config::CONFIG;
    use crate::error::{DashboardError, DashboardResult};
    use crate::models::{parse_selection, GridState, MapView, Shipment, ShipmentPatch};
    use crate::services::SavedFilterStore;
    use crate::utils::ffi::call_with_two_strings;
    use crate::views::bridge::DOWNLOAD_FILE_FN;
    use crate::views::toast::{show_error, show_toast, ToastKind};

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();

        if CONFIG.enable_logging {
            wasm_logger::init(Config::new(CONFIG.log_level()));
        }
        log::info!("🚀 Shipment Dashboard - Rust + WASM ({})", CONFIG.environment);

        DashboardApp::start().install();
        Ok(())
    }

    fn parse<T: DeserializeOwned>(what: &str, json: &str) -> DashboardResult<T> {
        serde_json::from_str(json).map_err(|e| DashboardError::Format(format!("{}: {}", what, e)))
    }

    fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
        serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Errores de publicación: sólo log (no son acciones del usuario)
    fn log_failure(error: DashboardError) -> JsValue {
        log::warn!("⚠️ [EXPORT] {}", error);
        JsValue::from_str(&error.to_string())
    }

    /// Errores de acciones del usuario: toast + rechazo de la promesa
    fn report_failure(error: DashboardError) -> JsValue {
        log::error!("❌ [EXPORT] {}", error);
        show_error(&error);
        JsValue::from_str(&error.to_string())
    }

    fn parse_id(id: &str) -> DashboardResult<Uuid> {
        Uuid::parse_str(id).map_err(|_| DashboardError::Validation(format!("Invalid shipment id: {}", id)))
    }

    // ------------------------------------------------------------------------
    // Publicación hacia las otras pestañas
    // ------------------------------------------------------------------------

    #[wasm_bindgen]
    pub fn publish_visible_shipments(shipments_json: &str, selected_json: &str) -> Result<(), JsValue> {
        let app = DashboardApp::current()?;
        let visible: Vec<Shipment> = parse("shipments", shipments_json).map_err(log_failure)?;
        let selected = parse_selection(selected_json).map_err(log_failure)?;
        app.sync.publish_shipments(visible, selected);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn publish_grid_state(state_json: &str) -> Result<(), JsValue> {
        let app = DashboardApp::current()?;
        let state: GridState = parse("grid state", state_json).map_err(log_failure)?;
        app.sync.publish_grid_state(state);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn publish_selection(selected_json: &str) -> Result<(), JsValue> {
        let app = DashboardApp::current()?;
        let selected = parse_selection(selected_json).map_err(log_failure)?;
        app.sync.publish_selection(selected);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn publish_map_view(view_json: &str) -> Result<(), JsValue> {
        let app = DashboardApp::current()?;
        let view: MapView = parse("map view", view_json).map_err(log_failure)?;
        app.sync.publish_map_view(view);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Filtros guardados
    // ------------------------------------------------------------------------

    /// Guarda el estado actual del grid bajo `name`
    #[wasm_bindgen]
    pub async fn save_filter(name: String, overwrite: bool) -> Result<JsValue, JsValue> {
        let app = DashboardApp::current()?;
        let state = app.sync.current_data().grid_state;
        let saved = app.filters.save(&name, &state, overwrite).await.map_err(report_failure)?;
        show_toast(&format!("Filter \"{}\" saved", saved.name), ToastKind::Success);
        Ok(JsValue::from_str(&to_json(&saved)?))
    }

    /// Carga el filtro y lo publica como estado del grid (local + otras pestañas)
    #[wasm_bindgen]
    pub async fn load_filter(name: String) -> Result<JsValue, JsValue> {
        let app = DashboardApp::current()?;
        let saved = app.filters.load(&name).await.map_err(report_failure)?;
        let json = to_json(&saved.state)?;
        app.sync.apply_grid_state(saved.state);
        show_toast(&format!("Filter \"{}\" applied", saved.name), ToastKind::Info);
        Ok(JsValue::from_str(&json))
    }

    #[wasm_bindgen]
    pub async fn delete_filter(name: String) -> Result<(), JsValue> {
        let app = DashboardApp::current()?;
        app.filters.delete(&name).await.map_err(report_failure)?;
        show_toast(&format!("Filter \"{}\" deleted", name), ToastKind::Success);
        Ok(())
    }

    /// Nombres en orden alfabético (JSON array)
    #[wasm_bindgen]
    pub async fn list_filters() -> Result<JsValue, JsValue> {
        let app = DashboardApp::current()?;
        let names = app.filters.list().await.map_err(report_failure)?;
        Ok(JsValue::from_str(&to_json(&names)?))
    }

    /// Devuelve el JSON exportado y, si la página sabe descargar, lo baja a fichero
    #[wasm_bindgen]
    pub async fn export_filters() -> Result<JsValue, JsValue> {
        let app = DashboardApp::current()?;
        let export = app.filters.export().await.map_err(report_failure)?;
        let json = serde_json::to_string_pretty(&export).map_err(|e| report_failure(e.into()))?;

        if app.capabilities.download {
            let file_name = format!("saved-filters-{}.json", export.export_date.format("%Y-%m-%d"));
            call_with_two_strings(DOWNLOAD_FILE_FN, &file_name, &json);
        }
        show_toast(&format!("{} filters exported", export.filter_count), ToastKind::Success);
        Ok(JsValue::from_str(&json))
    }

    #[wasm_bindgen]
    pub async fn import_filters(snapshot_json: String) -> Result<JsValue, JsValue> {
        let app = DashboardApp::current()?;
        let report = app.filters.import(&snapshot_json).await.map_err(report_failure)?;

        let kind = if report.failed == 0 { ToastKind::Success } else { ToastKind::Warning };
        show_toast(
            &format!("{} filters imported, {} failed", report.imported(), report.failed),
            kind,
        );
        let summary = json!({
            "added": report.added,
            "overwritten": report.overwritten,
            "failed": report.failed,
            "failures": report.failures,
        });
        Ok(JsValue::from_str(&summary.to_string()))
    }

    #[wasm_bindgen]
    pub async fn clear_saved_filters() -> Result<JsValue, JsValue> {
        let app = DashboardApp::current()?;
        let removed = app.filters.clear_all().await.map_err(report_failure)?;
        show_toast(&format!("{} saved filters removed", removed), ToastKind::Info);
        Ok(JsValue::from_f64(removed as f64))
    }

    // ------------------------------------------------------------------------
    // Envíos (REST)
    // ------------------------------------------------------------------------

    /// Pide una página al backend con el estado del grid y la publica como visible
    #[wasm_bindgen]
    pub async fn load_shipments(state_json: String) -> Result<JsValue, JsValue> {
        let app = DashboardApp::current()?;
        let state: GridState = parse("grid state", &state_json).map_err(report_failure)?;
        let page = app.shipments.list(&state).await.map_err(report_failure)?;
        let json = to_json(&page)?;

        let selected = app.sync.current_data().selected_shipments;
        app.sync.publish_shipments(page.rows, selected);
        Ok(JsValue::from_str(&json))
    }

    #[wasm_bindgen]
    pub async fn update_shipment(id: String, patch_json: String) -> Result<JsValue, JsValue> {
        let app = DashboardApp::current()?;
        let id = parse_id(&id).map_err(report_failure)?;
        let patch: ShipmentPatch = parse("shipment patch", &patch_json).map_err(report_failure)?;
        let updated = app.shipments.update(id, &patch).await.map_err(report_failure)?;
        show_toast(&format!("Shipment {} updated", updated.shipment_number), ToastKind::Success);
        Ok(JsValue::from_str(&to_json(&updated)?))
    }

    #[wasm_bindgen]
    pub async fn refresh_shipment(id: String) -> Result<JsValue, JsValue> {
        let app = DashboardApp::current()?;
        let id = parse_id(&id).map_err(report_failure)?;
        let refreshed = app.shipments.refresh(id).await.map_err(report_failure)?;
        Ok(JsValue::from_str(&to_json(&refreshed)?))
    }

    /// Borrado de uno o varios envíos (JSON array de ids)
    #[wasm_bindgen]
    pub async fn delete_shipments(ids_json: String) -> Result<(), JsValue> {
        let app = DashboardApp::current()?;
        let ids: Vec<Uuid> = parse("shipment ids", &ids_json).map_err(report_failure)?;
        match ids.as_slice() {
            [single] => app.shipments.delete(*single).await,
            _ => app.shipments.bulk_delete(&ids).await,
        }
        .map_err(report_failure)?;

        // Los borrados dejan de estar seleccionados en todas las pestañas
        let remaining: Vec<Uuid> = app
            .sync
            .current_data()
            .selected_shipments
            .into_iter()
            .filter(|id| !ids.contains(id))
            .collect();
        app.sync.publish_selection(remaining);
        show_toast(&format!("{} shipments deleted", ids.len()), ToastKind::Success);
        Ok(())
    }
}
