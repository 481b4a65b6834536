// ============================================================================
// MAP ADAPTER - Pinta en el mapa lo que llega del synchronizer
// ============================================================================

use uuid::Uuid;
use crate::config::MapConfig;
use crate::models::broadcast::MapView;
use crate::models::shipment::Shipment;
use crate::services::synchronizer::{EventOrigin, SyncEvent, SyncNotice, SyncSubscriber};
use crate::viewmodels::MapViewModel;
use crate::views::bridge::*;

pub struct MapAdapter<B> {
    bridge: B,
    config: MapConfig,
    /// La vista se encuadra sólo con el primer lote; después manda el usuario
    framed: bool,
    dropped: usize,
}

impl<B: PageBridge> MapAdapter<B> {
    pub fn new(bridge: B, config: MapConfig) -> Self {
        Self {
            bridge,
            config,
            framed: false,
            dropped: 0,
        }
    }

    /// Envíos del último lote sin posición válida
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    fn push<T: serde::Serialize>(&self, function: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.bridge.call(function, &json),
            Err(e) => log::error!("❌ [MAP] No se pudo serializar para {}: {}", function, e),
        }
    }
}

impl<B: PageBridge> SyncSubscriber for MapAdapter<B> {
    fn on_shipments_changed(&mut self, visible: &[Shipment], selected: &[Uuid]) {
        let batch = MapViewModel::prepare_markers(visible, selected, &self.config);
        self.dropped = batch.dropped;
        log::info!(
            "🗺️ [MAP] {} marcadores ({} sin posición)",
            batch.markers.len(),
            batch.dropped
        );

        if !self.framed && !batch.markers.is_empty() {
            let view = MapViewModel::view_for_markers(&batch.markers, &self.config);
            self.push(SET_MAP_VIEW_FN, &view);
            self.framed = true;
        }
        self.push(RENDER_MARKERS_FN, &batch);

        if self.bridge.has(RENDER_ROUTES_FN) {
            self.push(RENDER_ROUTES_FN, &MapViewModel::prepare_routes(visible));
        }
    }

    fn on_selection_changed(&mut self, selected: &[Uuid]) {
        self.push(HIGHLIGHT_FN, &selected);
    }

    fn on_map_view_changed(&mut self, view: &MapView) {
        // Otra pestaña de mapa movió la vista
        self.push(SET_MAP_VIEW_FN, view);
    }

    fn on_initial_data(&mut self, has_data: bool) {
        if !has_data {
            log::info!("ℹ️ [MAP] Hay una página abierta pero sin envíos todavía");
        }
    }

    fn on_notice(&mut self, notice: &SyncNotice) {
        // El propio mapa ya está en la vista que reportó
        if notice.origin == EventOrigin::Page && matches!(notice.event, SyncEvent::MapViewChanged(_)) {
            return;
        }
        notice.event.dispatch(self);
    }
}
