// ============================================================================
// GRID ADAPTER - Aplica en el grid el estado que llega de otras pestañas
// ============================================================================

use uuid::Uuid;
use crate::models::broadcast::MapView;
use crate::models::grid::GridState;
use crate::models::shipment::Shipment;
use crate::services::synchronizer::{EventOrigin, SyncEvent, SyncNotice, SyncSubscriber};
use crate::viewmodels::GridViewModel;
use crate::views::bridge::*;

pub struct GridAdapter<B> {
    bridge: B,
    visible: Vec<Shipment>,
}

impl<B: PageBridge> GridAdapter<B> {
    pub fn new(bridge: B) -> Self {
        Self {
            bridge,
            visible: Vec::new(),
        }
    }

    fn push<T: serde::Serialize + ?Sized>(&self, function: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.bridge.call(function, &json),
            Err(e) => log::error!("❌ [GRID] No se pudo serializar para {}: {}", function, e),
        }
    }
}

impl<B: PageBridge> SyncSubscriber for GridAdapter<B> {
    fn on_shipments_changed(&mut self, visible: &[Shipment], selected: &[Uuid]) {
        self.visible = visible.to_vec();
        log::debug!(
            "📋 [GRID] {}",
            GridViewModel::selection_summary(selected.len(), visible.len())
        );
        self.push(SELECT_GRID_ROWS_FN, selected);
    }

    fn on_selection_changed(&mut self, selected: &[Uuid]) {
        self.push(SELECT_GRID_ROWS_FN, selected);
    }

    fn on_grid_state_changed(&mut self, state: &GridState) {
        log::info!("📋 [GRID] Aplicando estado remoto: {}", state.describe());
        self.push(APPLY_GRID_STATE_FN, state);
    }

    fn on_map_view_changed(&mut self, view: &MapView) {
        if let Some(bounds) = &view.bounds {
            let in_view = GridViewModel::visible_after_filter(&self.visible, bounds);
            self.push(MARK_ROWS_IN_VIEW_FN, &in_view);
        }
    }

    /// Lo que reportó el propio grid ya está aplicado: reaplicarlo dispararía
    /// de nuevo sus eventos. Sólo se guarda la lista visible.
    fn on_notice(&mut self, notice: &SyncNotice) {
        match (notice.origin, &notice.event) {
            (EventOrigin::Page, SyncEvent::ShipmentsChanged { visible, .. }) => {
                self.visible = visible.clone();
            }
            (EventOrigin::Page, _) => {}
            _ => notice.event.dispatch(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::broadcast::MapBounds;
    use crate::models::shipment::{Coordinates, ShipmentStatus};
    use serde_json::json;

    fn notice(origin: EventOrigin, event: SyncEvent) -> SyncNotice {
        SyncNotice { origin, event }
    }

    fn grid_page() -> RecordingBridge {
        RecordingBridge::with_functions(&[APPLY_GRID_STATE_FN, SELECT_GRID_ROWS_FN, MARK_ROWS_IN_VIEW_FN])
    }

    #[test]
    fn remote_grid_state_is_applied() {
        let bridge = grid_page();
        let mut adapter = GridAdapter::new(bridge.clone());
        let state = GridState::default().with_filter("shipping_status", json!("DELIVERED"));
        SyncEvent::GridStateChanged(state.clone()).dispatch(&mut adapter);

        let sent: GridState = serde_json::from_str(&bridge.calls_to(APPLY_GRID_STATE_FN)[0]).unwrap();
        assert_eq!(sent, state);
    }

    #[test]
    fn map_bounds_mark_rows_in_view() {
        let bridge = grid_page();
        let mut adapter = GridAdapter::new(bridge.clone());
        let sg = Shipment::new(Uuid::new_v4(), "SG", ShipmentStatus::InTransit).with_coordinates(1.29, 103.85);
        let nl = Shipment::new(Uuid::new_v4(), "NL", ShipmentStatus::InTransit).with_coordinates(51.9, 4.4);
        SyncEvent::ShipmentsChanged { visible: vec![sg.clone(), nl], selected: vec![] }.dispatch(&mut adapter);

        let view = MapView {
            center: Coordinates::from((10.0, 110.0)),
            zoom: 4.0,
            bounds: Some(MapBounds {
                south_west: Coordinates::from((-10.0, 90.0)),
                north_east: Coordinates::from((30.0, 130.0)),
            }),
        };
        SyncEvent::MapViewChanged(view).dispatch(&mut adapter);

        assert_eq!(bridge.calls_to(MARK_ROWS_IN_VIEW_FN), vec![format!("[\"{}\"]", sg.id)]);
        assert_eq!(bridge.calls_to(SELECT_GRID_ROWS_FN), vec!["[]".to_string()]);
    }

    #[test]
    fn own_changes_are_not_pushed_back_to_the_grid() {
        let bridge = grid_page();
        let mut adapter = GridAdapter::new(bridge.clone());
        let state = GridState::default().with_filter("shipping_status", json!("IN_TRANSIT"));
        let sg = Shipment::new(Uuid::new_v4(), "SG", ShipmentStatus::InTransit).with_coordinates(1.29, 103.85);

        adapter.on_notice(&notice(EventOrigin::Page, SyncEvent::GridStateChanged(state.clone())));
        adapter.on_notice(&notice(EventOrigin::Page, SyncEvent::SelectionChanged { selected: vec![sg.id] }));
        adapter.on_notice(&notice(
            EventOrigin::Page,
            SyncEvent::ShipmentsChanged { visible: vec![sg.clone()], selected: vec![sg.id] },
        ));
        assert!(bridge.calls().is_empty());

        // La lista visible propia sí sirve para marcar filas desde el mapa
        let view = MapView {
            center: Coordinates::from((1.0, 104.0)),
            zoom: 6.0,
            bounds: Some(MapBounds {
                south_west: Coordinates::from((0.0, 100.0)),
                north_east: Coordinates::from((5.0, 110.0)),
            }),
        };
        adapter.on_notice(&notice(EventOrigin::Peer, SyncEvent::MapViewChanged(view)));
        assert_eq!(bridge.calls_to(MARK_ROWS_IN_VIEW_FN), vec![format!("[\"{}\"]", sg.id)]);

        // Un filtro cargado desde Rust sí se aplica en el grid
        adapter.on_notice(&notice(EventOrigin::Internal, SyncEvent::GridStateChanged(state)));
        assert_eq!(bridge.calls_to(APPLY_GRID_STATE_FN).len(), 1);
        assert!(bridge.calls_to(SELECT_GRID_ROWS_FN).is_empty());
    }

    #[test]
    fn missing_page_functions_are_skipped() {
        let bridge = RecordingBridge::with_functions(&[]);
        let mut adapter = GridAdapter::new(bridge.clone());
        SyncEvent::SelectionChanged { selected: vec![Uuid::nil()] }.dispatch(&mut adapter);
        assert!(bridge.calls().is_empty());
    }
}
