// ============================================================================
// SHIPMENT STORE - Último estado conocido de la pestaña
// ============================================================================
// Un único escritor por pestaña (su Synchronizer). Invariantes:
// - `last_update` nunca retrocede.
// - La selección solo contiene ids presentes en `visible_shipments`.
// ============================================================================

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;
use crate::models::broadcast::StateSnapshot;
use crate::models::grid::{GridState, GridStatePatch};
use crate::models::shipment::Shipment;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShipmentStore {
    visible_shipments: Vec<Shipment>,
    selected_shipments: Vec<Uuid>,
    grid_state: GridState,
    last_update: Option<DateTime<Utc>>,
}

/// Resumen para el indicador de estado
#[derive(Clone, Debug, PartialEq)]
pub struct SyncStatus {
    pub connected: bool,
    pub has_data: bool,
    pub shipment_count: usize,
    pub selected_count: usize,
    pub last_update: Option<DateTime<Utc>>,
    pub listener_count: usize,
}

impl ShipmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible_shipments(&self) -> &[Shipment] {
        &self.visible_shipments
    }

    pub fn selected_shipments(&self) -> &[Uuid] {
        &self.selected_shipments
    }

    pub fn grid_state(&self) -> &GridState {
        &self.grid_state
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    pub fn has_data(&self) -> bool {
        !self.visible_shipments.is_empty()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            visible_shipments: self.visible_shipments.clone(),
            selected_shipments: self.selected_shipments.clone(),
            grid_state: self.grid_state.clone(),
            last_update: self.last_update,
        }
    }

    /// Reemplazo superficial de envíos visibles + selección
    pub fn replace_shipments(&mut self, visible: Vec<Shipment>, selected: Vec<Uuid>, at: DateTime<Utc>) {
        self.visible_shipments = visible;
        self.selected_shipments = selected;
        self.prune_selection();
        self.touch(at);
    }

    pub fn replace_selection(&mut self, selected: Vec<Uuid>, at: DateTime<Utc>) {
        self.selected_shipments = selected;
        self.prune_selection();
        self.touch(at);
    }

    pub fn replace_grid_state(&mut self, state: GridState, at: DateTime<Utc>) {
        self.grid_state = state;
        self.touch(at);
    }

    /// Merge superficial del estado del grid; devuelve el estado resultante
    pub fn merge_grid_state(&mut self, patch: GridStatePatch, at: DateTime<Utc>) -> GridState {
        self.grid_state.merge(patch);
        self.touch(at);
        self.grid_state.clone()
    }

    /// Aplica el snapshot de otra pestaña (respuesta a REQUEST_INITIAL_DATA)
    pub fn apply_snapshot(&mut self, snapshot: StateSnapshot, at: DateTime<Utc>) {
        self.visible_shipments = snapshot.visible_shipments;
        self.selected_shipments = snapshot.selected_shipments;
        self.grid_state = snapshot.grid_state;
        self.prune_selection();
        self.touch(snapshot.last_update.map_or(at, |remote| remote.max(at)));
    }

    /// Sólo avanza: un timestamp anterior no cambia nada
    fn touch(&mut self, at: DateTime<Utc>) {
        match self.last_update {
            Some(current) if current >= at => {}
            _ => self.last_update = Some(at),
        }
    }

    /// Quita de la selección los ids que no están visibles y los duplicados
    fn prune_selection(&mut self) {
        let visible: HashSet<Uuid> = self.visible_shipments.iter().map(|s| s.id).collect();
        let mut seen = HashSet::new();
        let before = self.selected_shipments.len();
        self.selected_shipments
            .retain(|id| visible.contains(id) && seen.insert(*id));

        let dropped = before - self.selected_shipments.len();
        if dropped > 0 {
            log::debug!("🧹 [STORE] {} ids de selección descartados (no visibles)", dropped);
        }
    }

    pub fn status(&self, connected: bool, listener_count: usize) -> SyncStatus {
        SyncStatus {
            connected,
            has_data: self.has_data(),
            shipment_count: self.visible_shipments.len(),
            selected_count: self.selected_shipments.len(),
            last_update: self.last_update,
            listener_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::shipment::ShipmentStatus;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    fn shipments(n: usize) -> Vec<Shipment> {
        (0..n)
            .map(|i| Shipment::new(Uuid::new_v4(), &format!("SHP{:03}", i), ShipmentStatus::InTransit))
            .collect()
    }

    #[test]
    fn last_update_never_goes_backwards() {
        let mut store = ShipmentStore::new();
        store.replace_shipments(shipments(1), vec![], t0());
        store.replace_selection(vec![], t0() - Duration::seconds(30));
        assert_eq!(store.last_update(), Some(t0()));
        store.replace_selection(vec![], t0() + Duration::seconds(5));
        assert_eq!(store.last_update(), Some(t0() + Duration::seconds(5)));
    }

    #[test]
    fn selection_is_restricted_to_visible_ids() {
        let visible = shipments(3);
        let stranger = Uuid::new_v4();
        let mut store = ShipmentStore::new();
        store.replace_shipments(
            visible.clone(),
            vec![visible[2].id, stranger, visible[0].id, visible[2].id],
            t0(),
        );
        assert_eq!(store.selected_shipments(), &[visible[2].id, visible[0].id]);

        // Nuevo set visible sin el envío 0 => se cae de la selección
        store.replace_shipments(visible[1..].to_vec(), store.selected_shipments().to_vec(), t0());
        assert_eq!(store.selected_shipments(), &[visible[2].id]);
    }

    #[test]
    fn grid_state_merge_is_shallow() {
        let mut store = ShipmentStore::new();
        store.replace_grid_state(GridState::default().with_filter("status", json!("IN_TRANSIT")), t0());
        let merged = store.merge_grid_state(
            GridStatePatch {
                sorting: Some(vec![]),
                ..Default::default()
            },
            t0(),
        );
        assert_eq!(merged.active_filter_count(), 1);
    }

    #[test]
    fn snapshot_round_trips_through_apply() {
        let mut source = ShipmentStore::new();
        let visible = shipments(2);
        source.replace_shipments(visible.clone(), vec![visible[1].id], t0());

        let mut target = ShipmentStore::new();
        target.apply_snapshot(source.snapshot(), t0() - Duration::minutes(1));
        assert_eq!(target.visible_shipments(), visible.as_slice());
        assert_eq!(target.selected_shipments(), &[visible[1].id]);
        assert_eq!(target.last_update(), Some(t0()));

        let status = target.status(true, 3);
        assert!(status.has_data);
        assert_eq!(status.shipment_count, 2);
        assert_eq!(status.selected_count, 1);
        assert_eq!(status.listener_count, 3);
    }
}
