// ============================================================================
// SHIPMENT SYNCHRONIZER - Estado compartido entre la página del grid y el mapa
// ============================================================================
// Cada pestaña tiene su propio synchronizer: escribe en su store, emite por el
// canal y avisa a sus subscribers locales. Los mensajes entrantes se aplican
// sobre el store y también se notifican. Sin canal sólo se pierde la emisión:
// el store y los subscribers locales siguen funcionando.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use chrono::{DateTime, Utc};
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;
use crate::error::DashboardResult;
use crate::models::broadcast::{
    BroadcastMessage, BroadcastPayload, InitialDataRequest, InitialDataResponse, MapView,
    SelectionUpdate, ShipmentsUpdate, StateSnapshot,
};
use crate::models::grid::{GridState, GridStatePatch};
use crate::models::shipment::Shipment;
use crate::services::channel::BroadcastTransport;
use crate::state::{ReactiveState, ShipmentStore, SyncStatus};

pub type Clock = Rc<dyn Fn() -> DateTime<Utc>>;

/// Cola de eventos de un subscriber
pub type SyncEvents = UnboundedReceiver<SyncNotice>;

/// Quién causó el cambio
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventOrigin {
    /// El JS de esta página lo reportó: la página ya lo muestra
    Page,
    /// Llegó de otra pestaña
    Peer,
    /// Lo aplicó Rust (filtro cargado, replay del store): la página aún no lo muestra
    Internal,
}

/// Evento tal como llega a la cola de un subscriber
#[derive(Clone, Debug, PartialEq)]
pub struct SyncNotice {
    pub origin: EventOrigin,
    pub event: SyncEvent,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SyncEvent {
    ShipmentsChanged {
        visible: Vec<Shipment>,
        selected: Vec<Uuid>,
    },
    SelectionChanged {
        selected: Vec<Uuid>,
    },
    /// Estado del grid ya mergeado
    GridStateChanged(GridState),
    MapViewChanged(MapView),
    InitialDataReceived {
        has_data: bool,
        from_grid_page: bool,
    },
}

/// Adaptadores de presentación (mapa, grid). Sólo el primer método es
/// obligatorio; el resto se ignora por defecto.
pub trait SyncSubscriber {
    fn on_shipments_changed(&mut self, visible: &[Shipment], selected: &[Uuid]);

    fn on_selection_changed(&mut self, _selected: &[Uuid]) {}

    fn on_grid_state_changed(&mut self, _state: &GridState) {}

    fn on_map_view_changed(&mut self, _view: &MapView) {}

    fn on_initial_data(&mut self, _has_data: bool) {}

    /// Entrada desde la cola. Por defecto se procesa todo, sea cual sea el origen.
    fn on_notice(&mut self, notice: &SyncNotice)
    where
        Self: Sized,
    {
        notice.event.dispatch(self);
    }
}

impl SyncEvent {
    pub fn dispatch(&self, subscriber: &mut dyn SyncSubscriber) {
        match self {
            SyncEvent::ShipmentsChanged { visible, selected } => {
                subscriber.on_shipments_changed(visible, selected)
            }
            SyncEvent::SelectionChanged { selected } => subscriber.on_selection_changed(selected),
            SyncEvent::GridStateChanged(state) => subscriber.on_grid_state_changed(state),
            SyncEvent::MapViewChanged(view) => subscriber.on_map_view_changed(view),
            SyncEvent::InitialDataReceived { has_data, .. } => subscriber.on_initial_data(*has_data),
        }
    }
}

struct SyncInner {
    transport: RefCell<Option<Rc<dyn BroadcastTransport>>>,
    store: Rc<RefCell<ShipmentStore>>,
    subscribers: RefCell<Vec<UnboundedSender<SyncNotice>>>,
    clock: Clock,
    is_grid_page: bool,
    peer_present: Cell<bool>,
    requester_id: String,
    connected: ReactiveState<bool>,
}

/// Handle clonable; todas las clones comparten store y canal
#[derive(Clone)]
pub struct ShipmentSynchronizer {
    inner: Rc<SyncInner>,
}

/// Igualdad por identidad (props de Yew)
impl PartialEq for ShipmentSynchronizer {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl ShipmentSynchronizer {
    /// Conecta sobre el resultado de abrir el canal. Si falló, la pestaña
    /// funciona sola (sin sync) y se loguea un warning.
    pub fn connect<T>(open_result: DashboardResult<T>, is_grid_page: bool) -> Self
    where
        T: BroadcastTransport + 'static,
    {
        Self::connect_with_clock(open_result, is_grid_page, Rc::new(Utc::now))
    }

    pub fn connect_with_clock<T>(open_result: DashboardResult<T>, is_grid_page: bool, clock: Clock) -> Self
    where
        T: BroadcastTransport + 'static,
    {
        let sync = Self {
            inner: Rc::new(SyncInner {
                transport: RefCell::new(None),
                store: Rc::new(RefCell::new(ShipmentStore::new())),
                subscribers: RefCell::new(Vec::new()),
                clock,
                is_grid_page,
                peer_present: Cell::new(false),
                requester_id: Uuid::new_v4().to_string(),
                connected: ReactiveState::new(false),
            }),
        };

        match open_result {
            Ok(transport) => {
                let transport: Rc<dyn BroadcastTransport> = Rc::new(transport);
                let weak: Weak<SyncInner> = Rc::downgrade(&sync.inner);
                transport.on_message(Rc::new(move |raw: &str| {
                    if let Some(inner) = weak.upgrade() {
                        inner.handle_raw(raw);
                    }
                }));
                log::info!("✅ [SYNC] Conectado al canal \"{}\"", transport.name());
                *sync.inner.transport.borrow_mut() = Some(transport);
                sync.inner.connected.set(true);
            }
            Err(e) => {
                log::warn!("⚠️ [SYNC] Canal no disponible, la pestaña funciona sin sync: {}", e);
            }
        }

        sync
    }

    pub fn is_connected(&self) -> bool {
        self.inner.connected.get()
    }

    /// Flag observable para el indicador de estado
    pub fn connection_state(&self) -> ReactiveState<bool> {
        self.inner.connected.clone()
    }

    pub fn is_grid_page(&self) -> bool {
        self.inner.is_grid_page
    }

    /// Otra página respondió a REQUEST_INITIAL_DATA (con o sin datos)
    pub fn peer_present(&self) -> bool {
        self.inner.peer_present.get()
    }

    pub fn current_data(&self) -> StateSnapshot {
        self.inner.store.borrow().snapshot()
    }

    pub fn status(&self) -> SyncStatus {
        self.inner
            .store
            .borrow()
            .status(self.is_connected(), self.subscriber_count())
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .borrow()
            .iter()
            .filter(|tx| !tx.is_closed())
            .count()
    }

    // ========================================================================
    // PUBLICACIÓN
    // ========================================================================

    pub fn publish_shipments(&self, visible: Vec<Shipment>, selected: Vec<Uuid>) {
        let now = (self.inner.clock)();
        let (visible, selected) = {
            let mut store = self.inner.store.borrow_mut();
            store.replace_shipments(visible, selected, now);
            (store.visible_shipments().to_vec(), store.selected_shipments().to_vec())
        };

        log::info!(
            "📤 [SYNC] Publicando {} envíos ({} seleccionados)",
            visible.len(),
            selected.len()
        );
        self.inner.emit(
            BroadcastPayload::ShipmentsUpdate(ShipmentsUpdate::new(visible.clone(), selected.clone())),
            now,
        );
        self.inner
            .notify(SyncEvent::ShipmentsChanged { visible, selected }, EventOrigin::Page);
    }

    /// Publica el estado completo del grid que la página acaba de aplicar
    pub fn publish_grid_state(&self, state: GridState) {
        self.replace_grid_state(state, EventOrigin::Page);
    }

    /// Estado del grid decidido desde Rust (p. ej. un filtro guardado): también
    /// llega al grid de esta página
    pub fn apply_grid_state(&self, state: GridState) {
        self.replace_grid_state(state, EventOrigin::Internal);
    }

    fn replace_grid_state(&self, state: GridState, origin: EventOrigin) {
        let now = (self.inner.clock)();
        self.inner
            .store
            .borrow_mut()
            .replace_grid_state(state.clone(), now);

        self.inner
            .emit(BroadcastPayload::GridStateUpdate(GridStatePatch::from(state.clone())), now);
        self.inner.notify(SyncEvent::GridStateChanged(state), origin);
    }

    pub fn publish_selection(&self, selected: Vec<Uuid>) {
        let now = (self.inner.clock)();
        let selected = {
            let mut store = self.inner.store.borrow_mut();
            store.replace_selection(selected, now);
            store.selected_shipments().to_vec()
        };

        self.inner.emit(
            BroadcastPayload::SelectionUpdate(SelectionUpdate {
                selected_shipments: selected.clone(),
            }),
            now,
        );
        self.inner
            .notify(SyncEvent::SelectionChanged { selected }, EventOrigin::Page);
    }

    /// La vista del mapa no se guarda en el store
    pub fn publish_map_view(&self, view: MapView) {
        let now = (self.inner.clock)();
        self.inner.emit(BroadcastPayload::MapViewChange(view.clone()), now);
        self.inner.notify(SyncEvent::MapViewChanged(view), EventOrigin::Page);
    }

    /// Pide el estado a las demás pestañas. Una vez por carga de página.
    pub fn request_initial_state(&self) {
        if !self.inner.ensure_connected("request_initial_state") {
            return;
        }
        log::info!("📡 [SYNC] Pidiendo datos iniciales a otras pestañas");
        let now = (self.inner.clock)();
        self.inner.emit(
            BroadcastPayload::RequestInitialData(InitialDataRequest {
                requester_id: self.inner.requester_id.clone(),
            }),
            now,
        );
    }

    // ========================================================================
    // SUBSCRIBERS
    // ========================================================================

    /// Nueva cola de eventos. Si ya hay envíos, el primer evento es un
    /// ShipmentsChanged (`Internal`) con el estado actual.
    pub fn subscribe(&self) -> SyncEvents {
        let (tx, rx) = unbounded();
        {
            let store = self.inner.store.borrow();
            if store.has_data() {
                let replay = SyncNotice {
                    origin: EventOrigin::Internal,
                    event: SyncEvent::ShipmentsChanged {
                        visible: store.visible_shipments().to_vec(),
                        selected: store.selected_shipments().to_vec(),
                    },
                };
                if tx.unbounded_send(replay).is_err() {
                    log::debug!("🔇 [SYNC] Subscriber cerrado antes del replay");
                }
            }
        }
        self.inner.subscribers.borrow_mut().push(tx);
        rx
    }

    /// Cierra el canal y suelta los subscribers. Idempotente.
    pub fn close(&self) {
        let transport = self.inner.transport.borrow_mut().take();
        if let Some(transport) = transport {
            transport.close();
            log::info!("🧹 [SYNC] Synchronizer cerrado");
        }
        self.inner.subscribers.borrow_mut().clear();
        if self.inner.connected.get() {
            self.inner.connected.set(false);
        }
    }
}

impl SyncInner {
    fn ensure_connected(&self, operation: &str) -> bool {
        let connected = self.transport.borrow().as_ref().map_or(false, |t| t.is_open());
        if !connected {
            log::warn!("⚠️ [SYNC] {} ignorado: sin conexión al canal", operation);
        }
        connected
    }

    /// Sin canal abierto el mensaje se descarta (el estado local ya está aplicado)
    fn emit(&self, payload: BroadcastPayload, at: DateTime<Utc>) {
        let transport = match self.transport.borrow().as_ref() {
            Some(transport) if transport.is_open() => transport.clone(),
            _ => {
                log::debug!("📪 [SYNC] Sin canal, {} sólo se aplica en esta pestaña", payload.kind().as_str());
                return;
            }
        };
        let message = BroadcastMessage::new(payload, at);
        match message.encode() {
            Ok(raw) => transport.send(&raw),
            Err(e) => log::error!("❌ [SYNC] No se pudo serializar {}: {}", message.kind().as_str(), e),
        }
    }

    /// Envía a cada subscriber vivo; los cerrados se descartan
    fn notify(&self, event: SyncEvent, origin: EventOrigin) {
        let notice = SyncNotice { origin, event };
        self.subscribers
            .borrow_mut()
            .retain(|tx| tx.unbounded_send(notice.clone()).is_ok());
    }

    fn handle_raw(&self, raw: &str) {
        let message = match BroadcastMessage::decode(raw) {
            Ok(message) => message,
            Err(e) => {
                log::warn!("⚠️ [SYNC] Mensaje descartado: {}", e);
                return;
            }
        };
        log::debug!("📥 [SYNC] {}", message.kind().as_str());
        let now = (self.clock)();

        match message.payload {
            BroadcastPayload::ShipmentsUpdate(update) => {
                let (visible, selected) = {
                    let mut store = self.store.borrow_mut();
                    store.replace_shipments(update.visible_shipments, update.selected_shipments, now);
                    (store.visible_shipments().to_vec(), store.selected_shipments().to_vec())
                };
                self.notify(SyncEvent::ShipmentsChanged { visible, selected }, EventOrigin::Peer);
            }
            BroadcastPayload::GridStateUpdate(patch) => {
                let merged = self.store.borrow_mut().merge_grid_state(patch, now);
                self.notify(SyncEvent::GridStateChanged(merged), EventOrigin::Peer);
            }
            BroadcastPayload::SelectionUpdate(update) => {
                let selected = {
                    let mut store = self.store.borrow_mut();
                    store.replace_selection(update.selected_shipments, now);
                    store.selected_shipments().to_vec()
                };
                self.notify(SyncEvent::SelectionChanged { selected }, EventOrigin::Peer);
            }
            BroadcastPayload::RequestInitialData(request) => {
                // Se responde siempre: quien pregunta sabe que hay otra página
                let snapshot = self.store.borrow().snapshot();
                let has_data = !snapshot.visible_shipments.is_empty();
                log::info!(
                    "📡 [SYNC] Respondiendo a {} con {} envíos",
                    request.requester_id,
                    snapshot.visible_shipments.len()
                );
                self.emit(
                    BroadcastPayload::InitialDataResponse(InitialDataResponse {
                        snapshot,
                        has_data,
                        is_grid_page: self.is_grid_page,
                    }),
                    now,
                );
            }
            BroadcastPayload::InitialDataResponse(response) => {
                self.peer_present.set(true);
                if response.has_data {
                    let (visible, selected) = {
                        let mut store = self.store.borrow_mut();
                        store.apply_snapshot(response.snapshot, now);
                        (store.visible_shipments().to_vec(), store.selected_shipments().to_vec())
                    };
                    log::info!("📥 [SYNC] Datos iniciales recibidos: {} envíos", visible.len());
                    self.notify(SyncEvent::ShipmentsChanged { visible, selected }, EventOrigin::Peer);
                }
                self.notify(
                    SyncEvent::InitialDataReceived {
                        has_data: response.has_data,
                        from_grid_page: response.is_grid_page,
                    },
                    EventOrigin::Peer,
                );
            }
            BroadcastPayload::MapViewChange(view) => {
                self.notify(SyncEvent::MapViewChanged(view), EventOrigin::Peer);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use crate::models::grid::SortDirection;
    use crate::models::shipment::{Coordinates, ShipmentStatus};
    use crate::services::channel::{LocalChannel, LocalHub};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const CHANNEL: &str = "shipment-map-data";

    fn fixed_clock() -> Clock {
        Rc::new(|| Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap())
    }

    fn tab(hub: &LocalHub, is_grid_page: bool) -> ShipmentSynchronizer {
        ShipmentSynchronizer::connect_with_clock(hub.open(CHANNEL), is_grid_page, fixed_clock())
    }

    fn shipments(n: usize) -> Vec<Shipment> {
        (0..n)
            .map(|i| {
                Shipment::new(Uuid::new_v4(), &format!("MSCU{:04}", i), ShipmentStatus::InTransit)
                    .with_coordinates(1.0 + i as f64, 103.0)
            })
            .collect()
    }

    fn drain_notices(events: &mut SyncEvents) -> Vec<SyncNotice> {
        let mut out = Vec::new();
        while let Ok(Some(notice)) = events.try_next() {
            out.push(notice);
        }
        out
    }

    fn drain(events: &mut SyncEvents) -> Vec<SyncEvent> {
        drain_notices(events).into_iter().map(|notice| notice.event).collect()
    }

    #[test]
    fn publish_reaches_the_other_tab_exactly_once() {
        let hub = LocalHub::new();
        let grid = tab(&hub, true);
        let map = tab(&hub, false);
        let mut map_events = map.subscribe();

        let visible = shipments(3);
        let selected = vec![visible[1].id];
        grid.publish_shipments(visible.clone(), selected.clone());

        assert_eq!(
            drain(&mut map_events),
            vec![SyncEvent::ShipmentsChanged { visible: visible.clone(), selected: selected.clone() }]
        );
        assert_eq!(map.current_data().visible_shipments, visible);
        assert_eq!(map.current_data().selected_shipments, selected);
    }

    #[test]
    fn publisher_notifies_its_own_subscribers_too() {
        let hub = LocalHub::new();
        let grid = tab(&hub, true);
        let mut own = grid.subscribe();
        grid.publish_selection(vec![]);
        assert_eq!(drain(&mut own), vec![SyncEvent::SelectionChanged { selected: vec![] }]);
    }

    #[test]
    fn late_joiner_gets_the_twelve_shipments() {
        let hub = LocalHub::new();
        let grid = tab(&hub, true);
        let visible = shipments(12);
        let first = visible[0].id;
        grid.publish_shipments(visible.clone(), vec![first]);

        let map = tab(&hub, false);
        let mut events = map.subscribe();
        map.request_initial_state();

        assert!(map.status().has_data);
        assert_eq!(map.status().shipment_count, 12);
        assert!(map.peer_present());
        assert_eq!(
            drain(&mut events),
            vec![
                SyncEvent::ShipmentsChanged { visible, selected: vec![first] },
                SyncEvent::InitialDataReceived { has_data: true, from_grid_page: true },
            ]
        );
    }

    #[test]
    fn empty_peer_still_answers() {
        let hub = LocalHub::new();
        let _grid = tab(&hub, true);
        let map = tab(&hub, false);
        let mut events = map.subscribe();

        map.request_initial_state();

        assert!(map.peer_present());
        assert!(!map.status().has_data);
        assert_eq!(
            drain(&mut events),
            vec![SyncEvent::InitialDataReceived { has_data: false, from_grid_page: true }]
        );
    }

    #[test]
    fn grid_state_updates_merge_shallowly() {
        let hub = LocalHub::new();
        let grid = tab(&hub, true);
        let map = tab(&hub, false);

        let state = GridState::default()
            .with_filter("shipping_status", json!({"type": "equals", "filter": "IN_TRANSIT"}))
            .with_sort("shipment_number", SortDirection::Desc);
        grid.publish_grid_state(state.clone());
        assert_eq!(map.current_data().grid_state, state);

        let mut events = map.subscribe();
        let raw = json!({
            "type": "GRID_STATE_UPDATE",
            "data": { "sorting": [] },
            "timestamp": "2024-06-01T09:31:00Z"
        })
        .to_string();
        let js_page = hub.open(CHANNEL).unwrap();
        js_page.send(&raw);

        let merged = map.current_data().grid_state;
        assert_eq!(merged.active_filter_count(), 1);
        assert!(merged.sorting.is_empty());
        assert_eq!(drain(&mut events), vec![SyncEvent::GridStateChanged(merged)]);
    }

    #[test]
    fn malformed_messages_are_dropped() {
        let hub = LocalHub::new();
        let map = tab(&hub, false);
        let mut events = map.subscribe();
        let rogue: LocalChannel = hub.open(CHANNEL).unwrap();

        rogue.send("not json at all");
        rogue.send(r#"{"type":"SELF_DESTRUCT","data":{},"timestamp":"2024-06-01T09:31:00Z"}"#);

        assert!(drain(&mut events).is_empty());
        assert!(map.is_connected());
        assert_eq!(map.current_data(), StateSnapshot::default());
    }

    #[test]
    fn disconnected_publish_stays_in_this_tab() {
        let sync = ShipmentSynchronizer::connect(LocalHub::unavailable().open(CHANNEL), true);
        let mut events = sync.subscribe();
        let visible = shipments(2);
        let state = GridState::default().with_filter("status", json!("IN_TRANSIT"));

        sync.publish_shipments(visible.clone(), vec![]);
        sync.publish_grid_state(state.clone());
        sync.request_initial_state();

        assert!(!sync.is_connected());
        assert!(!sync.peer_present());
        assert!(sync.status().has_data);
        assert_eq!(sync.current_data().grid_state, state);
        assert_eq!(
            drain(&mut events),
            vec![
                SyncEvent::ShipmentsChanged { visible, selected: vec![] },
                SyncEvent::GridStateChanged(state),
            ]
        );
    }

    #[test]
    fn saving_a_filter_works_without_the_channel() {
        use crate::services::filter_store::{LocalFilterStore, SavedFilterStore};
        use crate::utils::storage::MemoryStorage;
        use futures::executor::block_on;

        let sync = ShipmentSynchronizer::connect(LocalHub::unavailable().open(CHANNEL), true);
        let state = GridState::default().with_filter("status", json!("IN_TRANSIT"));
        sync.publish_grid_state(state.clone());

        let filters = LocalFilterStore::new(MemoryStorage::new(), "shipment_saved_filters");
        block_on(async {
            filters.save("Asia Lane", &sync.current_data().grid_state, false).await.unwrap();
            assert_eq!(filters.load("Asia Lane").await.unwrap().state, state);
        });
    }

    #[test]
    fn events_carry_their_origin() {
        let hub = LocalHub::new();
        let grid = tab(&hub, true);
        let map = tab(&hub, false);
        let mut own = grid.subscribe();
        let mut peer = map.subscribe();
        let state = GridState::default().with_filter("status", json!("DELIVERED"));

        grid.publish_grid_state(state.clone());
        grid.apply_grid_state(state.clone());

        let origins = |notices: Vec<SyncNotice>| notices.into_iter().map(|n| n.origin).collect::<Vec<_>>();
        assert_eq!(origins(drain_notices(&mut own)), vec![EventOrigin::Page, EventOrigin::Internal]);
        assert_eq!(origins(drain_notices(&mut peer)), vec![EventOrigin::Peer, EventOrigin::Peer]);

        grid.publish_shipments(shipments(1), vec![]);
        let mut late = grid.subscribe();
        assert_eq!(origins(drain_notices(&mut late)), vec![EventOrigin::Internal]);
    }

    #[test]
    fn late_subscriber_gets_a_replay() {
        let hub = LocalHub::new();
        let grid = tab(&hub, true);
        let visible = shipments(2);
        grid.publish_shipments(visible.clone(), vec![]);

        let mut late = grid.subscribe();
        assert_eq!(
            drain(&mut late),
            vec![SyncEvent::ShipmentsChanged { visible, selected: vec![] }]
        );
    }

    #[test]
    fn map_view_changes_are_relayed_not_stored() {
        let hub = LocalHub::new();
        let map = tab(&hub, false);
        let grid = tab(&hub, true);
        let mut grid_events = grid.subscribe();
        let view = MapView { center: Coordinates::from((1.29, 103.85)), zoom: 6.0, bounds: None };

        map.publish_map_view(view.clone());

        assert_eq!(drain(&mut grid_events), vec![SyncEvent::MapViewChanged(view)]);
        assert_eq!(grid.current_data(), StateSnapshot::default());
    }

    #[test]
    fn close_is_idempotent_and_drops_subscribers() {
        let hub = LocalHub::new();
        let grid = tab(&hub, true);
        let map = tab(&hub, false);
        let mut events = map.subscribe();
        let flips = Rc::new(Cell::new(0));
        let flips_in = flips.clone();
        map.connection_state().subscribe(move |_| flips_in.set(flips_in.get() + 1));

        map.close();
        map.close();
        grid.publish_shipments(shipments(1), vec![]);

        assert!(!map.is_connected());
        assert_eq!(flips.get(), 1);
        assert_eq!(map.subscriber_count(), 0);
        assert!(matches!(events.try_next(), Ok(None)));
        assert_eq!(hub.peer_count(CHANNEL), 1);
    }

    #[derive(Default)]
    struct Recorder {
        shipments: usize,
        initial: Vec<bool>,
    }

    impl SyncSubscriber for Recorder {
        fn on_shipments_changed(&mut self, visible: &[Shipment], _selected: &[Uuid]) {
            self.shipments += visible.len();
        }

        fn on_initial_data(&mut self, has_data: bool) {
            self.initial.push(has_data);
        }
    }

    #[test]
    fn events_dispatch_to_subscriber_trait() {
        let mut recorder = Recorder::default();
        SyncEvent::ShipmentsChanged { visible: shipments(4), selected: vec![] }.dispatch(&mut recorder);
        SyncEvent::SelectionChanged { selected: vec![] }.dispatch(&mut recorder);
        SyncEvent::InitialDataReceived { has_data: false, from_grid_page: false }.dispatch(&mut recorder);
        assert_eq!(recorder.shipments, 4);
        assert_eq!(recorder.initial, vec![false]);
    }

    #[test]
    fn transport_error_is_reported_as_unavailable() {
        let result = LocalHub::unavailable().open(CHANNEL);
        assert!(matches!(result, Err(DashboardError::TransportUnavailable(_))));
    }
}
