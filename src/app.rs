// ============================================================================
// DASHBOARD APP - Raíz de composición de cada página (grid o mapa)
// ============================================================================
// Abre el canal, arma synchronizer + stores + clientes y conecta los
// adaptadores según lo que la página JS expone.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;
use futures::StreamExt;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use crate::components::{SyncStatusBadge, SyncStatusBadgeProps};
use crate::config::CONFIG;
use crate::services::{
    BrowserChannel, FilterStoreKind, GlooHttp, ShipmentApi, ShipmentSynchronizer, SyncEvents, SyncSubscriber,
};
use crate::utils::ffi::PageCapabilities;
use crate::utils::storage::BrowserStorage;
use crate::views::{GridAdapter, MapAdapter, WindowBridge};

pub type PageFilterStore = FilterStoreKind<BrowserStorage, GlooHttp>;

const SYNC_BADGE_ROOT_ID: &str = "sync-status";

thread_local! {
    static APP: RefCell<Option<DashboardApp>> = RefCell::new(None);
}

#[derive(Clone)]
pub struct DashboardApp {
    pub sync: ShipmentSynchronizer,
    pub filters: Rc<PageFilterStore>,
    pub shipments: Rc<ShipmentApi<GlooHttp>>,
    pub capabilities: PageCapabilities,
}

impl DashboardApp {
    pub fn start() -> Self {
        let capabilities = PageCapabilities::detect();
        let sync = ShipmentSynchronizer::connect(
            BrowserChannel::open(&CONFIG.broadcast_channel_name),
            capabilities.is_grid_page(),
        );

        let http = GlooHttp::new(CONFIG.backend_url());
        let filters = Rc::new(FilterStoreKind::from_backend(
            CONFIG.filter_backend(),
            BrowserStorage,
            &CONFIG.saved_filters_storage_key,
            http.clone(),
        ));
        let shipments = Rc::new(ShipmentApi::new(http));

        if capabilities.is_map_page() {
            spawn_adapter(sync.subscribe(), MapAdapter::new(WindowBridge, CONFIG.map_config.clone()));
        }
        if capabilities.is_grid_page() {
            spawn_adapter(sync.subscribe(), GridAdapter::new(WindowBridge));
        }
        mount_sync_badge(&sync);

        // Una sola vez por carga, antes de tener datos propios
        sync.request_initial_state();

        log::info!(
            "🚀 [APP] Dashboard listo (grid: {}, mapa: {}, filtros: {:?})",
            capabilities.is_grid_page(),
            capabilities.is_map_page(),
            CONFIG.filter_backend()
        );

        Self {
            sync,
            filters,
            shipments,
            capabilities,
        }
    }

    pub fn install(self) {
        APP.with(|cell| *cell.borrow_mut() = Some(self));
    }

    /// Handle de la app instalada (clon barato: todo es Rc)
    pub fn current() -> Result<DashboardApp, JsValue> {
        APP.with(|cell| cell.borrow().clone())
            .ok_or_else(|| JsValue::from_str("Dashboard not initialized"))
    }
}

fn spawn_adapter<A: SyncSubscriber + 'static>(mut events: SyncEvents, mut adapter: A) {
    spawn_local(async move {
        while let Some(notice) = events.next().await {
            adapter.on_notice(&notice);
        }
        log::debug!("🔇 [APP] Adaptador desconectado");
    });
}

fn mount_sync_badge(sync: &ShipmentSynchronizer) {
    let root = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(SYNC_BADGE_ROOT_ID));
    if let Some(root) = root {
        yew::Renderer::<SyncStatusBadge>::with_root_and_props(root, SyncStatusBadgeProps { sync: sync.clone() })
            .render();
    }
}
