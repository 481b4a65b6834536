// ============================================================================
// PAGE BRIDGE - Llamadas a las funciones JS de la página
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

/// Funciones que la página JS expone en `window`
pub const RENDER_MARKERS_FN: &str = "renderShipmentMarkers";
pub const RENDER_ROUTES_FN: &str = "renderShipmentRoutes";
pub const HIGHLIGHT_FN: &str = "highlightShipments";
pub const SET_MAP_VIEW_FN: &str = "setMapView";
pub const APPLY_GRID_STATE_FN: &str = "applyGridState";
pub const SELECT_GRID_ROWS_FN: &str = "selectGridRows";
pub const MARK_ROWS_IN_VIEW_FN: &str = "markRowsInMapView";
pub const DOWNLOAD_FILE_FN: &str = "downloadTextFile";

pub trait PageBridge {
    fn has(&self, function: &str) -> bool;

    /// `window[function](json)`; si no existe no hace nada
    fn call(&self, function: &str, json: &str);
}

/// Bridge sobre `window` del navegador
#[cfg(target_arch = "wasm32")]
#[derive(Clone, Copy, Default)]
pub struct WindowBridge;

#[cfg(target_arch = "wasm32")]
impl PageBridge for WindowBridge {
    fn has(&self, function: &str) -> bool {
        crate::utils::ffi::has_window_fn(function)
    }

    fn call(&self, function: &str, json: &str) {
        crate::utils::ffi::call_with_json(function, json);
    }
}

/// Bridge en memoria: registra las llamadas. Las clones comparten registro.
#[derive(Clone, Default)]
pub struct RecordingBridge {
    available: Rc<Vec<&'static str>>,
    calls: Rc<RefCell<Vec<(String, String)>>>,
}

impl RecordingBridge {
    pub fn with_functions(functions: &[&'static str]) -> Self {
        Self {
            available: Rc::new(functions.to_vec()),
            calls: Rc::default(),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, function: &str) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|(name, _)| name == function)
            .map(|(_, json)| json.clone())
            .collect()
    }
}

impl PageBridge for RecordingBridge {
    fn has(&self, function: &str) -> bool {
        self.available.contains(&function)
    }

    fn call(&self, function: &str, json: &str) {
        if self.has(function) {
            self.calls.borrow_mut().push((function.to_string(), json.to_string()));
        }
    }
}
