// ============================================================================
// PAGE FFI - Puente con el código JS de la página (grid y mapa)
// ============================================================================
// Solo wrappers: sin estado, sin lógica. Qué funciones existen se detecta una
// vez al arrancar (PageCapabilities) en lugar de preguntar en cada llamada.
// ============================================================================

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::views::bridge::*;

/// Capacidades de la página actual
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PageCapabilities {
    pub map_markers: bool,
    pub map_routes: bool,
    pub map_highlight: bool,
    pub map_view: bool,
    pub grid_state: bool,
    pub grid_selection: bool,
    pub rows_in_view: bool,
    pub download: bool,
}

impl PageCapabilities {
    pub fn detect() -> Self {
        let caps = Self {
            map_markers: has_window_fn(RENDER_MARKERS_FN),
            map_routes: has_window_fn(RENDER_ROUTES_FN),
            map_highlight: has_window_fn(HIGHLIGHT_FN),
            map_view: has_window_fn(SET_MAP_VIEW_FN),
            grid_state: has_window_fn(APPLY_GRID_STATE_FN),
            grid_selection: has_window_fn(SELECT_GRID_ROWS_FN),
            rows_in_view: has_window_fn(MARK_ROWS_IN_VIEW_FN),
            download: has_window_fn(DOWNLOAD_FILE_FN),
        };
        log::info!("🧩 [FFI] Capacidades de la página: {:?}", caps);
        caps
    }

    pub fn is_map_page(&self) -> bool {
        self.map_markers
    }

    pub fn is_grid_page(&self) -> bool {
        self.grid_state
    }
}

fn window_fn(name: &str) -> Option<js_sys::Function> {
    let window = web_sys::window()?;
    js_sys::Reflect::get(&window, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<js_sys::Function>()
        .ok()
}

pub fn has_window_fn(name: &str) -> bool {
    window_fn(name).is_some()
}

/// Llama `window[name](json)`; los errores JS se loguean y se descartan
pub fn call_with_json(name: &str, json: &str) {
    match window_fn(name) {
        Some(function) => {
            if let Err(e) = function.call1(&JsValue::NULL, &JsValue::from_str(json)) {
                log::error!("❌ [FFI] {} lanzó un error: {:?}", name, e);
            }
        }
        None => log::warn!("⚠️ [FFI] window.{} no existe", name),
    }
}

/// Llama `window[name](a, b)` con dos strings
pub fn call_with_two_strings(name: &str, a: &str, b: &str) {
    match window_fn(name) {
        Some(function) => {
            if let Err(e) = function.call2(&JsValue::NULL, &JsValue::from_str(a), &JsValue::from_str(b)) {
                log::error!("❌ [FFI] {} lanzó un error: {:?}", name, e);
            }
        }
        None => log::warn!("⚠️ [FFI] window.{} no existe", name),
    }
}
