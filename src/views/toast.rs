// ============================================================================
// TOAST - Avisos cortos para las acciones del usuario
// ============================================================================

use crate::error::DashboardError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Warning,
}

impl ToastKind {
    pub fn icon(&self) -> &'static str {
        match self {
            ToastKind::Success => "✅",
            ToastKind::Error => "❌",
            ToastKind::Info => "ℹ️",
            ToastKind::Warning => "⚠️",
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            ToastKind::Success => "toast toast-success",
            ToastKind::Error => "toast toast-error",
            ToastKind::Info => "toast toast-info",
            ToastKind::Warning => "toast toast-warning",
        }
    }
}

/// Nombre existente => warning (el usuario puede confirmar), resto => error
pub fn kind_for_error(error: &DashboardError) -> ToastKind {
    match error {
        DashboardError::AlreadyExists(_) | DashboardError::Validation(_) => ToastKind::Warning,
        _ => ToastKind::Error,
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::{show_error, show_toast};

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::*;
    use gloo_timers::callback::Timeout;
    use web_sys::{Document, Element};
    use crate::config::CONFIG;

    const CONTAINER_ID: &str = "toast-container";

    fn container(document: &Document) -> Option<Element> {
        if let Some(existing) = document.get_element_by_id(CONTAINER_ID) {
            return Some(existing);
        }
        let created = document.create_element("div").ok()?;
        created.set_id(CONTAINER_ID);
        created.set_class_name("toast-container");
        document.body()?.append_child(&created).ok()?;
        Some(created)
    }

    /// Muestra el aviso y lo quita a los `toast_duration_ms` de la config
    pub fn show_toast(message: &str, kind: ToastKind) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::warn!("⚠️ [TOAST] Sin document: {}", message);
            return;
        };
        let Some(parent) = container(&document) else {
            log::warn!("⚠️ [TOAST] No se pudo crear el contenedor: {}", message);
            return;
        };
        let toast = match document.create_element("div") {
            Ok(element) => element,
            Err(e) => {
                log::error!("❌ [TOAST] create_element falló: {:?}", e);
                return;
            }
        };
        toast.set_class_name(kind.class());
        toast.set_text_content(Some(&format!("{} {}", kind.icon(), message)));
        if parent.append_child(&toast).is_err() {
            return;
        }

        Timeout::new(CONFIG.toast_duration_ms, move || toast.remove()).forget();
    }

    pub fn show_error(error: &DashboardError) {
        show_toast(&error.user_message(), kind_for_error(error));
    }
}
