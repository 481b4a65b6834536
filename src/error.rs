// ============================================================================
// ERRORES - Taxonomía única del dashboard
// ============================================================================
// Los errores de transporte/notificación se loguean y se descartan;
// las mutaciones iniciadas por el usuario se muestran como toast.
// ============================================================================

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    /// El navegador no tiene BroadcastChannel (o el canal está cerrado)
    #[error("broadcast channel unavailable: {0}")]
    TransportUnavailable(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Nombre de filtro repetido sin confirmación explícita de sobrescritura
    #[error("a saved filter named \"{0}\" already exists")]
    AlreadyExists(String),

    #[error("invalid format: {0}")]
    Format(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("unauthorized")]
    Unauthorized,
}

pub type DashboardResult<T> = Result<T, DashboardError>;

impl DashboardError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DashboardError::NotFound(_))
    }

    /// Texto corto para el toast
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::TransportUnavailable(_) => {
                "Live sync between tabs is not available in this browser.".to_string()
            }
            DashboardError::Validation(msg) => msg.clone(),
            DashboardError::NotFound(what) => format!("{} not found.", what),
            DashboardError::AlreadyExists(name) => {
                format!("Filter \"{}\" already exists. Confirm to overwrite it.", name)
            }
            DashboardError::Format(msg) => format!("Invalid data: {}", msg),
            DashboardError::Network(msg) => format!("Network error: {}", msg),
            DashboardError::Http { status, message } => format!("Server error ({}): {}", status, message),
            DashboardError::Storage(msg) => format!("Could not access browser storage: {}", msg),
            DashboardError::Unauthorized => "Please sign in again.".to_string(),
        }
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(e: serde_json::Error) -> Self {
        DashboardError::Format(e.to_string())
    }
}
