use serde::{Deserialize, Serialize};
use crate::services::filter_store::FilterBackend;
use crate::models::grid::DEFAULT_PAGE_SIZE;
use crate::models::shipment::Coordinates;
use crate::utils::constants::{BROADCAST_CHANNEL_NAME, SAVED_FILTERS_STORAGE_KEY};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend_url_development: String,
    pub backend_url_production: String,
    pub environment: String,
    pub enable_logging: bool,
    pub log_level: String,
    pub broadcast_channel_name: String,
    /// "local" (localStorage) o "remote" (API de filtros)
    pub filter_backend: String,
    pub saved_filters_storage_key: String,
    pub default_page_size: u32,
    pub grid_page_size: u32,
    pub map_config: MapConfig,
    pub toast_duration_ms: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url_development: "http://localhost:8080/api".to_string(),
            backend_url_production: "/api".to_string(),
            environment: "development".to_string(),
            enable_logging: true,
            log_level: "info".to_string(),
            broadcast_channel_name: BROADCAST_CHANNEL_NAME.to_string(),
            filter_backend: "local".to_string(),
            saved_filters_storage_key: SAVED_FILTERS_STORAGE_KEY.to_string(),
            default_page_size: DEFAULT_PAGE_SIZE,
            grid_page_size: 20,
            map_config: MapConfig::default(),
            toast_duration_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    pub default_center_lat: f64,
    pub default_center_lng: f64,
    pub default_zoom: f64,
    /// Zoom máximo al encuadrar los marcadores
    pub max_fit_zoom: f64,
    pub selected_marker_color: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_center_lat: 20.0,
            default_center_lng: 0.0,
            default_zoom: 2.0,
            max_fit_zoom: 10.0,
            selected_marker_color: "#EF4444".to_string(),
        }
    }
}

impl MapConfig {
    pub fn default_center(&self) -> Coordinates {
        Coordinates::from((self.default_center_lat, self.default_center_lng))
    }
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno en tiempo de compilación
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let map_defaults = MapConfig::default();
        Self {
            backend_url_development: option_env!("BACKEND_URL_DEVELOPMENT")
                .unwrap_or("http://localhost:8080/api").to_string(),
            backend_url_production: option_env!("BACKEND_URL_PRODUCTION")
                .unwrap_or("/api").to_string(),
            environment: option_env!("ENVIRONMENT")
                .unwrap_or("development").to_string(),
            enable_logging: option_env!("ENABLE_LOGGING")
                .unwrap_or("true").parse().unwrap_or(true),
            log_level: option_env!("LOG_LEVEL")
                .unwrap_or("info").to_string(),
            broadcast_channel_name: option_env!("BROADCAST_CHANNEL_NAME")
                .unwrap_or(BROADCAST_CHANNEL_NAME).to_string(),
            filter_backend: option_env!("FILTER_BACKEND")
                .unwrap_or("local").to_string(),
            saved_filters_storage_key: option_env!("SAVED_FILTERS_STORAGE_KEY")
                .unwrap_or(SAVED_FILTERS_STORAGE_KEY).to_string(),
            default_page_size: option_env!("DEFAULT_PAGE_SIZE")
                .and_then(|v| v.parse().ok()).unwrap_or(defaults.default_page_size),
            grid_page_size: option_env!("GRID_PAGE_SIZE")
                .and_then(|v| v.parse().ok()).unwrap_or(defaults.grid_page_size),
            map_config: MapConfig {
                default_center_lat: option_env!("DEFAULT_MAP_CENTER_LAT")
                    .and_then(|v| v.parse().ok()).unwrap_or(map_defaults.default_center_lat),
                default_center_lng: option_env!("DEFAULT_MAP_CENTER_LNG")
                    .and_then(|v| v.parse().ok()).unwrap_or(map_defaults.default_center_lng),
                default_zoom: option_env!("DEFAULT_MAP_ZOOM")
                    .and_then(|v| v.parse().ok()).unwrap_or(map_defaults.default_zoom),
                max_fit_zoom: option_env!("MAX_FIT_ZOOM")
                    .and_then(|v| v.parse().ok()).unwrap_or(map_defaults.max_fit_zoom),
                selected_marker_color: map_defaults.selected_marker_color,
            },
            toast_duration_ms: option_env!("TOAST_DURATION_MS")
                .and_then(|v| v.parse().ok()).unwrap_or(defaults.toast_duration_ms),
        }
    }

    /// Obtiene la URL del backend según el entorno actual
    pub fn backend_url(&self) -> &str {
        match self.environment.as_str() {
            "production" => &self.backend_url_production,
            _ => &self.backend_url_development,
        }
    }

    pub fn filter_backend(&self) -> FilterBackend {
        FilterBackend::parse(&self.filter_backend)
    }

    /// Nivel efectivo del logger; sin logging sólo pasan errores
    pub fn log_level(&self) -> log::Level {
        if !self.enable_logging {
            return log::Level::Error;
        }
        self.log_level.parse().unwrap_or(log::Level::Info)
    }
}

// Configuración global estática
lazy_static::lazy_static! {
    pub static ref CONFIG: AppConfig = AppConfig::from_env();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_url_follows_environment() {
        let mut config = AppConfig::default();
        assert_eq!(config.backend_url(), "http://localhost:8080/api");
        config.environment = "production".to_string();
        assert_eq!(config.backend_url(), "/api");
    }

    #[test]
    fn log_level_falls_back_to_info() {
        let mut config = AppConfig::default();
        config.log_level = "debug".to_string();
        assert_eq!(config.log_level(), log::Level::Debug);
        config.log_level = "chatty".to_string();
        assert_eq!(config.log_level(), log::Level::Info);
        config.enable_logging = false;
        assert_eq!(config.log_level(), log::Level::Error);
    }

    #[test]
    fn defaults_match_the_pages() {
        let config = AppConfig::default();
        assert_eq!(config.broadcast_channel_name, "shipment-map-data");
        assert_eq!(config.default_page_size, 15);
        assert_eq!(config.filter_backend(), FilterBackend::Local);
        assert_eq!(config.map_config.default_center(), Coordinates::from((20.0, 0.0)));
    }
}
