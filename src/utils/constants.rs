/// Nombre del BroadcastChannel compartido por las páginas de grid y mapa.
/// Todas las pestañas del mismo origen que usen este nombre interoperan.
pub const BROADCAST_CHANNEL_NAME: &str = "shipment-map-data";

/// Clave de localStorage con todos los filtros guardados
pub const SAVED_FILTERS_STORAGE_KEY: &str = "shipment_saved_filters";
