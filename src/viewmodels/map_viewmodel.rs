// ============================================================================
// MAP VIEWMODEL - Preparación de datos para el mapa
// ============================================================================
// SOLO lógica de preparación de datos - Sin estado, sin DOM
// ============================================================================

use std::collections::HashSet;
use serde::Serialize;
use uuid::Uuid;
use crate::config::MapConfig;
use crate::models::broadcast::{MapBounds, MapView};
use crate::models::shipment::{route_distance_km, Coordinates, Shipment, ShipmentStatus};

/// Marcador listo para la página JS
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    pub id: Uuid,
    pub label: String,
    pub coords: [f64; 2], // [lat, lng]
    pub status: ShipmentStatus,
    pub status_label: String,
    pub color: String,
    pub selected: bool,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MapRoute {
    pub id: Uuid,
    pub points: Vec<[f64; 2]>,
    pub distance_km: f64,
    pub color: String,
}

/// Resultado de preparar marcadores: los envíos sin posición no se pintan
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarkerBatch {
    pub markers: Vec<MapMarker>,
    pub dropped: usize,
}

pub struct MapViewModel;

impl MapViewModel {
    /// Un marcador por envío con coordenadas válidas. (0, 0) cuenta como
    /// "sin posición".
    pub fn prepare_markers(visible: &[Shipment], selected: &[Uuid], config: &MapConfig) -> MarkerBatch {
        let selected: HashSet<&Uuid> = selected.iter().collect();
        let mut batch = MarkerBatch::default();

        for shipment in visible {
            let coords = match shipment.coordinates {
                Some(c) if shipment.has_valid_coordinates() => c,
                _ => {
                    batch.dropped += 1;
                    continue;
                }
            };
            let is_selected = selected.contains(&shipment.id);
            batch.markers.push(MapMarker {
                id: shipment.id,
                label: shipment.shipment_number.clone(),
                coords: [coords.latitude, coords.longitude],
                status: shipment.status,
                status_label: shipment.status.label().to_string(),
                color: if is_selected {
                    config.selected_marker_color.clone()
                } else {
                    shipment.status.marker_color().to_string()
                },
                selected: is_selected,
            });
        }

        if batch.dropped > 0 {
            log::debug!("🗺️ [MAP] {} envíos sin coordenadas válidas", batch.dropped);
        }
        batch
    }

    /// Rutas con al menos dos puntos válidos
    pub fn prepare_routes(visible: &[Shipment]) -> Vec<MapRoute> {
        visible
            .iter()
            .filter_map(|shipment| {
                let points = shipment.route_coordinates();
                if points.len() < 2 {
                    return None;
                }
                Some(MapRoute {
                    id: shipment.id,
                    distance_km: route_distance_km(&points),
                    points: points.iter().map(|c| [c.latitude, c.longitude]).collect(),
                    color: shipment.status.marker_color().to_string(),
                })
            })
            .collect()
    }

    /// Caja mínima que contiene todos los puntos
    pub fn fit_bounds(points: &[Coordinates]) -> Option<MapBounds> {
        let first = points.first()?;
        let (mut south, mut west, mut north, mut east) =
            (first.latitude, first.longitude, first.latitude, first.longitude);
        for p in &points[1..] {
            south = south.min(p.latitude);
            north = north.max(p.latitude);
            west = west.min(p.longitude);
            east = east.max(p.longitude);
        }
        Some(MapBounds {
            south_west: Coordinates::from((south, west)),
            north_east: Coordinates::from((north, east)),
        })
    }

    /// Vista que encuadra los marcadores; sin marcadores, la vista por defecto
    pub fn view_for_markers(markers: &[MapMarker], config: &MapConfig) -> MapView {
        let points: Vec<Coordinates> = markers.iter().map(|m| Coordinates::from((m.coords[0], m.coords[1]))).collect();
        match Self::fit_bounds(&points) {
            Some(bounds) => MapView {
                center: Coordinates::from((
                    (bounds.south_west.latitude + bounds.north_east.latitude) / 2.0,
                    (bounds.south_west.longitude + bounds.north_east.longitude) / 2.0,
                )),
                zoom: if points.len() == 1 { config.max_fit_zoom } else { config.default_zoom },
                bounds: Some(bounds),
            },
            None => MapView {
                center: config.default_center(),
                zoom: config.default_zoom,
                bounds: None,
            },
        }
    }
}
