use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::error::{DashboardError, DashboardResult};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Estado de un envío tal como lo devuelve la API
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    InTransit,
    Delivered,
    Planned,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ShipmentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ShipmentStatus::InTransit => "In Transit",
            ShipmentStatus::Delivered => "Delivered",
            ShipmentStatus::Planned => "Planned",
            ShipmentStatus::Unknown => "Unknown",
        }
    }

    /// Color del marcador en el mapa
    pub fn marker_color(&self) -> &'static str {
        match self {
            ShipmentStatus::InTransit => "#3B82F6",
            ShipmentStatus::Delivered => "#10B981",
            ShipmentStatus::Planned => "#F59E0B",
            ShipmentStatus::Unknown => "#6B7280",
        }
    }

    /// Clases del badge en la celda de estado del grid
    pub fn badge_classes(&self) -> &'static str {
        match self {
            ShipmentStatus::InTransit => "bg-blue-100 text-blue-800",
            ShipmentStatus::Delivered => "bg-green-100 text-green-800",
            ShipmentStatus::Planned => "bg-yellow-100 text-yellow-800",
            ShipmentStatus::Unknown => "bg-gray-100 text-gray-800",
        }
    }
}

/// Coordenadas geográficas (grados decimales)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> DashboardResult<Self> {
        let coords = Self { latitude, longitude };
        if coords.is_valid() {
            Ok(coords)
        } else {
            Err(DashboardError::Validation(format!(
                "coordinates out of range: ({}, {})",
                latitude, longitude
            )))
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// (0, 0) es el valor que manda el backend cuando no hay posición
    pub fn is_null_island(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }

    /// Distancia haversine en km
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lng = (other.longitude - self.longitude).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.latitude.to_radians().cos()
                * other.latitude.to_radians().cos()
                * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }
}

impl From<(f64, f64)> for Coordinates {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self {
            latitude: lat,
            longitude: lng,
        }
    }
}

/// Longitud total de una ruta (suma de tramos)
pub fn route_distance_km(points: &[Coordinates]) -> f64 {
    points
        .windows(2)
        .map(|pair| pair[0].distance_km(&pair[1]))
        .sum()
}

/// Tramo de ruta: un puerto con su posición y fecha
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub port_name: String,
    #[serde(default)]
    pub port_code: Option<String>,
    pub coordinates: Coordinates,
    pub timestamp: DateTime<Utc>,
    /// SEA, LAND, ...
    #[serde(default)]
    pub leg_type: Option<String>,
}

/// Envío (copia local; el dueño es el servidor)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub id: Uuid,
    pub shipment_number: String,
    #[serde(default)]
    pub shipment_type: String,
    #[serde(default)]
    pub sealine_code: String,
    #[serde(default)]
    pub sealine_name: String,
    #[serde(rename = "shipping_status", default)]
    pub status: ShipmentStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub route: Option<Vec<RouteLeg>>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

impl Shipment {
    pub fn new(id: Uuid, shipment_number: &str, status: ShipmentStatus) -> Self {
        Self {
            id,
            shipment_number: shipment_number.to_string(),
            shipment_type: String::new(),
            sealine_code: String::new(),
            sealine_name: String::new(),
            status,
            created_at: None,
            updated_at: None,
            route: None,
            coordinates: None,
        }
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.coordinates = Some(Coordinates { latitude, longitude });
        self
    }

    pub fn with_route(mut self, route: Vec<RouteLeg>) -> Self {
        self.route = Some(route);
        self
    }

    pub fn has_valid_coordinates(&self) -> bool {
        self.coordinates
            .map(|c| c.is_valid() && !c.is_null_island())
            .unwrap_or(false)
    }

    /// Puntos válidos de la ruta, en orden
    pub fn route_coordinates(&self) -> Vec<Coordinates> {
        self.route
            .as_ref()
            .map(|legs| {
                legs.iter()
                    .map(|leg| leg.coordinates)
                    .filter(|c| c.is_valid() && !c.is_null_island())
                    .collect()
            })
            .unwrap_or_default()
    }
}

// ============================================================================
// DTOs DE LA API DE ENVÍOS
// ============================================================================

/// Respuesta de los endpoints de listado: `{ rows, lastRow }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridDataResponse {
    pub rows: Vec<Shipment>,
    #[serde(rename = "lastRow")]
    pub last_row: i64,
}

/// Cuerpo de error: `{ error }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkDeleteRequest {
    #[serde(rename = "shipmentIDs")]
    pub shipment_ids: Vec<Uuid>,
}

/// Respuesta de `POST /shipments/{id}:refresh`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub shipment: Shipment,
}

/// Actualización parcial de un envío (PATCH)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_of_loading: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_of_delivery: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipper: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mbl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customs_processed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoiced: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_received: Option<bool>,
}

impl ShipmentPatch {
    pub fn is_empty(&self) -> bool {
        *self == ShipmentPatch::default()
    }

    /// Recorta espacios y valida longitudes. Devuelve el patch normalizado.
    pub fn validate(mut self) -> DashboardResult<Self> {
        if self.is_empty() {
            return Err(DashboardError::Validation("nothing to update".to_string()));
        }

        let limits: [(&mut Option<String>, &str, usize); 10] = [
            (&mut self.consignee, "consignee", 255),
            (&mut self.recipient, "recipient", 255),
            (&mut self.assigned_to, "assigned to", 255),
            (&mut self.place_of_loading, "place of loading", 255),
            (&mut self.place_of_delivery, "place of delivery", 255),
            (&mut self.final_destination, "final destination", 1000),
            (&mut self.container_type, "container type", 100),
            (&mut self.shipper, "shipper", 255),
            (&mut self.mbl, "MBL", 100),
            (&mut self.notes, "notes", 2000),
        ];

        for (field, label, max) in limits {
            if let Some(value) = field.as_mut() {
                let trimmed = value.trim().to_string();
                if trimmed.chars().count() > max {
                    return Err(DashboardError::Validation(format!(
                        "{} must be less than {} characters",
                        label, max
                    )));
                }
                *value = trimmed;
            }
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_status_strings_fall_back_to_unknown() {
        let status: ShipmentStatus = serde_json::from_str("\"CUSTOMS_HOLD\"").unwrap();
        assert_eq!(status, ShipmentStatus::Unknown);
        let status: ShipmentStatus = serde_json::from_str("\"IN_TRANSIT\"").unwrap();
        assert_eq!(status, ShipmentStatus::InTransit);
        assert_eq!(status.label(), "In Transit");
    }

    #[test]
    fn coordinates_outside_range_are_rejected() {
        assert!(Coordinates::new(91.0, 0.0).is_err());
        assert!(Coordinates::new(0.0, -180.5).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
        assert!(Coordinates::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn null_island_is_not_a_position() {
        let s = Shipment::new(Uuid::new_v4(), "MSCU1", ShipmentStatus::Planned).with_coordinates(0.0, 0.0);
        assert!(!s.has_valid_coordinates());
        let s = s.with_coordinates(1.29, 103.85);
        assert!(s.has_valid_coordinates());
    }

    #[test]
    fn haversine_distance_singapore_rotterdam() {
        let singapore = Coordinates::from((1.2644, 103.8222));
        let rotterdam = Coordinates::from((51.9244, 4.4777));
        let d = singapore.distance_km(&rotterdam);
        assert!((d - 10_500.0).abs() < 250.0, "distance was {}", d);
        assert_eq!(route_distance_km(&[singapore]), 0.0);
    }

    #[test]
    fn grid_response_uses_api_field_names() {
        let id = Uuid::new_v4();
        let json = format!(
            r#"{{"rows":[{{"id":"{}","shipment_number":"MAEU123","shipment_type":"CT","sealine_code":"MAEU","sealine_name":"Maersk","shipping_status":"DELIVERED","created_at":"2024-01-01","updated_at":"2024-01-02"}}],"lastRow":1}}"#,
            id
        );
        let resp: GridDataResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(resp.last_row, 1);
        assert_eq!(resp.rows[0].id, id);
        assert_eq!(resp.rows[0].status, ShipmentStatus::Delivered);
        assert!(resp.rows[0].route.is_none());
    }

    #[test]
    fn patch_validation_trims_and_limits() {
        let patch = ShipmentPatch {
            notes: Some("  fragile  ".to_string()),
            ..Default::default()
        };
        let patch = patch.validate().unwrap();
        assert_eq!(patch.notes.as_deref(), Some("fragile"));

        let too_long = ShipmentPatch {
            mbl: Some("x".repeat(101)),
            ..Default::default()
        };
        assert!(matches!(too_long.validate(), Err(DashboardError::Validation(_))));
        assert!(ShipmentPatch::default().validate().is_err());
    }

    #[test]
    fn patch_omits_unset_fields() {
        let patch = ShipmentPatch {
            invoiced: Some(true),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"invoiced":true}"#);
    }
}
