// ============================================================================
// MENSAJES DEL CANAL - Protocolo entre pestañas (grid <-> mapa)
// ============================================================================
// Formato en el cable (compatible con las páginas JS):
//   { "type": "SHIPMENTS_UPDATE", "data": { ... }, "timestamp": "..." }
// El tipo determina completamente la forma de `data`.
// ============================================================================

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::error::{DashboardError, DashboardResult};
use crate::models::grid::{GridState, GridStatePatch};
use crate::models::shipment::{Coordinates, Shipment};

/// Selección como ids. Las páginas JS mandan filas completas del grid
/// (`{ id, ... }`), así que se aceptan ambas formas; `null` es vacía.
pub fn deserialize_selection<'de, D>(deserializer: D) -> Result<Vec<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SelectedEntry {
        Id(Uuid),
        Row { id: Uuid },
    }

    let entries: Option<Vec<SelectedEntry>> = Option::deserialize(deserializer)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .map(|entry| match entry {
            SelectedEntry::Id(id) | SelectedEntry::Row { id } => id,
        })
        .collect())
}

/// Selección que llega del JS de la página (ids o filas)
pub fn parse_selection(json: &str) -> DashboardResult<Vec<Uuid>> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    let selected = deserialize_selection(&mut deserializer)?;
    deserializer.end()?;
    Ok(selected)
}

/// Snapshot completo del store de una pestaña
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    #[serde(default)]
    pub visible_shipments: Vec<Shipment>,
    #[serde(default, deserialize_with = "deserialize_selection")]
    pub selected_shipments: Vec<Uuid>,
    #[serde(default)]
    pub grid_state: GridState,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentsUpdate {
    pub visible_shipments: Vec<Shipment>,
    #[serde(default, deserialize_with = "deserialize_selection")]
    pub selected_shipments: Vec<Uuid>,
    #[serde(default)]
    pub shipment_count: usize,
    #[serde(default)]
    pub selected_count: usize,
}

impl ShipmentsUpdate {
    pub fn new(visible_shipments: Vec<Shipment>, selected_shipments: Vec<Uuid>) -> Self {
        Self {
            shipment_count: visible_shipments.len(),
            selected_count: selected_shipments.len(),
            visible_shipments,
            selected_shipments,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionUpdate {
    #[serde(default, deserialize_with = "deserialize_selection")]
    pub selected_shipments: Vec<Uuid>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialDataRequest {
    pub requester_id: String,
}

/// Respuesta a REQUEST_INITIAL_DATA. Se manda siempre, aunque esté vacía,
/// para que quien pregunta sepa que hay otra página abierta.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialDataResponse {
    #[serde(flatten)]
    pub snapshot: StateSnapshot,
    pub has_data: bool,
    #[serde(default)]
    pub is_grid_page: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapBounds {
    pub south_west: Coordinates,
    pub north_east: Coordinates,
}

impl MapBounds {
    pub fn contains(&self, point: &Coordinates) -> bool {
        point.latitude >= self.south_west.latitude
            && point.latitude <= self.north_east.latitude
            && point.longitude >= self.south_west.longitude
            && point.longitude <= self.north_east.longitude
    }
}

/// Vista del mapa (centro, zoom, bounds)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: Coordinates,
    pub zoom: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<MapBounds>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BroadcastPayload {
    ShipmentsUpdate(ShipmentsUpdate),
    GridStateUpdate(GridStatePatch),
    SelectionUpdate(SelectionUpdate),
    RequestInitialData(InitialDataRequest),
    InitialDataResponse(InitialDataResponse),
    MapViewChange(MapView),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    ShipmentsUpdate,
    GridStateUpdate,
    SelectionUpdate,
    RequestInitialData,
    InitialDataResponse,
    MapViewChange,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::ShipmentsUpdate => "SHIPMENTS_UPDATE",
            MessageKind::GridStateUpdate => "GRID_STATE_UPDATE",
            MessageKind::SelectionUpdate => "SELECTION_UPDATE",
            MessageKind::RequestInitialData => "REQUEST_INITIAL_DATA",
            MessageKind::InitialDataResponse => "INITIAL_DATA_RESPONSE",
            MessageKind::MapViewChange => "MAP_VIEW_CHANGE",
        }
    }
}

impl BroadcastPayload {
    pub fn kind(&self) -> MessageKind {
        match self {
            BroadcastPayload::ShipmentsUpdate(_) => MessageKind::ShipmentsUpdate,
            BroadcastPayload::GridStateUpdate(_) => MessageKind::GridStateUpdate,
            BroadcastPayload::SelectionUpdate(_) => MessageKind::SelectionUpdate,
            BroadcastPayload::RequestInitialData(_) => MessageKind::RequestInitialData,
            BroadcastPayload::InitialDataResponse(_) => MessageKind::InitialDataResponse,
            BroadcastPayload::MapViewChange(_) => MessageKind::MapViewChange,
        }
    }
}

/// Mensaje completo: payload etiquetado + timestamp de emisión
#[derive(Clone, Debug, PartialEq)]
pub struct BroadcastMessage {
    pub payload: BroadcastPayload,
    pub timestamp: DateTime<Utc>,
}

impl BroadcastMessage {
    pub fn new(payload: BroadcastPayload, timestamp: DateTime<Utc>) -> Self {
        Self { payload, timestamp }
    }

    pub fn kind(&self) -> MessageKind {
        self.payload.kind()
    }

    /// Serializa a `{ type, data, timestamp }`
    pub fn encode(&self) -> DashboardResult<String> {
        let mut value = serde_json::to_value(&self.payload)?;
        match value.as_object_mut() {
            Some(obj) => {
                obj.insert("timestamp".to_string(), serde_json::to_value(self.timestamp)?);
            }
            None => return Err(DashboardError::Format("payload is not an object".to_string())),
        }
        Ok(serde_json::to_string(&value)?)
    }

    /// Parsea un mensaje recibido. Tipos desconocidos o cuerpos mal formados
    /// son `Format`.
    pub fn decode(raw: &str) -> DashboardResult<Self> {
        let mut value: Value = serde_json::from_str(raw)?;
        let obj = value
            .as_object_mut()
            .ok_or_else(|| DashboardError::Format("message is not an object".to_string()))?;

        let timestamp = obj
            .remove("timestamp")
            .ok_or_else(|| DashboardError::Format("message without timestamp".to_string()))?;
        let timestamp: DateTime<Utc> = serde_json::from_value(timestamp)?;

        let payload: BroadcastPayload = serde_json::from_value(value)?;
        Ok(Self { payload, timestamp })
    }
}
