pub mod shipment;
pub mod grid;
pub mod filter;
pub mod broadcast;

pub use shipment::{Coordinates, RouteLeg, Shipment, ShipmentPatch, ShipmentStatus, GridDataResponse};
pub use grid::{GridState, GridStatePatch, Pagination, SortDirection, SortModel, GridQuery};
pub use filter::{SavedFilter, FilterExport, FilterStats, ImportReport, validate_filter_name};
pub use broadcast::{
    BroadcastMessage, BroadcastPayload, MessageKind, StateSnapshot, ShipmentsUpdate,
    SelectionUpdate, InitialDataRequest, InitialDataResponse, MapView, MapBounds, parse_selection,
};
