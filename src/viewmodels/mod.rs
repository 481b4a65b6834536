pub mod map_viewmodel;
pub mod grid_viewmodel;
pub mod sync_viewmodel;

pub use map_viewmodel::{MapMarker, MapRoute, MapViewModel, MarkerBatch};
pub use grid_viewmodel::{GridRow, GridViewModel};
pub use sync_viewmodel::{SyncBadge, SyncViewModel};
