// ============================================================================
// VIEWS - Adaptadores de presentación (mapa, grid, avisos)
// ============================================================================
// Sin lógica de negocio: reciben eventos del synchronizer y llaman a la página
// ============================================================================

pub mod bridge;
pub mod map_adapter;
pub mod grid_adapter;
pub mod toast;

pub use bridge::*;
pub use map_adapter::MapAdapter;
pub use grid_adapter::GridAdapter;
pub use toast::*;
