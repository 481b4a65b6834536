// ============================================================================
// SERVICES - Canal entre pestañas, sync de estado y clientes REST
// ============================================================================

pub mod channel;
pub mod synchronizer;
pub mod http;
pub mod shipment_api;
pub mod filter_store;

pub use channel::*;
pub use synchronizer::*;
pub use http::*;
pub use shipment_api::*;
pub use filter_store::*;
