// ============================================================================
// STATE MODULE - Estado local de la pestaña con Rc<RefCell> + notificaciones
// ============================================================================

pub mod reactivity;
pub mod shipment_store;

pub use reactivity::*;
pub use shipment_store::*;
