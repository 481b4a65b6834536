pub mod use_sync_status;

pub use use_sync_status::use_sync_status;
