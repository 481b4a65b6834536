// Utils compartidos

pub mod constants;
pub mod storage;

#[cfg(target_arch = "wasm32")]
pub mod ffi;

pub use constants::*;
