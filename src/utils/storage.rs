// ============================================================================
// STORAGE - Almacenamiento clave/valor (localStorage o memoria)
// ============================================================================

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use serde::{Serialize, de::DeserializeOwned};
use crate::error::{DashboardError, DashboardResult};

/// Almacenamiento de strings por clave, síncrono como localStorage
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> DashboardResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> DashboardResult<()>;
    fn remove(&self, key: &str) -> DashboardResult<()>;
}

pub fn save_json<S: KeyValueStorage + ?Sized, T: Serialize>(storage: &S, key: &str, value: &T) -> DashboardResult<()> {
    let json = serde_json::to_string(value)?;
    storage.set(key, &json)
}

pub fn load_json<S: KeyValueStorage + ?Sized, T: DeserializeOwned>(storage: &S, key: &str) -> DashboardResult<Option<T>> {
    match storage.get(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Almacenamiento en memoria (tests y navegadores sin localStorage).
/// Las clones comparten contenido.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> DashboardResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> DashboardResult<()> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> DashboardResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// localStorage del navegador vía gloo-storage
#[cfg(target_arch = "wasm32")]
#[derive(Clone, Copy, Default)]
pub struct BrowserStorage;

#[cfg(target_arch = "wasm32")]
impl KeyValueStorage for BrowserStorage {
    fn get(&self, key: &str) -> DashboardResult<Option<String>> {
        use gloo_storage::{LocalStorage, Storage};

        LocalStorage::raw()
            .get_item(key)
            .map_err(|_| DashboardError::Storage("Error leyendo localStorage".to_string()))
    }

    fn set(&self, key: &str, value: &str) -> DashboardResult<()> {
        use gloo_storage::{LocalStorage, Storage};

        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|_| DashboardError::Storage("Error guardando en localStorage".to_string()))
    }

    fn remove(&self, key: &str) -> DashboardResult<()> {
        use gloo_storage::{LocalStorage, Storage};

        LocalStorage::delete(key);
        Ok(())
    }
}
