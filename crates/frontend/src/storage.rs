use mapmemo_shared::snapshot::{KeyValueStore, SnapshotError};

/// `window.localStorage` behind the engine's key-value interface. Holds the
/// snapshot document only.
pub struct LocalStorage {
    storage: web_sys::Storage,
}

pub(crate) fn js_err(e: wasm_bindgen::JsValue) -> SnapshotError {
    SnapshotError::Store(format!("{e:?}"))
}

impl LocalStorage {
    pub fn open() -> Result<Self, SnapshotError> {
        let storage = web_sys::window()
            .ok_or_else(|| SnapshotError::Store("no window".to_string()))?
            .local_storage()
            .map_err(js_err)?
            .ok_or_else(|| SnapshotError::Store("local storage disabled".to_string()))?;
        Ok(LocalStorage { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SnapshotError> {
        self.storage.get_item(key).map_err(js_err)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SnapshotError> {
        self.storage.set_item(key, value).map_err(js_err)
    }

    fn remove(&mut self, key: &str) -> Result<(), SnapshotError> {
        self.storage.remove_item(key).map_err(js_err)
    }
}
