//! Background images in IndexedDB. A map screenshot as a data URL easily
//! exceeds the localStorage quota, so only the snapshot lives there.

use js_sys::Promise;
use mapmemo_shared::models::City;
use mapmemo_shared::snapshot::{image_key, SnapshotError};
use tracing::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Event, IdbDatabase, IdbObjectStore, IdbRequest, IdbTransactionMode};

use crate::storage::js_err;

const DB_NAME: &str = "mapmemo_maps";
const DB_VERSION: u32 = 1;
const STORE: &str = "images";

/// Resolves with the request's result, or rejects on its error event.
fn settle(request: &IdbRequest) -> JsFuture {
    let promise = Promise::new(&mut |resolve, reject| {
        let done = request.clone();
        let on_success = Closure::once_into_js(move |_: Event| {
            let result = done.result().unwrap_or(JsValue::UNDEFINED);
            let _ = resolve.call1(&JsValue::NULL, &result);
        });
        let on_error = Closure::once_into_js(move |_: Event| {
            let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("IndexedDB request failed"));
        });
        request.set_onsuccess(Some(on_success.unchecked_ref()));
        request.set_onerror(Some(on_error.unchecked_ref()));
    });
    JsFuture::from(promise)
}

pub struct ImageDb {
    db: IdbDatabase,
}

impl ImageDb {
    pub async fn open() -> Result<Self, SnapshotError> {
        let factory = web_sys::window()
            .ok_or_else(|| SnapshotError::Store("no window".to_string()))?
            .indexed_db()
            .map_err(js_err)?
            .ok_or_else(|| SnapshotError::Store("IndexedDB unavailable".to_string()))?;
        let open = factory.open_with_u32(DB_NAME, DB_VERSION).map_err(js_err)?;

        let upgrading = open.clone();
        let on_upgrade = Closure::once_into_js(move |_: Event| {
            let created = upgrading
                .result()
                .and_then(|db| db.dyn_into::<IdbDatabase>())
                .and_then(|db| db.create_object_store(STORE));
            if let Err(e) = created {
                warn!(error = ?e, "image store upgrade failed");
            }
        });
        open.set_onupgradeneeded(Some(on_upgrade.unchecked_ref()));

        let db = settle(&open)
            .await
            .map_err(js_err)?
            .dyn_into::<IdbDatabase>()
            .map_err(js_err)?;
        Ok(ImageDb { db })
    }

    fn store(&self, mode: IdbTransactionMode) -> Result<IdbObjectStore, SnapshotError> {
        self.db
            .transaction_with_str_and_mode(STORE, mode)
            .and_then(|tx| tx.object_store(STORE))
            .map_err(js_err)
    }

    pub async fn load(&self, city: &City) -> Result<Option<String>, SnapshotError> {
        let key = JsValue::from_str(&image_key(city));
        let request = self
            .store(IdbTransactionMode::Readonly)?
            .get(&key)
            .map_err(js_err)?;
        Ok(settle(&request).await.map_err(js_err)?.as_string())
    }

    /// Store `data` for `city`, or delete its image when `None`.
    pub async fn save(&self, city: &City, data: Option<&str>) -> Result<(), SnapshotError> {
        let store = self.store(IdbTransactionMode::Readwrite)?;
        let key = JsValue::from_str(&image_key(city));
        let request = match data {
            Some(data) => store.put_with_key(&JsValue::from_str(data), &key),
            None => store.delete(&key),
        }
        .map_err(js_err)?;
        settle(&request).await.map_err(js_err)?;
        Ok(())
    }
}
