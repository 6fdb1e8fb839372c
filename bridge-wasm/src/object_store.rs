//! IndexedDB implementation of the object store bridge.
//!
//! # Layout
//!
//! - **Database**: `musicpod_db`, version 1
//! - **Object store**: `offline_tracks`, out-of-line keys (the track id)
//! - **Values**: `Uint8Array` copies of the payload. Blobs and bare
//!   `ArrayBuffer`s written by other clients are read back as well.
//!
//! The database is opened for every operation and closed when it completes, so
//! no handle outlives a call. The upgrade handler creates the object store
//! when it is missing.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use bridge_traits::{error::Result as BridgeResult, storage::ObjectStore};
use bytes::Bytes;
use futures::channel::oneshot;
use js_sys::{Array, ArrayBuffer, Uint8Array};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Blob, IdbDatabase, IdbObjectStore as IdbStoreHandle, IdbOpenDbRequest, IdbRequest,
    IdbTransactionMode, IdbVersionChangeEvent,
};

use crate::error::{describe_js_value, WasmError, WasmResult};

/// Database holding offline payloads.
pub const DB_NAME: &str = "musicpod_db";
/// Object store inside [`DB_NAME`].
pub const STORE_NAME: &str = "offline_tracks";
const DB_VERSION: u32 = 1;

/// Offline payload storage on top of IndexedDB.
#[derive(Debug, Clone)]
pub struct IdbObjectStore {
    db_name: String,
}

impl Default for IdbObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IdbObjectStore {
    /// Store backed by the `musicpod_db` database.
    pub fn new() -> Self {
        Self::with_database(DB_NAME)
    }

    /// Use a different database name. Tests use this to stay isolated.
    pub fn with_database(db_name: impl Into<String>) -> Self {
        Self {
            db_name: db_name.into(),
        }
    }

    async fn open(&self) -> WasmResult<IdbDatabase> {
        let window = web_sys::window().ok_or_else(|| WasmError::NotAvailable("window".into()))?;
        let factory = window
            .indexed_db()?
            .ok_or_else(|| WasmError::NotAvailable("indexedDB".into()))?;

        let request: IdbOpenDbRequest = factory.open_with_u32(&self.db_name, DB_VERSION)?;
        let on_upgrade = Closure::once(move |event: IdbVersionChangeEvent| {
            if let Err(err) = create_store(&event) {
                warn!(error = %describe_js_value(&err), "Failed to create offline store");
            }
        });
        request.set_onupgradeneeded(Some(on_upgrade.as_ref().unchecked_ref()));

        let opened = await_request(&request).await;
        request.set_onupgradeneeded(None);
        drop(on_upgrade);

        opened?
            .dyn_into::<IdbDatabase>()
            .map_err(|_| WasmError::IndexedDb("open did not yield a database".into()))
    }

    /// Open the database, run `op` against the object store, then close it.
    async fn with_store<T, F, Fut>(&self, mode: IdbTransactionMode, op: F) -> WasmResult<T>
    where
        F: FnOnce(IdbStoreHandle) -> Fut,
        Fut: std::future::Future<Output = WasmResult<T>>,
    {
        let db = self.open().await?;
        let result = match db.transaction_with_str_and_mode(STORE_NAME, mode) {
            Ok(transaction) => match transaction.object_store(STORE_NAME) {
                Ok(store) => op(store).await,
                Err(err) => Err(err.into()),
            },
            Err(err) => Err(err.into()),
        };
        db.close();
        result
    }
}

fn create_store(event: &IdbVersionChangeEvent) -> Result<(), JsValue> {
    let target = event
        .target()
        .ok_or_else(|| JsValue::from_str("upgrade event without target"))?;
    let request = target
        .dyn_into::<IdbOpenDbRequest>()
        .map_err(JsValue::from)?;
    let db = request.result()?.dyn_into::<IdbDatabase>()?;
    if !db.object_store_names().contains(STORE_NAME) {
        db.create_object_store(STORE_NAME)?;
    }
    Ok(())
}

/// Resolve once `request` fires `success` or `error`.
async fn await_request(request: &IdbRequest) -> WasmResult<JsValue> {
    let (tx, rx) = oneshot::channel::<Result<JsValue, JsValue>>();
    let tx = Rc::new(RefCell::new(Some(tx)));

    let success_tx = Rc::clone(&tx);
    let success_request = request.clone();
    let on_success = Closure::<dyn FnMut()>::new(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(success_request.result());
        }
    });

    let error_request = request.clone();
    let on_error = Closure::<dyn FnMut()>::new(move || {
        if let Some(tx) = tx.borrow_mut().take() {
            let error = match error_request.error() {
                Ok(Some(exception)) => JsValue::from(exception),
                _ => JsValue::from_str("request failed"),
            };
            let _ = tx.send(Err(error));
        }
    });

    request.set_onsuccess(Some(on_success.as_ref().unchecked_ref()));
    request.set_onerror(Some(on_error.as_ref().unchecked_ref()));

    let outcome = rx.await;
    request.set_onsuccess(None);
    request.set_onerror(None);

    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(WasmError::IndexedDb(describe_js_value(&err))),
        Err(_) => Err(WasmError::IndexedDb("request was dropped".into())),
    }
}

async fn value_to_bytes(value: JsValue) -> WasmResult<Bytes> {
    if let Some(array) = value.dyn_ref::<Uint8Array>() {
        return Ok(Bytes::from(array.to_vec()));
    }
    if let Some(buffer) = value.dyn_ref::<ArrayBuffer>() {
        return Ok(Bytes::from(Uint8Array::new(buffer).to_vec()));
    }
    if let Some(blob) = value.dyn_ref::<Blob>() {
        let buffer = JsFuture::from(blob.array_buffer()).await?;
        return Ok(Bytes::from(Uint8Array::new(&buffer).to_vec()));
    }
    Err(WasmError::IndexedDb(format!(
        "unexpected payload type: {}",
        describe_js_value(&value)
    )))
}

#[async_trait(?Send)]
impl ObjectStore for IdbObjectStore {
    async fn put(&self, key: &str, value: Bytes) -> BridgeResult<()> {
        let len = value.len();
        self.with_store(IdbTransactionMode::Readwrite, |store| async move {
            let payload = Uint8Array::from(value.as_ref());
            let request = store.put_with_key(&payload, &JsValue::from_str(key))?;
            await_request(&request).await.map(|_| ())
        })
        .await?;
        debug!(key, bytes = len, "Stored payload in IndexedDB");
        Ok(())
    }

    async fn get(&self, key: &str) -> BridgeResult<Option<Bytes>> {
        let value = self
            .with_store(IdbTransactionMode::Readonly, |store| async move {
                let request = store.get(&JsValue::from_str(key))?;
                await_request(&request).await
            })
            .await?;

        if value.is_undefined() || value.is_null() {
            return Ok(None);
        }
        Ok(Some(value_to_bytes(value).await?))
    }

    async fn delete(&self, key: &str) -> BridgeResult<()> {
        self.with_store(IdbTransactionMode::Readwrite, |store| async move {
            let request = store.delete(&JsValue::from_str(key))?;
            await_request(&request).await.map(|_| ())
        })
        .await?;
        Ok(())
    }

    async fn list_keys(&self) -> BridgeResult<Vec<String>> {
        let keys = self
            .with_store(IdbTransactionMode::Readonly, |store| async move {
                let request = store.get_all_keys()?;
                await_request(&request).await
            })
            .await?;

        Ok(Array::from(&keys)
            .iter()
            .filter_map(|key| key.as_string())
            .collect())
    }

    async fn contains(&self, key: &str) -> BridgeResult<bool> {
        let count = self
            .with_store(IdbTransactionMode::Readonly, |store| async move {
                let request = store.count_with_key(&JsValue::from_str(key))?;
                await_request(&request).await
            })
            .await?;
        Ok(count.as_f64().unwrap_or(0.0) > 0.0)
    }
}
