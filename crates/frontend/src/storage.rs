//! `window.localStorage` session backend

use gloo::storage::{LocalStorage, Storage};
use railo_core::{CoreError, CoreResult, SessionStorage};
use wasm_bindgen::JsValue;

/// Session storage backed by the browser's `localStorage`
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserStorage;

fn js_error(err: JsValue) -> CoreError {
    CoreError::storage(format!("localStorage: {err:?}"))
}

impl SessionStorage for BrowserStorage {
    fn load(&self, key: &str) -> CoreResult<Option<String>> {
        LocalStorage::raw().get_item(key).map_err(js_error)
    }

    fn store(&self, key: &str, value: &str) -> CoreResult<()> {
        LocalStorage::raw().set_item(key, value).map_err(js_error)
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        LocalStorage::raw().remove_item(key).map_err(js_error)
    }
}
