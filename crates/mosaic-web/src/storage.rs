#![forbid(unsafe_code)]

//! `localStorage`-backed preference store.

use mosaic_core::{PreferenceError, PreferenceStore};
use wasm_bindgen::JsValue;
use web_sys::{Storage, Window};

/// Wraps `window.localStorage`. Access can be denied (privacy mode, sandboxed
/// frames), so the handle is optional and every call reports why it failed.
pub struct LocalStore {
    storage: Option<Storage>,
    unavailable: String,
}

impl LocalStore {
    pub fn open(window: &Window) -> Self {
        match window.local_storage() {
            Ok(Some(storage)) => Self {
                storage: Some(storage),
                unavailable: String::new(),
            },
            Ok(None) => Self {
                storage: None,
                unavailable: "localStorage is not provided".into(),
            },
            Err(err) => Self {
                storage: None,
                unavailable: describe(&err),
            },
        }
    }

    fn storage(&self) -> Result<&Storage, PreferenceError> {
        self.storage
            .as_ref()
            .ok_or_else(|| PreferenceError::Unavailable(self.unavailable.clone()))
    }
}

impl PreferenceStore for LocalStore {
    fn name(&self) -> &str {
        "localStorage"
    }

    fn load(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        self.storage()?
            .get_item(key)
            .map_err(|err| PreferenceError::Rejected {
                op: "read",
                reason: describe(&err),
            })
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|err| PreferenceError::Rejected {
                op: "write",
                reason: describe(&err),
            })
    }
}

pub(crate) fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
