//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Storage (LocalStorage on web, nothing on native)
//! - Leaderboard requests (fetch on web)

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{fetch_leaderboard, submit_score};

/// Read a LocalStorage item
#[cfg(target_arch = "wasm32")]
pub fn storage_get(key: &str) -> Option<String> {
    let storage = web_sys::window()?.local_storage().ok()??;
    storage.get_item(key).ok()?
}

/// Write a LocalStorage item, logging failures (quota, private mode)
#[cfg(target_arch = "wasm32")]
pub fn storage_set(key: &str, value: &str) {
    let storage = web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten();

    match storage {
        Some(storage) => {
            if let Err(e) = storage.set_item(key, value) {
                log::warn!("Failed to store {key}: {e:?}");
            }
        }
        None => log::warn!("LocalStorage unavailable, {key} not saved"),
    }
}

/// Native stubs
#[cfg(not(target_arch = "wasm32"))]
pub fn storage_get(_key: &str) -> Option<String> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
pub fn storage_set(_key: &str, _value: &str) {
    // No-op for native
}
