//! Where the best score lives between runs: the browser's `localStorage` on
//! the web, process memory elsewhere.

#[cfg(target_arch = "wasm32")]
pub type PlatformStore = LocalStorage;

#[cfg(not(target_arch = "wasm32"))]
pub type PlatformStore = tile_engine::MemoryStore;

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

#[cfg(target_arch = "wasm32")]
mod web {
    use bevy::log::{error, warn};
    use tile_engine::KeyValueStore;

    /// `window.localStorage`. Reads and writes degrade to no-ops when the
    /// browser denies storage access.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct LocalStorage;

    fn storage() -> Option<web_sys::Storage> {
        let storage = web_sys::window()?.local_storage().ok().flatten();
        if storage.is_none() {
            warn!("localStorage is unavailable, the best score will not persist");
        }
        storage
    }

    impl KeyValueStore for LocalStorage {
        fn get(&self, key: &str) -> Option<String> {
            storage()?.get_item(key).unwrap_or_else(|error| {
                error!("Failed to read {key} from localStorage: {error:?}");
                None
            })
        }

        fn set(&mut self, key: &str, value: &str) {
            if let Some(storage) = storage() {
                if let Err(error) = storage.set_item(key, value) {
                    error!("Failed to write {key} to localStorage: {error:?}");
                }
            }
        }
    }
}
