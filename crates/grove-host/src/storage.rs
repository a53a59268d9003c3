//! `localStorage` and `prefers-color-scheme`.

use grove::grove_theme::{PreferenceStore, StoreError, SystemScheme, Theme};
use web_sys::{MediaQueryList, Storage, Window};

/// `window.localStorage`, when the browser grants it.
#[derive(Debug, Clone)]
pub struct LocalStore {
    storage: Option<Storage>,
}

impl LocalStore {
    pub fn new(window: &Window) -> Self {
        let storage = match window.local_storage() {
            Ok(storage) => storage,
            Err(error) => {
                tracing::debug!(?error, "localStorage unavailable");
                None
            }
        };
        Self { storage }
    }

    fn storage(&self) -> Result<&Storage, StoreError> {
        self.storage
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("no localStorage".into()))
    }
}

impl PreferenceStore for LocalStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage()?
            .get_item(key)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StoreError::Write(format!("{e:?}")))
    }
}

/// The `prefers-color-scheme` media queries.
#[derive(Debug, Clone)]
pub struct MediaScheme {
    dark: Option<MediaQueryList>,
    light: Option<MediaQueryList>,
}

impl MediaScheme {
    pub fn new(window: &Window) -> Self {
        let query = |q: &str| window.match_media(q).ok().flatten();
        Self {
            dark: query("(prefers-color-scheme: dark)"),
            light: query("(prefers-color-scheme: light)"),
        }
    }

    /// The dark query, to listen for changes on.
    pub fn dark_query(&self) -> Option<&MediaQueryList> {
        self.dark.as_ref()
    }
}

impl SystemScheme for MediaScheme {
    fn preferred(&self) -> Option<Theme> {
        if self.dark.as_ref().is_some_and(MediaQueryList::matches) {
            Some(Theme::Dark)
        } else if self.light.as_ref().is_some_and(MediaQueryList::matches) {
            Some(Theme::Light)
        } else {
            None
        }
    }
}
