//! Deciding which theme is applied.
//!
//! On load the applied theme is, in order: the stored preference, the
//! configured fallback, the system color scheme, light. Toggling stores the
//! opposite of what is applied. A system scheme change only matters while
//! nothing is stored and the theme was not toggled in this session.

use serde::{Deserialize, Serialize};

use crate::Theme;

/// Persisted key/value storage (`localStorage` in the browser).
pub trait PreferenceStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// The system-level color scheme signal.
pub trait SystemScheme {
    /// `None` when the platform expresses no preference.
    fn preferred(&self) -> Option<Theme>;
}

/// Where an applied theme becomes visible.
pub trait ThemeSurface {
    fn apply(&mut self, theme: Theme);
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Storage can't be reached at all (disabled, sandboxed, ...).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage write failed: {0}")]
    Write(String),
}

/// Theme resolution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ThemeConfig {
    /// Storage key of the explicit preference.
    pub storage_key: String,
    /// Theme used when nothing is stored. `None` defers to the system scheme.
    pub fallback: Option<Theme>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: "theme".into(),
            fallback: Some(Theme::Light),
        }
    }
}

/// Resolves, applies and toggles the page theme.
#[derive(Debug)]
pub struct ThemeResolver<S, M, T> {
    store: S,
    scheme: M,
    surface: T,
    config: ThemeConfig,
    applied: Theme,
    /// Toggled in this session, whether or not the store kept it.
    explicit: bool,
}

impl<S, M, T> ThemeResolver<S, M, T>
where
    S: PreferenceStore,
    M: SystemScheme,
    T: ThemeSurface,
{
    /// Resolve the initial theme and apply it.
    pub fn load(store: S, scheme: M, surface: T, config: ThemeConfig) -> Self {
        let mut resolver = Self {
            store,
            scheme,
            surface,
            config,
            applied: Theme::Light,
            explicit: false,
        };

        let theme = resolver
            .stored()
            .or(resolver.config.fallback)
            .or_else(|| resolver.scheme.preferred())
            .unwrap_or(Theme::Light);
        tracing::debug!(%theme, "resolved initial theme");
        resolver.apply(theme);
        resolver
    }

    /// Switch to the opposite theme and remember it.
    pub fn toggle(&mut self) -> Theme {
        let theme = self.applied.opposite();
        if let Err(error) = self.store.save(&self.config.storage_key, theme.as_str()) {
            tracing::debug!(%error, "theme preference not saved");
        }
        self.explicit = true;
        self.apply(theme);
        theme
    }

    /// React to a system color scheme change.
    ///
    /// Ignored while an explicit preference is stored or was toggled.
    pub fn on_system_change(&mut self, theme: Theme) {
        if self.explicit || self.stored().is_some() {
            return;
        }
        self.apply(theme);
    }

    pub fn applied(&self) -> Theme {
        self.applied
    }

    pub fn config(&self) -> &ThemeConfig {
        &self.config
    }

    pub fn surface(&self) -> &T {
        &self.surface
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The stored preference; unreadable or unrecognised values count as unset.
    fn stored(&self) -> Option<Theme> {
        match self.store.load(&self.config.storage_key) {
            Ok(value) => value.and_then(|v| v.parse().ok()),
            Err(error) => {
                tracing::debug!(%error, "theme preference unreadable");
                None
            }
        }
    }

    fn apply(&mut self, theme: Theme) {
        self.surface.apply(theme);
        self.applied = theme;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    struct MemoryStore {
        values: HashMap<String, String>,
        broken: bool,
    }

    impl MemoryStore {
        fn with(key: &str, value: &str) -> Self {
            let mut store = Self::default();
            store.values.insert(key.into(), value.into());
            store
        }

        fn broken() -> Self {
            Self {
                broken: true,
                ..Self::default()
            }
        }
    }

    impl PreferenceStore for MemoryStore {
        fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
            if self.broken {
                return Err(StoreError::Unavailable("denied".into()));
            }
            Ok(self.values.get(key).cloned())
        }

        fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            if self.broken {
                return Err(StoreError::Write("denied".into()));
            }
            self.values.insert(key.into(), value.into());
            Ok(())
        }
    }

    struct Scheme(Option<Theme>);

    impl SystemScheme for Scheme {
        fn preferred(&self) -> Option<Theme> {
            self.0
        }
    }

    /// Records every applied theme.
    #[derive(Debug, Default)]
    struct Surface(Vec<Theme>);

    impl ThemeSurface for Surface {
        fn apply(&mut self, theme: Theme) {
            self.0.push(theme);
        }
    }

    fn no_fallback() -> ThemeConfig {
        ThemeConfig {
            fallback: None,
            ..ThemeConfig::default()
        }
    }

    #[test]
    fn test_nothing_stored_no_system_gives_fallback() {
        let resolver = ThemeResolver::load(
            MemoryStore::default(),
            Scheme(None),
            Surface::default(),
            ThemeConfig::default(),
        );
        assert_eq!(resolver.applied(), Theme::Light);
        assert_eq!(resolver.surface().0, vec![Theme::Light]);

        let resolver = ThemeResolver::load(
            MemoryStore::default(),
            Scheme(None),
            Surface::default(),
            ThemeConfig {
                fallback: Some(Theme::Dark),
                ..ThemeConfig::default()
            },
        );
        assert_eq!(resolver.applied(), Theme::Dark);
    }

    #[test]
    fn test_fallback_comes_before_system() {
        let resolver = ThemeResolver::load(
            MemoryStore::default(),
            Scheme(Some(Theme::Dark)),
            Surface::default(),
            ThemeConfig::default(),
        );
        assert_eq!(resolver.applied(), Theme::Light);
    }

    #[test]
    fn test_system_used_without_fallback() {
        let resolver = ThemeResolver::load(
            MemoryStore::default(),
            Scheme(Some(Theme::Dark)),
            Surface::default(),
            no_fallback(),
        );
        assert_eq!(resolver.applied(), Theme::Dark);

        let resolver = ThemeResolver::load(
            MemoryStore::default(),
            Scheme(None),
            Surface::default(),
            no_fallback(),
        );
        assert_eq!(resolver.applied(), Theme::Light);
    }

    #[test]
    fn test_stored_preference_overrides_system() {
        let mut resolver = ThemeResolver::load(
            MemoryStore::with("theme", "dark"),
            Scheme(Some(Theme::Light)),
            Surface::default(),
            no_fallback(),
        );
        assert_eq!(resolver.applied(), Theme::Dark);

        resolver.on_system_change(Theme::Light);
        assert_eq!(resolver.applied(), Theme::Dark);
        assert_eq!(resolver.surface().0, vec![Theme::Dark]);
    }

    #[test]
    fn test_system_change_applies_when_unset() {
        let mut resolver = ThemeResolver::load(
            MemoryStore::default(),
            Scheme(None),
            Surface::default(),
            ThemeConfig::default(),
        );
        resolver.on_system_change(Theme::Dark);
        assert_eq!(resolver.applied(), Theme::Dark);
        assert_eq!(resolver.store().values.get("theme"), None);
    }

    #[test]
    fn test_toggle_twice_restores_theme_and_storage() {
        let mut resolver = ThemeResolver::load(
            MemoryStore::with("theme", "light"),
            Scheme(None),
            Surface::default(),
            ThemeConfig::default(),
        );

        assert_eq!(resolver.toggle(), Theme::Dark);
        assert_eq!(resolver.store().values["theme"], "dark");
        assert_eq!(resolver.toggle(), Theme::Light);
        assert_eq!(resolver.applied(), Theme::Light);
        assert_eq!(resolver.store().values["theme"], "light");
        assert_eq!(
            resolver.surface().0,
            vec![Theme::Light, Theme::Dark, Theme::Light]
        );
    }

    #[test]
    fn test_toggle_pins_against_system_changes() {
        let mut resolver = ThemeResolver::load(
            MemoryStore::default(),
            Scheme(None),
            Surface::default(),
            ThemeConfig::default(),
        );
        resolver.toggle();
        resolver.on_system_change(Theme::Light);
        assert_eq!(resolver.applied(), Theme::Dark);
    }

    #[test]
    fn test_broken_storage_still_toggles() {
        let mut resolver = ThemeResolver::load(
            MemoryStore::broken(),
            Scheme(Some(Theme::Dark)),
            Surface::default(),
            no_fallback(),
        );
        assert_eq!(resolver.applied(), Theme::Dark);
        assert_eq!(resolver.toggle(), Theme::Light);
        assert_eq!(resolver.applied(), Theme::Light);
    }

    #[test]
    fn test_unsaved_toggle_pins_against_system_changes() {
        let mut resolver = ThemeResolver::load(
            MemoryStore::broken(),
            Scheme(Some(Theme::Light)),
            Surface::default(),
            no_fallback(),
        );
        assert_eq!(resolver.toggle(), Theme::Dark);
        resolver.on_system_change(Theme::Light);
        assert_eq!(resolver.applied(), Theme::Dark);
        assert_eq!(resolver.surface().0, vec![Theme::Light, Theme::Dark]);
    }

    #[test]
    fn test_garbage_value_counts_as_unset() {
        let resolver = ThemeResolver::load(
            MemoryStore::with("theme", "solarized"),
            Scheme(Some(Theme::Dark)),
            Surface::default(),
            no_fallback(),
        );
        assert_eq!(resolver.applied(), Theme::Dark);
    }

    #[test]
    fn test_custom_storage_key() {
        let resolver = ThemeResolver::load(
            MemoryStore::with("grove-theme", "dark"),
            Scheme(None),
            Surface::default(),
            ThemeConfig {
                storage_key: "grove-theme".into(),
                fallback: None,
            },
        );
        assert_eq!(resolver.applied(), Theme::Dark);
    }
}
