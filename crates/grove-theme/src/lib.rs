//! Light/dark theme preference for grove sites.
//!
//! This crate provides:
//! - [`Theme`], the two page themes and their toggle glyphs
//! - [`ThemeResolver`], which decides the applied theme from a stored
//!   preference, a fallback and the system color scheme
//! - the traits the resolver is driven through ([`PreferenceStore`],
//!   [`SystemScheme`], [`ThemeSurface`]), implemented over the DOM by the
//!   browser host and with plain structs in tests

mod resolver;

pub use resolver::{
    PreferenceStore, StoreError, SystemScheme, ThemeConfig, ThemeResolver, ThemeSurface,
};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A page theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// Value stored and written to `data-theme`.
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn opposite(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Toggle icon shown while this theme is applied (the theme a click
    /// switches to).
    pub fn glyph(self) -> &'static str {
        match self {
            Theme::Light => "☾",
            Theme::Dark => "☀",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored string that names no theme.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme: {0:?}")]
pub struct UnknownTheme(pub String);

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(UnknownTheme(other.to_string())),
        }
    }
}
