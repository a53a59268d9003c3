//! Client-side bootstrap for grove sites.
//!
//! A grove site is a generated "forest" of notes (trees). The generator
//! writes static HTML plus a manifest; this crate finishes the page in the
//! browser:
//!
//! - code blocks are dedented and highlighted once each, including Lean
//!   ([`grove_highlight`], [`grove_lean`])
//! - a quick-open palette is filled from the manifest ([`grove_search`])
//! - the light/dark theme is resolved and can be toggled ([`grove_theme`])
//! - in-page jumps open collapsed sections on the way ([`jump`])
//!
//! Nothing here touches the DOM directly. The platform is reached through
//! traits, implemented over `web-sys` by `grove-host` and with plain structs
//! in tests.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use grove::{GroveConfig, PageLoad, boot};
//!
//! let config = GroveConfig::default();
//! let booted = boot(
//!     PageLoad { document, engine, store, scheme, surface, source_path },
//!     &config,
//! );
//! if let Some(request) = booted.search {
//!     // drive grove_search::load_index(..) on the page's executor
//! }
//! ```

mod boot;
mod config;
pub mod jump;

pub use boot::{BootReport, Booted, Highlighter, PageLoad, SearchRequest, boot};
pub use config::{ConfigError, GroveConfig};

pub use grove_highlight;
pub use grove_lean;
pub use grove_search;
pub use grove_theme;

use grove_highlight::Grammar;

/// Grammars bundled with grove, registered on every page.
pub fn builtin_grammars() -> Vec<Grammar> {
    vec![grove_lean::grammar()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_highlight::GrammarRegistry;

    #[test]
    fn test_builtin_grammars_register_cleanly() {
        let mut registry = GrammarRegistry::new();
        for grammar in builtin_grammars() {
            registry.register(grammar).unwrap();
        }
        assert_eq!(registry.canonical_name("lean4"), Some("lean"));
    }
}
