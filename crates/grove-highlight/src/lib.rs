//! Code block highlighting for grove sites.
//!
//! This crate holds everything about highlighting that does not depend on a
//! browser:
//!
//! - [`normalize`]: strip the incidental indentation a code block picks up
//!   from the markup it was authored in.
//! - [`Grammar`] / [`Mode`] / [`Keywords`]: declarative grammar data, handed
//!   to the tokenizing engine as-is.
//! - [`GrammarRegistry`]: grammars by id and alias, installed into an engine.
//! - [`Dispatcher`]: the once-per-element highlight pass.
//!
//! # Architecture
//!
//! Tokenizing is not done here. It is delegated to an external engine behind
//! the [`HighlightEngine`] trait, and page elements are reached through
//! [`CodeElement`] / [`BlockSource`]. The browser host implements these over
//! the DOM and highlight.js; tests implement them with plain structs.
//!
//! ```rust,ignore
//! use grove_highlight::{Dispatcher, GrammarRegistry};
//!
//! let mut registry = GrammarRegistry::new();
//! let report = registry.install([grove_lean::grammar()], &mut engine);
//! assert!(report.is_complete());
//!
//! let stats = Dispatcher::new(&registry).highlight_all(&document, &mut engine);
//! ```
//!
//! # The highlight marker
//!
//! A highlighted element carries `data-highlighted="yes"`. The dispatcher
//! reads that attribute instead of keeping its own set of seen elements, so
//! running the pass twice is harmless and a re-rendered element is picked up
//! again.

mod dispatch;
mod grammar;
mod normalize;
mod registry;
pub mod scope;
mod types;

pub use dispatch::{
    BlockSource, BlockState, CodeBlock, CodeElement, DispatchConfig, DispatchStats, Dispatcher,
};
pub use grammar::{Contains, Grammar, Keywords, Mode};
pub use normalize::{apply_normalized, normalize};
pub use registry::{GrammarRegistry, RegistrationReport, RegistryError};
pub use scope::{SCOPES, is_known_scope};
pub use types::HighlightError;

/// A tokenizing engine that can learn grammars and highlight elements.
///
/// Both calls are synchronous: the engine is already loaded by the time the
/// dispatcher runs. Errors are per call, so one bad grammar or element never
/// poisons the engine for the rest of the page.
pub trait HighlightEngine {
    /// The element type this engine highlights in place.
    type Element: CodeElement;

    /// Teach the engine a grammar under its id and aliases.
    fn register_language(&mut self, grammar: &Grammar) -> Result<(), HighlightError>;

    /// Tokenize `element`'s text and replace its content with highlighted
    /// markup.
    ///
    /// `language` is the canonical id declared by the element, or `None` to
    /// let the engine detect it.
    fn highlight_element(
        &mut self,
        element: &mut Self::Element,
        language: Option<&str>,
    ) -> Result<(), HighlightError>;
}
