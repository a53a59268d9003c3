//! The once-per-element highlight pass.
//!
//! [`Dispatcher::highlight_all`] walks every code block under a root in
//! document order. Each element is wrapped in a [`CodeBlock`] whose
//! [`BlockState`] is read from the element's marker attribute, so the guard
//! travels with the element: an element that is removed and re-rendered comes
//! back unmarked, and nothing keeps a table of elements alive.

use serde::{Deserialize, Serialize};

use crate::normalize::apply_normalized;
use crate::registry::GrammarRegistry;
use crate::HighlightEngine;

/// A rendered code element, as seen by the dispatcher.
pub trait CodeElement {
    fn text_content(&self) -> String;

    /// Replace the whole text content.
    fn set_text_content(&mut self, text: &str);

    fn class_names(&self) -> Vec<String>;

    fn attribute(&self, name: &str) -> Option<String>;

    fn set_attribute(&mut self, name: &str, value: &str);
}

/// Something that can list the code blocks beneath it, in document order.
pub trait BlockSource {
    type Element: CodeElement;

    fn code_blocks(&self) -> Vec<Self::Element>;
}

/// Dispatcher settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DispatchConfig {
    /// CSS selector for code blocks (used by DOM-backed block sources).
    pub selector: String,
    /// Attribute recording that an element has been highlighted.
    pub marker_attribute: String,
    /// Value written to the marker attribute.
    pub marker_value: String,
    /// Class prefix declaring a block's language (`language-lean`).
    pub language_prefix: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            selector: "pre > code".into(),
            marker_attribute: "data-highlighted".into(),
            marker_value: "yes".into(),
            language_prefix: "language-".into(),
        }
    }
}

/// Highlight state of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    Pending,
    Highlighted,
}

/// A code element plus its highlight state.
#[derive(Debug)]
pub struct CodeBlock<E> {
    element: E,
    state: BlockState,
}

impl<E: CodeElement> CodeBlock<E> {
    /// Wrap an element, reading its state from the marker attribute.
    ///
    /// Any value of the marker attribute counts as highlighted.
    pub fn wrap(element: E, config: &DispatchConfig) -> Self {
        let state = if element.attribute(&config.marker_attribute).is_some() {
            BlockState::Highlighted
        } else {
            BlockState::Pending
        };
        Self { element, state }
    }

    pub fn state(&self) -> BlockState {
        self.state
    }

    /// Language named by the first `<prefix><name>` class, if any.
    pub fn declared_language(&self, config: &DispatchConfig) -> Option<String> {
        self.element
            .class_names()
            .into_iter()
            .find_map(|class| {
                class
                    .strip_prefix(config.language_prefix.as_str())
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
            })
    }

    /// Normalize the element's text; `true` if it was rewritten.
    pub fn normalize(&mut self) -> bool {
        apply_normalized(&mut self.element)
    }

    pub fn mark_highlighted(&mut self, config: &DispatchConfig) {
        self.element
            .set_attribute(&config.marker_attribute, &config.marker_value);
        self.state = BlockState::Highlighted;
    }

    pub fn element_mut(&mut self) -> &mut E {
        &mut self.element
    }
}

/// Counters for one highlight pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    /// Blocks highlighted in this pass.
    pub highlighted: usize,
    /// Blocks already marked before the pass.
    pub skipped: usize,
    /// Blocks the engine failed on (left unmarked).
    pub failed: usize,
    /// Blocks whose text was rewritten by normalization.
    pub rewritten: usize,
}

/// Runs the highlight pass against a registry of grammars.
pub struct Dispatcher<'r> {
    registry: &'r GrammarRegistry,
    config: DispatchConfig,
}

impl<'r> Dispatcher<'r> {
    pub fn new(registry: &'r GrammarRegistry) -> Self {
        Self::with_config(registry, DispatchConfig::default())
    }

    pub fn with_config(registry: &'r GrammarRegistry, config: DispatchConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Highlight every unmarked code block under `root`.
    ///
    /// A failing element is logged and left unmarked; the pass continues with
    /// the next one. Running this again only touches elements that are still
    /// unmarked.
    pub fn highlight_all<R, E>(&self, root: &R, engine: &mut E) -> DispatchStats
    where
        R: BlockSource,
        E: HighlightEngine<Element = R::Element>,
    {
        let mut stats = DispatchStats::default();

        for element in root.code_blocks() {
            let mut block = CodeBlock::wrap(element, &self.config);
            if block.state() == BlockState::Highlighted {
                stats.skipped += 1;
                continue;
            }

            if block.normalize() {
                stats.rewritten += 1;
            }

            let declared = block.declared_language(&self.config);
            let language = declared
                .as_deref()
                .map(|name| self.registry.canonical_name(name).unwrap_or(name));

            match engine.highlight_element(block.element_mut(), language) {
                Ok(()) => {
                    block.mark_highlighted(&self.config);
                    stats.highlighted += 1;
                }
                Err(error) => {
                    tracing::warn!(
                        language = language.unwrap_or("auto"),
                        %error,
                        "failed to highlight code block"
                    );
                    stats.failed += 1;
                }
            }
        }

        tracing::debug!(
            highlighted = stats.highlighted,
            skipped = stats.skipped,
            failed = stats.failed,
            "highlight pass finished"
        );
        stats
    }
}
