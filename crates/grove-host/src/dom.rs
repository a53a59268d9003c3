//! DOM adapters: code blocks, the theme surface and jump targets.

use grove::grove_highlight::{BlockSource, CodeElement};
use grove::grove_theme::{Theme, ThemeSurface};
use grove::jump::{Disclosure, JumpTarget, TargetLookup};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlDetailsElement, HtmlElement};

/// A `<code>` element.
#[derive(Debug, Clone)]
pub struct DomCodeBlock {
    element: Element,
}

impl DomCodeBlock {
    pub fn element(&self) -> &Element {
        &self.element
    }
}

impl CodeElement for DomCodeBlock {
    fn text_content(&self) -> String {
        self.element.text_content().unwrap_or_default()
    }

    fn set_text_content(&mut self, text: &str) {
        self.element.set_text_content(Some(text));
    }

    fn class_names(&self) -> Vec<String> {
        self.element
            .class_name()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.element.get_attribute(name)
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        if let Err(error) = self.element.set_attribute(name, value) {
            tracing::warn!(name, ?error, "failed to set attribute");
        }
    }
}

/// Code blocks matching a selector under the document.
#[derive(Debug, Clone)]
pub struct DocumentRoot {
    document: Document,
    selector: String,
}

impl DocumentRoot {
    pub fn new(document: Document, selector: impl Into<String>) -> Self {
        Self {
            document,
            selector: selector.into(),
        }
    }
}

impl BlockSource for DocumentRoot {
    type Element = DomCodeBlock;

    fn code_blocks(&self) -> Vec<DomCodeBlock> {
        let nodes = match self.document.query_selector_all(&self.selector) {
            Ok(nodes) => nodes,
            Err(error) => {
                tracing::warn!(selector = %self.selector, ?error, "invalid code block selector");
                return Vec::new();
            }
        };

        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| DomCodeBlock { element })
            .collect()
    }
}

/// `data-theme` on `<body>` plus the toggle glyph.
#[derive(Debug, Clone)]
pub struct DomThemeSurface {
    body: Option<HtmlElement>,
    icon: Option<Element>,
}

impl DomThemeSurface {
    pub const TOGGLE_ID: &'static str = "theme-toggle";
    const ICON_SELECTOR: &'static str = "#theme-toggle .theme-icon";

    pub fn new(document: &Document) -> Self {
        let icon = document.query_selector(Self::ICON_SELECTOR).ok().flatten();
        if icon.is_none() {
            tracing::debug!("no theme toggle icon on this page");
        }
        Self {
            body: document.body(),
            icon,
        }
    }
}

impl ThemeSurface for DomThemeSurface {
    fn apply(&mut self, theme: Theme) {
        if let Some(body) = &self.body
            && let Err(error) = body.set_attribute("data-theme", theme.as_str())
        {
            tracing::warn!(?error, "failed to set data-theme");
        }
        if let Some(icon) = &self.icon {
            icon.set_text_content(Some(theme.glyph()));
        }
    }
}

/// A `<details>` element.
pub struct DetailsDisclosure(HtmlDetailsElement);

impl Disclosure for DetailsDisclosure {
    fn is_open(&self) -> bool {
        self.0.open()
    }

    fn open(&mut self) {
        self.0.set_open(true);
    }
}

/// An element some `data-jump-target` link points at.
pub struct DomJumpTarget(Element);

impl JumpTarget for DomJumpTarget {
    type Ancestor = DetailsDisclosure;

    fn collapsible_ancestors(&self) -> Vec<DetailsDisclosure> {
        std::iter::successors(self.0.parent_element(), |e| e.parent_element())
            .filter_map(|e| e.dyn_into::<HtmlDetailsElement>().ok())
            .map(DetailsDisclosure)
            .collect()
    }

    fn scroll_into_view(&self) {
        self.0.scroll_into_view();
    }
}

/// Selector lookup over the document.
pub struct DocumentLookup(pub Document);

impl TargetLookup for DocumentLookup {
    type Target = DomJumpTarget;

    fn find(&self, selector: &str) -> Option<DomJumpTarget> {
        match self.0.query_selector(selector) {
            Ok(found) => found.map(DomJumpTarget),
            Err(error) => {
                tracing::debug!(selector, ?error, "invalid jump selector");
                None
            }
        }
    }
}
