//! highlight.js as the tokenizing engine.
//!
//! The host expects the global `hljs` object:
//!
//! ```javascript
//! hljs.registerLanguage(name, factory);  // factory(hljs) -> definition
//! hljs.getLanguage(name);                // definition or undefined
//! hljs.highlightElement(element);
//! ```

use grove::grove_highlight::{Grammar, HighlightEngine, HighlightError};
use wasm_bindgen::prelude::*;

use crate::dom::DomCodeBlock;

// JS functions imported from the host environment.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = hljs, js_name = registerLanguage, catch)]
    fn js_register_language(name: &str, factory: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(js_namespace = hljs, js_name = getLanguage, catch)]
    fn js_get_language(name: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = hljs, js_name = highlightElement, catch)]
    fn js_highlight_element(element: &web_sys::Element) -> Result<(), JsValue>;
}

/// Engine backed by the page's highlight.js.
#[derive(Debug, Default)]
pub struct HljsEngine;

impl HljsEngine {
    pub fn new() -> Self {
        Self
    }

    /// Whether highlight.js knows `name` (id or alias).
    /// Fails when `hljs` itself is missing.
    pub fn knows(&self, name: &str) -> Result<bool, HighlightError> {
        js_get_language(name)
            .map(|language| !language.is_undefined())
            .map_err(engine_error)
    }
}

fn engine_error(error: JsValue) -> HighlightError {
    HighlightError::Engine(
        error
            .as_string()
            .unwrap_or_else(|| format!("{error:?}")),
    )
}

impl HighlightEngine for HljsEngine {
    type Element = DomCodeBlock;

    fn register_language(&mut self, grammar: &Grammar) -> Result<(), HighlightError> {
        if self.knows(&grammar.id)? {
            return Err(HighlightError::AlreadyRegistered(grammar.id.clone()));
        }

        let invalid = |message: String| HighlightError::InvalidDefinition {
            language: grammar.id.clone(),
            message,
        };
        let json = serde_json::to_string(grammar).map_err(|e| invalid(e.to_string()))?;
        let definition = js_sys::JSON::parse(&json).map_err(|e| invalid(format!("{e:?}")))?;

        // highlight.js calls the factory with itself; the definition is static.
        let factory = Closure::<dyn Fn(JsValue) -> JsValue>::new(move |_hljs: JsValue| {
            definition.clone()
        })
        .into_js_value();

        js_register_language(&grammar.id, &factory).map_err(engine_error)
    }

    fn highlight_element(
        &mut self,
        element: &mut DomCodeBlock,
        language: Option<&str>,
    ) -> Result<(), HighlightError> {
        if let Some(name) = language
            && !self.knows(name)?
        {
            return Err(HighlightError::UnsupportedLanguage(name.to_string()));
        }
        js_highlight_element(element.element()).map_err(engine_error)
    }
}
