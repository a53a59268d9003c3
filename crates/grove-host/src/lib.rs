//! grove WASM host for browser.
//!
//! Uses wasm-bindgen for JS interop and wasm-bindgen-futures for async.
//! Implements the platform traits of `grove` over the DOM, `localStorage`,
//! `matchMedia`, `fetch` and highlight.js, then runs the page load from the
//! module's start hook.
//!
//! ## Page contract
//!
//! ```html
//! <script type="application/json" id="grove-config">{ "base-url": "/notes/" }</script>
//! <button id="theme-toggle"><span class="theme-icon"></span></button>
//! <ninja-keys></ninja-keys>
//! <a data-jump-target="#tree-0a1b">...</a>
//! <script>window.sourcePath = "/workspaces/notes/trees/0a1b.tree";</script>
//! ```
//!
//! highlight.js must be loaded before the module starts.

mod dom;
mod engine;
mod fetch;
mod log;
mod search;
mod storage;

pub use dom::{DocumentLookup, DocumentRoot, DomCodeBlock, DomThemeSurface};
pub use engine::HljsEngine;
pub use fetch::FetchSource;
pub use storage::{LocalStore, MediaScheme};

use std::cell::RefCell;
use std::rc::Rc;

use grove::grove_search::load_index;
use grove::grove_theme::{Theme, ThemeResolver};
use grove::jump::jump_to;
use grove::{GroveConfig, PageLoad, SearchRequest, boot};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Event, MediaQueryListEvent, Window};

type SharedTheme = Rc<RefCell<ThemeResolver<LocalStore, MediaScheme, DomThemeSurface>>>;

const CONFIG_ELEMENT_ID: &str = "grove-config";

/// Module start hook: run the page load.
#[wasm_bindgen(start)]
pub fn start() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    let (config, config_error) = match read_config(&document) {
        Ok(config) => (config, None),
        Err(error) => (GroveConfig::default(), Some(error)),
    };
    log::init(config.max_level());
    if let Some(error) = config_error {
        tracing::warn!(%error, "ignoring page configuration");
    }

    let scheme = MediaScheme::new(&window);
    let dark_query = scheme.dark_query().cloned();

    let page = PageLoad {
        document: DocumentRoot::new(document.clone(), config.highlight.selector.clone()),
        engine: HljsEngine::new(),
        store: LocalStore::new(&window),
        scheme,
        surface: DomThemeSurface::new(&document),
        source_path: source_path(&window),
    };
    let booted = boot(page, &config);

    let theme: SharedTheme = Rc::new(RefCell::new(booted.theme));
    wire_theme_toggle(&document, &theme);
    if let Some(query) = dark_query {
        watch_system_scheme(&query, &theme);
    }
    wire_jump_links(&document);

    if let Some(request) = booted.search {
        wasm_bindgen_futures::spawn_local(run_search(document, request));
    }
}

fn read_config(document: &Document) -> Result<GroveConfig, grove::ConfigError> {
    match document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|e| e.text_content())
    {
        Some(text) => GroveConfig::from_json(&text),
        None => Ok(GroveConfig::default()),
    }
}

/// `window.sourcePath`, when the page defines it.
fn source_path(window: &Window) -> Option<String> {
    js_sys::Reflect::get(window, &"sourcePath".into())
        .ok()
        .and_then(|value| value.as_string())
}

fn wire_theme_toggle(document: &Document, theme: &SharedTheme) {
    let Some(toggle) = document.get_element_by_id(DomThemeSurface::TOGGLE_ID) else {
        tracing::debug!("no theme toggle on this page");
        return;
    };

    let theme = theme.clone();
    let on_click = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
        let applied = theme.borrow_mut().toggle();
        tracing::debug!(%applied, "theme toggled");
    });
    if let Err(error) =
        toggle.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
    {
        tracing::warn!(?error, "failed to wire theme toggle");
    }
    on_click.forget();
}

fn watch_system_scheme(query: &web_sys::MediaQueryList, theme: &SharedTheme) {
    let theme = theme.clone();
    let on_change = Closure::<dyn FnMut(MediaQueryListEvent)>::new(
        move |event: MediaQueryListEvent| {
            let preferred = if event.matches() {
                Theme::Dark
            } else {
                Theme::Light
            };
            theme.borrow_mut().on_system_change(preferred);
        },
    );
    if let Err(error) =
        query.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())
    {
        tracing::warn!(?error, "failed to watch color scheme");
    }
    on_change.forget();
}

fn wire_jump_links(document: &Document) {
    let links = match document.query_selector_all("[data-jump-target]") {
        Ok(links) => links,
        Err(error) => {
            tracing::warn!(?error, "failed to find jump links");
            return;
        }
    };

    for i in 0..links.length() {
        let Some(link) = links.item(i).and_then(|n| n.dyn_into::<web_sys::Element>().ok()) else {
            continue;
        };
        let Some(selector) = link.get_attribute("data-jump-target") else {
            continue;
        };

        let lookup = DocumentLookup(document.clone());
        let on_click = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if jump_to(&lookup, &selector) {
                event.prevent_default();
            }
        });
        if let Err(error) =
            link.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
        {
            tracing::warn!(?error, "failed to wire jump link");
        }
        on_click.forget();
    }
}

async fn run_search(document: Document, request: SearchRequest) {
    let SearchRequest {
        manifest_url,
        source_path,
        config,
    } = request;

    let Some(index) = load_index(&FetchSource, &manifest_url, source_path.as_deref(), &config).await
    else {
        return;
    };
    if let Err(error) = search::install(&document, index) {
        tracing::warn!(?error, "failed to fill search palette");
    }
}
