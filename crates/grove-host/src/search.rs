//! Filling the `<ninja-keys>` quick-open palette.

use grove::grove_search::{Action, ActionItem, SearchIndex};
use js_sys::{Array, Object, Reflect};
use wasm_bindgen::prelude::*;
use web_sys::Document;

/// Set the palette's `data` property to the index items.
///
/// Pages without a palette are left alone.
pub fn install(document: &Document, index: SearchIndex) -> Result<(), JsValue> {
    let Some(palette) = document.query_selector("ninja-keys")? else {
        tracing::debug!("no ninja-keys element on this page");
        return Ok(());
    };

    let items = Array::new();
    let count = index.len();
    for item in index.into_items() {
        items.push(&to_js(item)?);
    }
    Reflect::set(&palette, &"data".into(), &items)?;

    tracing::debug!(items = count, "search palette ready");
    Ok(())
}

fn to_js(item: ActionItem) -> Result<JsValue, JsValue> {
    let obj = Object::new();
    Reflect::set(&obj, &"id".into(), &item.id.into())?;
    Reflect::set(&obj, &"title".into(), &item.title.into())?;
    Reflect::set(&obj, &"section".into(), &item.section.into())?;
    if let Some(hotkey) = item.hotkey {
        Reflect::set(&obj, &"hotkey".into(), &hotkey.into())?;
    }
    if let Some(icon) = item.icon {
        Reflect::set(&obj, &"icon".into(), &icon.into())?;
    }

    let target = match item.action {
        Action::Navigate { route } => route,
        Action::Open { uri } => uri,
    };
    let handler = Closure::<dyn Fn()>::new(move || go_to(&target)).into_js_value();
    Reflect::set(&obj, &"handler".into(), &handler)?;

    Ok(obj.into())
}

fn go_to(target: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(error) = window.location().set_href(target) {
        tracing::warn!(href = target, ?error, "navigation failed");
    }
}
