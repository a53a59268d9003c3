//! Manifest fetching with `window.fetch`.

use grove::grove_search::{ManifestResponse, ManifestSource, SearchError};

/// Fetches the manifest over HTTP.
#[derive(Debug, Default, Clone, Copy)]
pub struct FetchSource;

impl ManifestSource for FetchSource {
    // This crate is only compiled for wasm32, so we use the non-Send version
    #[cfg(target_arch = "wasm32")]
    async fn fetch(&self, url: &str) -> Result<ManifestResponse, SearchError> {
        use wasm_bindgen::{JsCast, JsValue};
        use wasm_bindgen_futures::JsFuture;

        let failed = |error: JsValue| SearchError::Fetch {
            url: url.to_string(),
            message: error.as_string().unwrap_or_else(|| format!("{error:?}")),
        };

        let window = web_sys::window().ok_or_else(|| failed(JsValue::from_str("no window")))?;
        let response: web_sys::Response = JsFuture::from(window.fetch_with_str(url))
            .await
            .map_err(failed)?
            .dyn_into()
            .map_err(failed)?;

        let status = response.status();
        let body = JsFuture::from(response.text().map_err(failed)?)
            .await
            .map_err(failed)?
            .as_string()
            .unwrap_or_default();

        Ok(ManifestResponse { status, body })
    }

    // Stub for non-wasm32 targets (never used, just for compilation)
    #[cfg(not(target_arch = "wasm32"))]
    async fn fetch(&self, _url: &str) -> Result<ManifestResponse, SearchError> {
        unreachable!("grove-host is only for wasm32")
    }
}
