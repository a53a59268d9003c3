//! Quick-open search for grove sites.
//!
//! The generator writes a manifest (`forest.json`) listing every tree. This
//! crate fetches it, and turns each entry into an [`ActionItem`] for the
//! quick-open palette: pinned trees first, then everything else, plus an
//! "edit current tree" command when the page knows its source file.
//!
//! # Fetching
//!
//! Fetching is the only async step, and goes through [`ManifestSource`]. In
//! the browser it is a `fetch()` call; the CLI reads a local file and returns
//! immediately, so it can drive the same code with [`build_index_now`].
//!
//! Search is optional: [`load_index`] logs any failure and returns `None`,
//! and the page carries on without it. There is no retry.

mod index;
mod manifest;

pub use index::{Action, ActionItem, EditorConfig, IndexConfig, SearchIndex, edit_uri};
pub use manifest::{ManifestEntry, parse_manifest};

use std::future::Future;
use std::task::{Context, Poll, Waker};

/// Why the index could not be built.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The request itself failed (network, CORS, missing file, ...).
    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// The server answered with a non-2xx status.
    #[error("fetching {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("invalid manifest: {0}")]
    Parse(#[from] serde_json::Error),

    /// A source expected to complete immediately did not.
    #[error("manifest source did not complete synchronously")]
    Pending,
}

/// A fetched manifest, before the status is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestResponse {
    pub status: u16,
    pub body: String,
}

impl ManifestResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Where the manifest comes from.
pub trait ManifestSource {
    /// Fetch the manifest at `url`.
    ///
    /// # Send Bound
    ///
    /// On native targets, the future must be `Send` for compatibility with
    /// async runtimes. On WASM, `Send` is not required (single-threaded).
    #[cfg(not(target_arch = "wasm32"))]
    fn fetch(&self, url: &str) -> impl Future<Output = Result<ManifestResponse, SearchError>> + Send;

    /// Fetch the manifest at `url` (WASM version without Send bound).
    #[cfg(target_arch = "wasm32")]
    fn fetch(&self, url: &str) -> impl Future<Output = Result<ManifestResponse, SearchError>>;
}

/// Fetch and parse the manifest, then build the index.
pub async fn build_index<S: ManifestSource>(
    source: &S,
    manifest_url: &str,
    source_path: Option<&str>,
    config: &IndexConfig,
) -> Result<SearchIndex, SearchError> {
    let response = source.fetch(manifest_url).await?;
    if !response.is_success() {
        return Err(SearchError::Status {
            url: manifest_url.to_string(),
            status: response.status,
        });
    }

    let entries = parse_manifest(&response.body)?;
    tracing::debug!(entries = entries.len(), url = manifest_url, "loaded manifest");
    Ok(SearchIndex::from_entries(&entries, source_path, config))
}

/// [`build_index`], with failures logged and turned into `None`.
pub async fn load_index<S: ManifestSource>(
    source: &S,
    manifest_url: &str,
    source_path: Option<&str>,
    config: &IndexConfig,
) -> Option<SearchIndex> {
    match build_index(source, manifest_url, source_path, config).await {
        Ok(index) => Some(index),
        Err(error) => {
            tracing::warn!(%error, "search unavailable");
            None
        }
    }
}

/// [`build_index`] for sources that never yield, such as local files.
///
/// Polls the future once; a source that yields gives [`SearchError::Pending`].
pub fn build_index_now<S: ManifestSource>(
    source: &S,
    manifest_url: &str,
    source_path: Option<&str>,
    config: &IndexConfig,
) -> Result<SearchIndex, SearchError> {
    let future = build_index(source, manifest_url, source_path, config);
    let mut future = std::pin::pin!(future);

    let mut cx = Context::from_waker(Waker::noop());
    match future.as_mut().poll(&mut cx) {
        Poll::Ready(result) => result,
        Poll::Pending => Err(SearchError::Pending),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Serves a fixed response.
    struct FixedSource {
        status: u16,
        body: &'static str,
    }

    impl ManifestSource for FixedSource {
        async fn fetch(&self, _url: &str) -> Result<ManifestResponse, SearchError> {
            Ok(ManifestResponse {
                status: self.status,
                body: self.body.to_string(),
            })
        }
    }

    struct FailingSource;

    impl ManifestSource for FailingSource {
        async fn fetch(&self, url: &str) -> Result<ManifestResponse, SearchError> {
            Err(SearchError::Fetch {
                url: url.to_string(),
                message: "offline".into(),
            })
        }
    }

    /// Yields once before answering.
    struct SlowSource;

    struct YieldOnce(Cell<bool>);

    impl Future for YieldOnce {
        type Output = ();

        fn poll(self: std::pin::Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0.replace(true) {
                Poll::Ready(())
            } else {
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    impl ManifestSource for SlowSource {
        async fn fetch(&self, _url: &str) -> Result<ManifestResponse, SearchError> {
            YieldOnce(Cell::new(false)).await;
            Ok(ManifestResponse::ok("[]"))
        }
    }

    const MANIFEST: &str = r#"[
        {"uri": "a", "route": "/a/", "title": "A"},
        {"uri": "b", "route": "/b/", "title": "B", "tags": ["top"]},
        {"uri": "c", "route": "/c/"}
    ]"#;

    #[test]
    fn test_builds_from_fetched_manifest() {
        let source = FixedSource {
            status: 200,
            body: MANIFEST,
        };
        let index =
            build_index_now(&source, "/forest.json", Some("/x.tree"), &IndexConfig::default())
                .unwrap();

        let ids: Vec<_> = index.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["edit", "b", "a", "c"]);
        assert_eq!(index.items()[3].title, "Untitled [c]");
    }

    #[test]
    fn test_error_status_gives_no_index() {
        let source = FixedSource {
            status: 404,
            body: "not found",
        };
        let config = IndexConfig::default();
        let err = build_index_now(&source, "/forest.json", None, &config).unwrap_err();
        assert!(matches!(err, SearchError::Status { status: 404, .. }));

        let future = load_index(&source, "/forest.json", None, &config);
        let mut future = std::pin::pin!(future);
        let mut cx = Context::from_waker(Waker::noop());
        assert!(matches!(future.as_mut().poll(&mut cx), Poll::Ready(None)));
    }

    #[test]
    fn test_fetch_and_parse_failures_are_reported() {
        let err = build_index_now(&FailingSource, "/forest.json", None, &IndexConfig::default())
            .unwrap_err();
        assert!(matches!(err, SearchError::Fetch { .. }));

        let garbage = FixedSource {
            status: 200,
            body: "<html>",
        };
        let err = build_index_now(&garbage, "/forest.json", None, &IndexConfig::default())
            .unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
    }

    #[test]
    fn test_yielding_source_is_not_polled_to_completion() {
        let err = build_index_now(&SlowSource, "/forest.json", None, &IndexConfig::default())
            .unwrap_err();
        assert!(matches!(err, SearchError::Pending));
    }

    #[test]
    fn test_response_success_range() {
        assert!(ManifestResponse::ok("").is_success());
        assert!(
            !ManifestResponse {
                status: 304,
                body: String::new()
            }
            .is_success()
        );
    }
}
