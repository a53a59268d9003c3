//! Reading the manifest from disk.

use grove::grove_search::{ManifestResponse, ManifestSource, SearchError};

/// Treats manifest URLs as local file paths.
///
/// A missing file answers 404 so it is reported like a missing page.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSource;

impl ManifestSource for FileSource {
    async fn fetch(&self, url: &str) -> Result<ManifestResponse, SearchError> {
        match std::fs::read_to_string(url) {
            Ok(body) => Ok(ManifestResponse::ok(body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ManifestResponse {
                status: 404,
                body: String::new(),
            }),
            Err(e) => Err(SearchError::Fetch {
                url: url.to_string(),
                message: e.to_string(),
            }),
        }
    }
}
