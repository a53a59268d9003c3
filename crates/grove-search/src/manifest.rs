//! The site manifest written by the generator.

use serde::Deserialize;

use crate::SearchError;

/// One tree in the manifest.
///
/// Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestEntry {
    #[serde(default)]
    pub title: Option<String>,
    /// Tree address; unique within a manifest.
    pub uri: String,
    #[serde(default)]
    pub taxon: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    pub route: String,
}

impl ManifestEntry {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags
            .as_deref()
            .is_some_and(|tags| tags.iter().any(|t| t == tag))
    }

    /// `"<taxon>. <title> [<uri>]"`, dropping whichever of taxon/title is
    /// missing and using `untitled` when both are.
    pub fn display_title(&self, untitled: &str) -> String {
        let label = match (self.taxon.as_deref(), self.title.as_deref()) {
            (Some(taxon), Some(title)) => format!("{taxon}. {title}"),
            (Some(only), None) | (None, Some(only)) => only.to_string(),
            (None, None) => untitled.to_string(),
        };
        format!("{label} [{}]", self.uri)
    }
}

/// Parse a manifest body: a JSON array of entries, in site order.
pub fn parse_manifest(body: &str) -> Result<Vec<ManifestEntry>, SearchError> {
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn entry(title: Option<&str>, taxon: Option<&str>) -> ManifestEntry {
        ManifestEntry {
            title: title.map(str::to_string),
            uri: "0a1b".into(),
            taxon: taxon.map(str::to_string),
            tags: None,
            route: "/0a1b/".into(),
        }
    }

    #[test]
    fn test_display_title_variants() {
        assert_eq!(
            entry(Some("Groups"), Some("Definition")).display_title("Untitled"),
            "Definition. Groups [0a1b]"
        );
        assert_eq!(entry(Some("Groups"), None).display_title("Untitled"), "Groups [0a1b]");
        assert_eq!(entry(None, Some("Lemma")).display_title("Untitled"), "Lemma [0a1b]");
        assert_eq!(entry(None, None).display_title("Untitled"), "Untitled [0a1b]");
    }

    #[test]
    fn test_parse_keeps_order_and_ignores_unknown_fields() {
        let entries = parse_manifest(indoc! {r#"
            [
              {"uri": "b", "route": "/b/", "title": "B", "tags": ["top"], "date": "2024-01-01"},
              {"uri": "a", "route": "/a/", "taxon": null, "tags": null}
            ]
        "#})
        .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].uri, "b");
        assert!(entries[0].has_tag("top"));
        assert_eq!(entries[1].title, None);
        assert!(!entries[1].has_tag("top"));
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let err = parse_manifest(r#"{"uri": "a"}"#).unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
    }
}
