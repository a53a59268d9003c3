//! Declarative grammar data.
//!
//! A [`Grammar`] is a tree of [`Mode`] records handed to the tokenizing engine.
//! Nothing in here tokenizes: a mode only says where it begins, where it ends,
//! which modes may appear inside it and which keyword classes apply. The
//! serialized form is the engine's language-definition object (camelCase
//! fields, `"self"` for a mode that re-enters itself).

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

/// A named lexical grammar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grammar {
    /// Registration id (e.g. `lean`). Not part of the definition object.
    #[serde(skip)]
    pub id: String,
    /// Human readable name.
    pub name: String,
    /// Other names this grammar answers to (e.g. `lean4`).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub case_insensitive: bool,
    /// Patterns use Unicode property escapes and need the `u` regex flag.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub unicode_regex: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Keywords>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub illegal: Option<String>,
    pub contains: Vec<Contains>,
}

impl Grammar {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            aliases: Vec::new(),
            case_insensitive: false,
            unicode_regex: false,
            keywords: None,
            illegal: None,
            contains: Vec::new(),
        }
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn unicode_regex(mut self, enabled: bool) -> Self {
        self.unicode_regex = enabled;
        self
    }

    pub fn keywords(mut self, keywords: Keywords) -> Self {
        self.keywords = Some(keywords);
        self
    }

    pub fn contains<I>(mut self, modes: I) -> Self
    where
        I: IntoIterator<Item = Contains>,
    {
        self.contains = modes.into_iter().collect();
        self
    }

    /// Every name this grammar can be looked up by, id first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.id.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// All modes in the tree, depth-first, including `starts` and variants.
    ///
    /// Each mode is visited once per place it appears; `"self"` references are
    /// not followed.
    pub fn modes(&self) -> Vec<&Mode> {
        let mut out = Vec::new();
        for item in &self.contains {
            if let Contains::Mode(mode) = item {
                mode.collect(&mut out);
            }
        }
        out
    }

    /// Every keyword table in the grammar, top-level first.
    pub fn keyword_tables(&self) -> Vec<&Keywords> {
        self.keywords
            .iter()
            .chain(self.modes().into_iter().filter_map(|m| m.keywords.as_ref()))
            .collect()
    }
}

/// An entry in a `contains` list.
#[derive(Debug, Clone, PartialEq)]
pub enum Contains {
    /// The enclosing mode, re-entered recursively.
    SelfRef,
    Mode(Mode),
}

impl From<Mode> for Contains {
    fn from(mode: Mode) -> Self {
        Contains::Mode(mode)
    }
}

impl Serialize for Contains {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Contains::SelfRef => serializer.serialize_str("self"),
            Contains::Mode(mode) => mode.serialize(serializer),
        }
    }
}

/// Keyword classes: scope name to the words highlighted with that scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Keywords {
    /// Lexeme pattern keywords are matched against.
    #[serde(rename = "$pattern", skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(flatten)]
    pub classes: BTreeMap<String, Vec<String>>,
}

impl Keywords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn class(mut self, scope: impl Into<String>, words: &[&str]) -> Self {
        self.classes
            .entry(scope.into())
            .or_default()
            .extend(words.iter().map(|w| (*w).to_string()));
        self
    }

    /// Words that appear in more than one class, as `(word, first, second)`.
    pub fn overlaps(&self) -> Vec<(&str, &str, &str)> {
        let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
        let mut overlaps = Vec::new();
        for (scope, words) in &self.classes {
            for word in words {
                match seen.get(word.as_str()) {
                    Some(first) if *first != scope.as_str() => {
                        overlaps.push((word.as_str(), *first, scope.as_str()))
                    }
                    Some(_) => {}
                    None => {
                        seen.insert(word.as_str(), scope.as_str());
                    }
                }
            }
        }
        overlaps
    }

    /// Scope for a word, if any class lists it.
    pub fn scope_of(&self, word: &str) -> Option<&str> {
        self.classes
            .iter()
            .find(|(_, words)| words.iter().any(|w| w == word))
            .map(|(scope, _)| scope.as_str())
    }
}

/// A lexical mode.
///
/// Built with chained setters so grammar files read as data:
///
/// ```rust,ignore
/// Mode::scoped("comment").begin("--").end("$")
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Keywords>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub illegal: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contains: Vec<Contains>,
    /// Alternative begin/end pairs sharing this mode's other settings.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<Mode>,
    /// Mode started right after this one ends.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts: Option<Box<Mode>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub ends_with_parent: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub return_end: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance: Option<u32>,
}

impl Mode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scoped(scope: impl Into<String>) -> Self {
        Self {
            scope: Some(scope.into()),
            ..Self::default()
        }
    }

    pub fn begin(mut self, pattern: impl Into<String>) -> Self {
        self.begin = Some(pattern.into());
        self
    }

    pub fn end(mut self, pattern: impl Into<String>) -> Self {
        self.end = Some(pattern.into());
        self
    }

    pub fn keywords(mut self, keywords: Keywords) -> Self {
        self.keywords = Some(keywords);
        self
    }

    pub fn contains<I>(mut self, modes: I) -> Self
    where
        I: IntoIterator<Item = Contains>,
    {
        self.contains = modes.into_iter().collect();
        self
    }

    pub fn variants<I>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = Mode>,
    {
        self.variants = variants.into_iter().collect();
        self
    }

    pub fn starts(mut self, mode: Mode) -> Self {
        self.starts = Some(Box::new(mode));
        self
    }

    pub fn ends_with_parent(mut self) -> Self {
        self.ends_with_parent = true;
        self
    }

    pub fn return_end(mut self) -> Self {
        self.return_end = true;
        self
    }

    pub fn relevance(mut self, relevance: u32) -> Self {
        self.relevance = Some(relevance);
        self
    }

    /// Whether this mode lists `"self"` among its children.
    pub fn is_recursive(&self) -> bool {
        self.contains.iter().any(|c| matches!(c, Contains::SelfRef))
    }

    /// Direct child modes, `"self"` excluded.
    pub fn children(&self) -> impl Iterator<Item = &Mode> {
        self.contains.iter().filter_map(|c| match c {
            Contains::Mode(mode) => Some(mode),
            Contains::SelfRef => None,
        })
    }

    /// Every regular expression this mode declares directly, labelled by field.
    pub fn patterns(&self) -> Vec<(&'static str, &str)> {
        let mut out = Vec::new();
        if let Some(begin) = &self.begin {
            out.push(("begin", begin.as_str()));
        }
        if let Some(end) = &self.end {
            out.push(("end", end.as_str()));
        }
        if let Some(illegal) = &self.illegal {
            out.push(("illegal", illegal.as_str()));
        }
        if let Some(pattern) = self.keywords.as_ref().and_then(|k| k.pattern.as_deref()) {
            out.push(("$pattern", pattern));
        }
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a Mode>) {
        out.push(self);
        for variant in &self.variants {
            variant.collect(out);
        }
        for child in self.children() {
            child.collect(out);
        }
        if let Some(next) = &self.starts {
            next.collect(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Grammar {
        let nested = Mode::scoped("comment")
            .begin("/-")
            .end("-/")
            .contains([Contains::SelfRef]);
        let header = Mode::new()
            .begin(r"\bdef\b")
            .end(":=")
            .return_end()
            .contains([Mode::scoped("title")
                .begin(r"\w+")
                .starts(Mode::new().ends_with_parent())
                .into()]);
        Grammar::new("demo", "Demo")
            .aliases(["dm"])
            .keywords(Keywords::new().class("keyword", &["def"]))
            .contains([nested.into(), header.into()])
    }

    #[test]
    fn test_serializes_self_reference_as_string() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["contains"][0]["contains"][0], "self");
        assert_eq!(json["contains"][1]["returnEnd"], true);
        assert!(json.get("id").is_none());
        assert_eq!(json["aliases"][0], "dm");
    }

    #[test]
    fn test_serialization_omits_defaults() {
        let json = serde_json::to_value(Mode::scoped("number").begin(r"\d+")).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 2);
    }

    #[test]
    fn test_keyword_pattern_is_dollar_prefixed() {
        let keywords = Keywords::new()
            .pattern(r"[a-z_]+")
            .class("literal", &["true"]);
        let json = serde_json::to_value(keywords).unwrap();
        assert_eq!(json["$pattern"], "[a-z_]+");
        assert_eq!(json["literal"][0], "true");
    }

    #[test]
    fn test_modes_walks_starts_and_children() {
        let grammar = sample();
        let scopes: Vec<_> = grammar
            .modes()
            .iter()
            .map(|m| m.scope.as_deref().unwrap_or("-"))
            .collect();
        assert_eq!(scopes, vec!["comment", "-", "title", "-"]);
    }

    #[test]
    fn test_overlapping_keyword_classes() {
        let keywords = Keywords::new()
            .class("keyword", &["def", "by"])
            .class("built_in", &["simp", "by"]);
        assert_eq!(keywords.overlaps(), vec![("by", "built_in", "keyword")]);
        assert_eq!(keywords.scope_of("simp"), Some("built_in"));
    }

    #[test]
    fn test_names_lists_id_then_aliases() {
        let grammar = sample();
        assert_eq!(grammar.names().collect::<Vec<_>>(), vec!["demo", "dm"]);
    }
}
