//! Highlight scope catalog - single source of truth.
//!
//! Grammar modes and keyword classes name a *scope* (`keyword`, `string`,
//! `title.function`, ...). The engine turns a scope into CSS classes and the
//! site stylesheet colors those classes, so a grammar may only use scopes the
//! stylesheet knows about.
//!
//! Sub-scopes are dotted (`comment.doc`, `variable.language`). A sub-scope is
//! known when its root is in [`SCOPES`].

/// Root scopes the site stylesheet styles.
pub const SCOPES: &[&str] = &[
    // General purpose
    "keyword",
    "built_in",
    "type",
    "literal",
    "number",
    "operator",
    "punctuation",
    "property",
    "regexp",
    "string",
    "char",
    "subst",
    "symbol",
    "variable",
    "title",
    "params",
    "comment",
    "doctag",
    // Meta
    "meta",
    "section",
    "tag",
    "name",
    "attr",
    "attribute",
    // Markup
    "bullet",
    "code",
    "emphasis",
    "strong",
    "formula",
    "link",
    "quote",
    // Diff
    "addition",
    "deletion",
];

/// Whether `scope` (or its dotted root) is in the catalog.
pub fn is_known_scope(scope: &str) -> bool {
    let root = scope.split('.').next().unwrap_or(scope);
    SCOPES.contains(&root)
}
