//! Turning BibTeX entries into reference trees.
//!
//! Every entry becomes `<slug of its citekey>.tree`:
//!
//! ```text
//! \title{Some Paper}
//! \taxon{Reference}
//! \author/literal{Jane Doe, Richard Roe}
//! \date{2021-03-01}
//! \meta{external}{https://example.org/paper}
//! \meta{journal}{Journal of Examples}
//! ```

use biblatex::{Bibliography, ChunksExt};
use std::fs;
use std::path::{Path, PathBuf};

/// Fields rendered as `\title`, `\author/literal` and `\date`.
const HEADER_FIELDS: &[&str] = &["title", "author", "year", "month", "day"];
/// Fields that hold a link; they all become `\meta{external}`.
const URL_FIELDS: &[&str] = &["url", "howpublished", "external"];

#[derive(Debug, thiserror::Error)]
pub enum BibError {
    #[error("invalid BibTeX: {0}")]
    Parse(String),
    #[error("no BibTeX entries found in {}", .0.display())]
    Empty(PathBuf),
    #[error("refusing to overwrite existing file {}; use --overwrite to replace", .0.display())]
    AlreadyExists(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One bibliography entry with its field values flattened to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub key: String,
    /// Lower-case field names with cleaned values, in name order.
    pub fields: Vec<(String, String)>,
}

impl Reference {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
    }

    /// File stem of the tree: the slugified citekey, or the title without one.
    pub fn stem(&self) -> String {
        if self.key.trim().is_empty() {
            slugify(self.field("title").unwrap_or("reference"))
        } else {
            slugify(&self.key)
        }
    }
}

/// Parse every entry of a `.bib` source.
pub fn parse_references(source: &str) -> Result<Vec<Reference>, BibError> {
    let bibliography = Bibliography::parse(source).map_err(|e| BibError::Parse(e.to_string()))?;
    Ok(bibliography
        .iter()
        .map(|entry| Reference {
            key: entry.key.clone(),
            fields: entry
                .fields
                .iter()
                .map(|(name, chunks)| {
                    (name.to_lowercase(), clean_whitespace(&chunks.format_verbatim()))
                })
                .collect(),
        })
        .collect())
}

/// Content of the tree for `reference`.
pub fn tree_content(reference: &Reference) -> String {
    let title = reference.field("title").unwrap_or("Untitled");
    let mut lines = vec![format!("\\title{{{title}}}"), "\\taxon{Reference}".to_string()];

    if let Some(authors) = reference.field("author").and_then(format_authors) {
        lines.push(format!("\\author/literal{{{authors}}}"));
    }
    if let Some(date) = format_date(reference) {
        lines.push(format!("\\date{{{date}}}"));
    }

    for (name, value) in &reference.fields {
        if value.is_empty() || HEADER_FIELDS.contains(&name.as_str()) {
            continue;
        }
        let (key, value) = if URL_FIELDS.contains(&name.as_str()) {
            ("external", strip_url_command(value))
        } else {
            (name.as_str(), value.as_str())
        };
        lines.push(format!("\\meta{{{key}}}{{{}}}", value.replace('%', "\\%")));
    }

    lines.push(String::new());
    lines.join("\n")
}

/// Write one tree per entry of `source` into `output_dir`.
///
/// Nothing is written when a target exists and `overwrite` is off.
pub fn convert_bibtex(
    source: &Path,
    output_dir: &Path,
    overwrite: bool,
) -> Result<Vec<PathBuf>, BibError> {
    let references = parse_references(&fs::read_to_string(source)?)?;
    if references.is_empty() {
        return Err(BibError::Empty(source.to_path_buf()));
    }

    let targets: Vec<PathBuf> = references
        .iter()
        .map(|reference| output_dir.join(format!("{}.tree", reference.stem())))
        .collect();
    if !overwrite && let Some(existing) = targets.iter().find(|target| target.exists()) {
        return Err(BibError::AlreadyExists(existing.clone()));
    }

    fs::create_dir_all(output_dir)?;
    for (reference, target) in references.iter().zip(&targets) {
        fs::write(target, tree_content(reference))?;
        tracing::debug!(key = %reference.key, path = %target.display(), "wrote reference tree");
    }
    Ok(targets)
}

fn clean_whitespace(value: &str) -> String {
    let flattened = value.split_whitespace().collect::<Vec<_>>().join(" ");
    strip_braces(&flattened).to_string()
}

fn strip_braces(mut value: &str) -> &str {
    value = value.trim();
    while value.len() > 1 && value.starts_with('{') && value.ends_with('}') {
        value = value[1..value.len() - 1].trim();
    }
    value
}

fn format_authors(field: &str) -> Option<String> {
    let authors: Vec<&str> = field
        .split(" and ")
        .map(str::trim)
        .filter(|author| !author.is_empty())
        .collect();
    (!authors.is_empty()).then(|| authors.join(", "))
}

/// Month number from a name, abbreviation or number; 1 when unrecognised.
fn parse_month(month: Option<&str>) -> u32 {
    let Some(month) = month.map(|m| m.trim().to_lowercase()) else {
        return 1;
    };
    if let Ok(value) = month.parse::<u32>()
        && (1..=12).contains(&value)
    {
        return value;
    }
    const NAMES: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    NAMES
        .iter()
        .position(|name| month.starts_with(name))
        .map_or(1, |index| index as u32 + 1)
}

/// `YYYY-MM-DD`, or `None` without a numeric year.
fn format_date(reference: &Reference) -> Option<String> {
    let year: i32 = reference.field("year")?.parse().ok()?;
    let month = parse_month(reference.field("month"));
    let day = reference
        .field("day")
        .and_then(|day| day.parse::<i64>().ok())
        .unwrap_or(1)
        .clamp(1, 31);
    Some(format!("{year:04}-{month:02}-{day:02}"))
}

fn strip_url_command(value: &str) -> &str {
    let trimmed = value.trim();
    trimmed
        .strip_prefix("\\url{")
        .and_then(|rest| rest.strip_suffix('}'))
        .map_or(trimmed, str::trim)
}

/// Lower-case ASCII slug; `reference` when nothing is left.
pub fn slugify(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    for c in strip_braces(&lowered).chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "reference".to_string()
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn reference(key: &str, fields: &[(&str, &str)]) -> Reference {
        Reference {
            key: key.into(),
            fields: fields
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Doe2021:Groves"), "doe2021-groves");
        assert_eq!(slugify("  {Knuth}--1984 "), "knuth-1984");
        assert_eq!(slugify("!!!"), "reference");
    }

    #[test]
    fn test_month_forms() {
        assert_eq!(parse_month(None), 1);
        assert_eq!(parse_month(Some("3")), 3);
        assert_eq!(parse_month(Some("13")), 1);
        assert_eq!(parse_month(Some("Sept")), 9);
        assert_eq!(parse_month(Some("December")), 12);
        assert_eq!(parse_month(Some("spring")), 1);
    }

    #[test]
    fn test_date_clamps_day() {
        let r = reference("k", &[("year", "2021"), ("month", "feb"), ("day", "40")]);
        assert_eq!(format_date(&r).as_deref(), Some("2021-02-31"));

        let r = reference("k", &[("year", "987"), ("day", "zero")]);
        assert_eq!(format_date(&r).as_deref(), Some("0987-01-01"));

        let r = reference("k", &[("year", "n.d.")]);
        assert_eq!(format_date(&r), None);
    }

    #[test]
    fn test_tree_content() {
        let r = reference(
            "doe2021",
            &[
                ("author", "Jane Doe and Richard Roe"),
                ("howpublished", "\\url{https://example.org/a%20b}"),
                ("journal", "Journal of Examples"),
                ("month", "mar"),
                ("note", "100% reviewed"),
                ("title", "Growing Groves"),
                ("year", "2021"),
            ],
        );
        assert_eq!(
            tree_content(&r),
            indoc! {r"
                \title{Growing Groves}
                \taxon{Reference}
                \author/literal{Jane Doe, Richard Roe}
                \date{2021-03-01}
                \meta{external}{https://example.org/a\%20b}
                \meta{journal}{Journal of Examples}
                \meta{note}{100\% reviewed}
            "}
        );
    }

    #[test]
    fn test_untitled_without_date() {
        let r = reference("k", &[("publisher", "")]);
        assert_eq!(tree_content(&r), "\\title{Untitled}\n\\taxon{Reference}\n");
    }

    #[test]
    fn test_parse_references() {
        let refs = parse_references(indoc! {r"
            @article{Doe2021:Groves,
                title = {Growing
                         Groves},
                author = {Jane Doe and Richard Roe},
                year = {2021},
                journal = {Journal of Examples},
            }
        "})
        .unwrap();

        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].key, "Doe2021:Groves");
        assert_eq!(refs[0].stem(), "doe2021-groves");
        assert_eq!(refs[0].field("title"), Some("Growing Groves"));
        assert_eq!(refs[0].field("year"), Some("2021"));
    }

    #[test]
    fn test_convert_writes_trees() {
        let dir = tempfile::tempdir().unwrap();
        let bib = dir.path().join("refs.bib");
        fs::write(
            &bib,
            "@book{knuth84, title = {The TeXbook}, author = {Donald Knuth}, year = {1984}}\n",
        )
        .unwrap();
        let out = dir.path().join("trees").join("references");

        let created = convert_bibtex(&bib, &out, false).unwrap();
        assert_eq!(created, vec![out.join("knuth84.tree")]);
        let tree = fs::read_to_string(&created[0]).unwrap();
        assert!(tree.starts_with("\\title{The TeXbook}\n\\taxon{Reference}\n"));
        assert!(tree.contains("\\author/literal{Donald Knuth}\n\\date{1984-01-01}\n"));
    }

    #[test]
    fn test_convert_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let bib = dir.path().join("refs.bib");
        fs::write(&bib, "@misc{a, title = {New}}\n").unwrap();
        fs::write(dir.path().join("a.tree"), "old").unwrap();

        let err = convert_bibtex(&bib, dir.path(), false).unwrap_err();
        assert!(matches!(err, BibError::AlreadyExists(_)));
        assert_eq!(fs::read_to_string(dir.path().join("a.tree")).unwrap(), "old");

        convert_bibtex(&bib, dir.path(), true).unwrap();
        assert!(
            fs::read_to_string(dir.path().join("a.tree"))
                .unwrap()
                .starts_with("\\title{New}")
        );
    }

    #[test]
    fn test_convert_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let bib = dir.path().join("empty.bib");
        fs::write(&bib, "\n").unwrap();
        assert!(matches!(
            convert_bibtex(&bib, dir.path(), false),
            Err(BibError::Empty(_))
        ));
    }
}
