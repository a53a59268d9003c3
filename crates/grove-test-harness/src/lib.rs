//! Test harness for grove grammar crates.
//!
//! Grammars are data for an engine that only runs in the browser, so the
//! harness checks what can be checked natively: every pattern compiles, every
//! scope is styled, keyword classes don't overlap, and the bundled samples
//! actually produce matches.
//!
//! # Usage
//!
//! In your grammar crate's lib.rs tests:
//!
//! ```ignore
//! #[cfg(test)]
//! mod tests {
//!     use super::*;
//!
//!     #[test]
//!     fn test_grammar() {
//!         grove_test_harness::test_grammar(&grammar(), env!("CARGO_MANIFEST_DIR"));
//!     }
//! }
//! ```

pub use grove_highlight;

use std::fs;
use std::path::Path;

use fancy_regex::Regex;
use grove_highlight::{Contains, Grammar, Keywords, Mode, is_known_scope};

/// Lexeme pattern the engine uses when a keyword table sets none.
const DEFAULT_KEYWORD_PATTERN: &str = r"\w+";

/// Validates a grammar and highlights-matches all its samples.
///
/// This function:
/// 1. Compiles every pattern (multi-line, case-insensitive when the grammar is)
/// 2. Checks every mode scope and keyword class against the scope catalog
/// 3. Checks that no keyword table lists a word under two classes
/// 4. Checks that `"self"` only appears inside a mode, never at the top level
/// 5. Finds samples listed in `grove.kdl` and verifies each produces matches
///
/// # Panics
///
/// Panics with a description of the first problem found.
pub fn test_grammar(grammar: &Grammar, crate_dir: &str) {
    let name = &grammar.id;

    let patterns = compile_patterns(grammar).unwrap_or_else(|e| {
        panic!("Pattern validation failed for {name}: {e}");
    });

    for mode in grammar.modes() {
        if let Some(scope) = &mode.scope
            && !is_known_scope(scope)
        {
            panic!("{name}: mode uses unknown scope `{scope}`");
        }
    }

    let tables = grammar.keyword_tables();
    for table in &tables {
        if let Some(scope) = table.classes.keys().find(|s| !is_known_scope(s)) {
            panic!("{name}: keyword class uses unknown scope `{scope}`");
        }
        if let Some((word, first, second)) = table.overlaps().first() {
            panic!("{name}: keyword `{word}` is in both `{first}` and `{second}`");
        }
    }

    if grammar.contains.iter().any(|c| matches!(c, Contains::SelfRef)) {
        panic!("{name}: top-level contains lists \"self\"; it must be inside a mode");
    }

    let crate_path = Path::new(crate_dir);
    let kdl_path = crate_path.join("grove.kdl");
    let samples: Vec<_> = if kdl_path.exists() {
        parse_samples_from_kdl(&kdl_path)
            .into_iter()
            .map(|p| crate_path.join(p))
            .collect()
    } else {
        vec![]
    };

    // Test each sample - must produce at least one match
    for sample_path in &samples {
        let sample_code = fs::read_to_string(sample_path).unwrap_or_else(|e| {
            panic!(
                "Failed to read sample file {} for {}: {}",
                sample_path.display(),
                name,
                e
            );
        });

        let count = count_matches(&patterns, &tables, &sample_code, grammar.case_insensitive);
        if count == 0 {
            panic!(
                "No matches produced for {} in {}.\n\
                 Sample has {} bytes.\n\
                 No begin pattern or keyword of the grammar occurs in the sample.",
                sample_path.display(),
                name,
                sample_code.len()
            );
        }
    }
}

/// Compile every `begin` pattern of the grammar, checking the others.
///
/// Returns the compiled begin patterns, which is what decides whether a mode
/// is entered at all.
pub fn compile_patterns(grammar: &Grammar) -> Result<Vec<Regex>, String> {
    let mut begins = Vec::new();

    for mode in grammar.modes() {
        for (field, pattern) in mode.patterns() {
            let regex = compile(pattern, grammar.case_insensitive)
                .map_err(|e| format!("{} `{}` in {}: {}", field, pattern, describe(mode), e))?;
            if field == "begin" {
                begins.push(regex);
            }
        }
    }

    for table in grammar.keyword_tables() {
        if let Some(pattern) = &table.pattern {
            compile(pattern, grammar.case_insensitive)
                .map_err(|e| format!("$pattern `{pattern}`: {e}"))?;
        }
    }

    Ok(begins)
}

fn compile(pattern: &str, case_insensitive: bool) -> Result<Regex, fancy_regex::Error> {
    let flags = if case_insensitive { "(?mi)" } else { "(?m)" };
    Regex::new(&format!("{flags}{pattern}"))
}

fn describe(mode: &Mode) -> String {
    match &mode.scope {
        Some(scope) => format!("mode `{scope}`"),
        None => "unscoped mode".to_string(),
    }
}

fn count_matches(
    begins: &[Regex],
    tables: &[&Keywords],
    text: &str,
    case_insensitive: bool,
) -> usize {
    let mode_hits: usize = begins
        .iter()
        .map(|regex| regex.find_iter(text).filter_map(Result::ok).count())
        .sum();

    let keyword_hits: usize = tables
        .iter()
        .filter_map(|table| {
            let pattern = table.pattern.as_deref().unwrap_or(DEFAULT_KEYWORD_PATTERN);
            let lexeme = compile(pattern, case_insensitive).ok()?;
            let hits = lexeme
                .find_iter(text)
                .filter_map(Result::ok)
                .filter(|m| {
                    let word = if case_insensitive {
                        m.as_str().to_lowercase()
                    } else {
                        m.as_str().to_string()
                    };
                    table.scope_of(&word).is_some()
                })
                .count();
            Some(hits)
        })
        .sum();

    mode_hits + keyword_hits
}

/// Parse sample paths from grove.kdl
///
/// Looks for `sample { path "..." }` blocks and extracts the path values.
fn parse_samples_from_kdl(path: &Path) -> Vec<String> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return vec![],
    };

    let mut samples = Vec::new();
    let mut in_sample_block = false;
    let mut brace_depth = 0;

    for line in content.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("sample") && trimmed.contains('{') {
            in_sample_block = true;
            brace_depth = 1;
            continue;
        }

        if in_sample_block {
            brace_depth += trimmed.matches('{').count();
            brace_depth = brace_depth.saturating_sub(trimmed.matches('}').count());

            if brace_depth == 0 {
                in_sample_block = false;
                continue;
            }

            if trimmed.starts_with("path")
                && let Some(start) = trimmed.find('"')
                && let Some(end) = trimmed[start + 1..].find('"')
            {
                let path_value = &trimmed[start + 1..start + 1 + end];
                if !path_value.is_empty() {
                    samples.push(path_value.to_string());
                }
            }
        }
    }

    samples
}
