//! Whitespace normalization for embedded code blocks.
//!
//! Generated pages carry code blocks with the indentation of the template they
//! were rendered into, plus stray blank lines around them. [`normalize`] strips
//! both before the block is handed to the highlighting engine.
//!
//! Indentation is measured in characters, not columns: a tab and a space each
//! count as one. Blocks mixing tabs and spaces therefore dedent by character
//! count, which can look uneven when rendered. This is intentional and kept
//! stable so existing pages keep rendering the same way.

use crate::dispatch::CodeElement;

/// Dedent a block of code and drop its surrounding blank lines.
///
/// - `\r\n` and lone `\r` become `\n`.
/// - Leading and trailing lines that are empty after trimming are removed.
/// - The smallest leading-whitespace length over the non-blank lines is removed
///   from every non-blank line; blank lines become empty.
///
/// The result is joined with `\n`. Applying it twice gives the same result as
/// applying it once.
pub fn normalize(text: &str) -> String {
    let canonical = text.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = canonical.split('\n').collect();

    let Some(first) = lines.iter().position(|line| !is_blank(line)) else {
        return String::new();
    };
    let last = lines
        .iter()
        .rposition(|line| !is_blank(line))
        .unwrap_or(first);
    let body = &lines[first..=last];

    let indent = body
        .iter()
        .filter(|line| !is_blank(line))
        .map(|line| leading_whitespace(line))
        .min()
        .unwrap_or(0);

    body.iter()
        .map(|line| {
            if is_blank(line) {
                ""
            } else {
                strip_leading(line, indent)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Normalize an element's text content in place.
///
/// Returns `true` when the content changed and was written back. Unchanged
/// content is never rewritten.
pub fn apply_normalized<E: CodeElement>(element: &mut E) -> bool {
    let original = element.text_content();
    let normalized = normalize(&original);
    if normalized == original {
        return false;
    }
    element.set_text_content(&normalized);
    true
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Remove up to `count` leading whitespace characters.
fn strip_leading(line: &str, count: usize) -> &str {
    let cut = line
        .char_indices()
        .take_while(|(_, c)| c.is_whitespace())
        .take(count)
        .last()
        .map(|(index, c)| index + c.len_utf8())
        .unwrap_or(0);
    &line[cut..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use proptest::prelude::*;

    #[test]
    fn test_only_blank_lines() {
        assert_eq!(normalize("\n\n\n"), "");
        assert_eq!(normalize("   \n\t\n  "), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_uniform_indent_is_removed() {
        let input = "\n    def f :=\n        g x\n    done\n";
        assert_eq!(normalize(input), "def f :=\n    g x\ndone");
    }

    #[test]
    fn test_interior_blank_lines_are_emptied() {
        let input = "  a\n      \n  b";
        assert_eq!(normalize(input), "a\n\nb");
    }

    #[test]
    fn test_crlf_and_cr_are_canonicalized() {
        assert_eq!(normalize("  a\r\n  b\r  c"), "a\nb\nc");
    }

    #[test]
    fn test_tabs_count_as_one_character() {
        // One tab and one space are the same width for dedent purposes.
        let input = "\tfoo\n bar\n\t\tbaz";
        assert_eq!(normalize(input), "foo\nbar\n\tbaz");
    }

    #[test]
    fn test_unindented_line_prevents_dedent() {
        let input = indoc! {"
            theorem t : True := by
              trivial
        "};
        assert_eq!(normalize(input), "theorem t : True := by\n  trivial");
    }

    #[test]
    fn test_trailing_whitespace_is_kept() {
        assert_eq!(normalize("  a  \n  b"), "a  \nb");
    }

    #[test]
    fn test_unicode_whitespace_prefix() {
        let input = "\u{3000}x\n\u{3000}\u{3000}y";
        assert_eq!(normalize(input), "x\n\u{3000}y");
    }

    fn non_whitespace(text: &str) -> String {
        text.chars().filter(|c| !c.is_whitespace()).collect()
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(input in "[ \t\r\na-z]{0,64}") {
            let once = normalize(&input);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn normalize_keeps_every_visible_character(input in "[ \t\r\nab.:=]{0,64}") {
            prop_assert_eq!(non_whitespace(&normalize(&input)), non_whitespace(&input));
        }

        #[test]
        fn normalize_never_indents(input in "[ \tx\n]{0,48}") {
            let output = normalize(&input);
            let widest_in = input.split(['\n', '\r']).map(leading_whitespace).max().unwrap_or(0);
            let widest_out = output.split('\n').map(leading_whitespace).max().unwrap_or(0);
            prop_assert!(widest_out <= widest_in);
        }
    }
}
