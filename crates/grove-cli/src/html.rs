//! Normalizing code blocks inside an HTML document.
//!
//! Two streaming passes with lol_html: the first collects the raw text of
//! every code block and notes blocks that contain markup or comments, the
//! second replaces the content of plain-text blocks whose normalized text
//! differs.
//!
//! Text is handled as raw HTML source, so entities (`&lt;`) pass through
//! untouched.

use std::cell::RefCell;

use grove::grove_highlight::normalize;
use lol_html::html_content::ContentType;
use lol_html::{RewriteStrSettings, comments, element, rewrite_str, text};

/// Counts for one document.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransformResult {
    /// Code blocks found.
    pub blocks_seen: usize,
    /// Blocks whose content was replaced.
    pub blocks_rewritten: usize,
    /// Blocks left alone because they contain elements or comments.
    pub blocks_skipped: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("invalid code block selector `{selector}`: {source}")]
    Selector {
        selector: String,
        source: lol_html::errors::SelectorError,
    },
    #[error("HTML rewriting failed: {0}")]
    Rewrite(#[from] lol_html::errors::RewritingError),
}

#[derive(Debug, Default)]
struct Block {
    text: String,
    /// Has child elements or comments; normalizing would drop them.
    complex: bool,
}

/// Normalize the code blocks matching `selector`.
///
/// Returns the rewritten document and the counts. A document without
/// rewritten blocks comes back byte-identical.
pub fn transform_html(
    html: &str,
    selector: &str,
) -> Result<(String, TransformResult), TransformError> {
    let blocks = collect_blocks(html, selector)?;

    let mut result = TransformResult {
        blocks_seen: blocks.len(),
        ..TransformResult::default()
    };
    let replacements: Vec<Option<String>> = blocks
        .iter()
        .map(|block| {
            if block.complex {
                result.blocks_skipped += 1;
                return None;
            }
            let normalized = normalize(&block.text);
            if normalized == block.text {
                None
            } else {
                result.blocks_rewritten += 1;
                Some(normalized)
            }
        })
        .collect();

    if result.blocks_rewritten == 0 {
        return Ok((html.to_string(), result));
    }

    let next = RefCell::new(replacements.into_iter());
    let output = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!(selector, |el| {
                if let Some(Some(text)) = next.borrow_mut().next() {
                    el.set_inner_content(&text, ContentType::Html);
                }
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )?;

    Ok((output, result))
}

fn collect_blocks(html: &str, selector: &str) -> Result<Vec<Block>, TransformError> {
    // The handler macros panic on a bad selector; it comes from user config.
    if let Err(source) = selector.parse::<lol_html::Selector>() {
        return Err(TransformError::Selector {
            selector: selector.to_string(),
            source,
        });
    }

    let blocks = RefCell::new(Vec::<Block>::new());
    let nested = format!("{selector} *");

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!(selector, |_el| {
                    blocks.borrow_mut().push(Block::default());
                    Ok(())
                }),
                element!(nested, |_el| {
                    if let Some(block) = blocks.borrow_mut().last_mut() {
                        block.complex = true;
                    }
                    Ok(())
                }),
                comments!(selector, |_comment| {
                    if let Some(block) = blocks.borrow_mut().last_mut() {
                        block.complex = true;
                    }
                    Ok(())
                }),
                text!(selector, |chunk| {
                    if let Some(block) = blocks.borrow_mut().last_mut() {
                        block.text.push_str(chunk.as_str());
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )?;

    Ok(blocks.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const SELECTOR: &str = "pre > code";

    #[test]
    fn test_dedents_plain_blocks() {
        let html = indoc! {r#"
            <p>intro</p>
            <pre><code class="language-lean">
                def x := 1
                  -- indented
            </code></pre>
        "#};

        let (out, result) = transform_html(html, SELECTOR).unwrap();
        assert_eq!(result.blocks_seen, 1);
        assert_eq!(result.blocks_rewritten, 1);
        assert!(out.contains(
            "<pre><code class=\"language-lean\">def x := 1\n  -- indented</code></pre>"
        ));
        assert!(out.starts_with("<p>intro</p>"));
    }

    #[test]
    fn test_keeps_entities() {
        let html = "<pre><code>\n  a &lt; b\n</code></pre>";
        let (out, _) = transform_html(html, SELECTOR).unwrap();
        assert_eq!(out, "<pre><code>a &lt; b</code></pre>");
    }

    #[test]
    fn test_skips_blocks_with_markup() {
        let html = "<pre><code>\n  <span class=\"k\">def</span> x\n</code></pre>\
                    <pre><code>\n  y\n</code></pre>";

        let (out, result) = transform_html(html, SELECTOR).unwrap();
        assert_eq!(result.blocks_seen, 2);
        assert_eq!(result.blocks_skipped, 1);
        assert_eq!(result.blocks_rewritten, 1);
        assert!(out.contains("<pre><code>\n  <span class=\"k\">def</span> x\n</code></pre>"));
        assert!(out.ends_with("<pre><code>y</code></pre>"));
    }

    #[test]
    fn test_skips_blocks_with_comments() {
        let html = "<pre><code>\n  a <!-- keep --> b\n  c\n</code></pre>";

        let (out, result) = transform_html(html, SELECTOR).unwrap();
        assert_eq!(out, html);
        assert_eq!(result.blocks_seen, 1);
        assert_eq!(result.blocks_skipped, 1);
        assert_eq!(result.blocks_rewritten, 0);
    }

    #[test]
    fn test_clean_document_is_untouched() {
        let html = "<pre><code>already\n  fine</code></pre><code>  inline  </code>";
        let (out, result) = transform_html(html, SELECTOR).unwrap();
        assert_eq!(out, html);
        assert_eq!(result.blocks_rewritten, 0);
        assert_eq!(result.blocks_seen, 1);
    }

    #[test]
    fn test_bad_selector_is_an_error() {
        let err = transform_html("<pre><code>x</code></pre>", "pre >>> code").unwrap_err();
        assert!(matches!(err, TransformError::Selector { .. }));
    }

    #[test]
    fn test_second_run_changes_nothing() {
        let html = "<pre><code>\n\n    one\n      two\n\n</code></pre>";
        let (once, _) = transform_html(html, SELECTOR).unwrap();
        let (twice, result) = transform_html(&once, SELECTOR).unwrap();
        assert_eq!(once, twice);
        assert_eq!(result.blocks_rewritten, 0);
    }
}
