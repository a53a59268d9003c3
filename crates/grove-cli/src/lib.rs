//! Command-line companion for grove sites.
//!
//! - `grove normalize`: dedent the code blocks of a built site ahead of time,
//!   so pages render cleanly before the browser module runs
//! - `grove index`: print the quick-open index a manifest produces
//! - `grove grammar`: dump the bundled highlight.js grammars as JSON
//! - `grove new`: create the next numbered `.tree` file
//! - `grove bib`: turn a BibTeX file into reference trees
//!
//! # Usage
//!
//! ```bash
//! grove normalize ./output --output ./output-normalized
//! grove new trees
//! grove bib refs.bib --output-dir trees/references
//! ```

pub mod bib;
mod html;
mod manifest;
mod processor;
pub mod tree;

pub use html::{TransformError, TransformResult, transform_html};
pub use manifest::FileSource;
pub use processor::{ProcessError, ProcessOptions, Processor, ProcessorStats};
