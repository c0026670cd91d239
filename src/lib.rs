//! Turns a noisy web page into a compact outline of its meaningful content.
//!
//! The pipeline has two stages.  The extractor walks the document once and
//! sorts visible regions into typed [`ContentBlock`]s (headings, prose,
//! lists, tables, definition lists, images), filtering out navigation,
//! advertising, interface chrome and marketing copy.  It also harvests
//! landmarks, headings, the primary navigation, forms, stand-alone buttons,
//! remaining links and the site's search box.  The grouper then partitions
//! the blocks into sections, scores each one and marks the weak ones as
//! initially collapsed.
//!
//! ## Quick start
//!
//! ```rust
//! use page_outline::{extract, ExtractOptions};
//!
//! let html = r#"<html><head><title>Tea</title></head><body><main>
//!     <h1>Brewing green tea</h1>
//!     <p>Use water well below boiling, around eighty degrees, for two minutes.</p>
//! </main></body></html>"#;
//! let snapshot = extract(html, "https://example.com/tea", ExtractOptions::default()).unwrap();
//!
//! assert_eq!(snapshot.title, "Tea");
//! assert_eq!(snapshot.content_groups.len(), 1);
//! ```
//!
//! ## Module layout
//!
//! * **Top level**: [`extract`] reads an HTML string, [`extract_from_host`]
//!   reads any tree exposed through [`HostNode`].  [`group_blocks`] is the
//!   grouping stage on its own.
//! * [`parser`]: the static HTML host ([`parser::NodeRef`],
//!   [`parser::parse_html`]).
//! * [`shared_utils`]: text and URL helpers used across the crate.

macro_rules! d {
    ($code:block) => {
        if cfg!(debug_assertions) {
            $code
        }
    };
}

#[macro_use]
mod logging;
mod error;
mod extractor;
mod grouper;
mod host;
mod lexicon;
mod models;
mod node_utils;
mod utils;

pub use error::{Error, HostError, Result};
pub use extractor::{ExtractedContent, Extractor};
pub use grouper::{group_blocks, DEFAULT_COLLAPSE_FLOOR};
pub use host::{HostNode, NodeKind};
pub use lexicon::{Lexicon, TextClassifier};
pub use logging::logger::DebugLogsCategories;
pub use models::*;

/// Text and URL helpers.
pub mod shared_utils {
    pub use crate::utils::{normalize_text, to_absolute_uri, word_count};
}

/// The static HTML host.
///
/// [`NodeRef`] is the reference-counted DOM node type; it implements
/// [`crate::HostNode`].  [`parse_html`] parses a complete HTML document.
pub mod parser {
    use kuchikiki::traits::TendrilSink;
    pub use kuchikiki::NodeRef;

    /// Parse an HTML string into a [`NodeRef`] document tree.
    ///
    /// The parser follows the HTML5 specification; an implicit `<html>`,
    /// `<head>` and `<body>` are synthesised when missing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use page_outline::parser::parse_html;
    ///
    /// let doc = parse_html("<div><p>hello</p></div>");
    /// assert!(doc.select_first("p").is_ok());
    /// ```
    pub fn parse_html(html: &str) -> NodeRef {
        kuchikiki::parse_html().one(html)
    }
}

/// Extract the outline of an HTML page.
///
/// # Arguments
///
/// * `html_str`: the HTML source of the page (as rendered, if available).
/// * `doc_uri`: the address the page was loaded from.  Relative links, form
///   actions and image sources are resolved against it (or against the
///   page's `<base href>`).
/// * `options`: limits, the collapse floor and the lexicon.
///
/// # Errors
///
/// [`Error::Pattern`] when `options.lexicon` holds an invalid pattern.  The
/// static host never fails otherwise.
pub fn extract(html_str: &str, doc_uri: &str, options: ExtractOptions) -> Result<PageSnapshot> {
    let document = parser::parse_html(html_str);
    extract_from_host(&document, doc_uri, options)
}

/// Extract the outline of a document exposed by any [`HostNode`]
/// implementation, such as a live browser tree.
///
/// # Errors
///
/// [`Error::Host`] when the host reports [`HostError::Failed`];
/// [`HostError::AccessDenied`] is handled by skipping the refused subtree.
pub fn extract_from_host<N: HostNode>(
    document: &N,
    doc_uri: &str,
    options: ExtractOptions,
) -> Result<PageSnapshot> {
    extractor::Extractor::new(document.clone(), doc_uri, options)?.extract()
}
