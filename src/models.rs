use crate::lexicon::Lexicon;
use crate::logging::logger::DebugLogsCategories;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which structural region produced a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceContext {
    Main,
    Article,
    Body,
}

/// One `(term, description)` entry of a definition list.  Multiple
/// descriptions of the same term are joined with `"; "`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub term: String,
    pub description: String,
}

/// The kind-specific part of a [`ContentBlock`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BlockKind {
    Heading {
        level: u8,
    },
    Paragraph,
    List {
        ordered: bool,
        items: Vec<String>,
    },
    Image {
        alt: String,
        /// Absolute address; `None` for `role="img"` regions.
        src: Option<String>,
    },
    Blockquote,
    Preformatted,
    Table {
        headers: Option<Vec<String>>,
        rows: Vec<Vec<String>>,
    },
    DefinitionList {
        definitions: Vec<Definition>,
    },
}

/// One classified unit of content.
///
/// `text` is the canonical extracted text.  It is empty for pure-structure
/// blocks (lists and definition lists), holds the display text of images
/// and the summary label of tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    #[serde(flatten)]
    pub kind: BlockKind,
    pub text: String,
    pub source_context: SourceContext,
}

impl ContentBlock {
    pub fn heading(level: u8, text: String, source_context: SourceContext) -> ContentBlock {
        ContentBlock {
            kind: BlockKind::Heading { level },
            text,
            source_context,
        }
    }

    pub fn paragraph(text: String, source_context: SourceContext) -> ContentBlock {
        ContentBlock {
            kind: BlockKind::Paragraph,
            text,
            source_context,
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self.kind, BlockKind::Heading { .. })
    }

    pub fn is_paragraph(&self) -> bool {
        matches!(self.kind, BlockKind::Paragraph)
    }
}

/// The heading that anchors a [`ContentGroup`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupHeading {
    pub text: String,
    pub level: u8,
}

/// A section: a run of blocks anchored by an optional heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentGroup {
    pub heading: Option<GroupHeading>,
    pub blocks: Vec<ContentBlock>,
    pub score: f64,
    pub collapsed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub role: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavLink {
    pub text: String,
    pub href: String,
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    #[serde(rename = "type")]
    pub field_type: String,
    pub name: String,
    pub label: String,
    pub required: bool,
    pub value: Option<String>,
    pub options: Option<Vec<SelectOption>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSnapshot {
    pub action: String,
    pub method: String,
    pub label: Option<String>,
    pub fields: Vec<FormField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonSnapshot {
    pub text: String,
    #[serde(rename = "type")]
    pub button_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSnapshot {
    pub text: String,
    pub href: String,
    pub is_footer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDescriptor {
    pub action: String,
    pub param_name: String,
}

/// The output of [`crate::extract`]: everything a serializer needs to
/// re-render the page as a clean, navigable document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    pub url: String,
    /// The `<title>` text, `"Untitled"` when missing.
    pub title: String,
    /// The `<html lang>` value, `"en"` when missing.
    pub lang: String,
    pub landmarks: Vec<Landmark>,
    pub headings: Vec<Heading>,
    pub nav_links: Vec<NavLink>,
    pub content_groups: Vec<ContentGroup>,
    pub forms: Vec<FormSnapshot>,
    pub buttons: Vec<ButtonSnapshot>,
    pub links: Vec<LinkSnapshot>,
    pub search: Option<SearchDescriptor>,
}

/// Knobs that control extraction and scoring.
///
/// # Examples
///
/// ```rust
/// use page_outline::ExtractOptions;
///
/// let mut opts = ExtractOptions::default();
/// opts.max_depth = 20;        // give up sooner on deeply nested markup
/// opts.link_text_limit = 80;  // shorter link labels
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Maximum recursion depth of the block walker.  Deeper branches are
    /// truncated silently.
    pub max_depth: usize,
    /// Link display text longer than this is cut at a sentence boundary or
    /// truncated with an ellipsis.
    pub link_text_limit: usize,
    /// Lower bound of the adaptive collapse threshold.
    pub collapse_floor: f64,
    /// Attach a console listener to the perf logger (debug builds only).
    pub debug: bool,
    /// Which spans the console listener prints when `debug` is set.
    #[serde(skip)]
    pub debug_categories: DebugLogsCategories,
    /// The curated word lists used by the noise and promotion classifiers.
    #[serde(skip)]
    pub lexicon: Arc<Lexicon>,
}

impl Default for ExtractOptions {
    fn default() -> ExtractOptions {
        ExtractOptions {
            max_depth: 50,
            link_text_limit: 120,
            collapse_floor: 5.0,
            debug: false,
            debug_categories: DebugLogsCategories::ALL,
            lexicon: Arc::new(Lexicon::default()),
        }
    }
}
