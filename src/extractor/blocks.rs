mod media;
mod table;

use super::text::{accessible_name, append_text, extract_text, NameFor};
use super::visibility::is_excluded;
use super::Page;
use crate::error::{HostError, Result};
use crate::host::HostNode;
use crate::models::{BlockKind, ContentBlock, Definition, SourceContext};
use crate::utils::{
    child_nodes_with_shadow, find_first_by_tag, is_same_origin, normalize_text, BLOCK_ELEMENTS,
};
use std::collections::HashSet;

/// Tags that never produce blocks; each has its own harvesting path.
const SKIPPED_TAGS: &[&str] = &[
    "nav", "form", "script", "style", "noscript", "aside", "header", "footer", "button", "video",
    "audio", "canvas", "svg", "template", "select", "input", "textarea", "label", "dialog",
    "object", "embed",
];
const SKIPPED_ROLES: &[&str] = &[
    "navigation", "banner", "contentinfo", "complementary", "search", "form",
];
/// Children that make an element a container rather than a paragraph,
/// besides the block-level tags.
const EMBEDDED_CONTENT: &[&str] = &["img", "picture", "iframe", "frame"];

/// The closed taxonomy an element is sorted into.  First match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rule {
    Skip,
    Heading(u8),
    Paragraph,
    List { ordered: bool },
    DefinitionList,
    Quote,
    Preformatted,
    Table,
    Figure,
    Image,
    AriaImage,
    Frame,
    Details,
    Article,
    Container,
}

pub(crate) fn classify<N: HostNode>(node: &N) -> Rule {
    let tag = node.tag_name().unwrap_or_default();
    let role = node.role();
    if SKIPPED_TAGS.contains(&tag.as_str())
        || role.as_deref().is_some_and(|r| SKIPPED_ROLES.contains(&r))
    {
        return Rule::Skip;
    }
    if let Some(level) = heading_level(node) {
        return Rule::Heading(level);
    }
    match tag.as_str() {
        "p" => Rule::Paragraph,
        "ul" | "menu" => Rule::List { ordered: false },
        "ol" => Rule::List { ordered: true },
        "dl" => Rule::DefinitionList,
        "blockquote" => Rule::Quote,
        "pre" => Rule::Preformatted,
        "table" => Rule::Table,
        "figure" => Rule::Figure,
        "img" | "picture" => Rule::Image,
        "iframe" | "frame" => Rule::Frame,
        "details" => Rule::Details,
        "article" => Rule::Article,
        _ => match role.as_deref() {
            Some("img") => Rule::AriaImage,
            Some("article") => Rule::Article,
            _ => Rule::Container,
        },
    }
}

/// Level of an `h1`..`h6` element, or of a `role="heading"` element
/// (`aria-level`, 2 when missing or invalid).
pub(crate) fn heading_level<N: HostNode>(node: &N) -> Option<u8> {
    let tag = node.tag_name()?;
    if let Some(level) = tag
        .strip_prefix('h')
        .and_then(|l| l.parse::<u8>().ok())
        .filter(|l| (1..=6).contains(l))
    {
        return Some(level);
    }
    if node.role().as_deref() == Some("heading") {
        let level = node
            .attr("aria-level")
            .and_then(|l| l.trim().parse::<u8>().ok())
            .filter(|l| (1..=6).contains(l))
            .unwrap_or(2);
        return Some(level);
    }
    None
}

/// Whether `node` has children that must be walked as blocks.
fn has_block_content<N: HostNode>(node: &N) -> bool {
    if node.shadow_root().is_some() {
        return true;
    }
    node.element_children().iter().any(|child| {
        let tag = child.tag_name().unwrap_or_default();
        BLOCK_ELEMENTS.contains(tag.as_str())
            || EMBEDDED_CONTENT.contains(&tag.as_str())
            || child.role().as_deref() == Some("img")
            || child.shadow_root().is_some()
    })
}

/// A child that joins the surrounding inline run instead of being visited
/// on its own.
fn is_inline<N: HostNode>(node: &N) -> bool {
    node.is_text() || (classify(node) == Rule::Container && !has_block_content(node) && {
        let tag = node.tag_name().unwrap_or_default();
        !BLOCK_ELEMENTS.contains(tag.as_str()) && node.role().is_none()
    })
}

/// Depth-first walker producing the flat block sequence.
pub(crate) struct BlockWalker<'a> {
    page: &'a Page<'a>,
    /// Texts of page headings harvested separately; `details` summaries
    /// repeating one of them are dropped.
    known_headings: &'a HashSet<String>,
    emitted_headings: HashSet<String>,
    blocks: Vec<ContentBlock>,
}

impl<'a> BlockWalker<'a> {
    pub fn new(page: &'a Page<'a>, known_headings: &'a HashSet<String>) -> BlockWalker<'a> {
        BlockWalker {
            page,
            known_headings,
            emitted_headings: HashSet::new(),
            blocks: vec![],
        }
    }

    pub fn walk<N: HostNode>(
        mut self,
        root: &N,
        context: SourceContext,
    ) -> Result<Vec<ContentBlock>> {
        self.walk_nodes(child_nodes_with_shadow(root), context, 1)?;
        Ok(self.blocks)
    }

    fn walk_nodes<N: HostNode>(
        &mut self,
        nodes: Vec<N>,
        context: SourceContext,
        depth: usize,
    ) -> Result<()> {
        if depth > self.page.options.max_depth {
            tracing::debug!(depth, "depth limit reached, truncating branch");
            return Ok(());
        }
        let mut inline_run = String::new();
        for node in nodes {
            if !node.is_element() && !node.is_text() {
                continue;
            }
            if node.is_element() && is_excluded(&node, self.page.classifier) {
                continue;
            }
            if node.is_element() && classify(&node) == Rule::Skip {
                continue;
            }
            if is_inline(&node) {
                append_text(&node, &mut inline_run);
                continue;
            }
            self.flush_inline_run(&mut inline_run, context);
            self.visit(&node, context, depth)?;
        }
        self.flush_inline_run(&mut inline_run, context);
        Ok(())
    }

    fn flush_inline_run(&mut self, run: &mut String, context: SourceContext) {
        let text = normalize_text(run);
        run.clear();
        self.push_paragraph(text, context);
    }

    fn push_paragraph(&mut self, text: String, context: SourceContext) {
        if !text.is_empty() && self.page.classifier.is_content_text(&text) {
            self.blocks.push(ContentBlock::paragraph(text, context));
        }
    }

    fn push_heading(&mut self, level: u8, text: String, context: SourceContext) {
        if text.is_empty() || self.emitted_headings.contains(&text) {
            return;
        }
        self.emitted_headings.insert(text.clone());
        self.blocks.push(ContentBlock::heading(level, text, context));
    }

    fn push(&mut self, kind: BlockKind, text: String, context: SourceContext) {
        self.blocks.push(ContentBlock {
            kind,
            text,
            source_context: context,
        });
    }

    fn visit<N: HostNode>(&mut self, node: &N, context: SourceContext, depth: usize) -> Result<()> {
        match classify(node) {
            Rule::Skip => {}
            Rule::Heading(level) => self.push_heading(level, extract_text(node), context),
            Rule::Paragraph | Rule::Container if has_block_content(node) => {
                self.walk_nodes(child_nodes_with_shadow(node), context, depth + 1)?;
            }
            Rule::Paragraph | Rule::Container => self.push_paragraph(extract_text(node), context),
            Rule::List { ordered } => self.visit_list(node, ordered, context),
            Rule::DefinitionList => self.visit_definition_list(node, context),
            Rule::Quote => {
                let text = extract_text(node);
                if !text.is_empty() {
                    self.push(BlockKind::Blockquote, text, context);
                }
            }
            Rule::Preformatted => {
                let text = extract_text(node);
                if !text.is_empty() {
                    self.push(BlockKind::Preformatted, text, context);
                }
            }
            Rule::Table => {
                if let Some((kind, text)) = table::extract_table(node, self.page.classifier) {
                    self.push(kind, text, context);
                }
            }
            Rule::Figure => self.visit_figure(node, context, depth)?,
            Rule::Image => {
                if let Some((kind, text)) = media::image_block(node, self.page) {
                    self.push(kind, text, context);
                }
            }
            Rule::AriaImage => {
                if let Some(label) = accessible_name(node, NameFor::Region) {
                    self.push(
                        BlockKind::Image {
                            alt: label.clone(),
                            src: None,
                        },
                        label,
                        context,
                    );
                }
            }
            Rule::Frame => self.visit_frame(node, context, depth)?,
            Rule::Details => {
                let children = child_nodes_with_shadow(node);
                let summary = children.iter().find(|c| c.has_tag("summary")).cloned();
                if let Some(summary) = summary.filter(|s| !is_excluded(s, self.page.classifier)) {
                    let text = extract_text(&summary);
                    if !self.known_headings.contains(&text) {
                        self.push_heading(4, text, context);
                    }
                }
                let rest = children
                    .into_iter()
                    .filter(|c| !c.has_tag("summary"))
                    .collect();
                self.walk_nodes(rest, context, depth + 1)?;
            }
            Rule::Article => {
                self.walk_nodes(child_nodes_with_shadow(node), SourceContext::Article, depth + 1)?;
            }
        }
        Ok(())
    }

    fn visit_list<N: HostNode>(&mut self, node: &N, ordered: bool, context: SourceContext) {
        let items = node
            .element_children()
            .into_iter()
            .filter(|li| li.has_tag("li") && !is_excluded(li, self.page.classifier))
            .map(|li| extract_text(&li))
            .filter(|text| !self.page.classifier.is_noise(text))
            .collect::<Vec<_>>();
        if !items.is_empty() {
            self.push(BlockKind::List { ordered, items }, String::new(), context);
        }
    }

    fn visit_definition_list<N: HostNode>(&mut self, node: &N, context: SourceContext) {
        let entries = node.element_children().into_iter().flat_map(|child| {
            if child.has_tag("div") {
                child.element_children()
            } else {
                vec![child]
            }
        });

        let mut pairs: Vec<(String, Vec<String>)> = vec![];
        for entry in entries {
            if is_excluded(&entry, self.page.classifier) {
                continue;
            }
            if entry.has_tag("dt") {
                pairs.push((extract_text(&entry), vec![]));
            } else if entry.has_tag("dd") {
                let text = extract_text(&entry);
                match pairs.last_mut() {
                    Some((_, descriptions)) if !text.is_empty() => descriptions.push(text),
                    _ => {}
                }
            }
        }

        let definitions = pairs
            .into_iter()
            .filter(|(term, descriptions)| {
                !self.page.classifier.is_noise(term) && !descriptions.is_empty()
            })
            .map(|(term, descriptions)| Definition {
                term,
                description: descriptions.join("; "),
            })
            .collect::<Vec<_>>();
        if !definitions.is_empty() {
            self.push(BlockKind::DefinitionList { definitions }, String::new(), context);
        }
    }

    fn visit_figure<N: HostNode>(
        &mut self,
        node: &N,
        context: SourceContext,
        depth: usize,
    ) -> Result<()> {
        let image = find_first_by_tag(node, "img");
        let Some(image) = image else {
            return self.walk_nodes(child_nodes_with_shadow(node), context, depth + 1);
        };
        let picture = find_first_by_tag(node, "picture");
        let caption = find_first_by_tag(node, "figcaption")
            .map(|c| extract_text(&c))
            .filter(|c| !c.is_empty());
        let alt = image
            .attr("alt")
            .map(|a| normalize_text(&a))
            .filter(|a| !a.is_empty());
        let Some(text) = caption.clone().or_else(|| alt.clone()) else {
            return Ok(());
        };
        let src = media::image_source(&image, picture.as_ref(), self.page);
        self.push(
            BlockKind::Image {
                alt: alt.unwrap_or(text.clone()),
                src,
            },
            text,
            context,
        );
        Ok(())
    }

    fn visit_frame<N: HostNode>(
        &mut self,
        node: &N,
        context: SourceContext,
        depth: usize,
    ) -> Result<()> {
        if let Some(src) = node.attr("src").filter(|s| !s.trim().is_empty()) {
            let resolved = self.page.resolve(&src);
            if !is_same_origin(&resolved, self.page.doc_uri) {
                tracing::debug!(src = %resolved, "skipping cross-origin frame");
                return Ok(());
            }
        }
        let document = match node.frame_document() {
            Ok(Some(document)) => document,
            Ok(None) => return Ok(()),
            Err(HostError::AccessDenied(reason)) => {
                tracing::debug!(%reason, "frame access refused, skipping");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let body = find_first_by_tag(&document, "body").unwrap_or(document);
        self.walk_nodes(child_nodes_with_shadow(&body), context, depth + 1)
    }
}
