//! Sectioning and significance scoring of the flat block sequence.
//!
//! Blocks are partitioned at headings, heading-less pages with a long run
//! of blocks get a fallback split that fences off product-tile listings,
//! and every section is scored so that low-value ones can start collapsed.

mod scorer;

use crate::logging::logger::PerfLogger;
use crate::logging::logging_defs::*;
use crate::models::{BlockKind, ContentBlock, ContentGroup, GroupHeading};
use crate::utils::word_count;

/// Lower bound of the adaptive collapse threshold.
pub const DEFAULT_COLLAPSE_FLOOR: f64 = 5.0;
/// A heading-less section needs more blocks than this for the fallback
/// split.
const FALLBACK_MIN_BLOCKS: usize = 10;
const PRODUCT_SHARE: f64 = 0.6;
const PRODUCT_RUN: usize = 3;

#[derive(Debug, Default)]
struct Section {
    heading: Option<GroupHeading>,
    blocks: Vec<ContentBlock>,
    /// Set by the fallback split; survives scoring.
    pre_collapsed: bool,
}

impl Section {
    fn is_empty(&self) -> bool {
        self.heading.is_none() && self.blocks.is_empty()
    }
}

/// A new section at every heading.  A heading directly followed by another
/// heading still yields its own, empty, section.
fn partition(blocks: Vec<ContentBlock>) -> Vec<Section> {
    let mut sections = vec![];
    let mut current = Section::default();
    for block in blocks {
        if let BlockKind::Heading { level } = block.kind {
            if !current.is_empty() {
                sections.push(std::mem::take(&mut current));
            }
            current.heading = Some(GroupHeading {
                text: block.text,
                level,
            });
        } else {
            current.blocks.push(block);
        }
    }
    if !current.is_empty() {
        sections.push(current);
    }
    sections
}

/// Short unpunctuated paragraphs: product names, prices, tile captions.
fn is_product_like(block: &ContentBlock) -> bool {
    block.is_paragraph()
        && word_count(&block.text) < 10
        && !block.text.trim_end().ends_with(['.', '!', '?'])
}

fn split_headingless(blocks: Vec<ContentBlock>) -> Vec<Section> {
    let product_like = blocks.iter().filter(|b| is_product_like(b)).count();
    if product_like as f64 > PRODUCT_SHARE * blocks.len() as f64 {
        tracing::debug!(
            product_like,
            total = blocks.len(),
            "heading-less page is mostly product tiles, collapsing it whole"
        );
        return vec![Section {
            heading: None,
            blocks,
            pre_collapsed: true,
        }];
    }

    let mut sections = vec![];
    let mut current = vec![];
    let mut run = 0;
    for block in blocks {
        if is_product_like(&block) {
            run += 1;
        } else {
            if run >= PRODUCT_RUN {
                sections.push(Section {
                    heading: None,
                    blocks: std::mem::take(&mut current),
                    pre_collapsed: true,
                });
            }
            run = 0;
        }
        current.push(block);
    }
    if !current.is_empty() {
        sections.push(Section {
            heading: None,
            blocks: current,
            pre_collapsed: run >= PRODUCT_RUN,
        });
    }
    tracing::debug!(sections = sections.len(), "heading-less page split");
    sections
}

/// Group `blocks` into scored sections using the default collapse floor.
///
/// Pure: the same blocks always produce the same groups.
///
/// ```rust
/// use page_outline::{group_blocks, ContentBlock, SourceContext};
///
/// let blocks = vec![ContentBlock::paragraph(
///     "One short paragraph of exactly ten words sits here alone.".to_string(),
///     SourceContext::Body,
/// )];
/// let groups = group_blocks(blocks);
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].score, 1.0);
/// assert!(groups[0].collapsed);
/// ```
pub fn group_blocks(blocks: Vec<ContentBlock>) -> Vec<ContentGroup> {
    group_with(blocks, DEFAULT_COLLAPSE_FLOOR, &PerfLogger::new(vec![]))
}

pub(crate) fn group_with(
    blocks: Vec<ContentBlock>,
    collapse_floor: f64,
    logger: &PerfLogger,
) -> Vec<ContentGroup> {
    start_span!(logger, GROUP_BLOCKS);
    let mut sections = partition(blocks);
    let needs_split = matches!(
        sections.as_slice(),
        [only] if only.heading.is_none() && only.blocks.len() > FALLBACK_MIN_BLOCKS
    );
    if needs_split {
        if let Some(only) = sections.pop() {
            sections = split_headingless(only.blocks);
        }
    }
    annotate_span!(logger, GROUP_BLOCKS, format!("{} sections", sections.len()));
    end_span!(logger, GROUP_BLOCKS);

    start_span!(logger, SCORE_GROUPS);
    let repeated = scorer::repeated_texts(sections.iter().flat_map(|s| &s.blocks));
    let scores = sections
        .iter()
        .map(|s| scorer::section_score(s.heading.as_ref(), &s.blocks, &repeated))
        .collect::<Vec<_>>();
    add_point_to_span!(logger, SCORE_GROUPS, "sections scored");
    let threshold = scorer::collapse_threshold(&scores, collapse_floor);
    add_point_to_span!(logger, SCORE_GROUPS, format!("threshold {threshold}"));
    let groups = sections
        .into_iter()
        .zip(scores)
        .map(|(section, score)| ContentGroup {
            heading: section.heading,
            blocks: section.blocks,
            score,
            collapsed: section.pre_collapsed || score < threshold,
        })
        .collect();
    end_span!(logger, SCORE_GROUPS);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceContext;

    fn heading(level: u8, text: &str) -> ContentBlock {
        ContentBlock::heading(level, text.to_string(), SourceContext::Main)
    }

    fn paragraph(text: &str) -> ContentBlock {
        ContentBlock::paragraph(text.to_string(), SourceContext::Main)
    }

    /// A distinct, fully punctuated 50-word paragraph.
    fn rich(i: usize) -> ContentBlock {
        paragraph(&format!("Section {i} {}.", "word ".repeat(48).trim()))
    }

    /// A distinct four-word product tile caption.
    fn product(i: usize) -> ContentBlock {
        paragraph(&format!("Item {i} Gala Apples"))
    }

    fn heading_texts(groups: &[ContentGroup]) -> Vec<Option<&str>> {
        groups
            .iter()
            .map(|g| g.heading.as_ref().map(|h| h.text.as_str()))
            .collect()
    }

    #[test]
    fn partitions_at_headings() {
        let groups = group_blocks(vec![
            paragraph("Lead paragraph before any heading appears."),
            heading(2, "First"),
            heading(3, "Second"),
            paragraph("Body of the second section."),
        ]);
        assert_eq!(heading_texts(&groups), vec![None, Some("First"), Some("Second")]);
        assert!(groups[1].blocks.is_empty());
        assert_eq!(groups[2].blocks.len(), 1);
        assert_eq!(groups[2].heading.as_ref().map(|h| h.level), Some(3));

        let groups = group_blocks(vec![heading(1, "Only"), paragraph("Text under it.")]);
        assert_eq!(heading_texts(&groups), vec![Some("Only")]);
        assert!(group_blocks(vec![]).is_empty());
    }

    #[test]
    fn lone_body_paragraph_scores_one_and_collapses() {
        let groups = group_blocks(vec![ContentBlock::paragraph(
            "One short paragraph of exactly ten words sits here alone.".into(),
            SourceContext::Body,
        )]);
        assert_eq!(groups.len(), 1);
        assert!((groups[0].score - 1.0).abs() < 1e-9);
        assert!(groups[0].collapsed);
    }

    #[test]
    fn product_dominated_page_collapses_whole() {
        let mut blocks = (0..12).map(product).collect::<Vec<_>>();
        blocks.extend((0..3).map(rich));
        let groups = group_blocks(blocks);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].blocks.len(), 15);
        assert!(groups[0].collapsed);
    }

    #[test]
    fn product_runs_fence_off_sub_sections() {
        let blocks = vec![
            rich(0),
            rich(1),
            product(0),
            product(1),
            product(2),
            rich(2),
            rich(3),
            rich(4),
            product(3),
            product(4),
            rich(5),
        ];
        let groups = group_blocks(blocks);
        let sizes = groups.iter().map(|g| g.blocks.len()).collect::<Vec<_>>();
        assert_eq!(sizes, vec![5, 6]);
        // 2 x 5.0 + 2.0 and 4 x 5.0 + 2.0; threshold is their median, 17.
        assert!((groups[0].score - 12.0).abs() < 1e-9);
        assert!((groups[1].score - 22.0).abs() < 1e-9);
        assert!(groups[0].collapsed);
        assert!(!groups[1].collapsed);
    }

    #[test]
    fn trailing_product_run_is_collapsed() {
        let mut blocks = (0..6).map(rich).collect::<Vec<_>>();
        blocks.extend((0..5).map(product));
        let groups = group_blocks(blocks);
        assert_eq!(groups.len(), 1);
        assert!(groups[0].collapsed);
    }

    #[test]
    fn short_headingless_pages_are_not_split() {
        let mut blocks = (0..5).map(rich).collect::<Vec<_>>();
        blocks.extend((0..5).map(product));
        let groups = group_blocks(blocks);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].blocks.len(), 10);
    }

    #[test]
    fn repeated_text_scores_minus_one_everywhere() {
        let mut blocks = vec![];
        for title in ["Apples", "Pears", "Plums"] {
            blocks.push(heading(2, title));
            blocks.push(paragraph("Buy now"));
        }
        let groups = group_blocks(blocks);
        assert_eq!(groups.len(), 3);
        for group in &groups {
            // (-1 + 2) halved, as every block scores below zero
            assert!((group.score - 0.5).abs() < 1e-9);
            assert!(group.collapsed);
        }
    }

    #[test]
    fn threshold_boundary_is_expanded() {
        let blocks = vec![
            heading(2, "A"),
            rich(0),
            heading(2, "B"),
            rich(1),
            heading(2, "C"),
            paragraph("one two three four five"),
        ];
        let groups = group_blocks(blocks);
        let scores = groups.iter().map(|g| g.score).collect::<Vec<_>>();
        assert_eq!(scores, vec![7.0, 7.0, 2.5]);
        // median 7.0 is the threshold; equal scores stay expanded
        let collapsed = groups.iter().map(|g| g.collapsed).collect::<Vec<_>>();
        assert_eq!(collapsed, vec![false, false, true]);
    }

    #[test]
    fn grouping_is_stable() {
        let blocks = vec![heading(2, "Intro to the topic"), rich(0), product(1)];
        assert_eq!(group_blocks(blocks.clone()), group_blocks(blocks));
    }
}
