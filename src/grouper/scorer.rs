use crate::models::{BlockKind, ContentBlock, GroupHeading, SourceContext};
use crate::utils::word_count;
use std::collections::{HashMap, HashSet};

/// A text seen this many times across the page is boilerplate.
const REPEAT_THRESHOLD: usize = 3;
const REPEATED_SCORE: f64 = -1.0;
/// Share of non-positive blocks above which a section's score is halved.
const WEAK_SHARE: f64 = 0.6;

pub(crate) fn repeated_texts<'a>(
    blocks: impl IntoIterator<Item = &'a ContentBlock>,
) -> HashSet<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for block in blocks {
        if !block.text.is_empty() {
            *counts.entry(block.text.as_str()).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count >= REPEAT_THRESHOLD)
        .map(|(text, _)| text.to_string())
        .collect()
}

pub(crate) fn block_score(block: &ContentBlock, repeated: &HashSet<String>) -> f64 {
    if repeated.contains(&block.text) {
        return REPEATED_SCORE;
    }
    match &block.kind {
        BlockKind::Paragraph => {
            let words = word_count(&block.text);
            if words >= 5 {
                (words as f64 / 10.0).min(5.0)
            } else {
                0.0
            }
        }
        BlockKind::List { items, .. } => 0.5 * items.len() as f64,
        BlockKind::Image { .. } => 3.0,
        BlockKind::Blockquote | BlockKind::Preformatted => 4.0,
        BlockKind::Table { rows, .. } => (3.0 + 0.3 * rows.len() as f64).min(10.0),
        BlockKind::DefinitionList { definitions } => (definitions.len() as f64).min(8.0),
        BlockKind::Heading { .. } => 0.0,
    }
}

/// The context most blocks came from.  Ties go to main, then article; an
/// empty section counts as main.
pub(crate) fn dominant_context(blocks: &[ContentBlock]) -> SourceContext {
    let count = |context| blocks.iter().filter(|b| b.source_context == context).count();
    let (main, article, body) = (
        count(SourceContext::Main),
        count(SourceContext::Article),
        count(SourceContext::Body),
    );
    if main >= article && main >= body {
        SourceContext::Main
    } else if article >= body {
        SourceContext::Article
    } else {
        SourceContext::Body
    }
}

fn context_bonus(context: SourceContext) -> f64 {
    match context {
        SourceContext::Main => 2.0,
        SourceContext::Article => 1.5,
        SourceContext::Body => 0.0,
    }
}

pub(crate) fn section_score(
    heading: Option<&GroupHeading>,
    blocks: &[ContentBlock],
    repeated: &HashSet<String>,
) -> f64 {
    let scores = blocks
        .iter()
        .map(|b| block_score(b, repeated))
        .collect::<Vec<_>>();
    let mut score = scores.iter().sum::<f64>() + context_bonus(dominant_context(blocks));
    if heading.is_some_and(|h| (3..=10).contains(&word_count(&h.text))) {
        score += 2.0;
    }
    let weak = scores.iter().filter(|s| **s <= 0.0).count();
    if !scores.is_empty() && weak as f64 > WEAK_SHARE * scores.len() as f64 {
        score /= 2.0;
    }
    score
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Sections scoring below this start out collapsed.
pub(crate) fn collapse_threshold(scores: &[f64], floor: f64) -> f64 {
    median(scores).map_or(floor, |m| m.max(floor))
}
