use super::navigation::link_text;
use super::visibility::content_elements;
use super::Page;
use crate::host::HostNode;
use crate::models::LinkSnapshot;
use crate::utils::{has_ancestor, strip_fragment, truncate_at_sentence, word_count};
use std::collections::HashSet;

const NON_PAGE_SCHEMES: &[&str] = &["javascript:", "data:", "blob:", "tel:", "mailto:"];

fn in_footer<N: HostNode>(node: &N) -> bool {
    has_ancestor(node, |a| {
        a.has_tag("footer") || a.role().as_deref() == Some("contentinfo")
    })
}

/// Link text that repeats a retained paragraph (or contains one) adds
/// nothing a reader has not already seen.
fn echoes_content(text: &str, paragraphs: &[String]) -> bool {
    let text = text.to_lowercase();
    paragraphs.iter().any(|p| p.contains(&text) || text.contains(p.as_str()))
}

/// Harvest the links that are not part of the primary navigation.
///
/// `nav_hrefs` are the resolved addresses already taken by navigation and
/// `paragraphs` the texts of the emitted paragraph blocks.
pub fn harvest_links<N: HostNode>(
    document: &N,
    page: &Page,
    nav_hrefs: &HashSet<String>,
    paragraphs: &[&str],
) -> Vec<LinkSnapshot> {
    let page_address = page.page_address();
    let paragraphs = paragraphs
        .iter()
        .filter(|p| word_count(p) >= 3)
        .map(|p| p.to_lowercase())
        .collect::<Vec<_>>();
    let mut seen_hrefs = HashSet::new();
    let mut seen_texts = HashSet::new();
    let mut links = vec![];

    let anchors = content_elements(document, page.classifier)
        .into_iter()
        .filter(|n| n.has_tag("a"));
    for anchor in anchors {
        let Some(href) = anchor.attr("href").map(|h| h.trim().to_string()) else {
            continue;
        };
        let lowered = href.to_ascii_lowercase();
        if href.is_empty()
            || href.starts_with('#')
            || NON_PAGE_SCHEMES.iter().any(|s| lowered.starts_with(s))
        {
            continue;
        }
        let resolved = page.resolve(&href);
        if nav_hrefs.contains(&resolved)
            || strip_fragment(&resolved) == strip_fragment(&page_address)
        {
            continue;
        }
        let text = link_text(&anchor);
        if text.is_empty() || !page.classifier.is_content_text(&text) {
            continue;
        }
        if echoes_content(&text, &paragraphs) {
            continue;
        }
        let text = truncate_at_sentence(&text, page.options.link_text_limit);
        if seen_hrefs.contains(&resolved) || seen_texts.contains(&text.to_lowercase()) {
            continue;
        }
        seen_hrefs.insert(resolved.clone());
        seen_texts.insert(text.to_lowercase());
        links.push(LinkSnapshot {
            text,
            href: resolved,
            is_footer: in_footer(&anchor),
        });
    }
    links
}
