use super::landmarks::landmark_role;
use super::text::{accessible_name, extract_text, NameFor};
use super::visibility::content_elements;
use super::Page;
use crate::host::HostNode;
use crate::lexicon::TextClassifier;
use crate::models::NavLink;
use crate::utils::{
    descendant_elements, has_ancestor, is_same_origin, normalize_text, strip_fragment,
    truncate_at_sentence,
};
use std::collections::HashSet;

fn is_nav_region<N: HostNode>(node: &N) -> bool {
    node.has_tag("nav") || node.role().as_deref() == Some("navigation")
}

fn is_banner<N: HostNode>(node: &N) -> bool {
    landmark_role(node).as_deref() == Some("banner")
}

fn is_footer_region<N: HostNode>(node: &N) -> bool {
    node.has_tag("footer") || landmark_role(node).as_deref() == Some("contentinfo")
}

/// Everything that can say what a nav region is for: its accessible
/// label, `id` and `class`.
fn region_label<N: HostNode>(node: &N) -> String {
    let label = accessible_name(node, NameFor::Region).unwrap_or_default();
    let id = node.attr("id").unwrap_or_default();
    let class = node.attr("class").unwrap_or_default();
    format!("{label} {id} {class}")
}

/// Display text of a link: its own text, else `aria-label`, `title`, or the
/// alt text of an image inside it.
pub(crate) fn link_text<N: HostNode>(anchor: &N) -> String {
    let text = extract_text(anchor);
    if !text.is_empty() {
        return text;
    }
    anchor
        .attr("aria-label")
        .or_else(|| anchor.attr("title"))
        .map(|t| normalize_text(&t))
        .filter(|t| !t.is_empty())
        .or_else(|| {
            descendant_elements(anchor)
                .into_iter()
                .filter(|n| n.has_tag("img"))
                .find_map(|img| {
                    img.attr("alt")
                        .map(|a| normalize_text(&a))
                        .filter(|a| !a.is_empty())
                })
        })
        .unwrap_or_default()
}

fn anchors_in<N: HostNode>(regions: &[N], classifier: &TextClassifier) -> Vec<N> {
    let mut anchors = vec![];
    for region in regions {
        if region.has_tag("a") {
            anchors.push(region.clone());
        }
        anchors.extend(
            content_elements(region, classifier)
                .into_iter()
                .filter(|n| n.has_tag("a")),
        );
    }
    anchors
}

/// Harvest the page's primary navigation.  Tiers are tried in order and the
/// first one yielding a usable link wins:
///
/// 1. nav regions labelled primary/main/site/global/top;
/// 2. nav regions inside the banner that are not secondary-labelled;
/// 3. every other nav region outside the footer that is not
///    secondary-labelled;
/// 4. menu widgets, conventionally named nav containers and banner links.
pub fn harvest_nav_links<N: HostNode>(document: &N, page: &Page) -> Vec<NavLink> {
    let elements = content_elements(document, page.classifier);
    let navs = elements
        .iter()
        .filter(|n| is_nav_region(*n))
        .cloned()
        .collect::<Vec<_>>();
    for tier in 1..=4 {
        let regions = tier_regions(tier, &navs, &elements, page.classifier);
        let links = collect_nav_links(&anchors_in(&regions, page.classifier), page);
        if !links.is_empty() {
            tracing::debug!(tier, count = links.len(), "navigation links harvested");
            return links;
        }
    }
    vec![]
}

fn tier_regions<N: HostNode>(
    tier: usize,
    navs: &[N],
    elements: &[N],
    classifier: &TextClassifier,
) -> Vec<N> {
    let is_secondary = |n: &N| classifier.is_secondary_nav_label(&region_label(n));
    let selected: Vec<&N> = match tier {
        1 => navs
            .iter()
            .filter(|n| classifier.is_primary_nav_label(&region_label(*n)))
            .collect(),
        2 => navs
            .iter()
            .filter(|n| has_ancestor(*n, is_banner) && !is_secondary(*n))
            .collect(),
        3 => navs
            .iter()
            .filter(|n| !has_ancestor(*n, is_footer_region) && !is_secondary(*n))
            .collect(),
        _ => elements
            .iter()
            .filter(|n| {
                matches!(n.role().as_deref(), Some("menu" | "menubar"))
                    || n.attr("class").is_some_and(|c| classifier.is_nav_class(&c))
                    || is_banner(*n)
            })
            .filter(|n| !has_ancestor(*n, is_footer_region))
            .collect(),
    };
    selected.into_iter().cloned().collect()
}

fn collect_nav_links<N: HostNode>(anchors: &[N], page: &Page) -> Vec<NavLink> {
    let page_address = page.page_address();
    let mut seen = HashSet::new();
    let mut links = vec![];
    for anchor in anchors {
        let Some(href) = anchor.attr("href").map(|h| h.trim().to_string()) else {
            continue;
        };
        let lowered = href.to_ascii_lowercase();
        if href.is_empty() || href.starts_with('#') || lowered.starts_with("javascript:") {
            continue;
        }
        if lowered.contains("%25") {
            continue;
        }
        let resolved = page.resolve(&href);
        if !is_same_origin(&resolved, &page_address) {
            continue;
        }
        let text = link_text(anchor);
        let bare = |s: &str| s.trim_end_matches('/').to_string();
        if text.is_empty() || bare(&text) == bare(&href) || bare(&text) == bare(&resolved) {
            continue;
        }
        if !seen.insert(resolved.clone()) {
            continue;
        }
        let is_current = anchor
            .attr("aria-current")
            .is_some_and(|v| !v.trim().eq_ignore_ascii_case("false"))
            || strip_fragment(&resolved) == strip_fragment(&page_address);
        links.push(NavLink {
            text: truncate_at_sentence(&text, page.options.link_text_limit),
            href: resolved,
            is_current,
        });
    }
    links
}
