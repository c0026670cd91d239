use super::blocks::heading_level;
use super::text::{accessible_name, extract_text, NameFor};
use super::visibility::visible_elements;
use crate::host::HostNode;
use crate::models::{Heading, Landmark};
use crate::utils::has_ancestor;

const LANDMARK_ROLES: &[&str] = &[
    "banner", "complementary", "contentinfo", "form", "main", "navigation", "region", "search",
];
/// Sectioning elements that stop a `header`/`footer` from being the page's
/// banner or contentinfo.
const SECTIONING: &[&str] = &["article", "aside", "main", "nav", "section"];

fn is_top_level<N: HostNode>(node: &N) -> bool {
    !has_ancestor(node, |a| {
        a.tag_name()
            .is_some_and(|t| SECTIONING.contains(&t.as_str()))
    })
}

/// The landmark role of an element, explicit or implied by its tag.
pub(crate) fn landmark_role<N: HostNode>(node: &N) -> Option<String> {
    if let Some(role) = node.role().filter(|r| LANDMARK_ROLES.contains(&r.as_str())) {
        return Some(role);
    }
    let named = || accessible_name(node, NameFor::Region).is_some();
    let role = match node.tag_name()?.as_str() {
        "main" => "main",
        "nav" => "navigation",
        "aside" => "complementary",
        "search" => "search",
        "header" if is_top_level(node) => "banner",
        "footer" if is_top_level(node) => "contentinfo",
        "section" if named() => "region",
        "form" if named() => "form",
        _ => return None,
    };
    Some(role.to_string())
}

pub fn harvest_landmarks<N: HostNode>(document: &N) -> Vec<Landmark> {
    visible_elements(document)
        .into_iter()
        .filter_map(|node| {
            let role = landmark_role(&node)?;
            Some(Landmark {
                role,
                label: accessible_name(&node, NameFor::Region),
            })
        })
        .collect()
}

pub fn harvest_headings<N: HostNode>(document: &N) -> Vec<Heading> {
    visible_elements(document)
        .into_iter()
        .filter_map(|node| {
            let level = heading_level(&node)?;
            let text = extract_text(&node);
            if text.is_empty() {
                return None;
            }
            Some(Heading {
                level,
                text,
                id: node.attr("id").filter(|id| !id.trim().is_empty()),
            })
        })
        .collect()
}
