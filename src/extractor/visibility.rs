use crate::host::HostNode;
use crate::lexicon::TextClassifier;
use crate::utils::child_nodes_with_shadow;

const LIVE_REGION_ROLES: &[&str] = &["alert", "status", "log", "marquee", "timer"];
const PRESENTATIONAL_ROLES: &[&str] = &["presentation", "none"];
const MARKER_ATTRIBUTES: &[&str] = &["id", "class", "data-component", "data-testid", "data-type"];

/// Hidden from every user: `hidden`/`inert`, `aria-hidden="true"`,
/// `display:none`, `visibility:hidden`, or a zero-size box that clips its
/// overflow.
pub fn is_hidden<N: HostNode>(node: &N) -> bool {
    if !node.is_element() {
        return false;
    }
    if node.has_attr("hidden") || node.has_attr("inert") {
        return true;
    }
    if node
        .attr("aria-hidden")
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    {
        return true;
    }
    if node.computed_style("display").as_deref() == Some("none") {
        return true;
    }
    if matches!(
        node.computed_style("visibility").as_deref(),
        Some("hidden" | "collapse")
    ) {
        return true;
    }
    is_clipped_to_nothing(node)
}

fn is_clipped_to_nothing<N: HostNode>(node: &N) -> bool {
    let Some((width, height)) = node.box_size() else {
        return false;
    };
    if width > 0.0 || height > 0.0 {
        return false;
    }
    ["overflow", "overflow-x", "overflow-y"].iter().any(|p| {
        matches!(
            node.computed_style(p).as_deref(),
            Some("hidden" | "clip")
        )
    })
}

/// The full gate applied before an element is classified: hidden nodes,
/// presentational and live-region roles, and elements whose markers name
/// page chrome.
pub fn is_excluded<N: HostNode>(node: &N, classifier: &TextClassifier) -> bool {
    if is_hidden(node) {
        return true;
    }
    if let Some(role) = node.role() {
        if PRESENTATIONAL_ROLES.contains(&role.as_str())
            || LIVE_REGION_ROLES.contains(&role.as_str())
        {
            return true;
        }
    }
    MARKER_ATTRIBUTES
        .iter()
        .filter_map(|a| node.attr(a))
        .any(|v| classifier.is_noise_marker(&v))
}

/// Elements below `root` in document order, skipping every subtree rooted
/// at a hidden element.
pub fn visible_elements<N: HostNode>(root: &N) -> Vec<N> {
    elements_where(root, |node| !is_hidden(node))
}

/// Elements below `root` in document order, skipping every subtree rooted
/// at an excluded element (hidden, live region, or chrome such as share
/// bars and consent banners).
pub fn content_elements<N: HostNode>(root: &N, classifier: &TextClassifier) -> Vec<N> {
    elements_where(root, |node| !is_excluded(node, classifier))
}

fn elements_where<N, F>(root: &N, keep: F) -> Vec<N>
where
    N: HostNode,
    F: Fn(&N) -> bool,
{
    let mut out = vec![];
    let mut stack = child_nodes_with_shadow(root);
    stack.reverse();
    while let Some(node) = stack.pop() {
        if !node.is_element() || !keep(&node) {
            continue;
        }
        let mut children = child_nodes_with_shadow(&node);
        children.reverse();
        out.push(node);
        stack.extend(children);
    }
    out
}
