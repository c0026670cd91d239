use super::visibility::is_hidden;
use crate::host::{HostNode, NodeKind};
use crate::utils::{
    closest_ancestor, descendant_elements, find_by_id, normalize_text, root_of, BLOCK_ELEMENTS,
};

const PAYLOAD_TAGS: &[&str] = &["script", "style", "noscript", "template"];
const FORM_CONTROLS: &[&str] = &["input", "select", "textarea", "button"];

/// The visible text of `node`, whitespace-collapsed and trimmed.
pub fn extract_text<N: HostNode>(node: &N) -> String {
    let mut out = String::new();
    collect_text(node, &[], &mut out);
    normalize_text(&out)
}

/// Like [`extract_text`], also leaving out the text of nested form
/// controls (so a `<label>` wrapping a `<select>` does not read its
/// options).
pub fn extract_label_text<N: HostNode>(node: &N) -> String {
    let mut out = String::new();
    collect_text(node, FORM_CONTROLS, &mut out);
    normalize_text(&out)
}

/// Append the raw text of `node` to `out` without normalizing it, so that
/// several sibling nodes can be joined before whitespace is collapsed.
pub fn append_text<N: HostNode>(node: &N, out: &mut String) {
    if node.is_element() && is_hidden(node) {
        return;
    }
    collect_text(node, &[], out);
}

enum Step<N> {
    /// The text of a node and everything below it.
    Collect(N),
    /// A child node, still subject to the payload, skip and hidden filters.
    Child(N),
    Space,
}

/// Walks with an explicit stack, so arbitrarily deep inline nesting cannot
/// exhaust the call stack.
fn collect_text<N: HostNode>(node: &N, skip: &[&str], out: &mut String) {
    let mut stack = vec![Step::Collect(node.clone())];
    while let Some(step) = stack.pop() {
        match step {
            Step::Space => out.push(' '),
            Step::Child(child) => push_child(child, skip, &mut stack, out),
            Step::Collect(node) => match node.kind() {
                NodeKind::Text => {
                    if let Some(text) = node.text() {
                        out.push_str(&text);
                    }
                }
                NodeKind::Other => {}
                _ => {
                    let mut pending = vec![];
                    if let Some(root) = node.shadow_root() {
                        pending.push(Step::Space);
                        pending.extend(root.children().into_iter().map(Step::Child));
                        pending.push(Step::Space);
                    }
                    pending.extend(node.children().into_iter().map(Step::Child));
                    stack.extend(pending.into_iter().rev());
                }
            },
        }
    }
}

fn push_child<N: HostNode>(child: N, skip: &[&str], stack: &mut Vec<Step<N>>, out: &mut String) {
    let Some(tag) = child.tag_name() else {
        stack.push(Step::Collect(child));
        return;
    };
    if PAYLOAD_TAGS.contains(&tag.as_str()) || skip.contains(&tag.as_str()) || is_hidden(&child) {
        return;
    }
    if tag == "br" {
        out.push(' ');
        return;
    }
    if BLOCK_ELEMENTS.contains(tag.as_str()) {
        stack.extend([Step::Space, Step::Collect(child), Step::Space]);
    } else {
        stack.push(Step::Collect(child));
    }
}

/// Where a name is being computed for; decides the last fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameFor {
    /// Landmarks and forms: explicit labelling only.
    Region,
    /// Form fields: placeholder and own text may name them.
    Field,
    Button,
}

/// Resolve the accessible name of `node`.
///
/// Priority: `aria-labelledby` targets, `aria-label`, a `<label for>`
/// pointing at the element, the nearest ancestor `<label>`, `title`, then
/// for fields the `placeholder` and for fields and buttons their own text
/// (`value` for `<input>` buttons).
pub fn accessible_name<N: HostNode>(node: &N, name_for: NameFor) -> Option<String> {
    let non_empty = |s: String| {
        let s = normalize_text(&s);
        (!s.is_empty()).then_some(s)
    };
    let scope = root_of(node);

    if let Some(ids) = node.attr("aria-labelledby") {
        let text = ids
            .split_whitespace()
            .filter_map(|id| find_by_id(&scope, id))
            .map(|target| extract_text(&target))
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(name) = non_empty(text) {
            return Some(name);
        }
    }
    if let Some(name) = node.attr("aria-label").and_then(non_empty) {
        return Some(name);
    }
    if name_for != NameFor::Region {
        if let Some(id) = node.attr("id").filter(|id| !id.trim().is_empty()) {
            let label = descendant_elements(&scope).into_iter().find(|n| {
                n.has_tag("label") && n.attr("for").as_deref().map(str::trim) == Some(id.trim())
            });
            if let Some(name) = label.map(|l| extract_label_text(&l)).and_then(non_empty) {
                return Some(name);
            }
        }
        if let Some(label) = closest_ancestor(node, "label") {
            if let Some(name) = non_empty(extract_label_text(&label)) {
                return Some(name);
            }
        }
    }
    if let Some(name) = node.attr("title").and_then(non_empty) {
        return Some(name);
    }
    let tag = node.tag_name().unwrap_or_default();
    if name_for == NameFor::Field && matches!(tag.as_str(), "input" | "textarea") {
        if let Some(name) = node.attr("placeholder").and_then(non_empty) {
            return Some(name);
        }
    }
    match name_for {
        NameFor::Region => None,
        _ if tag == "input" => node.attr("value").and_then(non_empty),
        _ => non_empty(extract_text(node)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_html, NodeRef};

    fn node(doc: &NodeRef, id: &str) -> NodeRef {
        find_by_id(doc, id).unwrap()
    }

    #[test]
    fn test_extract_text_spacing() {
        let doc = parse_html(
            r#"<div id="t">Hello<b>World</b><p>Para</p>line<br>break
               <script>var x = 1;</script><style>p{}</style><span hidden>secret</span>
               <span style="display:none">gone</span>  tail </div>"#,
        );
        assert_eq!(extract_text(&node(&doc, "t")), "HelloWorld Para line break tail");
    }

    #[test]
    fn test_extract_text_crosses_shadow_roots() {
        let doc = parse_html(
            r#"<div id="t">Before<x-card><template shadowrootmode="open"><p>Inside</p></template>Light</x-card></div>"#,
        );
        assert_eq!(extract_text(&node(&doc, "t")), "Before Inside Light");
    }

    #[test]
    fn test_extract_text_survives_deep_inline_nesting() {
        let depth = 20_000;
        let html = format!(
            r#"<div id="t">{}deep <b>text</b>{}</div>"#,
            "<span>".repeat(depth),
            "</span>".repeat(depth)
        );
        let doc = parse_html(&html);
        assert_eq!(extract_text(&node(&doc, "t")), "deep text");

        let mut raw = String::new();
        append_text(&node(&doc, "t"), &mut raw);
        assert_eq!(normalize_text(&raw), "deep text");
    }

    #[test]
    fn test_accessible_name_priority() {
        let doc = parse_html(
            r#"<span id="lbl">Shipping</span><span id="lbl2">address</span>
               <input id="a" aria-labelledby="lbl lbl2" aria-label="ignored">
               <input id="b" aria-label="  Email  ">
               <label for="c">Full name</label><input id="c" title="t">
               <label>Country <select id="d"><option>France</option></select></label>
               <input id="e" title="Phone number">
               <input id="f" placeholder="Search products">
               <input id="g" type="submit" value="Send">
               <button id="h">Go <b>fast</b></button>
               <nav id="i">Some links</nav>"#,
        );
        let name = |id: &str, f: NameFor| accessible_name(&node(&doc, id), f);
        assert_eq!(name("a", NameFor::Field).as_deref(), Some("Shipping address"));
        assert_eq!(name("b", NameFor::Field).as_deref(), Some("Email"));
        assert_eq!(name("c", NameFor::Field).as_deref(), Some("Full name"));
        assert_eq!(name("d", NameFor::Field).as_deref(), Some("Country"));
        assert_eq!(name("e", NameFor::Field).as_deref(), Some("Phone number"));
        assert_eq!(name("f", NameFor::Field).as_deref(), Some("Search products"));
        assert_eq!(name("f", NameFor::Button), None);
        assert_eq!(name("g", NameFor::Button).as_deref(), Some("Send"));
        assert_eq!(name("h", NameFor::Button).as_deref(), Some("Go fast"));
        assert_eq!(name("i", NameFor::Region), None);
    }
}
