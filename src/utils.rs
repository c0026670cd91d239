use crate::host::HostNode;

use percent_encoding::percent_decode_str;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use url::{Position, Url};

/// Elements that start a new line of text.  Crossing one while accumulating
/// text inserts a separating space; having one as a child makes an element
/// a container rather than a paragraph.
pub static BLOCK_ELEMENTS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        "address", "article", "aside", "blockquote", "caption", "dd", "details", "dialog",
        "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2",
        "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "li", "main", "menu", "nav", "ol",
        "p", "pre", "section", "summary", "table", "tbody", "td", "tfoot", "th", "thead", "tr",
        "ul",
    ])
});

pub static SRCSET_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\S+)(\s+[\d.]+[xw])?(\s*(?:,|$))").unwrap());

static NORMALIZE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Collapse every run of whitespace in `src` into a single ASCII space and
/// trim both ends.
///
/// # Examples
///
/// ```rust
/// use page_outline::shared_utils::normalize_text;
///
/// assert_eq!(normalize_text("  Hello \n\t world  "), "Hello world");
/// ```
pub fn normalize_text(src: &str) -> String {
    NORMALIZE_REGEX.replace_all(src.trim(), " ").to_string()
}

/// Count the number of whitespace-delimited tokens in `text`.
///
/// # Examples
///
/// ```rust
/// use page_outline::shared_utils::word_count;
///
/// assert_eq!(word_count("Hello World      Another word"), 4);
/// assert_eq!(word_count(""), 0);
/// assert_eq!(word_count("   "), 0);
/// ```
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Resolve a `<base href>` value against the document URI.  If
/// `base_path` is empty the document URI is returned unchanged.
pub fn resolve_base_uri(doc_uri: &str, base_path: &str) -> String {
    if base_path.trim().is_empty() {
        return doc_uri.to_string();
    }
    if let Ok(parsed_url) = Url::parse(doc_uri) {
        if let Ok(base) = parsed_url.join(base_path.trim()) {
            return base.to_string();
        }
    }
    base_path.to_string()
}

/// Convert a potentially-relative URI to an absolute one against
/// `base_uri`, percent-decoding its path.  An address that cannot be
/// resolved is returned trimmed but otherwise as written.
///
/// # Examples
///
/// ```rust
/// use page_outline::shared_utils::to_absolute_uri;
///
/// assert_eq!(
///     to_absolute_uri("../caf%C3%A9?x=1", "https://example.com/menu/today"),
///     "https://example.com/café?x=1"
/// );
/// ```
pub fn to_absolute_uri(uri: &str, base_uri: &str) -> String {
    let uri = uri.trim();
    let resolved =
        Url::parse(uri).or_else(|_| Url::parse(base_uri).and_then(|base| base.join(uri)));
    match resolved {
        Ok(url) => decode_url_path(&url),
        Err(e) => {
            tracing::debug!(uri, base_uri, error = %e, "keeping unresolvable address");
            uri.to_string()
        }
    }
}

/// Serialize `url` with its path percent-decoded; query and fragment are
/// kept as they are.
pub fn decode_url_path(url: &Url) -> String {
    let path = percent_decode_str(url.path()).decode_utf8_lossy();
    format!(
        "{}{}{}",
        &url[..Position::BeforePath],
        path,
        &url[Position::AfterPath..]
    )
}

/// Two addresses share an origin.  Unparsable or opaque addresses never do.
pub fn is_same_origin(a: &str, b: &str) -> bool {
    match (Url::parse(a), Url::parse(b)) {
        (Ok(a), Ok(b)) => a.origin().is_tuple() && a.origin() == b.origin(),
        _ => false,
    }
}

/// `scheme://host[:port]` of an absolute address.
pub fn origin_of(uri: &str) -> Option<String> {
    let origin = Url::parse(uri).ok()?.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

pub fn strip_fragment(uri: &str) -> &str {
    uri.split_once('#').map_or(uri, |(head, _)| head)
}

pub fn is_data_uri(src: &str) -> bool {
    src.trim_start().get(..5).is_some_and(|s| s.eq_ignore_ascii_case("data:"))
}

/// The URL of the first candidate in a `srcset` list.
pub fn first_srcset_candidate(srcset: &str) -> Option<String> {
    SRCSET_URL
        .captures(srcset.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches(',').to_string())
        .filter(|s| !s.is_empty())
}

/// Cut `text` to at most `limit` characters, preferring the last sentence
/// end inside the limit and falling back to a hard cut with an ellipsis.
pub fn truncate_at_sentence(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let head = text.chars().take(limit).collect::<String>();
    let mut sentence_end = None;
    let mut chars = head.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
        if i > 0 && matches!(c, '.' | '!' | '?') && at_boundary {
            sentence_end = Some(i + c.len_utf8());
        }
    }
    match sentence_end {
        Some(end) => head[..end].to_string(),
        None => {
            let cut = head
                .chars()
                .take(limit.saturating_sub(1))
                .collect::<String>();
            format!("{}…", cut.trim_end())
        }
    }
}

/// All elements below `root` in document order, open shadow trees included
/// (shadow content before the host's light children).  `root` itself is
/// not part of the result.
pub fn descendant_elements<N: HostNode>(root: &N) -> Vec<N> {
    let mut out = vec![];
    let mut stack = child_nodes_with_shadow(root);
    stack.reverse();
    while let Some(node) = stack.pop() {
        if !node.is_element() {
            continue;
        }
        let mut children = child_nodes_with_shadow(&node);
        children.reverse();
        out.push(node);
        stack.extend(children);
    }
    out
}

/// Children of `node`, preceded by the children of its open shadow root.
pub fn child_nodes_with_shadow<N: HostNode>(node: &N) -> Vec<N> {
    let mut children = node
        .shadow_root()
        .map(|root| root.children())
        .unwrap_or_default();
    children.extend(node.children());
    children
}

pub fn find_first_by_tag<N: HostNode>(root: &N, tag: &str) -> Option<N> {
    descendant_elements(root).into_iter().find(|n| n.has_tag(tag))
}

pub fn find_by_id<N: HostNode>(root: &N, id: &str) -> Option<N> {
    descendant_elements(root)
        .into_iter()
        .find(|n| n.attr("id").as_deref() == Some(id))
}

/// Whether any element above `node` satisfies `predicate`.
pub fn has_ancestor<N, F>(node: &N, predicate: F) -> bool
where
    N: HostNode,
    F: Fn(&N) -> bool,
{
    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.is_element() && predicate(&parent) {
            return true;
        }
        current = parent.parent();
    }
    false
}

/// The nearest element above `node` with the given tag.
pub fn closest_ancestor<N: HostNode>(node: &N, tag: &str) -> Option<N> {
    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.has_tag(tag) {
            return Some(parent);
        }
        current = parent.parent();
    }
    None
}

/// The topmost node reachable through `parent()`.
pub fn root_of<N: HostNode>(node: &N) -> N {
    let mut current = node.clone();
    while let Some(parent) = current.parent() {
        current = parent;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_html;

    #[test]
    fn test_to_absolute_uri() {
        let base = "https://example.com/docs/page.html";
        assert_eq!(to_absolute_uri("other.html", base), "https://example.com/docs/other.html");
        assert_eq!(to_absolute_uri("/a%20b", base), "https://example.com/a b");
        assert_eq!(to_absolute_uri("#top", base), "https://example.com/docs/page.html#top");
        assert_eq!(
            to_absolute_uri("https://other.org/x?y=%20", base),
            "https://other.org/x?y=%20"
        );
        assert_eq!(to_absolute_uri(" relative ", "not a url"), "relative");
    }

    #[test]
    fn test_resolve_base_uri() {
        assert_eq!(
            resolve_base_uri("https://example.com/a/b", "/static/"),
            "https://example.com/static/"
        );
        assert_eq!(resolve_base_uri("https://example.com/a/b", ""), "https://example.com/a/b");
    }

    #[test]
    fn test_origins() {
        assert!(is_same_origin("https://example.com/a", "https://example.com/b?c"));
        assert!(!is_same_origin("https://example.com/a", "http://example.com/a"));
        assert!(!is_same_origin("https://example.com/a", "https://cdn.example.com/a"));
        assert!(!is_same_origin("about:blank", "about:blank"));
        assert_eq!(
            origin_of("https://example.com:8443/x").as_deref(),
            Some("https://example.com:8443")
        );
        assert_eq!(strip_fragment("https://a.b/c#d"), "https://a.b/c");
    }

    #[test]
    fn test_truncate_at_sentence() {
        assert_eq!(truncate_at_sentence("Short.", 120), "Short.");
        assert_eq!(
            truncate_at_sentence("First one. Second one is much longer", 20),
            "First one."
        );
        assert_eq!(truncate_at_sentence("abcdefghij", 5), "abcd…");
        assert_eq!(truncate_at_sentence("v1.2 release notes", 8), "v1.2 re…");
    }

    #[test]
    fn test_first_srcset_candidate() {
        assert_eq!(
            first_srcset_candidate("small.jpg 480w, large.jpg 1080w").as_deref(),
            Some("small.jpg")
        );
        assert_eq!(first_srcset_candidate("a.png, b.png 2x").as_deref(), Some("a.png"));
        assert_eq!(first_srcset_candidate("   "), None);
        assert!(is_data_uri("DATA:image/png;base64,xyz"));
    }

    #[test]
    fn test_descendant_elements_include_shadow_content_first() {
        let doc = parse_html(
            r#"<div id="host"><template shadowrootmode="open"><p id="shadow">s</p></template><p id="light">l</p></div>"#,
        );
        let ids = descendant_elements(&doc)
            .into_iter()
            .filter_map(|n| n.attr("id"))
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["host", "shadow", "light"]);
        let light = find_by_id(&doc, "light").unwrap();
        assert!(has_ancestor(&light, |n| n.has_tag("div")));
        assert!(!has_ancestor(&light, |n| n.has_tag("section")));
    }
}
