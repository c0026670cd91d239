use crate::extractor::Page;
use crate::host::HostNode;
use crate::models::BlockKind;
use crate::utils::{find_first_by_tag, first_srcset_candidate, is_data_uri, normalize_text};
use regex::Regex;
use std::sync::LazyLock;

/// File names lazy loaders put into `src` until the real image arrives.
static PLACEHOLDER_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|/)[^/]*(?:placeholder|blank|spacer|pixel|transparent|loading|lazy|1x1)[^/]*$")
        .unwrap()
});

/// An image block for an `<img>` or `<picture>`, or `None` when the image
/// has no alternative text and is therefore decorative.
pub(super) fn image_block<N: HostNode>(node: &N, page: &Page) -> Option<(BlockKind, String)> {
    let (image, picture) = if node.has_tag("picture") {
        (find_first_by_tag(node, "img")?, Some(node.clone()))
    } else {
        (node.clone(), None)
    };
    let alt = image
        .attr("alt")
        .map(|a| normalize_text(&a))
        .filter(|a| !a.is_empty())?;
    let src = image_source(&image, picture.as_ref(), page);
    Some((
        BlockKind::Image {
            alt: alt.clone(),
            src,
        },
        alt,
    ))
}

/// The best address for `image`: a real `src`, then the lazy-load
/// attributes, then `srcset` (the image's own, then the picture's
/// `<source>` elements), then whatever `src` holds.
pub(super) fn image_source<N: HostNode>(
    image: &N,
    picture: Option<&N>,
    page: &Page,
) -> Option<String> {
    let raw_src = image
        .attr("src")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    if let Some(src) = raw_src.as_deref() {
        if !is_data_uri(src) && !PLACEHOLDER_SRC.is_match(src) {
            return Some(page.resolve(src));
        }
    }

    for attr in page.classifier.lazy_image_attributes() {
        let Some(value) = image.attr(attr).map(|v| v.trim().to_string()) else {
            continue;
        };
        let candidate = if attr.ends_with("srcset") {
            first_srcset_candidate(&value)
        } else {
            Some(value)
        };
        if let Some(candidate) = candidate.filter(|c| !c.is_empty() && !is_data_uri(c)) {
            return Some(page.resolve(&candidate));
        }
    }

    let sources = picture
        .map(|p| {
            p.element_children()
                .into_iter()
                .filter(|c| c.has_tag("source"))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    let srcset = std::iter::once(image.clone())
        .chain(sources)
        .filter_map(|n| n.attr("srcset"))
        .find_map(|s| first_srcset_candidate(&s));
    if let Some(candidate) = srcset {
        return Some(page.resolve(&candidate));
    }

    raw_src.map(|src| if is_data_uri(&src) { src } else { page.resolve(&src) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::{Lexicon, TextClassifier};
    use crate::models::ExtractOptions;
    use crate::parser::parse_html;
    use crate::utils::find_by_id;

    fn sources(html: &str) -> Vec<Option<String>> {
        let classifier = TextClassifier::new(&Lexicon::default()).unwrap();
        let options = ExtractOptions::default();
        let page = Page {
            doc_uri: "https://example.com/gallery/",
            base_uri: "https://example.com/gallery/",
            classifier: &classifier,
            options: &options,
        };
        let doc = parse_html(html);
        (1..)
            .map_while(|i| find_by_id(&doc, &format!("i{i}")))
            .map(|n| {
                if n.has_tag("picture") {
                    let img = find_first_by_tag(&n, "img").unwrap();
                    image_source(&img, Some(&n), &page)
                } else {
                    image_source(&n, None, &page)
                }
            })
            .collect()
    }

    #[test]
    fn test_image_source_priority() {
        let found = sources(
            r#"<img id="i1" src="cat.jpg" data-src="dog.jpg">
               <img id="i2" src="/img/placeholder.gif" data-lazy-src="lazy.jpg" data-src="first.jpg">
               <img id="i3" src="data:image/png;base64,AAAA" data-srcset="a.jpg 1x, b.jpg 2x">
               <img id="i4" srcset="small.jpg 320w, big.jpg 1024w">
               <picture id="i5"><source srcset="wide.webp 2x"><img src="data:image/gif;base64,R0"></picture>
               <img id="i6" src="spacer.gif">
               <img id="i7">"#,
        );
        assert_eq!(
            found,
            vec![
                Some("https://example.com/gallery/cat.jpg".to_string()),
                Some("https://example.com/gallery/first.jpg".to_string()),
                Some("https://example.com/gallery/a.jpg".to_string()),
                Some("https://example.com/gallery/small.jpg".to_string()),
                Some("https://example.com/gallery/wide.webp".to_string()),
                Some("https://example.com/gallery/spacer.gif".to_string()),
                None,
            ]
        );
    }
}
