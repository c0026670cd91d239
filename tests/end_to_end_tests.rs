#[cfg(test)]
mod tests {
    use page_outline::parser::*;
    use page_outline::*;

    use serde_json::Value;
    use std::collections::HashSet;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use test_generator::test_resources;

    fn test_texture_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/test_textures")
    }

    fn get_file_content(path: &Path) -> String {
        fs::read_to_string(path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
    }

    /// Every key present in `expected` must match in `actual`; arrays must
    /// match element for element and numbers within float tolerance.
    fn matches_expected(
        expected: &Value,
        actual: &Value,
        path: &str,
    ) -> std::result::Result<(), String> {
        match (expected, actual) {
            (Value::Object(e), Value::Object(a)) => {
                for (key, expected_value) in e {
                    let child_path = format!("{path}.{key}");
                    let actual_value = a
                        .get(key)
                        .ok_or_else(|| format!("missing key at {child_path}"))?;
                    matches_expected(expected_value, actual_value, &child_path)?;
                }
                Ok(())
            }
            (Value::Array(e), Value::Array(a)) => {
                if e.len() != a.len() {
                    return Err(format!(
                        "length mismatch at {path}: expected {} got {}\nactual: {:#}",
                        e.len(),
                        a.len(),
                        actual
                    ));
                }
                for (i, (expected_item, actual_item)) in e.iter().zip(a).enumerate() {
                    matches_expected(expected_item, actual_item, &format!("{path}[{i}]"))?;
                }
                Ok(())
            }
            (Value::Number(e), Value::Number(a)) => {
                let (e, a) = (e.as_f64().unwrap_or(f64::NAN), a.as_f64().unwrap_or(f64::NAN));
                if (e - a).abs() < 1e-9 {
                    Ok(())
                } else {
                    Err(format!("number mismatch at {path}: expected {e} got {a}"))
                }
            }
            _ if expected == actual => Ok(()),
            _ => Err(format!("mismatch at {path}: expected {expected} got {actual}")),
        }
    }

    fn test(resource: &Path) {
        let source = get_file_content(&resource.join("source.html"));
        let expected: Value =
            serde_json::from_str(&get_file_content(&resource.join("expected-snapshot.json")))
                .unwrap();
        let doc_uri = expected["url"].as_str().unwrap();
        let snapshot = extract(&source, doc_uri, ExtractOptions::default()).unwrap();
        let actual = serde_json::to_value(&snapshot).unwrap();
        if let Err(message) = matches_expected(&expected, &actual, "$") {
            panic!("{}: {message}", resource.display());
        }

        // the expected file is a complete snapshot and must read back as one
        let round_trip: PageSnapshot = serde_json::from_value(expected).unwrap();
        assert_eq!(round_trip.content_groups.len(), snapshot.content_groups.len());
    }

    #[test_resources("tests/test_textures/*")]
    fn run(resource: &str) {
        let resource = Path::new(resource);
        if !resource.is_dir() {
            return;
        }
        test(resource);
    }

    #[test]
    fn debug_this() {
        let resource = match std::env::var("PAGE_OUTLINE_DEBUG_RESOURCE") {
            Ok(value) => value,
            Err(_) => return,
        };
        let dir = test_texture_dir().join(resource);
        let source = get_file_content(&dir.join("source.html"));
        let mut options = ExtractOptions::default();
        options.debug = true;
        let snapshot = extract(&source, "https://example.com/", options).unwrap();
        let actual = serde_json::to_string_pretty(&snapshot).unwrap();
        fs::write("/tmp/page-outline-actual.json", actual.as_bytes()).unwrap();
        println!("Wrote /tmp/page-outline-actual.json");
    }

    fn texture_source(name: &str) -> String {
        get_file_content(&test_texture_dir().join(name).join("source.html"))
    }

    #[test]
    fn extraction_is_idempotent() {
        for name in ["tide-tables", "corner-shop"] {
            let source = texture_source(name);
            let first = extract(&source, "https://example.com/page", ExtractOptions::default());
            let second = extract(&source, "https://example.com/page", ExtractOptions::default());
            assert_eq!(first.unwrap(), second.unwrap());
        }
    }

    #[test]
    fn host_entry_point_matches_html_entry_point() {
        let source = texture_source("tide-tables");
        let document = parse_html(&source);
        let doc_uri = "https://harbour.example.com/tides";
        let from_host = extract_from_host(&document, doc_uri, ExtractOptions::default()).unwrap();
        let from_html = extract(&source, doc_uri, ExtractOptions::default()).unwrap();
        assert_eq!(from_host, from_html);
    }

    #[test]
    fn blocks_never_carry_empty_text() {
        for name in ["tide-tables", "corner-shop"] {
            let snapshot =
                extract(&texture_source(name), "https://example.com/", ExtractOptions::default())
                    .unwrap();
            for block in snapshot.content_groups.iter().flat_map(|g| &g.blocks) {
                match &block.kind {
                    BlockKind::List { items, .. } => assert!(!items.is_empty()),
                    BlockKind::DefinitionList { definitions } => assert!(!definitions.is_empty()),
                    _ => assert!(!block.text.trim().is_empty(), "{block:?}"),
                }
            }
        }
    }

    #[test]
    fn collections_obey_dedup_laws() {
        let html = r#"
            <nav aria-label="Main">
              <a href="/a">Alpha</a><a href="/a">Alpha again</a><a href="/b">Beta</a>
            </nav>
            <main><p>Nothing much to read on this page at all.</p></main>
            <form action="/subscribe"><input name="email"></form>
            <form action="/subscribe"><input name="phone"></form>
            <form action="/contact"><input name="message"></form>
            <button>Open the gallery</button><button>open the gallery</button>
            <footer>
              <a href="/terms">Terms of service</a><a href="/terms">Our terms</a>
              <a href="/legal">terms of service</a><a href="/b">Beta section</a>
            </footer>"#;
        let snapshot = extract(html, "https://example.com/", ExtractOptions::default()).unwrap();

        let nav = snapshot.nav_links.iter().map(|l| l.href.as_str()).collect::<Vec<_>>();
        assert_eq!(nav, vec!["https://example.com/a", "https://example.com/b"]);
        assert_eq!(snapshot.nav_links[0].text, "Alpha");

        let actions = snapshot.forms.iter().map(|f| f.action.as_str()).collect::<Vec<_>>();
        assert_eq!(actions, vec!["https://example.com/subscribe", "https://example.com/contact"]);
        assert_eq!(snapshot.forms[0].fields[0].name, "email");

        assert_eq!(snapshot.buttons.len(), 1);

        let links = snapshot
            .links
            .iter()
            .map(|l| (l.text.as_str(), l.href.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(links, vec![("Terms of service", "https://example.com/terms")]);

        let hrefs = snapshot.links.iter().map(|l| &l.href).collect::<HashSet<_>>();
        assert_eq!(hrefs.len(), snapshot.links.len());
    }

    #[test]
    fn deep_inline_nesting_is_read_without_recursion() {
        let depth = 20_000;
        let html = format!(
            "<main><p>{}A paragraph buried under many inline wrappers.{}</p></main>",
            "<span>".repeat(depth),
            "</span>".repeat(depth)
        );
        let snapshot = extract(&html, "https://example.com/", ExtractOptions::default()).unwrap();
        let texts = snapshot
            .content_groups
            .iter()
            .flat_map(|g| &g.blocks)
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>();
        assert_eq!(texts, vec!["A paragraph buried under many inline wrappers."]);
    }

    #[test]
    fn document_defaults() {
        let snapshot = extract("", "https://example.com/", ExtractOptions::default()).unwrap();
        assert_eq!(snapshot.title, "Untitled");
        assert_eq!(snapshot.lang, "en");
        assert!(snapshot.content_groups.is_empty());
        assert!(snapshot.landmarks.is_empty());
        assert!(snapshot.search.is_none());
    }

    #[test]
    fn custom_lexicon_changes_classification() {
        let source = texture_source("tide-tables");
        let mut lexicon = Lexicon::default();
        lexicon.chrome_phrases.push("print this table".to_string());
        let options = ExtractOptions {
            lexicon: Arc::new(lexicon),
            ..ExtractOptions::default()
        };
        let snapshot = extract(&source, "https://harbour.example.com/tides", options).unwrap();
        assert!(snapshot.buttons.is_empty());
    }

    #[test]
    fn invalid_lexicons_are_rejected() {
        assert!(matches!(Lexicon::from_json("{"), Err(Error::Lexicon(_))));

        let mut lexicon = Lexicon::default();
        lexicon.noise_patterns.push("(unclosed".to_string());
        let json = serde_json::to_string(&lexicon).unwrap();
        assert!(matches!(Lexicon::from_json(&json), Err(Error::Pattern(_))));

        let options = ExtractOptions {
            lexicon: Arc::new(lexicon),
            ..ExtractOptions::default()
        };
        let result = extract("<p>Some text</p>", "https://example.com/", options);
        assert!(matches!(result, Err(Error::Pattern(_))));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: ExtractOptions =
            serde_json::from_str(r#"{ "max_depth": 3, "collapse_floor": 2.5 }"#).unwrap();
        assert_eq!(options.max_depth, 3);
        assert_eq!(options.collapse_floor, 2.5);
        assert_eq!(options.link_text_limit, 120);
        assert!(!options.debug);
    }

    #[test]
    fn collapse_floor_is_configurable() {
        let html = "<main><p>One short paragraph of exactly ten words sits here alone.</p></main>";
        let default = extract(html, "https://example.com/", ExtractOptions::default()).unwrap();
        assert!(default.content_groups[0].collapsed);

        let options = ExtractOptions {
            collapse_floor: 0.0,
            ..ExtractOptions::default()
        };
        let lowered = extract(html, "https://example.com/", options).unwrap();
        // main-region bonus: 1.0 + 2.0, its own median
        assert_eq!(lowered.content_groups[0].score, 3.0);
        assert!(!lowered.content_groups[0].collapsed);
    }
}
