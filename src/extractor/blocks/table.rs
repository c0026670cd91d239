use crate::extractor::text::extract_text;
use crate::host::HostNode;
use crate::lexicon::TextClassifier;
use crate::models::BlockKind;

const ROW_GROUPS: &[&str] = &["thead", "tbody", "tfoot"];

fn cells<N: HostNode>(row: &N) -> Vec<N> {
    row.element_children()
        .into_iter()
        .filter(|c| c.has_tag("td") || c.has_tag("th"))
        .collect()
}

fn cell_texts<N: HostNode>(row: &N) -> Vec<String> {
    cells(row).iter().map(extract_text).collect()
}

/// Rows of `table` in order, each tagged with the row group holding it.
/// Nested tables are not descended into.
fn rows_of<N: HostNode>(table: &N) -> Vec<(Option<String>, N)> {
    let mut rows = vec![];
    for child in table.element_children() {
        let tag = child.tag_name().unwrap_or_default();
        if tag == "tr" {
            rows.push((None, child));
        } else if ROW_GROUPS.contains(&tag.as_str()) {
            rows.extend(
                child
                    .element_children()
                    .into_iter()
                    .filter(|r| r.has_tag("tr"))
                    .map(|r| (Some(tag.clone()), r)),
            );
        }
    }
    rows
}

/// A table block with its summary text, or `None` when no data row
/// survives.
pub(super) fn extract_table<N: HostNode>(
    table: &N,
    classifier: &TextClassifier,
) -> Option<(BlockKind, String)> {
    let rows = rows_of(table);
    let head_row = rows
        .iter()
        .position(|(group, _)| group.as_deref() == Some("thead"));
    let header_index = head_row.or_else(|| {
        rows.first()
            .filter(|(_, row)| cells(row).iter().any(|c| c.has_tag("th")))
            .map(|_| 0)
    });
    let headers = header_index
        .map(|i| cell_texts(&rows[i].1))
        .filter(|h| h.iter().any(|c| !c.is_empty()));

    let data_rows = rows
        .iter()
        .enumerate()
        .filter(|(i, (group, _))| Some(*i) != header_index && group.as_deref() != Some("thead"))
        .map(|(_, (_, row))| cell_texts(row))
        .filter(|cells| cells.iter().any(|c| !c.is_empty() && !classifier.is_noise(c)))
        .collect::<Vec<_>>();
    if data_rows.is_empty() {
        return None;
    }

    let caption = table
        .element_children()
        .into_iter()
        .find(|c| c.has_tag("caption"))
        .map(|c| extract_text(&c))
        .filter(|c| !c.is_empty());
    let text = match (caption, &headers) {
        (Some(caption), _) => caption,
        (None, Some(headers)) => format!("Table: {}", headers.join(", ")),
        (None, None) => format!("Table with {} rows", data_rows.len()),
    };
    Some((
        BlockKind::Table {
            headers,
            rows: data_rows,
        },
        text,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;
    use crate::parser::parse_html;
    use crate::utils::find_first_by_tag;

    fn table_of(html: &str) -> Option<(BlockKind, String)> {
        let classifier = TextClassifier::new(&Lexicon::default()).unwrap();
        let doc = parse_html(html);
        extract_table(&find_first_by_tag(&doc, "table").unwrap(), &classifier)
    }

    #[test]
    fn test_headers_from_thead() {
        let (kind, text) = table_of(
            "<table><thead><tr><th>Name</th><th>Age</th></tr></thead>
             <tbody><tr><td>Alice</td><td>30</td></tr><tr><td>Bob</td><td>25</td></tr></tbody></table>",
        )
        .unwrap();
        assert_eq!(text, "Table: Name, Age");
        assert_eq!(
            kind,
            BlockKind::Table {
                headers: Some(vec!["Name".into(), "Age".into()]),
                rows: vec![
                    vec!["Alice".into(), "30".into()],
                    vec!["Bob".into(), "25".into()]
                ],
            }
        );
    }

    #[test]
    fn test_headers_from_first_row_and_caption() {
        let (kind, text) = table_of(
            "<table><caption>Opening hours</caption>
             <tr><th>Day</th><th>Hours</th></tr>
             <tr><td>Monday</td><td>9 to 5</td></tr>
             <tr><td></td><td>$5</td></tr></table>",
        )
        .unwrap();
        assert_eq!(text, "Opening hours");
        let BlockKind::Table { headers, rows } = kind else {
            panic!("expected a table");
        };
        assert_eq!(headers, Some(vec!["Day".to_string(), "Hours".to_string()]));
        assert_eq!(rows, vec![vec!["Monday".to_string(), "9 to 5".to_string()]]);
    }

    #[test]
    fn test_headerless_and_empty_tables() {
        let (kind, text) = table_of(
            "<table><tr><td>Tea</td><td>Hot</td></tr><tr><td>Juice</td><td>Cold</td></tr></table>",
        )
        .unwrap();
        assert_eq!(text, "Table with 2 rows");
        assert!(matches!(kind, BlockKind::Table { headers: None, .. }));

        assert!(table_of("<table><tr><td>$4</td><td></td></tr></table>").is_none());
        assert!(table_of("<table><thead><tr><th>Only</th></tr></thead></table>").is_none());
    }
}
