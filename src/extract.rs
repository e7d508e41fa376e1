// src/extract.rs
//
// Walks the two-column layout of an An Bord Pleanála case page and flattens
// it into one label → value map. The layout is a Foundation grid: each row is
// a `div.grid-x.grid-padding-x` with a `medium-3` label cell and a `medium-9`
// value cell. The "History" row is a container whose value cell holds further
// rows of the same shape, with label and value cells swapped.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Label → raw value for one case page. Keys vary page to page; a repeated
/// label keeps its last value.
pub type RawFieldSet = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The document has no grid rows at all, i.e. it is not a case page.
    /// Pages whose rows are all skipped or malformed are not an error.
    #[error("page contains no label/value layout rows")]
    NoRows,
}

static ROW: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.grid-x.grid-padding-x").expect("row selector"));
static LABEL_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.medium-3.cell").expect("label cell selector"));
static VALUE_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.medium-9.cell").expect("value cell selector"));

/// Extract all labeled fields from one case page.
///
/// Rows labeled "Documents", rows whose label starts with a stray `\r` (a
/// rendering artifact on some pages), and rows missing either cell are
/// skipped without error. "History" rows expand into one field per nested
/// row, with the nested value cell naming the field and the nested label
/// cell carrying its value.
pub fn extract_fields(html: &str) -> Result<RawFieldSet, ExtractError> {
    let doc = Html::parse_document(html);
    let rows: Vec<ElementRef> = doc.select(&ROW).collect();
    if rows.is_empty() {
        return Err(ExtractError::NoRows);
    }

    let mut fields = RawFieldSet::new();
    // Nested History rows also match ROW, so the outer document-order walk
    // would revisit them; the container marks them consumed by node id.
    let mut consumed: HashSet<_> = HashSet::new();

    for row in rows {
        if consumed.contains(&row.id()) {
            continue;
        }
        let label_cell = match row.select(&LABEL_CELL).next() {
            Some(cell) => cell,
            None => continue,
        };
        let value_cell = match row.select(&VALUE_CELL).next() {
            Some(cell) => cell,
            None => continue,
        };

        let label = cell_text(label_cell);
        if label == "Documents" || label.starts_with('\r') {
            continue;
        }

        if label == "History" {
            for nested in row.select(&ROW) {
                consumed.insert(nested.id());
                // Swapped relative to the outer rows: the value cell holds
                // the field name, the label cell holds the field value.
                let name_cell = match nested.select(&VALUE_CELL).next() {
                    Some(cell) => cell,
                    None => continue,
                };
                let nested_value_cell = match nested.select(&LABEL_CELL).next() {
                    Some(cell) => cell,
                    None => continue,
                };
                fields.insert(cell_text(name_cell), cell_text(nested_value_cell));
            }
            continue;
        }

        fields.insert(label, cell_text(value_cell));
    }

    Ok(fields)
}

/// Collect a cell's text, stripped of leading/trailing newlines, then spaces.
/// A leading `\r` survives on purpose so the artifact check above can see it.
fn cell_text(cell: ElementRef) -> String {
    let raw: String = cell.text().collect();
    raw.trim_matches('\n').trim_matches(' ').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(label: &str, value: &str) -> String {
        format!(
            r#"<div class="grid-x grid-padding-x">
                 <div class="medium-3 cell">{}</div>
                 <div class="medium-9 cell">{}</div>
               </div>"#,
            label, value
        )
    }

    fn page(body: &str) -> String {
        format!("<html><body>{}</body></html>", body)
    }

    #[test]
    fn extracts_plain_rows() {
        let html = page(&format!(
            "{}{}",
            row("\n Case reference \n", "\n ABP-314724-22 \n"),
            row("Lodged", "30/09/2022")
        ));
        let fields = extract_fields(&html).unwrap();
        assert_eq!(fields["Case reference"], "ABP-314724-22");
        assert_eq!(fields["Lodged"], "30/09/2022");
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn skips_documents_and_artifact_rows() {
        let html = page(&format!(
            "{}{}{}",
            row("Documents", "link list"),
            // &#13; survives parsing where a literal CR would be normalized away
            row("&#13;\nBroken label", "whatever"),
            row("Parties", "CIE")
        ));
        let fields = extract_fields(&html).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["Parties"], "CIE");
    }

    #[test]
    fn malformed_row_is_skipped_not_fatal() {
        let orphans = r#"<div class="grid-x grid-padding-x">
                 <div class="medium-3 cell">Orphan label</div>
               </div>
               <div class="grid-x grid-padding-x">
                 <div class="medium-9 cell">Orphan value</div>
               </div>"#;
        let html = page(&format!("{}{}", orphans, row("Lodged", "30/09/2022")));
        let fields = extract_fields(&html).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["Lodged"], "30/09/2022");
    }

    #[test]
    fn page_without_grid_rows_is_an_error() {
        let html = page("<p>404 not found</p>");
        assert!(matches!(extract_fields(&html), Err(ExtractError::NoRows)));
    }

    #[test]
    fn all_rows_skipped_yields_empty_set() {
        let html = page(&format!(
            "{}{}",
            row("Documents", "link list"),
            r#"<div class="grid-x grid-padding-x">
                 <div class="medium-3 cell">Orphan</div>
               </div>"#
        ));
        let fields = extract_fields(&html).unwrap();
        assert!(fields.is_empty());
    }

    #[test]
    fn history_rows_are_swapped_and_not_revisited() {
        let history = format!(
            r#"<div class="grid-x grid-padding-x">
                 <div class="medium-3 cell">History</div>
                 <div class="medium-9 cell">
                   {}{}
                 </div>
               </div>"#,
            row("30/09/2022", "Lodged"),
            row("25/08/2024", "Date Signed"),
        );
        let html = page(&format!(
            "{}{}{}",
            row("Case reference", "ABP-314724-22"),
            history,
            row("Parties", "CIE"),
        ));
        let fields = extract_fields(&html).unwrap();
        // Nested rows come out with value cell as the field name.
        assert_eq!(fields["Lodged"], "30/09/2022");
        assert_eq!(fields["Date Signed"], "25/08/2024");
        // Rows around the container are untouched by the expansion.
        assert_eq!(fields["Case reference"], "ABP-314724-22");
        assert_eq!(fields["Parties"], "CIE");
        assert_eq!(fields.len(), 4);
    }

    #[test]
    fn repeated_label_keeps_last_value() {
        let html = page(&format!(
            "{}{}",
            row("Status", "Pending"),
            row("Status", "Decided")
        ));
        let fields = extract_fields(&html).unwrap();
        assert_eq!(fields["Status"], "Decided");
    }
}
