// src/core/html.rs
// Small helpers over `scraper` shared by the page specs.

use scraper::{ElementRef, Selector};

use crate::error::ParseError;

pub fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::Selector(s!(css)))
}

/// All descendant text nodes, each trimmed, empties dropped, joined by `sep`.
pub fn text_of(el: ElementRef<'_>, sep: &str) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Direct element children whose tag name is one of `names`.
pub fn child_elements<'a>(el: ElementRef<'a>, names: &[&str]) -> Vec<ElementRef<'a>> {
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(|c| names.iter().any(|n| c.value().name().eq_ignore_ascii_case(n)))
        .collect()
}

/// Rows that belong to `table` itself, not to a table nested inside it.
/// Rows under an implicit `<tbody>` count as the table's own.
pub fn own_rows<'a>(table: ElementRef<'a>, tr: &Selector) -> Vec<ElementRef<'a>> {
    table
        .select(tr)
        .filter(|row| {
            row.ancestors()
                .filter_map(ElementRef::wrap)
                .find(|a| a.value().name() == "table")
                .is_some_and(|t| t.id() == table.id())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn text_of_joins_trimmed_pieces() {
        let doc = Html::parse_fragment("<div> A <b> B </b>\n<i></i> C </div>");
        let div = doc.select(&selector("div").unwrap()).next().unwrap();
        assert_eq!(text_of(div, " "), "A B C");
        assert_eq!(text_of(div, "\n"), "A\nB\nC");
    }

    #[test]
    fn own_rows_skips_nested_tables() {
        let doc = Html::parse_document(
            "<table id=outer><tr><td>x<table><tr><td>inner</td></tr></table></td></tr>\
             <tr><td>y</td></tr></table>",
        );
        let outer = doc.select(&selector("#outer").unwrap()).next().unwrap();
        let rows = own_rows(outer, &selector("tr").unwrap());
        assert_eq!(rows.len(), 2);
    }
}
