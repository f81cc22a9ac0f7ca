// src/specs/listing.rs
//
// Listing page (`listpoetry.php?letter=All&page=N`).
//
// The poems table is the first <table> whose first row carries the cells
// "Poem Title", "Author", "Lines", "Views" (any order, case-insensitive).
// Data rows: Title (with link) | Author | Lines | Views.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::core::html::{child_elements, own_rows, selector, text_of};
use crate::core::sanitize::{normalize_ws, parse_count};
use crate::data::PoemRow;
use crate::error::ParseError;

const REQUIRED_HEADERS: [&str; 4] = ["poem title", "author", "lines", "views"];

/// Parse one listing page into rows. `page_url` resolves relative links.
///
/// A missing poems table is a page-level error. Individual rows without a
/// title or a link are skipped.
pub fn extract(html: &str, page: u32, page_url: &str) -> Result<Vec<PoemRow>, ParseError> {
    let base = Url::parse(page_url).map_err(|_| ParseError::BaseUrl(s!(page_url)))?;
    let doc = Html::parse_document(html);
    let table_sel = selector("table")?;
    let tr_sel = selector("tr")?;
    let link_sel = selector("a[href]")?;

    let rows = doc
        .select(&table_sel)
        .map(|t| own_rows(t, &tr_sel))
        .find(|rows| rows.first().is_some_and(|hdr| is_header_row(*hdr)))
        .ok_or(ParseError::TableNotFound { page })?;
    logd!("page {page}: poems table with {} rows", rows.len());

    let mut out = Vec::with_capacity(rows.len().saturating_sub(1));
    for tr in rows.into_iter().skip(1) {
        let cells = child_elements(tr, &["td"]);
        if cells.len() < 4 {
            continue;
        }
        let Some(row) = row_from_cells(&cells, page, &base, &link_sel) else {
            continue;
        };
        out.push(row);
    }
    Ok(out)
}

fn is_header_row(tr: ElementRef<'_>) -> bool {
    let labels: Vec<String> = child_elements(tr, &["td", "th"])
        .into_iter()
        .map(|c| normalize_ws(&text_of(c, " ")).to_lowercase())
        .collect();
    REQUIRED_HEADERS.iter().all(|h| labels.iter().any(|l| l == h))
}

fn row_from_cells(
    cells: &[ElementRef<'_>],
    page: u32,
    base: &Url,
    link_sel: &Selector,
) -> Option<PoemRow> {
    let title_cell = cells[0];
    let title = text_of(title_cell, " ");
    if title.is_empty() {
        return None;
    }
    let href = title_cell
        .select(link_sel)
        .next()
        .and_then(|a| a.value().attr("href"))?;
    let link = base.join(href.trim()).ok()?.to_string();

    Some(PoemRow {
        title,
        link,
        lines: parse_count(&text_of(cells[2], " ")),
        views: parse_count(&text_of(cells[3], " ")),
        source_page: page,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://www.public-domain-poetry.com/listpoetry.php?letter=All&page=3";

    fn page(rows: &str) -> String {
        format!(
            r#"<html><body>
            <table><tr><td>Main Menu</td></tr></table>
            <table>
              <tr><td><b>Poem Title</b></td><td>Author</td><td>Lines</td><td>Views</td></tr>
              {rows}
            </table>
            </body></html>"#
        )
    }

    #[test]
    fn extracts_rows_and_resolves_links() {
        let html = page(
            r#"<tr><td><a href="/john-keats/ode-to-autumn-1234">Ode  To Autumn</a></td>
                   <td>Keats, John</td><td>33</td><td>1,204</td></tr>
               <tr><td><a href="https://elsewhere.org/p">Abs</a></td><td>X</td><td>4</td><td>9</td></tr>"#,
        );
        let rows = extract(&html, 3, URL).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "Ode  To Autumn");
        assert_eq!(rows[0].link, "https://www.public-domain-poetry.com/john-keats/ode-to-autumn-1234");
        assert_eq!(rows[0].lines, 33);
        assert_eq!(rows[0].views, 1204);
        assert_eq!(rows[0].source_page, 3);
        assert_eq!(rows[1].link, "https://elsewhere.org/p");
    }

    #[test]
    fn skips_rows_missing_title_link_or_cells() {
        let html = page(
            r#"<tr><td><a href="/a">   </a></td><td>A</td><td>1</td><td>1</td></tr>
               <tr><td>No link</td><td>A</td><td>1</td><td>1</td></tr>
               <tr><td colspan="4">Sponsored</td></tr>
               <tr><td><a href="/ok">Ok</a></td><td>A</td><td>n/a</td><td></td></tr>"#,
        );
        let rows = extract(&html, 1, URL).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Ok");
        assert_eq!((rows[0].lines, rows[0].views), (0, 0));
    }

    #[test]
    fn missing_table_is_a_page_error() {
        let err = extract("<html><body><p>maintenance</p></body></html>", 9, URL).unwrap_err();
        assert!(matches!(err, ParseError::TableNotFound { page: 9 }));
    }

    #[test]
    fn header_cells_may_be_th_in_any_order() {
        let html = r#"<table>
            <tr><th>Views</th><th>Lines</th><th>Author</th><th>Poem   Title</th></tr>
            <tr><td><a href="x">T</a></td><td>A</td><td>5</td><td>6</td></tr></table>"#;
        let rows = extract(html, 2, URL).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].lines, 5);
    }
}
