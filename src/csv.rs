// src/csv.rs
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use ::csv::{ReaderBuilder, StringRecord, WriterBuilder};

use crate::config::consts::POEM_COLUMNS;
use crate::data::PoemRow;
use crate::file::ensure_parent;

/* ---------------- Sink ---------------- */

/// Append-only writer for `poems.csv`.
///
/// Header is written only when the file is new or empty. Each `append` opens,
/// writes and flushes, so a crash loses at most the page being written.
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with just a header if it does not exist yet.
    pub fn ensure_header(&self) -> ::csv::Result<()> {
        self.append(&[], 0)
    }

    /// Append one page worth of rows.
    pub fn append(&self, rows: &[PoemRow], source_page: u32) -> ::csv::Result<()> {
        debug_assert!(rows.iter().all(|r| r.source_page == source_page));
        ensure_parent(&self.path)?;

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let is_new = file.metadata()?.len() == 0;

        let mut out = WriterBuilder::new().has_headers(false).from_writer(file);
        if is_new {
            out.write_record(POEM_COLUMNS)?;
        }
        for row in rows {
            out.write_record(row.to_record())?;
        }
        out.flush()?;
        Ok(())
    }
}

/* ---------------- Reading ---------------- */

/// A whole CSV file with named columns. Ragged rows are tolerated;
/// missing cells read as "".
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<StringRecord>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Trimmed cell or "" when the row is short / column unknown.
    pub fn cell<'a>(&self, row: &'a StringRecord, col: Option<usize>) -> &'a str {
        col.and_then(|c| row.get(c)).map(str::trim).unwrap_or("")
    }
}

pub fn read_table(path: &Path) -> ::csv::Result<Table> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = rdr.headers()?.iter().map(str::to_owned).collect();
    let rows = rdr.records().collect::<Result<Vec<_>, _>>()?;
    Ok(Table { headers, rows })
}

/// Typed read of a scraper output file.
pub fn read_poems(path: &Path) -> ::csv::Result<Vec<PoemRow>> {
    let mut rdr = ReaderBuilder::new().from_path(path)?;
    rdr.deserialize().collect()
}

/// Count data rows (header excluded). 0 when the file is missing.
pub fn count_rows(path: &Path) -> ::csv::Result<usize> {
    if !fs::exists(path)? {
        return Ok(0);
    }
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    Ok(rdr.records().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(title: &str, page: u32) -> PoemRow {
        PoemRow { title: s!(title), link: format!("https://x/{title}"), lines: 10, views: 3, source_page: page }
    }

    #[test]
    fn header_written_once_across_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/poems.csv");
        let sink = CsvSink::new(&path);

        sink.ensure_header().unwrap();
        sink.append(&[row("a", 1), row("b, with comma", 1)], 1).unwrap();
        sink.append(&[row("c", 2)], 2).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("title,link,lines,views,source_page").count(), 1);
        assert!(text.contains("\"b, with comma\""));

        let back = read_poems(&path).unwrap();
        assert_eq!(back, vec![row("a", 1), row("b, with comma", 1), row("c", 2)]);
        assert_eq!(count_rows(&path).unwrap(), 3);
    }

    #[test]
    fn table_cells_default_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        fs::write(&path, "band,title\neasy, A \nhard\n").unwrap();
        let t = read_table(&path).unwrap();
        let title = t.column("title");
        assert_eq!(t.cell(&t.rows[0], title), "A");
        assert_eq!(t.cell(&t.rows[1], title), "");
        assert_eq!(t.cell(&t.rows[0], t.column("nope")), "");
    }
}
