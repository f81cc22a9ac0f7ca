// src/bands.rs
use std::path::{Path, PathBuf};

use crate::{
    config::consts::BANDS,
    config::options::BandOptions,
    core::net::{HttpTransport, Transport},
    csv::read_table,
    error::ToolError,
    fetch::{Fetcher, Sleeper},
    file::{ensure_directory, mod_file_path, write_mod_file},
    specs::poem::{clean_sample_text, extract_poem_text},
    store::{CacheStore, DiskStore, HtmlCache},
};

/// One shortlist line as the band tools need it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BandEntry {
    pub title: String,
    pub link: String,
    pub sample_text: String,
}

/// Shortlist rows grouped by band in `BANDS` order. Band names are matched
/// case-insensitively; rows of any other band are dropped.
pub fn read_shortlist(path: &Path) -> Result<[Vec<BandEntry>; 3], ToolError> {
    let table = read_table(path)?;
    let band_c = table.column("band").ok_or_else(|| ToolError::MissingColumn {
        column: s!("band"),
        path: path.to_path_buf(),
    })?;
    let (title_c, link_c, sample_c) =
        (table.column("title"), table.column("link"), table.column("sample_text"));

    let mut grouped: [Vec<BandEntry>; 3] = Default::default();
    for rec in &table.rows {
        let band = table.cell(rec, Some(band_c)).to_lowercase();
        let Some(i) = BANDS.iter().position(|b| *b == band) else { continue };
        grouped[i].push(BandEntry {
            title: s!(table.cell(rec, title_c)),
            link: s!(table.cell(rec, link_c)),
            sample_text: s!(table.cell(rec, sample_c)),
        });
    }
    Ok(grouped)
}

/// Paragraph for one entry: the full poem, else its cleaned sample, else `None`.
pub fn paragraph_for<T: Transport, S: Sleeper, C: CacheStore>(
    band: &str,
    entry: &BandEntry,
    fetcher: &mut Fetcher<T, S>,
    cache: &mut HtmlCache<C>,
) -> Option<String> {
    let poem = match cache.get_or_fetch(&entry.link, fetcher) {
        Ok(page) => match extract_poem_text(&page.text(), &entry.title) {
            Ok(text) => text,
            Err(e) => {
                logw!("{band}: could not parse {}: {e}", entry.link);
                String::new()
            }
        },
        Err(e) => {
            logw!("{band}: could not fetch {}: {e}", entry.link);
            String::new()
        }
    };
    if !poem.is_empty() {
        return Some(poem);
    }

    let fallback = clean_sample_text(&entry.sample_text);
    if fallback.is_empty() {
        logf!("{band}: skipped {} ({})", entry.title, entry.link);
        None
    } else {
        logf!("{band}: fallback sample_text for {} ({})", entry.title, entry.link);
        Some(fallback)
    }
}

/// Build every band's paragraphs and write `mod.paragraphs.<band>` files.
/// Returns the written paths in `BANDS` order.
pub fn build<T: Transport, S: Sleeper, C: CacheStore>(
    opts: &BandOptions,
    grouped: &[Vec<BandEntry>; 3],
    fetcher: &mut Fetcher<T, S>,
    cache: &mut HtmlCache<C>,
) -> Result<Vec<PathBuf>, ToolError> {
    ensure_directory(&opts.out_dir)?;
    let mut written = Vec::with_capacity(BANDS.len());

    for (band, entries) in BANDS.iter().zip(grouped) {
        let mut paragraphs = Vec::new();
        for entry in entries.iter().filter(|e| !e.link.is_empty()) {
            if paragraphs.len() >= opts.target_per_band {
                break;
            }
            if let Some(p) = paragraph_for(band, entry, fetcher, cache) {
                paragraphs.push(p);
            }
        }

        let path = mod_file_path(&opts.out_dir, band);
        write_mod_file(&path, &paragraphs)?;
        logf!("{band}: wrote {} paragraphs -> {}", paragraphs.len(), path.display());
        written.push(path);
    }
    Ok(written)
}

pub fn run(opts: &BandOptions) -> Result<Vec<PathBuf>, ToolError> {
    opts.fetch.validate()?;
    let grouped = read_shortlist(&opts.shortlist)?;
    let mut fetcher = Fetcher::new(HttpTransport::new(opts.fetch.timeout)?, &opts.fetch);
    let mut cache = HtmlCache::new(DiskStore::new(&opts.cache_dir));
    build(opts, &grouped, &mut fetcher, &mut cache)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn shortlist_grouping_ignores_unknown_bands() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shortlist.csv");
        fs::write(
            &path,
            "band,title,link,sample_text\n\
             HARD,H,/h,hh\n\
             easy,E1,/e1,e\n\
             bonus,B,/b,b\n\
             Easy ,E2,/e2,\n",
        )
        .unwrap();
        let [easy, medium, hard] = read_shortlist(&path).unwrap();
        assert_eq!(easy.iter().map(|e| e.title.as_str()).collect::<Vec<_>>(), ["E1", "E2"]);
        assert!(medium.is_empty());
        assert_eq!(hard[0].link, "/h");
        assert_eq!(easy[1].sample_text, "");
    }

    #[test]
    fn missing_band_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.csv");
        fs::write(&path, "title,link\nA,/a\n").unwrap();
        assert!(matches!(read_shortlist(&path), Err(ToolError::MissingColumn { .. })));
    }
}
