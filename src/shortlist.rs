// src/shortlist.rs
//! Balanced shortlist of poems by typing load.
//!
//! Popular poems of moderate length are fetched (through the HTML cache),
//! scored, and dropped into the first band that still has room and whose
//! ranges contain them.

use std::collections::HashSet;
use std::path::Path;

use crate::{
    config::consts::{BANDS, POOL_MAX_LINES, POOL_MIN_LINES, SAMPLE_TEXT_CHARS},
    config::options::ShortlistOptions,
    core::net::{HttpTransport, Transport},
    core::sanitize::{is_digits, parse_count, take_chars},
    csv::read_table,
    data::{Candidate, PoemRow, ShortlistRow},
    error::ToolError,
    fetch::{Fetcher, Sleeper},
    file::{ensure_parent, load_paragraphs},
    score::{baseline_bands, default_bands, score_text, BandRange},
    specs::poem::extract_sample_text,
    store::{CacheStore, DiskStore, HtmlCache},
};

pub struct Shortlist {
    pub bands: [BandRange; 3],
    /// Picked candidates per band, in `BANDS` order.
    pub picked: [Vec<Candidate>; 3],
    pub attempted: usize,
}

impl Shortlist {
    pub fn is_full(&self, per_band: usize) -> bool {
        self.picked.iter().all(|b| b.len() >= per_band)
    }

    /// Index of the band `c` was added to, if any.
    pub fn assign(&mut self, c: Candidate, per_band: usize) -> Option<usize> {
        let idx = self
            .bands
            .iter()
            .zip(&self.picked)
            .position(|(band, picked)| picked.len() < per_band && band.contains(c.typed_chars, c.words))?;
        self.picked[idx].push(c);
        Some(idx)
    }

    pub fn rows(&self) -> Vec<ShortlistRow> {
        BANDS
            .iter()
            .zip(&self.picked)
            .flat_map(|(band, picked)| {
                picked.iter().map(move |c| ShortlistRow {
                    band: s!(*band),
                    title: c.title.clone(),
                    link: c.link.clone(),
                    lines: c.lines,
                    views: c.views,
                    typed_chars: c.typed_chars,
                    words: c.words,
                    sample_text: take_chars(&c.text, SAMPLE_TEXT_CHARS),
                })
            })
            .collect()
    }
}

/* ---------------- Input ---------------- */

/// Usable rows of `poems.csv`, first occurrence of each link only.
pub fn load_poems(path: &Path) -> Result<Vec<PoemRow>, ToolError> {
    let table = read_table(path)?;
    let col = |name: &str| {
        table.column(name).ok_or_else(|| ToolError::MissingColumn {
            column: s!(name),
            path: path.to_path_buf(),
        })
    };
    let (title_c, link_c) = (Some(col("title")?), Some(col("link")?));
    let (lines_c, views_c, page_c) = (table.column("lines"), table.column("views"), table.column("source_page"));

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for rec in &table.rows {
        let title = table.cell(rec, title_c);
        let link = table.cell(rec, link_c);
        let lines = table.cell(rec, lines_c);
        if title.is_empty() || link.is_empty() || title.starts_with("Sponsored Links") {
            continue;
        }
        if !is_digits(lines) || !seen.insert(s!(link)) {
            continue;
        }
        let views = table.cell(rec, views_c);
        out.push(PoemRow {
            title: s!(title),
            link: s!(link),
            lines: parse_count(lines),
            views: if is_digits(views) { parse_count(views) } else { 0 },
            source_page: parse_count(table.cell(rec, page_c)) as u32,
        });
    }
    Ok(out)
}

/// Moderate-length poems, most viewed first, shorter first on equal views.
pub fn rough_pool(poems: Vec<PoemRow>) -> Vec<PoemRow> {
    let mut pool: Vec<PoemRow> = poems
        .into_iter()
        .filter(|p| (POOL_MIN_LINES..=POOL_MAX_LINES).contains(&p.lines))
        .collect();
    pool.sort_by(|a, b| b.views.cmp(&a.views).then(a.lines.cmp(&b.lines)));
    pool
}

/// Bands from the baseline file, or the fixed defaults.
pub fn load_bands(baseline: Option<&Path>) -> Result<[BandRange; 3], ToolError> {
    let Some(path) = baseline else {
        logf!("No baseline given, using default bands");
        return Ok(default_bands());
    };
    let paragraphs = load_paragraphs(path)?;
    baseline_bands(&paragraphs).ok_or_else(|| ToolError::NoPassages(path.to_path_buf()))
}

/* ---------------- Selection ---------------- */

/// Walk the pool until every band is full or `max_fetch` poems were tried.
/// Poems that fail to fetch or have no text are skipped.
pub fn select<T: Transport, S: Sleeper, C: CacheStore>(
    opts: &ShortlistOptions,
    bands: [BandRange; 3],
    pool: &[PoemRow],
    fetcher: &mut Fetcher<T, S>,
    cache: &mut HtmlCache<C>,
) -> Shortlist {
    let mut list = Shortlist { bands, picked: Default::default(), attempted: 0 };

    for poem in pool {
        if list.is_full(opts.per_band) || list.attempted >= opts.max_fetch {
            break;
        }
        list.attempted += 1;

        let page = match cache.get_or_fetch(&poem.link, fetcher) {
            Ok(page) => page,
            Err(e) => {
                logw!("Skipping {}: {e}", poem.link);
                continue;
            }
        };
        if !page.hit {
            fetcher.pause(opts.delay);
        }

        let text = match extract_sample_text(&page.text()) {
            Ok(t) if !t.is_empty() => t,
            Ok(_) => continue,
            Err(e) => {
                logw!("Skipping {}: {e}", poem.link);
                continue;
            }
        };

        let (typed_chars, words) = score_text(&text);
        let candidate = Candidate {
            title: poem.title.clone(),
            link: poem.link.clone(),
            lines: poem.lines,
            views: poem.views,
            typed_chars,
            words,
            text,
        };
        if let Some(i) = list.assign(candidate, opts.per_band) {
            logd!("{} -> {} ({typed_chars} chars, {words} words)", poem.title, BANDS[i]);
        }
    }
    list
}

pub fn write_shortlist(path: &Path, rows: &[ShortlistRow]) -> Result<(), ToolError> {
    ensure_parent(path)?;
    let mut out = ::csv::Writer::from_path(path)?;
    if rows.is_empty() {
        out.write_record(["band", "title", "link", "lines", "views", "typed_chars", "words", "sample_text"])?;
    }
    for row in rows {
        out.serialize(row)?;
    }
    out.flush()?;
    Ok(())
}

pub fn run(opts: &ShortlistOptions) -> Result<Shortlist, ToolError> {
    opts.fetch.validate()?;
    let bands = load_bands(opts.baseline.as_deref())?;
    let pool = rough_pool(load_poems(&opts.poems_csv)?);
    logf!("{} poems in the rough pool", pool.len());

    let mut fetcher = Fetcher::new(HttpTransport::new(opts.fetch.timeout)?, &opts.fetch);
    let mut cache = HtmlCache::new(DiskStore::new(&opts.cache_dir));
    let list = select(opts, bands, &pool, &mut fetcher, &mut cache);

    write_shortlist(&opts.output, &list.rows())?;

    logf!("Bands (typed_chars / words):");
    for (band, picked) in list.bands.iter().zip(&list.picked) {
        logf!(
            "  {}: chars={:?}, words={:?}, selected={}",
            band.name, band.chars, band.words, picked.len()
        );
    }
    logf!("Attempted fetches: {} ({} from cache)", list.attempted, cache.hits());
    logf!("Wrote: {}", opts.output.display());
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn poem(title: &str, lines: u64, views: u64) -> PoemRow {
        PoemRow { title: s!(title), link: format!("/{title}"), lines, views, source_page: 1 }
    }

    #[test]
    fn load_filters_bad_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poems.csv");
        fs::write(
            &path,
            "title,link,lines,views,source_page\n\
             A,/a,10,5,1\n\
             ,/b,10,5,1\n\
             Sponsored Links here,/c,10,5,1\n\
             D,/d,ten,5,1\n\
             A again,/a,12,9,2\n\
             E,/e,20,,3\n",
        )
        .unwrap();
        let poems = load_poems(&path).unwrap();
        let titles: Vec<&str> = poems.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["A", "E"]);
        assert_eq!(poems[1].views, 0);
    }

    #[test]
    fn missing_link_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poems.csv");
        fs::write(&path, "title,lines\nA,10\n").unwrap();
        assert!(matches!(load_poems(&path), Err(ToolError::MissingColumn { .. })));
    }

    #[test]
    fn pool_order_and_bounds() {
        let pool = rough_pool(vec![
            poem("short", 4, 1000),
            poem("a", 30, 10),
            poem("b", 12, 50),
            poem("c", 9, 50),
            poem("long", 61, 1000),
        ]);
        let titles: Vec<&str> = pool.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["c", "b", "a"]);
    }

    #[test]
    fn assign_prefers_first_open_band() {
        let mut list = Shortlist { bands: default_bands(), picked: Default::default(), attempted: 0 };
        let cand = |chars, words| Candidate {
            title: s!("t"),
            link: s!("/t"),
            lines: 10,
            views: 1,
            typed_chars: chars,
            words,
            text: s!("x"),
        };
        assert_eq!(list.assign(cand(100, 20), 1), Some(0));
        assert_eq!(list.assign(cand(100, 20), 1), None);
        assert_eq!(list.assign(cand(300, 60), 1), Some(1));
        assert_eq!(list.assign(cand(900, 60), 1), None);
        assert!(!list.is_full(1));
        assert_eq!(list.rows().len(), 2);
        assert_eq!(list.rows()[1].band, "medium");
    }
}
