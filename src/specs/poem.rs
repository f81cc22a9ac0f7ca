// src/specs/poem.rs
//
// Single poem page. The poem body sits in one of the layout <td>s; we pick the
// largest text block that is not navigation/ads and clean header/footer lines.
//
// Two flavours:
// - extract_sample_text: quick text for scoring (shortlist)
// - extract_poem_text: full cleanup for the band files

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

use crate::core::html::{selector, text_of};
use crate::core::sanitize::normalize_ws;
use crate::error::ParseError;

const NOISE_MARKERS: [&str; 2] = ["Main Menu", "Sponsored Links"];
const SAMPLE_DROP_PREFIXES: [&str; 4] = ["Public Domain Poetry", "By ", "Read, rate", "Main Menu"];
const MIN_BLOCK_CHARS: usize = 250;
const FALLBACK_BLOCK_CHARS: usize = 180;
const MIN_BLOCK_LINES: usize = 6;

static EXTRA_INFO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*Extra\s+Info:.*$").expect("static regex"));
static PRINTABLE_FOOTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*Printable\s+Page\s+This\s+page\s+viewed\s+\d+\s+times\.?$").expect("static regex")
});
static BYLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^By\s+").expect("static regex"));

/// Text of every <td>, lines separated by '\n'.
fn td_texts(html: &str) -> Result<Vec<String>, ParseError> {
    let doc = Html::parse_document(html);
    let td = selector("td")?;
    Ok(doc.select(&td).map(|cell| text_of(cell, "\n")).collect())
}

fn has_noise(text: &str) -> bool {
    NOISE_MARKERS.iter().any(|m| text.contains(m))
}

fn non_empty_lines(text: &str) -> Vec<String> {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_owned).collect()
}

/// Like `max_by_key`, but ties go to the earliest item.
fn first_max_by_key<T, K: Ord>(items: impl IntoIterator<Item = T>, key: impl Fn(&T) -> K) -> Option<T> {
    let mut best: Option<(K, T)> = None;
    for item in items {
        let k = key(&item);
        if best.as_ref().is_none_or(|(bk, _)| k > *bk) {
            best = Some((k, item));
        }
    }
    best.map(|(_, item)| item)
}

/// Poem text for scoring. Empty string when nothing plausible is found.
pub fn extract_sample_text(html: &str) -> Result<String, ParseError> {
    let candidates = td_texts(html)?
        .into_iter()
        .filter(|t| t.chars().count() >= MIN_BLOCK_CHARS && !has_noise(t));
    let Some(best) = first_max_by_key(candidates, |t| t.chars().count()) else {
        return Ok(s!());
    };

    let kept: Vec<String> = non_empty_lines(&best)
        .into_iter()
        .filter(|l| !SAMPLE_DROP_PREFIXES.iter().any(|p| l.starts_with(p)))
        .collect();
    Ok(kept.join(" "))
}

/// Drop the title line, the first byline and site chrome lines.
pub fn clean_poem_lines(lines: &[String], title: &str) -> Vec<String> {
    let wanted_title = normalize_ws(title).to_lowercase();
    let mut dropped_title = false;
    let mut dropped_byline = false;
    let mut out = Vec::with_capacity(lines.len());

    for line in lines {
        let text = normalize_ws(line);
        if text.is_empty() {
            continue;
        }
        if !dropped_title && text.to_lowercase() == wanted_title {
            dropped_title = true;
            continue;
        }
        if !dropped_byline && BYLINE.is_match(&text) {
            dropped_byline = true;
            continue;
        }
        if text.contains("Sponsored Links") || text.starts_with("Public Domain Poetry") {
            continue;
        }
        out.push(text);
    }
    out
}

/// Full poem text for a band file. Empty string when nothing plausible is found.
pub fn extract_poem_text(html: &str, title: &str) -> Result<String, ParseError> {
    let texts = td_texts(html)?;

    let mut blocks: Vec<Vec<String>> = texts
        .iter()
        .filter(|t| t.chars().count() >= MIN_BLOCK_CHARS && !has_noise(t))
        .map(|t| non_empty_lines(t))
        .filter(|lines| lines.len() >= MIN_BLOCK_LINES)
        .collect();

    if blocks.is_empty() {
        blocks = texts
            .iter()
            .filter(|t| t.chars().count() >= FALLBACK_BLOCK_CHARS)
            .map(|t| non_empty_lines(t))
            .filter(|lines| lines.len() >= MIN_BLOCK_LINES)
            .collect();
    }

    let Some(best) = first_max_by_key(blocks, |lines| lines.iter().map(|l| l.chars().count()).sum::<usize>())
    else {
        return Ok(s!());
    };

    let mut text = clean_poem_lines(&best, title).join(" ");
    text = EXTRA_INFO.replace(&text, "").into_owned();
    text = PRINTABLE_FOOTER.replace(&text, "").into_owned();

    let title = normalize_ws(title);
    if !title.is_empty() {
        text = strip_title_author_prefix(&text, &title);
    }

    Ok(normalize_ws(&text))
}

/// "<Title> By Firstname Lastname (1795-1821) ..." is left over when the title
/// and byline shared one line. Dates end the author when present; otherwise the
/// author is the run of capitalised words after "By".
fn strip_title_author_prefix(text: &str, title: &str) -> String {
    let title = regex::escape(title);
    let patterns = [
        format!(r"(?i:^\s*{title}\s+By\s+)[^()]{{1,80}}?\([^)]*\d[^)]*\)\s+"),
        format!(r"(?i:^\s*{title}\s+By\s+)[A-Z][\w'.\-]*(?:\s+[A-Z][\w'.\-]*)*\s+"),
    ];
    for pattern in &patterns {
        let Ok(re) = Regex::new(pattern) else { continue };
        if re.is_match(text) {
            return re.replace(text, "").into_owned();
        }
    }
    s!(text)
}

/// Shortlist `sample_text` made presentable as a fallback paragraph.
pub fn clean_sample_text(text: &str) -> String {
    normalize_ws(&EXTRA_INFO.replace(text, ""))
}
