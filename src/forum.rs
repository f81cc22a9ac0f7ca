// src/forum.rs
//! Shortlist as forum markup: one `[h2]` heading per band and a bulleted
//! `[url]` list of the poems.

use std::fs;

use crate::bands::{read_shortlist, BandEntry};
use crate::config::consts::BANDS;
use crate::config::options::ForumOptions;
use crate::error::ToolError;
use crate::file::ensure_parent;

/// Author from a `.../<author-slug>/<poem-slug>` URL, words capitalised.
pub fn slug_to_author_name(link: &str) -> String {
    let parts: Vec<&str> = link.trim_matches('/').split('/').collect();
    if parts.len() < 2 {
        return s!("Unknown Author");
    }
    parts[parts.len() - 2]
        .split('-')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub fn build_output(grouped: &[Vec<BandEntry>; 3]) -> String {
    let mut lines = Vec::new();
    for (i, (band, entries)) in BANDS.iter().zip(grouped).enumerate() {
        lines.push(format!("[h2]Poems included - {band}[/h2]"));
        for e in entries {
            let author = slug_to_author_name(&e.link);
            lines.push(format!("* [url={}]{} by {author}[/url]", e.link, e.title));
        }
        if i + 1 < BANDS.len() {
            lines.push(String::new());
        }
    }
    lines.join("\n") + "\n"
}

/// Format the shortlist; writes to `output` or returns the text for stdout.
pub fn run(opts: &ForumOptions) -> Result<Option<String>, ToolError> {
    let text = build_output(&read_shortlist(&opts.input)?);
    match &opts.output {
        Some(path) => {
            ensure_parent(path)?;
            fs::write(path, text)?;
            logd!("wrote {}", path.display());
            Ok(None)
        }
        None => Ok(Some(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_from_slug() {
        assert_eq!(
            slug_to_author_name("https://www.public-domain-poetry.com/john-keats/to-autumn-123"),
            "John Keats"
        );
        assert_eq!(slug_to_author_name("/EMILY-dickinson/hope/"), "Emily Dickinson");
        assert_eq!(slug_to_author_name("solo"), "Unknown Author");
    }

    #[test]
    fn markup_layout() {
        let entry = BandEntry {
            title: s!("To Autumn"),
            link: s!("https://x.com/john-keats/to-autumn"),
            sample_text: String::new(),
        };
        let out = build_output(&[vec![entry], vec![], vec![]]);
        assert_eq!(
            out,
            "[h2]Poems included - easy[/h2]\n\
             * [url=https://x.com/john-keats/to-autumn]To Autumn by John Keats[/url]\n\
             \n\
             [h2]Poems included - medium[/h2]\n\
             \n\
             [h2]Poems included - hard[/h2]\n"
        );
    }
}
