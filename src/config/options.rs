// src/config/options.rs
use std::path::PathBuf;
use std::time::Duration;

use super::consts::*;
use crate::error::ConfigError;

/// What to do when a whole listing page fails to parse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ParseFailurePolicy {
    /// Log, advance the checkpoint past the page, keep going.
    #[default]
    Skip,
    /// Stop the run; the checkpoint stays on the failing page.
    Abort,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FetchOptions {
    pub timeout: Duration,
    /// Total attempts per request, first one included.
    pub max_retries: u32,
    /// Base of the exponential backoff.
    pub base_delay: Duration,
    pub jitter: bool,
    /// Seeds the jitter RNG; entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_secs_f64(DEFAULT_DELAY_SECS),
            jitter: true,
            seed: None,
        }
    }
}

impl FetchOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries == 0 {
            return Err(ConfigError::MaxRetries);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScrapeOptions {
    pub start_page: u32,
    pub end_page: u32,
    pub output: PathBuf,
    pub checkpoint: PathBuf,
    pub resume: bool,
    /// Courtesy pause between pages.
    pub delay: Duration,
    pub on_parse_error: ParseFailurePolicy,
    pub fetch: FetchOptions,
    /// Listing URL with a `{page}` placeholder.
    pub url_template: String,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            start_page: DEFAULT_START_PAGE,
            end_page: DEFAULT_END_PAGE,
            output: PathBuf::from(DEFAULT_OUTPUT),
            checkpoint: PathBuf::from(DEFAULT_CHECKPOINT),
            resume: true,
            delay: Duration::from_secs_f64(DEFAULT_DELAY_SECS),
            on_parse_error: ParseFailurePolicy::Skip,
            fetch: FetchOptions::default(),
            url_template: s!(LISTING_URL_TEMPLATE),
        }
    }
}

impl ScrapeOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_page == 0 {
            return Err(ConfigError::StartPage);
        }
        if self.end_page == u32::MAX {
            return Err(ConfigError::EndPage);
        }
        if self.end_page < self.start_page {
            return Err(ConfigError::PageRange { start: self.start_page, end: self.end_page });
        }
        if !self.url_template.contains("{page}") {
            return Err(ConfigError::UrlTemplate(self.url_template.clone()));
        }
        self.fetch.validate()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DedupeOptions {
    pub input: PathBuf,
    /// `None` rewrites `input` in place.
    pub output: Option<PathBuf>,
    pub key_columns: Vec<String>,
}

impl Default for DedupeOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_OUTPUT),
            output: None,
            key_columns: POEM_COLUMNS.iter().map(|c| s!(*c)).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShortlistOptions {
    pub poems_csv: PathBuf,
    /// Vanilla `mod.paragraphs` used to derive band ranges.
    pub baseline: Option<PathBuf>,
    pub per_band: usize,
    pub output: PathBuf,
    pub max_fetch: usize,
    pub delay: Duration,
    pub cache_dir: PathBuf,
    pub fetch: FetchOptions,
}

impl Default for ShortlistOptions {
    fn default() -> Self {
        Self {
            poems_csv: PathBuf::from(DEFAULT_OUTPUT),
            baseline: None,
            per_band: DEFAULT_PER_BAND,
            output: PathBuf::from(DEFAULT_SHORTLIST),
            max_fetch: DEFAULT_MAX_FETCH,
            delay: Duration::from_secs_f64(SHORTLIST_DELAY_SECS),
            cache_dir: PathBuf::from(CACHE_DIR),
            fetch: FetchOptions {
                timeout: Duration::from_secs_f64(SHORTLIST_TIMEOUT_SECS),
                max_retries: 1,
                seed: Some(DEFAULT_SEED),
                ..FetchOptions::default()
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BandOptions {
    pub shortlist: PathBuf,
    pub out_dir: PathBuf,
    pub target_per_band: usize,
    pub cache_dir: PathBuf,
    pub fetch: FetchOptions,
}

impl Default for BandOptions {
    fn default() -> Self {
        Self {
            shortlist: PathBuf::from(DEFAULT_SHORTLIST),
            out_dir: PathBuf::from(DEFAULT_BAND_DIR),
            target_per_band: DEFAULT_PER_BAND,
            cache_dir: PathBuf::from(CACHE_DIR),
            fetch: FetchOptions {
                timeout: Duration::from_secs_f64(SHORTLIST_TIMEOUT_SECS),
                max_retries: BAND_FETCH_RETRIES,
                ..FetchOptions::default()
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompareOptions {
    /// (name, path) pairs in display order.
    pub datasets: Vec<(String, PathBuf)>,
    pub output_dir: PathBuf,
}

impl Default for CompareOptions {
    fn default() -> Self {
        let dir = PathBuf::from(DEFAULT_BAND_DIR);
        Self {
            datasets: BANDS
                .iter()
                .map(|b| (s!(*b), dir.join(join!(MOD_FILE_PREFIX, ".", b))))
                .collect(),
            output_dir: PathBuf::from(DEFAULT_GRAPH_DIR),
        }
    }
}

/// Parse `NAME=PATH` as given to `--dataset`.
pub fn parse_dataset_spec(spec: &str) -> Result<(String, PathBuf), ConfigError> {
    let (name, path) = spec
        .split_once('=')
        .ok_or_else(|| ConfigError::DatasetSpec(s!(spec)))?;
    let (name, path) = (name.trim(), path.trim());
    if name.is_empty() || path.is_empty() {
        return Err(ConfigError::DatasetSpec(s!(spec)));
    }
    Ok((s!(name), PathBuf::from(path)))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForumOptions {
    pub input: PathBuf,
    /// stdout when `None`
    pub output: Option<PathBuf>,
}

impl Default for ForumOptions {
    fn default() -> Self {
        Self { input: PathBuf::from(DEFAULT_SHORTLIST), output: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrape_defaults_are_valid() {
        let opts = ScrapeOptions::default();
        assert!(opts.validate().is_ok());
        assert_eq!(opts.end_page, 771);
        assert!(opts.resume);
    }

    #[test]
    fn inverted_page_range_is_rejected() {
        let opts = ScrapeOptions { start_page: 5, end_page: 4, ..ScrapeOptions::default() };
        assert!(matches!(opts.validate(), Err(ConfigError::PageRange { start: 5, end: 4 })));
    }

    #[test]
    fn last_representable_page_is_rejected() {
        let opts = ScrapeOptions { start_page: u32::MAX, end_page: u32::MAX, ..ScrapeOptions::default() };
        assert!(matches!(opts.validate(), Err(ConfigError::EndPage)));
        let opts = ScrapeOptions { end_page: u32::MAX - 1, ..ScrapeOptions::default() };
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn zero_retries_is_rejected() {
        let mut opts = ScrapeOptions::default();
        opts.fetch.max_retries = 0;
        assert!(matches!(opts.validate(), Err(ConfigError::MaxRetries)));
    }

    #[test]
    fn dataset_spec_parsing() {
        let (name, path) = parse_dataset_spec(" easy = band_mods/mod.paragraphs.easy").unwrap();
        assert_eq!(name, "easy");
        assert_eq!(path, PathBuf::from("band_mods/mod.paragraphs.easy"));
        assert!(parse_dataset_spec("nameonly").is_err());
        assert!(parse_dataset_spec("=path").is_err());
    }

    #[test]
    fn compare_defaults_point_at_band_files() {
        let opts = CompareOptions::default();
        let names: Vec<_> = opts.datasets.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["easy", "medium", "hard"]);
        assert!(opts.datasets[2].1.ends_with("mod.paragraphs.hard"));
    }
}
