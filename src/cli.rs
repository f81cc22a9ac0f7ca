// src/cli.rs
//! Argument structs for the command-line tools and their entry points.
//! Each `run_*` maps arguments onto the matching options struct and calls
//! into the library.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{eyre, Result, WrapErr};

use crate::config::consts::*;
use crate::config::options::{
    parse_dataset_spec, BandOptions, CompareOptions, DedupeOptions, FetchOptions, ForumOptions,
    ParseFailurePolicy, ScrapeOptions, ShortlistOptions,
};
use crate::progress::LogProgress;
use crate::{bands, compare, dedupe, forum, scrape, shortlist};

fn secs(name: &str, v: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(v).map_err(|_| eyre!("--{name} must be a non-negative number of seconds, got {v}"))
}

/* ---------------- scrape ---------------- */

#[derive(Parser, Debug)]
#[command(name = "scrape", about = "Scrape the poem listing into a CSV, resumable via a checkpoint")]
pub struct ScrapeArgs {
    #[arg(long, default_value_t = DEFAULT_START_PAGE)]
    pub start_page: u32,
    #[arg(long, default_value_t = DEFAULT_END_PAGE)]
    pub end_page: u32,
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,
    #[arg(long, default_value = DEFAULT_CHECKPOINT)]
    pub checkpoint: PathBuf,
    /// Continue from the checkpoint (default).
    #[arg(long, overrides_with = "no_resume")]
    pub resume: bool,
    /// Ignore the checkpoint and start at --start-page.
    #[arg(long, overrides_with = "resume")]
    pub no_resume: bool,
    /// Pause between pages, seconds. Also the backoff base.
    #[arg(long, default_value_t = DEFAULT_DELAY_SECS)]
    pub delay: f64,
    /// Attempts per page, first one included.
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: f64,
    #[arg(long, value_enum, default_value_t = ParseFailurePolicy::Skip)]
    pub on_parse_error: ParseFailurePolicy,
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl ScrapeArgs {
    pub fn to_options(&self) -> Result<ScrapeOptions> {
        let delay = secs("delay", self.delay)?;
        Ok(ScrapeOptions {
            start_page: self.start_page,
            end_page: self.end_page,
            output: self.output.clone(),
            checkpoint: self.checkpoint.clone(),
            resume: !self.no_resume,
            delay,
            on_parse_error: self.on_parse_error,
            fetch: FetchOptions {
                timeout: secs("timeout", self.timeout)?,
                max_retries: self.max_retries,
                base_delay: delay,
                ..FetchOptions::default()
            },
            ..ScrapeOptions::default()
        })
    }
}

pub fn run_scrape(args: &ScrapeArgs) -> Result<()> {
    let opts = args.to_options()?;
    opts.validate()?;
    let mut progress = LogProgress::new();
    let summary = scrape::run(&opts, &mut progress)?;
    logf!(
        "Pages {}..{}: {} fetched, {} skipped, {} rows -> {}",
        summary.first_page,
        summary.next_page.saturating_sub(1),
        summary.pages_fetched,
        summary.pages_skipped,
        summary.rows_written,
        opts.output.display()
    );
    Ok(())
}

/* ---------------- dedupe ---------------- */

#[derive(Parser, Debug)]
#[command(name = "dedupe", about = "Remove duplicate rows from a scraped CSV")]
pub struct DedupeArgs {
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    pub input: PathBuf,
    /// Write here instead of rewriting --input in place.
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Columns forming the duplicate key (default: all).
    #[arg(long, num_args = 1.., default_values_t = POEM_COLUMNS.map(String::from))]
    pub key_columns: Vec<String>,
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

pub fn run_dedupe(args: &DedupeArgs) -> Result<()> {
    let opts = DedupeOptions {
        input: args.input.clone(),
        output: args.output.clone(),
        key_columns: args.key_columns.clone(),
    };
    dedupe::run(&opts).wrap_err_with(|| format!("deduplicating {}", opts.input.display()))?;
    Ok(())
}

/* ---------------- shortlist ---------------- */

#[derive(Parser, Debug)]
#[command(name = "shortlist", about = "Balanced shortlist of poems by typing difficulty (punctuation ignored)")]
pub struct ShortlistArgs {
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    pub poems_csv: PathBuf,
    /// Vanilla mod.paragraphs file to derive band ranges from.
    #[arg(long)]
    pub baseline: Option<PathBuf>,
    #[arg(long, default_value_t = DEFAULT_PER_BAND)]
    pub per_band: usize,
    #[arg(long, default_value = DEFAULT_SHORTLIST)]
    pub output: PathBuf,
    #[arg(long, default_value_t = DEFAULT_MAX_FETCH)]
    pub max_fetch: usize,
    #[arg(long, default_value_t = SHORTLIST_DELAY_SECS)]
    pub delay: f64,
    #[arg(long, default_value_t = SHORTLIST_TIMEOUT_SECS)]
    pub timeout: f64,
    #[arg(long, default_value_t = 1)]
    pub max_retries: u32,
    #[arg(long, default_value = CACHE_DIR)]
    pub cache_dir: PathBuf,
    /// Seeds the backoff jitter.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

pub fn run_shortlist(args: &ShortlistArgs) -> Result<()> {
    let defaults = ShortlistOptions::default();
    let opts = ShortlistOptions {
        poems_csv: args.poems_csv.clone(),
        baseline: args.baseline.clone(),
        per_band: args.per_band,
        output: args.output.clone(),
        max_fetch: args.max_fetch,
        delay: secs("delay", args.delay)?,
        cache_dir: args.cache_dir.clone(),
        fetch: FetchOptions {
            timeout: secs("timeout", args.timeout)?,
            max_retries: args.max_retries,
            seed: Some(args.seed),
            ..defaults.fetch
        },
    };
    shortlist::run(&opts)?;
    Ok(())
}

/* ---------------- bands ---------------- */

#[derive(Parser, Debug)]
#[command(name = "bands", about = "Build easy/medium/hard mod.paragraphs files from the shortlist")]
pub struct BandArgs {
    #[arg(long, default_value = DEFAULT_SHORTLIST)]
    pub shortlist: PathBuf,
    #[arg(long, default_value = DEFAULT_BAND_DIR)]
    pub out_dir: PathBuf,
    #[arg(long, default_value_t = DEFAULT_PER_BAND)]
    pub target_per_band: usize,
    #[arg(long, default_value_t = SHORTLIST_TIMEOUT_SECS)]
    pub timeout: f64,
    #[arg(long, default_value_t = BAND_FETCH_RETRIES)]
    pub max_retries: u32,
    #[arg(long, default_value = CACHE_DIR)]
    pub cache_dir: PathBuf,
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

pub fn run_bands(args: &BandArgs) -> Result<()> {
    let defaults = BandOptions::default();
    let opts = BandOptions {
        shortlist: args.shortlist.clone(),
        out_dir: args.out_dir.clone(),
        target_per_band: args.target_per_band,
        cache_dir: args.cache_dir.clone(),
        fetch: FetchOptions {
            timeout: secs("timeout", args.timeout)?,
            max_retries: args.max_retries,
            ..defaults.fetch
        },
    };
    bands::run(&opts)?;
    Ok(())
}

/* ---------------- compare ---------------- */

#[derive(Parser, Debug)]
#[command(name = "compare", about = "Compare paragraph sets and write metrics, summary and charts")]
pub struct CompareArgs {
    /// NAME=PATH, repeatable. Defaults to the three band files.
    #[arg(long = "dataset")]
    pub datasets: Vec<String>,
    #[arg(long, default_value = DEFAULT_GRAPH_DIR)]
    pub output_dir: PathBuf,
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

pub fn run_compare(args: &CompareArgs) -> Result<()> {
    let mut opts = CompareOptions { output_dir: args.output_dir.clone(), ..CompareOptions::default() };
    if !args.datasets.is_empty() {
        opts.datasets = args
            .datasets
            .iter()
            .map(|d| parse_dataset_spec(d))
            .collect::<Result<_, _>>()?;
    }
    compare::run(&opts)?;
    Ok(())
}

/* ---------------- forum_post ---------------- */

#[derive(Parser, Debug)]
#[command(name = "forum_post", about = "Format the shortlist into forum-style poem lists")]
pub struct ForumArgs {
    #[arg(long, default_value = DEFAULT_SHORTLIST)]
    pub input: PathBuf,
    /// Prints to stdout if omitted.
    #[arg(long)]
    pub output: Option<PathBuf>,
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

pub fn run_forum(args: &ForumArgs) -> Result<()> {
    let opts = ForumOptions { input: args.input.clone(), output: args.output.clone() };
    if let Some(text) = forum::run(&opts)? {
        let mut out = std::io::stdout().lock();
        out.write_all(text.as_bytes())?;
        out.flush()?;
    }
    Ok(())
}
