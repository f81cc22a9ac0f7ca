// src/config/consts.rs

// Net config
pub const LISTING_URL_TEMPLATE: &str =
    "https://www.public-domain-poetry.com/listpoetry.php?letter=All&page={page}";
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; PoetryScraper/1.0; +https://example.com)";
pub const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
pub const BACKOFF_CAP_SECS: f64 = 60.0;

// Scrape
pub const DEFAULT_START_PAGE: u32 = 1;
pub const DEFAULT_END_PAGE: u32 = 771;
pub const DEFAULT_OUTPUT: &str = "poems.csv";
pub const DEFAULT_CHECKPOINT: &str = "checkpoint.json";
pub const DEFAULT_DELAY_SECS: f64 = 0.5;
pub const DEFAULT_TIMEOUT_SECS: f64 = 30.0;
pub const DEFAULT_MAX_RETRIES: u32 = 8;

/// Fixed column order of `poems.csv`.
pub const POEM_COLUMNS: [&str; 5] = ["title", "link", "lines", "views", "source_page"];

// Local cache
pub const CACHE_DIR: &str = ".cache/poem_pages";
pub const CACHE_EXT: &str = "html";

// Shortlist
pub const DEFAULT_SHORTLIST: &str = "shortlist_candidates.csv";
pub const DEFAULT_PER_BAND: usize = 10;
pub const DEFAULT_MAX_FETCH: usize = 300;
pub const SHORTLIST_DELAY_SECS: f64 = 0.2;
pub const SHORTLIST_TIMEOUT_SECS: f64 = 20.0;
pub const POOL_MIN_LINES: u64 = 8;
pub const POOL_MAX_LINES: u64 = 60;
pub const SAMPLE_TEXT_CHARS: usize = 300;
pub const DEFAULT_SEED: u64 = 42;

// Bands
pub const BANDS: [&str; 3] = ["easy", "medium", "hard"];
pub const DEFAULT_BAND_DIR: &str = "band_mods";
pub const MOD_FILE_PREFIX: &str = "mod.paragraphs";
pub const BAND_FETCH_RETRIES: u32 = 3;

// Compare
pub const DEFAULT_GRAPH_DIR: &str = "analysis_graphs";
pub const HIST_BINS: usize = 8;
