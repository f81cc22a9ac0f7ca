// src/specs/mod.rs
//! # Page specs
//!
//! Page-specific extraction for public-domain-poetry.com. Each spec knows
//! *where the data lives in the HTML* of one kind of page and nothing else.
//!
//! ## What lives here
//! - **Pure HTML parsing** (`scraper` selectors + `core::html` helpers).
//! - **Row-level tolerance**: rows missing required cells are skipped, never fatal.
//! - **Page-level errors** (`ParseError`) when the expected structure is absent;
//!   the caller decides whether that skips the page or aborts the run.
//!
//! ## What does **not** live here
//! - Fetching, retries, caching (`fetch`, `store`).
//! - CSV writing and checkpointing (`csv`, `checkpoint`, `scrape`).
//!
//! ## Typical call chain
//! ```text
//! scrape::Scraper ─ Fetcher::fetch(p) → specs::listing::extract(html, p, url)
//!                                      ↘ CsvSink::append → CheckpointStore::save
//! shortlist / bands ─ HtmlCache::get_or_fetch(link) → specs::poem::extract_*
//! ```
//!
//! ## Testing notes
//! Specs are tested offline against inline HTML fixtures.
pub mod listing;
pub mod poem;
