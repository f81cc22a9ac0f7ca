// src/lib.rs

#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod specs;

pub mod data;
pub mod error;

pub mod checkpoint;
pub mod csv;
pub mod fetch;
pub mod file;
pub mod progress;
pub mod scrape;

pub mod dedupe;
pub mod store;

pub mod bands;
pub mod chart;
pub mod compare;
pub mod forum;
pub mod score;
pub mod shortlist;
