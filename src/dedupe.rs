// src/dedupe.rs
use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use ::csv::{ReaderBuilder, WriterBuilder};
use tempfile::NamedTempFile;

use crate::config::options::DedupeOptions;
use crate::error::DedupeError;
use crate::file::ensure_parent;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DedupeStats {
    pub total: usize,
    pub kept: usize,
}

impl DedupeStats {
    pub fn removed(&self) -> usize {
        self.total - self.kept
    }
}

/// Copy `input` to `output` keeping the first row of each distinct key tuple.
/// Key cells are compared trimmed; kept rows are written unchanged. The result
/// goes through a temp file beside `output`, so `output` may equal `input`.
pub fn dedupe(input: &Path, output: &Path, key_columns: &[String]) -> Result<DedupeStats, DedupeError> {
    if !input.is_file() {
        return Err(DedupeError::InputMissing(input.to_path_buf()));
    }
    ensure_parent(output)?;
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    let stats = dedupe_stream(File::open(input)?, tmp.as_file_mut(), key_columns)?;
    tmp.as_file().sync_all()?;
    tmp.persist(output).map_err(|e| e.error)?;
    Ok(stats)
}

/// Rewrite `input` with its duplicates removed.
pub fn dedupe_in_place(input: &Path, key_columns: &[String]) -> Result<DedupeStats, DedupeError> {
    dedupe(input, input, key_columns)
}

pub fn run(opts: &DedupeOptions) -> Result<DedupeStats, DedupeError> {
    let stats = match &opts.output {
        Some(out) => dedupe(&opts.input, out, &opts.key_columns)?,
        None => dedupe_in_place(&opts.input, &opts.key_columns)?,
    };
    logf!(
        "Read {} rows, kept {}, removed {} duplicates",
        stats.total,
        stats.kept,
        stats.removed()
    );
    Ok(stats)
}

fn dedupe_stream<R: Read, W: Write>(
    input: R,
    output: W,
    key_columns: &[String],
) -> Result<DedupeStats, DedupeError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(DedupeError::NoHeader);
    }

    let missing: Vec<String> = key_columns
        .iter()
        .filter(|k| !headers.iter().any(|h| h == k.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(DedupeError::MissingColumns(missing));
    }
    let key_idx: Vec<usize> = key_columns
        .iter()
        .filter_map(|k| headers.iter().position(|h| h == k.as_str()))
        .collect();

    let mut wtr = WriterBuilder::new().flexible(true).from_writer(output);
    wtr.write_record(&headers)?;

    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut stats = DedupeStats { total: 0, kept: 0 };

    for record in rdr.records() {
        let record = record?;
        stats.total += 1;
        let key = key_idx
            .iter()
            .map(|&i| record.get(i).unwrap_or("").trim().to_owned())
            .collect();
        if seen.insert(key) {
            wtr.write_record(&record)?;
            stats.kept += 1;
        }
    }
    wtr.flush()?;
    Ok(stats)
}
