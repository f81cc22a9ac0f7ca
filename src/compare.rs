// src/compare.rs
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};

use crate::{
    chart,
    config::consts::HIST_BINS,
    config::options::CompareOptions,
    data::ParagraphMetrics,
    error::ToolError,
    file::{ensure_directory, ensure_parent, load_paragraphs, write_json},
    score::{normalize_typed, words_of},
};

pub const METRICS_FILE: &str = "paragraph_metrics.csv";
pub const SUMMARY_FILE: &str = "dataset_summary.json";
pub const BOXPLOT_FILE: &str = "boxplots_chars_words.png";
pub const HISTOGRAM_FILE: &str = "hist_typed_chars.png";
pub const SCATTER_FILE: &str = "scatter_words_vs_chars.png";
pub const MEANS_FILE: &str = "means_chars_words.png";

/// One named paragraph set with its per-paragraph metrics.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub name: String,
    pub rows: Vec<ParagraphMetrics>,
}

impl Dataset {
    fn column(&self, f: impl Fn(&ParagraphMetrics) -> f64) -> Vec<f64> {
        self.rows.iter().map(f).collect()
    }
}

pub fn compute_metrics(dataset: &str, index: usize, text: &str) -> ParagraphMetrics {
    let raw_chars = text.chars().count();
    let typed = normalize_typed(text);
    let typed_chars = typed.chars().count();
    let words: Vec<&str> = words_of(&typed).collect();
    let unique_words = words.iter().map(|w| w.to_lowercase()).collect::<HashSet<_>>().len();
    let avg_word_len = if words.is_empty() {
        0.0
    } else {
        words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / words.len() as f64
    };
    let punctuation_removed = raw_chars.saturating_sub(typed_chars);
    let punctuation_ratio = if raw_chars > 0 {
        punctuation_removed as f64 / raw_chars as f64
    } else {
        0.0
    };

    ParagraphMetrics {
        dataset: s!(dataset),
        index,
        raw_chars,
        typed_chars,
        words: words.len(),
        unique_words,
        avg_word_len,
        punctuation_removed,
        punctuation_ratio,
    }
}

pub fn load_dataset(name: &str, path: &Path) -> Result<Dataset, ToolError> {
    let rows: Vec<ParagraphMetrics> = load_paragraphs(path)?
        .iter()
        .enumerate()
        .map(|(i, text)| compute_metrics(name, i + 1, text))
        .collect();
    if rows.is_empty() {
        return Err(ToolError::EmptyDataset(s!(name)));
    }
    Ok(Dataset { name: s!(name), rows })
}

/* ---------------- Outputs ---------------- */

pub fn write_metrics_csv(path: &Path, datasets: &[Dataset]) -> Result<(), ToolError> {
    ensure_parent(path)?;
    let mut out = ::csv::Writer::from_path(path)?;
    out.write_record([
        "dataset",
        "index",
        "raw_chars",
        "typed_chars",
        "words",
        "unique_words",
        "avg_word_len",
        "punctuation_removed",
        "punctuation_ratio",
    ])?;
    for m in datasets.iter().flat_map(|d| &d.rows) {
        out.write_record([
            m.dataset.clone(),
            m.index.to_string(),
            m.raw_chars.to_string(),
            m.typed_chars.to_string(),
            m.words.to_string(),
            m.unique_words.to_string(),
            format!("{:.4}", m.avg_word_len),
            m.punctuation_removed.to_string(),
            format!("{:.6}", m.punctuation_ratio),
        ])?;
    }
    out.flush()?;
    Ok(())
}

fn mean(v: &[f64]) -> f64 {
    v.iter().sum::<f64>() / v.len() as f64
}

fn median(v: &[f64]) -> f64 {
    let mut s = v.to_vec();
    s.sort_by(f64::total_cmp);
    let mid = s.len() / 2;
    if s.len() % 2 == 0 { (s[mid - 1] + s[mid]) / 2.0 } else { s[mid] }
}

fn round_to(x: f64, places: i32) -> f64 {
    let f = 10f64.powi(places);
    (x * f).round() / f
}

/// Per-dataset summary, keyed by dataset name in input order.
/// Datasets are never empty (see `load_dataset`).
pub fn summary(datasets: &[Dataset]) -> Value {
    let mut out = Map::new();
    for d in datasets {
        let typed: Vec<usize> = d.rows.iter().map(|r| r.typed_chars).collect();
        let words: Vec<usize> = d.rows.iter().map(|r| r.words).collect();
        let typed_f = d.column(|r| r.typed_chars as f64);
        let words_f = d.column(|r| r.words as f64);

        out.insert(
            d.name.clone(),
            json!({
                "count": d.rows.len(),
                "typed_chars_mean": round_to(mean(&typed_f), 2),
                "typed_chars_median": round_to(median(&typed_f), 2),
                "typed_chars_min": typed.iter().min(),
                "typed_chars_max": typed.iter().max(),
                "words_mean": round_to(mean(&words_f), 2),
                "words_median": round_to(median(&words_f), 2),
                "words_min": words.iter().min(),
                "words_max": words.iter().max(),
                "unique_words_mean": round_to(mean(&d.column(|r| r.unique_words as f64)), 2),
                "punctuation_ratio_mean": round_to(mean(&d.column(|r| r.punctuation_ratio)), 4),
            }),
        );
    }
    Value::Object(out)
}

pub fn write_charts(dir: &Path, datasets: &[Dataset]) -> Result<(), ToolError> {
    let names: Vec<&str> = datasets.iter().map(|d| d.name.as_str()).collect();
    let typed: Vec<Vec<f64>> = datasets.iter().map(|d| d.column(|r| r.typed_chars as f64)).collect();
    let words: Vec<Vec<f64>> = datasets.iter().map(|d| d.column(|r| r.words as f64)).collect();
    let points: Vec<Vec<(f64, f64)>> = words
        .iter()
        .zip(&typed)
        .map(|(w, t)| w.iter().copied().zip(t.iter().copied()).collect())
        .collect();

    chart::boxplots(&dir.join(BOXPLOT_FILE), &names, &typed, &words)?;
    chart::histograms(&dir.join(HISTOGRAM_FILE), &names, &typed, HIST_BINS)?;
    chart::scatter(&dir.join(SCATTER_FILE), &names, &points)?;
    chart::mean_bars(
        &dir.join(MEANS_FILE),
        &names,
        &typed.iter().map(|v| mean(v)).collect::<Vec<_>>(),
        &words.iter().map(|v| mean(v)).collect::<Vec<_>>(),
    )?;
    Ok(())
}

/// Load every dataset, then write metrics CSV, summary JSON and charts.
pub fn run(opts: &CompareOptions) -> Result<Vec<PathBuf>, ToolError> {
    let datasets = opts
        .datasets
        .iter()
        .map(|(name, path)| load_dataset(name, path))
        .collect::<Result<Vec<_>, _>>()?;

    ensure_directory(&opts.output_dir)?;
    let dir = &opts.output_dir;
    write_metrics_csv(&dir.join(METRICS_FILE), &datasets)?;
    write_json(&dir.join(SUMMARY_FILE), &summary(&datasets))?;
    write_charts(dir, &datasets)?;

    logf!("Wrote analysis outputs to: {}", dir.display());
    for d in &datasets {
        logf!(
            "- {}: count={}, typed_chars_mean={:.1}, words_mean={:.1}",
            d.name,
            d.rows.len(),
            mean(&d.column(|r| r.typed_chars as f64)),
            mean(&d.column(|r| r.words as f64))
        );
    }

    Ok([METRICS_FILE, SUMMARY_FILE, BOXPLOT_FILE, HISTOGRAM_FILE, SCATTER_FILE, MEANS_FILE]
        .iter()
        .map(|f| dir.join(f))
        .collect())
}
