// src/chart.rs
//! Comparison charts, drawn with `plotters` into PNG bitmaps.
//!
//! Every chart carries a title, axis descriptions and either category labels
//! or a legend. Series colours follow the order the datasets were given in:
//! matplotlib's default cycle first, then `Palette99`.

use std::error::Error;
use std::ops::Range;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::ToolError;
use crate::file::ensure_parent;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
type DrawResult = Result<(), Box<dyn Error>>;

const TAB10: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

const FONT: &str = "sans-serif";
const TITLE_SIZE: u32 = 36;
const DESC_SIZE: u32 = 26;
const LABEL_SIZE: u32 = 22;

// Figure sizes at 150 dpi (14x5 in and 9x6 in).
pub const WIDE: (u32, u32) = (2100, 750);
pub const SQUARE: (u32, u32) = (1350, 900);

pub fn color(i: usize) -> RGBColor {
    match TAB10.get(i) {
        Some(c) => *c,
        None => {
            let (r, g, b) = Palette99::pick(i - TAB10.len()).rgb();
            RGBColor(r, g, b)
        }
    }
}

/* ---------------- Stats ---------------- */

/// Equal-width bins over the data's own range. Returns `(start, width, counts)`.
pub fn histogram(values: &[f64], bins: usize) -> Option<(f64, f64, Vec<usize>)> {
    if values.is_empty() || bins == 0 {
        return None;
    }
    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;
    let mut counts = vec![0; bins];
    for v in values {
        let i = (((v - lo) / width) as usize).min(bins - 1);
        counts[i] += 1;
    }
    Some((lo, width, counts))
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Range with 5% headroom on both sides; never zero-width.
fn padded((lo, hi): (f64, f64)) -> (f64, f64) {
    if lo == hi {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

/* ---------------- Plumbing ---------------- */

fn render(path: &Path, size: (u32, u32), draw: impl FnOnce(&Area<'_>) -> DrawResult) -> Result<(), ToolError> {
    ensure_parent(path)?;
    let root = BitMapBackend::new(path, size).into_drawing_area();
    paint(&root, draw).map_err(|e| ToolError::Chart { path: path.to_path_buf(), reason: e.to_string() })
}

fn paint(root: &Area<'_>, draw: impl FnOnce(&Area<'_>) -> DrawResult) -> DrawResult {
    root.fill(&WHITE)?;
    draw(root)?;
    root.present()?;
    Ok(())
}

/// Category axis: dataset `i` sits at `x = i`.
fn slots(n: usize) -> Range<f64> {
    -0.5..(n.max(1) as f64 - 0.5)
}

fn slot_label(names: &[&str], v: f64) -> String {
    let i = v.round();
    if (v - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    names.get(i as usize).map(|n| s!(*n)).unwrap_or_default()
}

/* ---------------- Panels ---------------- */

fn box_panel(area: &Area<'_>, title: &str, y_desc: &str, names: &[&str], series: &[Vec<f64>]) -> DrawResult {
    let quartiles: Vec<Option<Quartiles>> = series
        .iter()
        .map(|v| (!v.is_empty()).then(|| Quartiles::new(v.as_slice())))
        .collect();
    let fences = quartiles.iter().flatten().flat_map(|q| q.values().map(f64::from));
    let (lo, hi) = padded(extent(series.iter().flatten().copied().chain(fences)).unwrap_or((0.0, 1.0)));

    let labels = |v: &f64| slot_label(names, *v);
    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, TITLE_SIZE))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(slots(names.len()), lo as f32..hi as f32)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .light_line_style(WHITE)
        .bold_line_style(BLACK.mix(0.25))
        .x_labels(names.len())
        .x_label_formatter(&labels)
        .y_desc(y_desc)
        .axis_desc_style((FONT, DESC_SIZE))
        .label_style((FONT, LABEL_SIZE))
        .draw()?;

    for (i, (q, values)) in quartiles.iter().zip(series).enumerate() {
        let Some(q) = q else { continue };
        let (x, c) = (i as f64, color(i));
        chart.draw_series(std::iter::once(
            Boxplot::new_vertical(x, q).width(80).whisker_width(0.5).style(c.stroke_width(3)),
        ))?;
        let [fence_lo, .., fence_hi] = q.values();
        chart.draw_series(
            values
                .iter()
                .map(|v| *v as f32)
                .filter(|v| *v < fence_lo || *v > fence_hi)
                .map(|v| Circle::new((x, v), 5, c.filled())),
        )?;
    }
    Ok(())
}

fn bar_panel(area: &Area<'_>, title: &str, y_desc: &str, names: &[&str], means: &[f64]) -> DrawResult {
    let top = means.iter().copied().fold(0.0, f64::max);
    let ymax = if top > 0.0 { top * 1.1 } else { 1.0 };
    let labels = |v: &f64| slot_label(names, *v);
    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, TITLE_SIZE))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(slots(names.len()), 0.0..ymax)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .light_line_style(WHITE)
        .bold_line_style(BLACK.mix(0.25))
        .x_labels(names.len())
        .x_label_formatter(&labels)
        .y_desc(y_desc)
        .axis_desc_style((FONT, DESC_SIZE))
        .label_style((FONT, LABEL_SIZE))
        .draw()?;

    chart.draw_series(means.iter().enumerate().map(|(i, m)| {
        let x = i as f64;
        Rectangle::new([(x - 0.35, 0.0), (x + 0.35, *m)], color(i).filled())
    }))?;
    Ok(())
}

/* ---------------- Charts ---------------- */

/// Side-by-side box plots (typed chars left, words right), one box per dataset.
pub fn boxplots(path: &Path, names: &[&str], typed: &[Vec<f64>], words: &[Vec<f64>]) -> Result<(), ToolError> {
    render(path, WIDE, |root| {
        let panels = root.split_evenly((1, 2));
        box_panel(&panels[0], "Typed Characters (punctuation ignored)", "Characters", names, typed)?;
        box_panel(&panels[1], "Word Count", "Words", names, words)
    })
}

/// Overlaid translucent histograms of typed chars, each over its own data range.
pub fn histograms(path: &Path, names: &[&str], series: &[Vec<f64>], bins: usize) -> Result<(), ToolError> {
    let hists: Vec<_> = series.iter().map(|v| histogram(v, bins)).collect();
    let (x0, x1) = padded(
        extent(hists.iter().flatten().flat_map(|(lo, w, c)| [*lo, lo + w * c.len() as f64]))
            .unwrap_or((0.0, 1.0)),
    );
    let ymax = hists.iter().flatten().flat_map(|(_, _, c)| c.iter().copied()).max().unwrap_or(1);

    render(path, SQUARE, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption("Distribution of Typed Characters", (FONT, TITLE_SIZE))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(80)
            .build_cartesian_2d(x0..x1, 0.0..ymax.max(1) as f64 * 1.05)?;
        chart
            .configure_mesh()
            .light_line_style(WHITE)
            .bold_line_style(BLACK.mix(0.25))
            .x_desc("Typed characters")
            .y_desc("Count")
            .axis_desc_style((FONT, DESC_SIZE))
            .label_style((FONT, LABEL_SIZE))
            .draw()?;

        for (i, (name, hist)) in names.iter().zip(&hists).enumerate() {
            let Some((lo, width, counts)) = hist else { continue };
            let c = color(i);
            chart
                .draw_series(counts.iter().enumerate().filter(|(_, n)| **n > 0).map(|(k, n)| {
                    let left = lo + width * k as f64;
                    Rectangle::new([(left, 0.0), (left + width, *n as f64)], c.mix(0.5).filled())
                }))?
                .label(*name)
                .legend(move |(x, y)| Rectangle::new([(x, y - 8), (x + 16, y + 8)], c.mix(0.5).filled()));
        }
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK.mix(0.3))
            .label_font((FONT, LABEL_SIZE))
            .draw()?;
        Ok(())
    })
}

/// Scatter of `(words, typed_chars)` points per dataset.
pub fn scatter(path: &Path, names: &[&str], series: &[Vec<(f64, f64)>]) -> Result<(), ToolError> {
    let (x0, x1) = padded(extent(series.iter().flatten().map(|p| p.0)).unwrap_or((0.0, 1.0)));
    let (y0, y1) = padded(extent(series.iter().flatten().map(|p| p.1)).unwrap_or((0.0, 1.0)));

    render(path, SQUARE, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption("Words vs Typed Characters", (FONT, TITLE_SIZE))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(90)
            .build_cartesian_2d(x0..x1, y0..y1)?;
        chart
            .configure_mesh()
            .light_line_style(WHITE)
            .bold_line_style(BLACK.mix(0.25))
            .x_desc("Words")
            .y_desc("Typed characters")
            .axis_desc_style((FONT, DESC_SIZE))
            .label_style((FONT, LABEL_SIZE))
            .draw()?;

        for (i, (name, points)) in names.iter().zip(series).enumerate() {
            let c = color(i);
            chart
                .draw_series(points.iter().map(|&p| Circle::new(p, 6, c.mix(0.8).filled())))?
                .label(*name)
                .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 12, y + 6)], c.mix(0.8).filled()));
        }
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK.mix(0.3))
            .label_font((FONT, LABEL_SIZE))
            .draw()?;
        Ok(())
    })
}

/// Mean typed chars (left) and mean words (right) per dataset.
pub fn mean_bars(path: &Path, names: &[&str], typed: &[f64], words: &[f64]) -> Result<(), ToolError> {
    render(path, WIDE, |root| {
        let panels = root.split_evenly((1, 2));
        bar_panel(&panels[0], "Average Typed Characters", "Characters", names, typed)?;
        bar_panel(&panels[1], "Average Word Count", "Words", names, words)
    })
}
