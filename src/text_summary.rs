//! Text summary builder for CLI output.
//!
//! Formats human-readable lines describing the plotted matrix for `--text`.

use crate::model::{MatrixSummary, MedianPolicy};

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// Build a text summary from a finished run.
pub(crate) fn build_text_summary(summary: &MatrixSummary) -> TextSummary {
    let mut lines = Vec::new();

    lines.push(format!("Input: {}", summary.input.display()));
    let total_pairs = summary.cores * summary.cores.saturating_sub(1) / 2;
    lines.push(format!(
        "Cores: {} ({} of {} pairs measured)",
        summary.cores, summary.pairs, total_pairs
    ));

    let median_scope = match summary.median_policy {
        MedianPolicy::Pairs => "pairs",
        MedianPolicy::Full => "all cells",
    };
    lines.push(format!(
        "Latency: min {:.1} ns, median {:.1} ns ({}), max {:.1} ns",
        summary.stats.min, summary.stats.median, median_scope, summary.stats.max
    ));

    if summary.vmin != summary.stats.min || summary.vmax != summary.stats.max {
        lines.push(format!(
            "Color range: {:.1} .. {:.1} ns",
            summary.vmin, summary.vmax
        ));
    }

    match summary.output.as_deref() {
        Some(path) => lines.push(format!("Output: {}", path.display())),
        None => lines.push("Output: terminal".to_string()),
    }

    TextSummary { lines }
}
