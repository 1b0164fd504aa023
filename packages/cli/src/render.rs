//! Plain-text rendering of dashboard output.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use homescope_analytics::ValueFormat;
use homescope_analytics::format::infer_variable;
use homescope_dashboard::{DashboardView, ForecastTeaser, Leaderboards, MarketEntry};
use homescope_market_models::Variable;

/// Renders the visible chart window as a table plus legend.
#[must_use]
pub fn chart(view: &DashboardView) -> String {
    let mut out = String::new();

    if view.rows.is_empty() {
        out.push_str("No data for this selection.\n");
        if let Some(hint) = &view.hint {
            let _ = writeln!(out, "Hint: {hint}");
        }
        return out;
    }

    let labels: Vec<&str> = view.legend.iter().map(|e| e.label.as_str()).collect();
    let formats: Vec<ValueFormat> = labels
        .iter()
        .map(|l| ValueFormat::for_optional(infer_variable(l, &view.variables)))
        .collect();
    let width = labels.iter().map(|l| l.len()).max().unwrap_or(0).max(12);

    let _ = write!(out, "{:<10}", "Date");
    for label in &labels {
        let _ = write!(out, "  {label:>width$}");
    }
    out.push('\n');

    for row in &view.rows {
        let _ = write!(out, "{:<10}", row.date.format("%Y-%m-%d"));
        for (label, fmt) in labels.iter().zip(&formats) {
            let cell = row
                .values
                .get(*label)
                .map_or_else(|| "-".to_string(), |v| fmt.format(*v));
            let _ = write!(out, "  {cell:>width$}");
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "\nShowing {} of {} rows ({:.0}% to {:.0}%)",
        view.rows.len(),
        view.total_rows,
        view.range.start,
        view.range.end
    );

    for entry in &view.legend {
        let _ = writeln!(
            out,
            "  {} {}: {} ({})",
            entry.color, entry.label, entry.last_value_text, entry.percent_change_text
        );
    }

    if let Some(hint) = &view.hint {
        let _ = writeln!(out, "Hint: {hint}");
    }

    out
}

/// Renders the metric picker groups.
#[must_use]
pub fn catalog(groups: &BTreeMap<String, Vec<Variable>>) -> String {
    let mut out = String::new();
    for (category, vars) in groups {
        let _ = writeln!(out, "{category}");
        for v in vars {
            let _ = writeln!(out, "  {:<32} {}", v.key, v.label);
        }
    }
    if out.is_empty() {
        out.push_str("No matching metrics.\n");
    }
    out
}

fn market_lines(out: &mut String, title: &str, entries: &[MarketEntry]) {
    let _ = writeln!(out, "{title}");
    for (i, e) in entries.iter().enumerate() {
        let _ = writeln!(out, "  {:>2}. {:<24} {}", i + 1, e.name, e.formatted_value());
    }
}

/// Renders both leaderboards.
#[must_use]
pub fn leaderboards(boards: &Leaderboards) -> String {
    let mut out = String::new();
    market_lines(&mut out, "Highest markets", &boards.highest);
    out.push('\n');
    market_lines(&mut out, "Lowest markets", &boards.lowest);
    out
}

/// Renders the forecast teaser.
#[must_use]
pub fn forecast(teaser: &ForecastTeaser) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n{}", teaser.title, teaser.headline);
    for (name, change) in &teaser.rows {
        let _ = writeln!(out, "  {name:<24} {change}");
    }
    if teaser.hidden > 0 {
        let _ = writeln!(out, "  ... {} more markets locked", teaser.hidden);
    }
    if let Some(cta) = &teaser.cta {
        let _ = writeln!(out, "{cta}");
    }
    out
}
