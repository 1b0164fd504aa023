//! Value formatting for axis ticks, tooltips, and the legend.
//!
//! All three surfaces go through [`ValueFormat::format`] so a value always
//! renders the same way wherever it appears.
//!
//! | value type | period-change metric | output for `v` |
//! |---|---|---|
//! | currency | either | `$1,235` (whole dollars) |
//! | percent | no | `v × 100` with two decimals, e.g. `8.50%` |
//! | percent | yes | `v` with two decimals, e.g. `-11.50%` |
//! | number / none | no | grouped, up to three decimals, e.g. `1,234.568` |
//! | number / none | yes | `v` with two decimals, e.g. `4.20%` |

use homescope_market_models::{ValueType, Variable};
use homescope_variables::is_period_change_metric;

/// How values of one metric are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValueFormat {
    /// Declared value type, if any.
    pub value_type: Option<ValueType>,
    /// Whether the metric charts a precomputed period-over-period change.
    pub period_change: bool,
}

impl ValueFormat {
    /// Builds the format for a catalog variable.
    #[must_use]
    pub fn for_variable(variable: &Variable) -> Self {
        Self {
            value_type: variable.value_type,
            period_change: is_period_change_metric(&variable.key),
        }
    }

    /// Builds the format for an optional variable; unknown variables render
    /// as plain numbers.
    #[must_use]
    pub fn for_optional(variable: Option<&Variable>) -> Self {
        variable.map(Self::for_variable).unwrap_or_default()
    }

    /// Renders `value`.
    #[must_use]
    pub fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return "N/A".to_string();
        }
        match (self.value_type, self.period_change) {
            (Some(ValueType::Currency), _) => format_currency(value),
            (Some(ValueType::Percent), false) => format_percent(value * 100.0),
            (_, true) => format_percent(value),
            (Some(ValueType::Number) | None, false) => format_decimal(value, 3, true),
        }
    }

    /// Renders a y-axis tick label.
    #[must_use]
    pub fn axis_tick(&self, value: f64) -> String {
        self.format(value)
    }

    /// Renders a tooltip line for one series.
    #[must_use]
    pub fn tooltip(&self, label: &str, value: f64) -> String {
        format!("{label}: {}", self.format(value))
    }

    /// Renders the legend's latest-value text.
    #[must_use]
    pub fn legend(&self, value: Option<f64>) -> String {
        value.map_or_else(|| "N/A".to_string(), |v| self.format(v))
    }
}

/// Picks the variable a series label belongs to.
///
/// With a single selected variable every series belongs to it. Otherwise
/// the label is expected to end with `" - <variable label>"`.
#[must_use]
pub fn infer_variable<'a>(label: &str, selected: &'a [Variable]) -> Option<&'a Variable> {
    if let [only] = selected {
        return Some(only);
    }
    selected
        .iter()
        .find(|v| label.ends_with(&format!(" - {}", v.label)))
}

/// Renders a signed percent change for the legend, e.g. `+4.20%`.
#[must_use]
pub fn format_percent_change(change: Option<f64>) -> String {
    match change {
        Some(c) if c.is_finite() => {
            let body = format_percent(c);
            if body.starts_with('-') || format_decimal(c, 2, false) == "0.00" {
                body
            } else {
                format!("+{body}")
            }
        }
        _ => "N/A".to_string(),
    }
}

/// Whole-dollar US currency, rounding half away from zero.
#[must_use]
pub fn format_currency(value: f64) -> String {
    let rounded = value.round();
    let body = format_decimal(rounded.abs(), 0, false);
    if rounded < 0.0 {
        format!("-${body}")
    } else {
        format!("${body}")
    }
}

/// Two-decimal percentage of an already-scaled value.
#[must_use]
pub fn format_percent(value: f64) -> String {
    format!("{}%", format_decimal(value, 2, false))
}

/// Groups the integer part with commas and keeps `decimals` fraction
/// digits, optionally trimming trailing zeros.
#[must_use]
pub fn format_decimal(value: f64, decimals: usize, trim_zeros: bool) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let frac = if trim_zeros {
        frac_part.trim_end_matches('0')
    } else {
        frac_part
    };

    let mut out = group_thousands(int_part);
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }

    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    if value.is_sign_negative() && !is_zero {
        out.insert(0, '-');
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
