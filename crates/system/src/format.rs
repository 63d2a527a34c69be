/// Text shown when the host has no time estimate.
pub const UNKNOWN_TIME: &str = "∞ weeks";

/// `(unit, divisor to the next unit)`; the last unit has no divisor.
const UNITS: [(&str, Option<f64>); 5] = [
    ("seconds", Some(60.0)),
    ("minutes", Some(60.0)),
    ("hours",   Some(24.0)),
    ("days",    Some(7.0)),
    ("weeks",   None),
];

/// Format a duration in seconds as a compact string (e.g. `"2.0 hours"`).
///
/// The value is divided up through the unit table for as long as it reaches
/// the current unit's divisor, then printed with one decimal.  Weeks is the
/// largest unit.  `None`, infinite and NaN inputs mean "no estimate" and
/// yield [`UNKNOWN_TIME`]; negative inputs are treated as zero.
pub fn format_time(seconds: Option<f64>) -> String {
    let Some(mut value) = seconds.filter(|s| s.is_finite()) else {
        return UNKNOWN_TIME.to_string();
    };
    value = value.max(0.0);

    let mut unit = 0;
    while let Some(divisor) = UNITS[unit].1 {
        if value < divisor {
            break;
        }
        value /= divisor;
        unit += 1;
    }

    format!("{value:.1} {}", UNITS[unit].0)
}

/// Render a percentage with three significant digits (`55` → `"55.0"`,
/// `100` → `"100"`, `9.5` → `"9.50"`).
///
/// Values of 1000 and above are printed without decimals.
pub fn format_percentage(percentage: f64) -> String {
    const DIGITS: i32 = 3;

    if !percentage.is_finite() {
        return percentage.to_string();
    }
    if percentage == 0.0 {
        return format!("{:.prec$}", 0.0, prec = (DIGITS - 1) as usize);
    }

    let exponent = percentage.abs().log10().floor() as i32;
    let mut decimals = (DIGITS - 1 - exponent).max(0);
    let mut text = format!("{percentage:.prec$}", prec = decimals as usize);

    // Rounding may carry into a new leading digit (99.95 → "100.0").
    let carried = text
        .parse::<f64>()
        .map(|rounded| rounded.abs() >= 10f64.powi(exponent + 1))
        .unwrap_or(false);
    if carried && decimals > 0 {
        decimals -= 1;
        text = format!("{percentage:.prec$}", prec = decimals as usize);
    }

    text
}
