//! Human-friendly durations for intervals and cooldowns.

use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Suffix to milliseconds multiplier (longer suffixes first so `ms` wins over `s`)
const UNITS: &[(&str, f64)] = &[("ms", 1.0), ("min", 60_000.0), ("s", 1_000.0), ("m", 60_000.0)];

/// Parse `"2s"`, `"500ms"`, `"1.5s"` or `"1min"`. A bare number is seconds.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        bail!("Empty duration");
    }

    let (number, multiplier) = UNITS
        .iter()
        .find_map(|(suffix, mult)| s.strip_suffix(suffix).map(|n| (n.trim(), *mult)))
        .unwrap_or((s, 1_000.0));

    let value: f64 = number
        .parse()
        .with_context(|| format!("Invalid duration: {}", s))?;
    if !value.is_finite() || value < 0.0 {
        bail!("Duration must be a non-negative number: {}", s);
    }

    Ok(Duration::from_micros((value * multiplier * 1_000.0).round() as u64))
}

/// Compact rendering for the status bar, e.g. `2s`, `500ms`, `1.5s`.
pub fn format_duration(d: Duration) -> String {
    let millis = d.as_millis();
    if millis < 1_000 {
        format!("{}ms", millis)
    } else if millis % 1_000 == 0 {
        format!("{}s", millis / 1_000)
    } else {
        format!("{:.1}s", d.as_secs_f64())
    }
}
