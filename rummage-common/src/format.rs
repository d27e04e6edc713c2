//! Display parsing and formatting for durations, view counts, and ratings
//!
//! Sources report these fields in wildly different shapes (`"7:29"`, `"449"`,
//! `"1.2K views"`, `"94%"`, `"4.7"`). Adapters normalize through these
//! helpers so every `SearchResult` carries one canonical form.

/// Parse a duration string into seconds.
///
/// Accepts `H:MM:SS`, `M:SS`, a bare number of seconds, or the `"12 min"`
/// style some listing pages use. Returns `None` for anything unparseable.
///
/// # Examples
///
/// ```
/// use rummage_common::format::parse_duration_text;
///
/// assert_eq!(parse_duration_text("7:29"), Some(449));
/// assert_eq!(parse_duration_text("1:02:03"), Some(3723));
/// assert_eq!(parse_duration_text("449"), Some(449));
/// assert_eq!(parse_duration_text("12 min"), Some(720));
/// assert_eq!(parse_duration_text("n/a"), None);
/// ```
pub fn parse_duration_text(text: &str) -> Option<u64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let lower = text.to_ascii_lowercase();
    for (suffix, multiplier) in [("mins", 60), ("min", 60), ("secs", 1), ("sec", 1)] {
        if let Some(number) = lower.strip_suffix(suffix) {
            return number.trim().parse::<u64>().ok().map(|n| n * multiplier);
        }
    }

    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() > 3 {
        return None;
    }

    let mut seconds: u64 = 0;
    for part in &parts {
        let value: u64 = part.trim().parse().ok()?;
        seconds = seconds * 60 + value;
    }
    Some(seconds)
}

/// Format seconds as the canonical display duration: `H:MM:SS` at an hour
/// or more, `M:SS` below.
///
/// # Examples
///
/// ```
/// use rummage_common::format::format_duration;
///
/// assert_eq!(format_duration(449), "7:29");
/// assert_eq!(format_duration(3723), "1:02:03");
/// assert_eq!(format_duration(59), "0:59");
/// ```
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}

/// Parse a view count with K/M suffix awareness.
///
/// Accepts `"12345"`, `"12,345"`, `"1.2K"`, `"3M"`, `"1.2K views"`.
///
/// # Examples
///
/// ```
/// use rummage_common::format::parse_views_text;
///
/// assert_eq!(parse_views_text("12,345"), Some(12345));
/// assert_eq!(parse_views_text("1.2K"), Some(1200));
/// assert_eq!(parse_views_text("3M views"), Some(3_000_000));
/// ```
pub fn parse_views_text(text: &str) -> Option<u64> {
    let cleaned: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',' || matches!(c, 'k' | 'K' | 'm' | 'M'))
        .filter(|c| *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let (number_part, multiplier) = match cleaned.chars().last() {
        Some('k') | Some('K') => (&cleaned[..cleaned.len() - 1], 1_000.0),
        Some('m') | Some('M') => (&cleaned[..cleaned.len() - 1], 1_000_000.0),
        _ => (cleaned.as_str(), 1.0),
    };

    let value: f64 = number_part.parse().ok()?;
    if value < 0.0 {
        return None;
    }
    Some((value * multiplier).round() as u64)
}

/// Format a view count compactly: `1.2M`, `3.4K`, or the plain number.
///
/// # Examples
///
/// ```
/// use rummage_common::format::format_views;
///
/// assert_eq!(format_views(432), "432");
/// assert_eq!(format_views(1200), "1.2K");
/// assert_eq!(format_views(3_000_000), "3M");
/// ```
pub fn format_views(count: u64) -> String {
    fn compact(value: f64, suffix: &str) -> String {
        let rounded = (value * 10.0).round() / 10.0;
        if (rounded - rounded.trunc()).abs() < f64::EPSILON {
            format!("{}{}", rounded.trunc() as u64, suffix)
        } else {
            format!("{:.1}{}", rounded, suffix)
        }
    }

    if count >= 1_000_000 {
        compact(count as f64 / 1_000_000.0, "M")
    } else if count >= 1_000 {
        compact(count as f64 / 1_000.0, "K")
    } else {
        count.to_string()
    }
}

/// Normalize a rating onto the 0-100 percent scale.
///
/// Values at or below 5.0 are treated as a 5-star scale; everything else is
/// clamped to 0..=100. Percent signs and surrounding text are the caller's
/// problem; this takes the already-parsed number.
pub fn normalize_rating(value: f64) -> f64 {
    let percent = if value <= 5.0 { value * 20.0 } else { value };
    percent.clamp(0.0, 100.0)
}
