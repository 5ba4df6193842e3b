use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Tokens dropped from person names before strict comparison.
pub const STOPWORDS: [&str; 7] = ["the", "mr", "mrs", "ms", "sir", "maam", "ma'am"];

/// Half-open minute range. `end` may exceed one day when the range wraps
/// past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeframe {
    pub start: u32,
    pub end: u32,
}

impl Timeframe {
    /// Length in minutes, floored at one so ratios never divide by zero.
    pub fn len_minutes(&self) -> u32 {
        self.end.saturating_sub(self.start).max(1)
    }
}

pub fn normalize_text(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sorted, deduplicated word tokens of `s`.
pub fn tokenize(s: &str, drop_stopwords: bool) -> Vec<String> {
    let normalized = normalize_text(s);
    normalized
        .split(|c: char| !is_word_char(c))
        .filter(|t| !t.is_empty())
        .filter(|t| !drop_stopwords || !STOPWORDS.contains(t))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn normalize_plate(s: &str) -> String {
    s.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

pub fn normalize_phone(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Parses `H`, `H:MM`, `Ham`, `H:MMpm` and friends into minutes since
/// midnight.
pub fn parse_clock_time(token: &str) -> Option<u32> {
    let caps = clock_re()?.captures(token)?;
    let hour = caps.get(1)?.as_str().parse::<u32>().ok()?;
    let minute = match caps.get(2) {
        Some(m) => m.as_str().parse::<u32>().ok()?,
        None => 0,
    };
    if hour > 24 || minute > 59 {
        return None;
    }

    let hour = match caps.get(3).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(suffix) if suffix == "am" && hour == 12 => 0,
        Some(suffix) if suffix == "pm" && hour != 12 => hour + 12,
        _ => hour,
    };
    Some((hour % 24) * 60 + minute)
}

/// Parses `20:10-20:20`, `8pm–8:20pm` or `20:10 to 20:20`. A range whose end
/// precedes its start is taken to wrap past midnight.
pub fn parse_timeframe(s: &str) -> Option<Timeframe> {
    let cleaned = s.trim().to_lowercase().replace(['\u{2014}', '\u{2013}'], "-");
    let parts: Vec<&str> = if cleaned.contains(" to ") {
        cleaned.split(" to ").collect()
    } else if cleaned.contains('-') {
        cleaned.split('-').collect()
    } else {
        return None;
    };

    let [first, second] = parts.as_slice() else {
        return None;
    };
    let start = parse_clock_time(first.trim())?;
    let mut end = parse_clock_time(second.trim())?;
    if end < start {
        end += MINUTES_PER_DAY;
    }
    Some(Timeframe { start, end })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn clock_re() -> Option<&'static Regex> {
    static CLOCK_RE: OnceLock<Option<Regex>> = OnceLock::new();
    CLOCK_RE
        .get_or_init(|| Regex::new(r"(?i)^\s*([0-9]{1,2})(?::([0-9]{2}))?\s*(am|pm)?\s*$").ok())
        .as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_folds_case_and_whitespace() {
        assert_eq!(normalize_text("  Market \t Road\n"), "market road");
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text("   "), "");
    }

    #[test]
    fn tokenize_sorts_dedups_and_drops_stopwords() {
        assert_eq!(
            tokenize("The Vendor, Imran the vendor", false),
            vec!["imran", "the", "vendor"]
        );
        assert_eq!(
            tokenize("Mr. Imran the Vendor", true),
            vec!["imran", "vendor"]
        );
        assert!(tokenize("--", true).is_empty());
    }

    #[test]
    fn plate_and_phone_keep_only_significant_chars() {
        assert_eq!(normalize_plate("ka-01 ab 1234"), "KA01AB1234");
        assert_eq!(normalize_phone("+91 98765-43210"), "919876543210");
    }

    #[test]
    fn clock_time_handles_twelve_hour_suffixes() {
        assert_eq!(parse_clock_time("20:10"), Some(1210));
        assert_eq!(parse_clock_time("8pm"), Some(1200));
        assert_eq!(parse_clock_time("8:20 PM"), Some(1220));
        assert_eq!(parse_clock_time("12am"), Some(0));
        assert_eq!(parse_clock_time("12pm"), Some(720));
        assert_eq!(parse_clock_time("24"), Some(0));
        assert_eq!(parse_clock_time("25:00"), None);
        assert_eq!(parse_clock_time("10:75"), None);
        assert_eq!(parse_clock_time("noon"), None);
    }

    #[test]
    fn timeframe_accepts_dashes_and_to() {
        assert_eq!(
            parse_timeframe("20:10-20:20"),
            Some(Timeframe { start: 1210, end: 1220 })
        );
        assert_eq!(
            parse_timeframe("8pm\u{2013}8:20pm"),
            Some(Timeframe { start: 1200, end: 1220 })
        );
        assert_eq!(
            parse_timeframe("20:10 to 20:20"),
            Some(Timeframe { start: 1210, end: 1220 })
        );
        assert_eq!(
            parse_timeframe("20:10\u{2014}20:20"),
            Some(Timeframe { start: 1210, end: 1220 })
        );
        assert_eq!(
            parse_timeframe("20:10 TO 20:20"),
            Some(Timeframe { start: 1210, end: 1220 })
        );
    }

    #[test]
    fn timeframe_wraps_past_midnight() {
        let tf = parse_timeframe("23:50-00:10").expect("wrapping range");
        assert_eq!(tf, Timeframe { start: 1430, end: 1450 });
        assert_eq!(tf.len_minutes(), 20);
    }

    #[test]
    fn timeframe_rejects_malformed_ranges() {
        assert_eq!(parse_timeframe("20:10"), None);
        assert_eq!(parse_timeframe("20:10-20:20-20:30"), None);
        assert_eq!(parse_timeframe("dusk-dawn"), None);
    }
}
