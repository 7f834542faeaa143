//! Display formatting shared by the terminal UI and the CLI.

use chrono::{DateTime, NaiveDate};

/// Five-character star rating: `★` per whole point, then `☆` for a half
/// point and for each remaining empty slot.
pub fn stars(rating: f64) -> String {
    let rating = rating.clamp(0.0, 5.0);
    let full = rating.floor() as usize;
    let half = rating.fract() >= 0.5;
    let empty = 5 - full - usize::from(half);

    let mut out = "★".repeat(full);
    if half {
        out.push('☆');
    }
    out.push_str(&"☆".repeat(empty));
    out
}

/// Truncates to `max_chars` characters, appending `...` when cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{cut}...")
}

/// US-dollar amount: `$1,234.50`, `-$3.00`.
pub fn format_price(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = cents / 100;
    let rest = cents % 100;

    let digits = dollars.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{rest:02}")
}

/// Long US date (`March 5, 2024`) from an RFC 3339 timestamp or a plain
/// `YYYY-MM-DD` date. Unparseable input is returned unchanged.
pub fn format_date(value: &str) -> String {
    let value = value.trim();
    let date = DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(value.get(..10).unwrap_or(value), "%Y-%m-%d"));

    match date {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stars() {
        assert_eq!(stars(4.5), "★★★★☆");
        assert_eq!(stars(4.2), "★★★★☆");
        assert_eq!(stars(3.0), "★★★☆☆");
        assert_eq!(stars(0.0), "☆☆☆☆☆");
        assert_eq!(stars(7.0), "★★★★★");
        assert_eq!(stars(2.5).chars().count(), 5);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 4), "abcd...");
        assert_eq!(truncate("héllo wörld", 5), "héllo...");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(99.99), "$99.99");
        assert_eq!(format_price(0.0), "$0.00");
        assert_eq!(format_price(1234.5), "$1,234.50");
        assert_eq!(format_price(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_price(-3.0), "-$3.00");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-03-05T10:15:00Z"), "March 5, 2024");
        assert_eq!(format_date("2023-12-25"), "December 25, 2023");
        assert_eq!(format_date("2023-12-25T08:00:00"), "December 25, 2023");
        assert_eq!(format_date("yesterday"), "yesterday");
    }
}
