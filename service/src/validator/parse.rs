//! Literal parsers shared by the validator and the workbook decoder

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::str::FromStr;

// Optional sign, digits with optional thousands grouping, optional fraction.
static DECIMAL_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[+-]?(?:\d{1,3}(?:,\d{3})+|\d+)?(?:\.\d+)?$").ok());

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parse a decimal literal
///
/// Accepts surrounding whitespace, an optional sign, `,` thousands separators
/// and a `.` fraction. Exponents, currency symbols and non-finite values are
/// rejected.
#[must_use]
pub fn parse_decimal(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    if !DECIMAL_RE.as_ref()?.is_match(trimmed) {
        return None;
    }
    trimmed
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// Compare a decimal literal against a numeric bound
///
/// `number` is the literal as parsed by [`parse_decimal`]. The comparison is
/// exact on the decimal text (`120.0000000000000001` is above `120`) and
/// falls back to `f64` only when either side is outside the range of
/// [`Decimal`].
#[must_use]
pub fn compare_to_bound(value: &str, number: f64, bound: f64) -> Ordering {
    match (exact_decimal(value), Decimal::from_str(&bound.to_string()).ok()) {
        (Some(value), Some(bound)) => value.cmp(&bound),
        _ => number.partial_cmp(&bound).unwrap_or(Ordering::Equal),
    }
}

fn exact_decimal(value: &str) -> Option<Decimal> {
    let cleaned = value.trim().replace(',', "");
    let unsigned = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    let (negative, digits) = match unsigned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, unsigned),
    };
    let magnitude = if digits.starts_with('.') {
        Decimal::from_str(&format!("0{digits}")).ok()?
    } else {
        Decimal::from_str(digits).ok()?
    };
    Some(if negative { -magnitude } else { magnitude })
}

/// Parse a calendar date, with or without a time component
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Parse a boolean literal (`true`/`false`/`yes`/`no`, case-insensitive)
///
/// `Yes`/`No` are the choices offered by generated workbooks, so they are
/// accepted alongside the plain literals.
#[must_use]
pub fn parse_boolean(value: &str) -> Option<bool> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("yes") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") || trimmed.eq_ignore_ascii_case("no") {
        Some(false)
    } else {
        None
    }
}

/// Render a number the way decoded cells are rendered (`42`, `17.5`)
#[must_use]
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // Avoid "-0"
        return "0".to_string();
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("17"), Some(17.0));
        assert_eq!(parse_decimal(" -3.25 "), Some(-3.25));
        assert_eq!(parse_decimal("+0.5"), Some(0.5));
        assert_eq!(parse_decimal(".5"), Some(0.5));
        assert_eq!(parse_decimal("1,234.50"), Some(1234.5));
        assert_eq!(parse_decimal("1234567"), Some(1_234_567.0));

        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("-"), None);
        assert_eq!(parse_decimal("."), None);
        assert_eq!(parse_decimal("1e5"), None);
        assert_eq!(parse_decimal("12,34"), None);
        assert_eq!(parse_decimal("NaN"), None);
        assert_eq!(parse_decimal("inf"), None);
        assert_eq!(parse_decimal("$5"), None);
    }

    #[test]
    fn test_compare_to_bound_is_exact() {
        let cmp = |value: &str, bound: f64| {
            let number = parse_decimal(value).unwrap();
            compare_to_bound(value, number, bound)
        };
        assert_eq!(cmp("120.0000000000000001", 120.0), Ordering::Greater);
        assert_eq!(cmp("-0.0000000000000000001", 0.0), Ordering::Less);
        assert_eq!(cmp("120", 120.0), Ordering::Equal);
        assert_eq!(cmp("99.99", 99.99), Ordering::Equal);
        assert_eq!(cmp("+.5", 0.5), Ordering::Equal);
        assert_eq!(cmp("1,000", 99.99), Ordering::Greater);
        // beyond the decimal range the float comparison decides
        let huge = format!("1{}", "0".repeat(40));
        assert_eq!(cmp(&huge, 1e40), Ordering::Equal);
    }

    #[test]
    fn test_parse_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15);
        assert_eq!(parse_date("2024-03-15"), expected);
        assert_eq!(parse_date("2024/03/15"), expected);
        assert_eq!(parse_date("03/15/2024"), expected);
        assert_eq!(parse_date("15 March 2024"), expected);
        assert_eq!(parse_date("March 15, 2024"), expected);
        assert_eq!(parse_date("2024-03-15 08:30:00"), expected);
        assert_eq!(parse_date("2024-03-15T08:30:00Z"), expected);

        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("13/45/2024"), None);
    }

    #[test]
    fn test_parse_boolean() {
        assert_eq!(parse_boolean("true"), Some(true));
        assert_eq!(parse_boolean("FALSE"), Some(false));
        assert_eq!(parse_boolean(" Yes "), Some(true));
        assert_eq!(parse_boolean("no"), Some(false));
        assert_eq!(parse_boolean("maybe"), None);
        assert_eq!(parse_boolean("1"), None);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(17.5), "17.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(-12.25), "-12.25");
    }
}
