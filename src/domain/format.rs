//! Locale-aware display formatters for grid cells.
//!
//! The formatters never fail. Input that cannot be interpreted degrades to a
//! fallback string (`Invalid Date`, `￥NaN`) instead of an error, because
//! cell values are never validated on the way in.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

use super::columns::{CellFormat, ColumnKey};
use super::models::Row;

pub const INVALID_DATE: &str = "Invalid Date";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    JaJp,
    EnUs,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "ja-jp" | "ja" => Ok(Locale::JaJp),
            "en-us" | "en" => Ok(Locale::EnUs),
            other => Err(format!("unsupported locale '{other}'")),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::JaJp => write!(f, "ja-JP"),
            Locale::EnUs => write!(f, "en-US"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Currency {
    #[default]
    Jpy,
    Usd,
}

impl Currency {
    pub fn fraction_digits(self) -> usize {
        match self {
            Currency::Jpy => 0,
            Currency::Usd => 2,
        }
    }

    fn symbol(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Currency::Jpy, Locale::JaJp) => "\u{FFE5}",
            (Currency::Jpy, Locale::EnUs) => "\u{00A5}",
            (Currency::Usd, _) => "$",
        }
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpy" => Ok(Currency::Jpy),
            "usd" => Ok(Currency::Usd),
            other => Err(format!("unsupported currency '{other}'")),
        }
    }
}

/// Locale, currency and display time zone shared by all formatters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSettings {
    pub locale: Locale,
    pub currency: Currency,
    pub utc_offset: FixedOffset,
}

/// Asia/Tokyo.
pub fn default_utc_offset() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap_or(Utc.fix())
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            currency: Currency::default(),
            utc_offset: default_utc_offset(),
        }
    }
}

impl FormatSettings {
    pub fn date_formatter(&self) -> DateFormatter {
        DateFormatter {
            locale: self.locale,
            utc_offset: self.utc_offset,
        }
    }

    pub fn date_time_formatter(&self) -> DateTimeFormatter {
        DateTimeFormatter {
            locale: self.locale,
            utc_offset: self.utc_offset,
        }
    }

    pub fn currency_formatter(&self) -> CurrencyFormatter {
        CurrencyFormatter {
            locale: self.locale,
            currency: self.currency,
        }
    }

    /// Display text of one cell.
    pub fn format_cell(&self, format: CellFormat, row: &Row, key: ColumnKey) -> String {
        match format {
            CellFormat::Plain => row.field(key),
            CellFormat::Currency => self
                .currency_formatter()
                .format(parse_js_number(&row.field(key))),
            CellFormat::Date => self.date_formatter().format(&row.field(key)),
            CellFormat::DateTime => match key {
                ColumnKey::CreateDatetime => {
                    self.date_time_formatter().format(&row.create_datetime)
                }
                _ => match DateTime::parse_from_rfc3339(&row.field(key)) {
                    Ok(instant) => self.date_time_formatter().format(&instant.with_timezone(&Utc)),
                    Err(_) => INVALID_DATE.to_string(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DateFormatter {
    locale: Locale,
    utc_offset: FixedOffset,
}

impl DateFormatter {
    /// Formats an ISO date (`2021-01-01`) or RFC 3339 timestamp.
    ///
    /// A bare date is taken as midnight UTC and then shown in the display
    /// time zone, so far-west offsets show the previous day.
    pub fn format(&self, value: &str) -> String {
        let value = value.trim();
        let instant = if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            match date.and_hms_opt(0, 0, 0) {
                Some(midnight) => midnight.and_utc(),
                None => return INVALID_DATE.to_string(),
            }
        } else if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
            timestamp.with_timezone(&Utc)
        } else {
            return INVALID_DATE.to_string();
        };

        let local = instant.with_timezone(&self.utc_offset);
        match self.locale {
            Locale::JaJp => local.format("%Y/%m/%d").to_string(),
            Locale::EnUs => local.format("%m/%d/%Y").to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DateTimeFormatter {
    locale: Locale,
    utc_offset: FixedOffset,
}

impl DateTimeFormatter {
    pub fn format(&self, value: &DateTime<Utc>) -> String {
        let local = value.with_timezone(&self.utc_offset);
        match self.locale {
            Locale::JaJp => local.format("%Y/%m/%d %H:%M:%S").to_string(),
            Locale::EnUs => local.format("%m/%d/%Y, %I:%M:%S %p").to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CurrencyFormatter {
    locale: Locale,
    currency: Currency,
}

impl CurrencyFormatter {
    /// Formats an amount, e.g. `3000.0` as `￥3,000` for ja-JP/JPY.
    ///
    /// # Examples
    ///
    /// ```
    /// use rowgrid::domain::FormatSettings;
    ///
    /// let formatter = FormatSettings::default().currency_formatter();
    /// assert_eq!(formatter.format(1234567.0), "\u{FFE5}1,234,567");
    /// assert_eq!(formatter.format(f64::NAN), "\u{FFE5}NaN");
    /// ```
    pub fn format(&self, value: f64) -> String {
        let symbol = self.currency.symbol(self.locale);
        let sign = if value.is_sign_negative() && !value.is_nan() { "-" } else { "" };

        if value.is_nan() {
            return format!("{symbol}NaN");
        }
        if value.is_infinite() {
            return format!("{sign}{symbol}\u{221E}");
        }

        let digits = self.currency.fraction_digits();
        let scale = 10f64.powi(digits as i32);
        let scaled = value.abs() * scale;
        // Past 2^53 every f64 is already an integer, and scaling can overflow.
        let rounded = if scaled.is_finite() {
            scaled.round() / scale
        } else {
            value.abs()
        };
        let plain = format!("{rounded:.digits$}");
        let (integer, fraction) = match plain.split_once('.') {
            Some((integer, fraction)) => (integer, Some(fraction)),
            None => (plain.as_str(), None),
        };

        let mut out = format!("{sign}{symbol}{}", group_thousands(integer));
        if let Some(fraction) = fraction {
            out.push('.');
            out.push_str(fraction);
        }
        out
    }
}

fn group_thousands(integer: &str) -> String {
    let len = integer.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Converts cell text to a number following JavaScript's `Number()` rules:
/// surrounding whitespace is ignored, the empty string is zero, `Infinity`
/// and `0x`/`0o`/`0b` literals are accepted, anything else is NaN.
pub fn parse_js_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match trimmed.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&trimmed[2..], radix)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }

    // Rust also accepts spellings like "inf" and "nan" that Number() rejects.
    let numeric = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !numeric {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(locale: Locale, currency: Currency) -> FormatSettings {
        FormatSettings {
            locale,
            currency,
            ..FormatSettings::default()
        }
    }

    #[test]
    fn test_currency_regression_literal() {
        let formatter = FormatSettings::default().currency_formatter();
        assert_eq!(formatter.format(3000.0), "\u{FFE5}3,000");
        assert_eq!(formatter.format(3000.0), "￥3,000");
    }

    #[test]
    fn test_currency_grouping_and_rounding() {
        let formatter = FormatSettings::default().currency_formatter();
        assert_eq!(formatter.format(0.0), "￥0");
        assert_eq!(formatter.format(999.0), "￥999");
        assert_eq!(formatter.format(1000.0), "￥1,000");
        assert_eq!(formatter.format(1234.5), "￥1,235");
        assert_eq!(formatter.format(-2500.0), "-￥2,500");
        assert_eq!(formatter.format(10_000_000.0), "￥10,000,000");
    }

    #[test]
    fn test_currency_fallbacks() {
        let formatter = FormatSettings::default().currency_formatter();
        assert_eq!(formatter.format(f64::NAN), "￥NaN");
        assert_eq!(formatter.format(f64::INFINITY), "￥∞");
        assert_eq!(formatter.format(f64::NEG_INFINITY), "-￥∞");
    }

    #[test]
    fn test_currency_other_locales() {
        let usd = settings(Locale::EnUs, Currency::Usd).currency_formatter();
        assert_eq!(usd.format(3000.0), "$3,000.00");
        assert_eq!(usd.format(12.346), "$12.35");

        let yen_en = settings(Locale::EnUs, Currency::Jpy).currency_formatter();
        assert_eq!(yen_en.format(3000.0), "¥3,000");
    }

    #[test]
    fn test_currency_huge_amounts_stay_numeric() {
        let usd = settings(Locale::EnUs, Currency::Usd).currency_formatter();
        let text = usd.format(1e307);
        let digits = text
            .strip_prefix('$')
            .and_then(|rest| rest.strip_suffix(".00"))
            .unwrap_or_else(|| panic!("unexpected shape: {text}"));
        assert!(digits.chars().all(|c| c.is_ascii_digit() || c == ','), "{text}");
        assert_eq!(digits.matches(',').count(), 102);

        let row = Row::generate(1).with_field(crate::domain::TextField::Price, "1e307");
        let usd_settings = settings(Locale::EnUs, Currency::Usd);
        assert_eq!(usd_settings.format_cell(CellFormat::Currency, &row, ColumnKey::Price), text);
    }

    #[test]
    fn test_parse_js_number() {
        assert_eq!(parse_js_number("5000"), 5000.0);
        assert_eq!(parse_js_number("  42 "), 42.0);
        assert_eq!(parse_js_number(""), 0.0);
        assert_eq!(parse_js_number("1e3"), 1000.0);
        assert_eq!(parse_js_number("0x10"), 16.0);
        assert_eq!(parse_js_number("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_js_number("abc").is_nan());
        assert!(parse_js_number("inf").is_nan());
        assert!(parse_js_number("12abc").is_nan());
        assert!(parse_js_number("0xZZ").is_nan());
    }

    #[test]
    fn test_date_formatter() {
        let ja = FormatSettings::default().date_formatter();
        assert_eq!(ja.format("2021-01-01"), "2021/01/01");
        assert_eq!(ja.format("2021-03-15T20:00:00Z"), "2021/03/16");
        assert_eq!(ja.format("not a date"), INVALID_DATE);
        assert_eq!(ja.format("2021-02-30"), INVALID_DATE);

        let en = settings(Locale::EnUs, Currency::Usd).date_formatter();
        assert_eq!(en.format("2021-01-01"), "01/01/2021");
    }

    #[test]
    fn test_date_formatter_west_of_utc_shows_previous_day() {
        let mut settings = FormatSettings::default();
        settings.utc_offset = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(settings.date_formatter().format("2021-01-01"), "2020/12/31");
    }

    #[test]
    fn test_date_time_formatter() {
        let row = Row::generate(1);
        let ja = FormatSettings::default().date_time_formatter();
        assert_eq!(ja.format(&row.create_datetime), "2021/01/01 09:00:00");

        let en = settings(Locale::EnUs, Currency::Usd).date_time_formatter();
        assert_eq!(en.format(&row.create_datetime), "01/01/2021, 09:00:00 AM");
    }

    #[test]
    fn test_format_cell() {
        let settings = FormatSettings::default();
        let row = Row::generate(3);
        assert_eq!(settings.format_cell(CellFormat::Plain, &row, ColumnKey::Code), "Code3");
        assert_eq!(settings.format_cell(CellFormat::Currency, &row, ColumnKey::Price), "￥3,000");
        assert_eq!(settings.format_cell(CellFormat::Date, &row, ColumnKey::Date), "2021/01/01");
        assert_eq!(
            settings.format_cell(CellFormat::DateTime, &row, ColumnKey::CreateDatetime),
            "2021/01/01 09:00:00"
        );

        let broken = row.with_field(crate::domain::TextField::Price, "five");
        assert_eq!(settings.format_cell(CellFormat::Currency, &broken, ColumnKey::Price), "￥NaN");
    }

    #[test]
    fn test_locale_and_currency_parsing() {
        assert_eq!("ja-JP".parse::<Locale>(), Ok(Locale::JaJp));
        assert_eq!("en_us".parse::<Locale>(), Ok(Locale::EnUs));
        assert!("fr-FR".parse::<Locale>().is_err());
        assert_eq!("USD".parse::<Currency>(), Ok(Currency::Usd));
        assert!("eur".parse::<Currency>().is_err());
    }
}
