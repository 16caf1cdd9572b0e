//! Value formatting for clear-signing display
//!
//! Every function here is total: whatever the input, a display string comes
//! back. Values that cannot be interpreted for the requested kind fall back
//! to their plain display form, missing values render as `"N/A"`.

use std::sync::Arc;

use alloy_primitives::{Address, U256, utils::format_units};
use chrono::{DateTime, Utc};

use crate::registry::KnownTokens;
use crate::value::ArgValue;

/// Placeholder shown for missing or null values
pub const NOT_AVAILABLE: &str = "N/A";

/// Decimal-string length up to which an amount is assumed to use 6 decimals
const SIX_DECIMAL_MAX_DIGITS: usize = 12;

/// Future timestamps closer than this are shown relative to now
const RELATIVE_WINDOW_MINUTES: i64 = 7 * 24 * 60;

/// Semantic display kind of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Amount,
    Address,
    Date,
    /// Plain display string; also used for unrecognized kinds
    Raw,
}

impl FormatKind {
    /// Maps a field's `format` string to a kind, accepting the legacy synonyms
    pub fn from_synonym(format: &str) -> Self {
        match format {
            "tokenAmount" | "amount" => FormatKind::Amount,
            "tokenAddress" | "recipientAddress" | "addressName" | "address" => FormatKind::Address,
            "timestamp" | "date" => FormatKind::Date,
            _ => FormatKind::Raw,
        }
    }

    /// Maps a format definition's `type` to a kind, `None` if unrecognized
    pub fn from_definition_type(ty: &str) -> Option<Self> {
        match ty {
            "amount" => Some(FormatKind::Amount),
            "address" => Some(FormatKind::Address),
            "date" => Some(FormatKind::Date),
            "raw" => Some(FormatKind::Raw),
            _ => None,
        }
    }
}

/// Optional adjustments to a format kind
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatHints<'a> {
    /// Prepended to address output
    pub prefix: Option<&'a str>,
    /// Known token decimals; overrides magnitude detection for amounts
    pub decimals: Option<u8>,
}

/// Source of the current time for relative dates
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Frozen at `secs` seconds after the Unix epoch, or the epoch if out of range
    pub fn at_unix(secs: i64) -> Self {
        FixedClock(DateTime::from_timestamp(secs, 0).unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Formats values by kind, with dates relative to an injectable clock
#[derive(Clone)]
pub struct ValueFormatter {
    clock: Arc<dyn Clock>,
}

impl ValueFormatter {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Renders `value` as `kind`
    ///
    /// `None` (unresolved) and explicit nulls both render as `"N/A"`; without
    /// a kind the plain display string is returned.
    pub fn format(
        &self,
        value: Option<&ArgValue>,
        kind: Option<&FormatKind>,
        hints: FormatHints<'_>,
    ) -> String {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            return NOT_AVAILABLE.to_string();
        };
        match kind {
            None | Some(FormatKind::Raw) => value.to_string(),
            Some(FormatKind::Amount) => format_amount(value, hints.decimals),
            Some(FormatKind::Address) => format_address(value, hints.prefix),
            Some(FormatKind::Date) => self.format_date(value),
        }
    }

    pub fn format_date(&self, value: &ArgValue) -> String {
        format_date_at(value, self.clock.now())
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

impl Default for ValueFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ValueFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueFormatter").finish_non_exhaustive()
    }
}

/// Interprets `value` as an unsigned integer
pub fn as_unsigned(value: &ArgValue) -> Option<U256> {
    match value {
        ArgValue::BigInt(u) => Some(*u),
        ArgValue::Number(n) => Some(U256::from(*n)),
        ArgValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Decimal places assumed for a raw amount with no known token
///
/// Short values are taken to be 6-decimal stablecoin amounts, longer ones
/// 18-decimal. This is a guess from magnitude alone.
pub fn detect_decimals(raw: &U256) -> u8 {
    if raw.to_string().len() <= SIX_DECIMAL_MAX_DIGITS { 6 } else { 18 }
}

/// Formats a token amount
///
/// `decimals` overrides magnitude-based detection when the token is known.
pub fn format_amount(value: &ArgValue, decimals: Option<u8>) -> String {
    let Some(raw) = as_unsigned(value) else {
        return value.to_string();
    };
    let decimals = decimals.unwrap_or_else(|| detect_decimals(&raw));
    let Some(num) = format_units(raw, decimals)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
    else {
        return value.to_string();
    };

    if num == 0.0 {
        "0".to_string()
    } else if num < 0.000001 {
        format!("{num:.2e}")
    } else if num < 1.0 {
        format!("{num:.6}")
    } else if num >= 1_000_000.0 {
        format!("{:.2}M", num / 1_000_000.0)
    } else if num >= 1_000.0 {
        format!("{:.2}K", num / 1_000.0)
    } else {
        group_thousands(&format!("{num:.2}"))
    }
}

/// Adds `,` thousands separators and drops trailing fractional zeros
fn group_thousands(fixed: &str) -> String {
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed, ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if frac_part.is_empty() {
        grouped
    } else {
        format!("{grouped}.{frac_part}")
    }
}

/// Parses a `0x`-prefixed, 20-byte hex address
///
/// Mixed-case input must carry a valid EIP-55 checksum.
pub fn parse_address(s: &str) -> Option<Address> {
    let hex_part = s.strip_prefix("0x")?;
    if hex_part.len() != 40 || !hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let has_lower = hex_part.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = hex_part.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(s, None).ok()
    } else {
        s.parse().ok()
    }
}

/// Formats an address as a known token name or as `0xAbCd...1234`
///
/// Malformed input is returned unchanged.
pub fn format_address(value: &ArgValue, prefix: Option<&str>) -> String {
    let text = value.to_string();
    let Some(address) = parse_address(&text) else {
        return text;
    };
    let prefix = prefix.unwrap_or_default();

    if let Some(name) = KnownTokens::name(&address) {
        return format!("{prefix}{name}");
    }
    format!("{prefix}{}", shorten_address(&address))
}

/// `0xAbCd...1234` form of the checksummed address
pub fn shorten_address(address: &Address) -> String {
    let checksummed = address.to_checksum(None);
    format!(
        "{}...{}",
        &checksummed[..6],
        &checksummed[checksummed.len() - 4..]
    )
}

fn as_timestamp(value: &ArgValue) -> Option<i64> {
    match value {
        ArgValue::Number(n) => i64::try_from(*n).ok(),
        ArgValue::BigInt(u) => i64::try_from(*u).ok(),
        ArgValue::Int(i) => i64::try_from(*i).ok(),
        ArgValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Formats a Unix timestamp (seconds) relative to `now`
///
/// Future instants less than a week away read "in N minutes/hours/days";
/// everything else is an absolute UTC date such as `Nov 14, 2023, 10:13 PM`.
pub fn format_date_at(value: &ArgValue, now: DateTime<Utc>) -> String {
    let Some(date) = as_timestamp(value).and_then(|ts| DateTime::from_timestamp(ts, 0)) else {
        return value.to_string();
    };

    let diff_ms = (date - now).num_milliseconds();
    let diff_minutes = diff_ms.div_euclid(60_000);

    if diff_ms > 0 && diff_minutes < RELATIVE_WINDOW_MINUTES {
        return if diff_minutes < 60 {
            format!("in {diff_minutes} minutes")
        } else if diff_minutes < 24 * 60 {
            format!("in {} hours", diff_minutes / 60)
        } else {
            format!("in {} days", diff_minutes / (24 * 60))
        };
    }

    date.format("%b %-d, %Y, %I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_760_000_000;

    fn big(n: u128) -> ArgValue {
        ArgValue::BigInt(U256::from(n))
    }

    #[test]
    fn zero_amount_is_zero() {
        assert_eq!(format_amount(&big(0), None), "0");
        assert_eq!(format_amount(&big(0), Some(18)), "0");
        assert_eq!(format_amount(&ArgValue::from("0"), None), "0");
    }

    #[test]
    fn six_decimal_amounts() {
        // 1000 USDC sits exactly on the K boundary
        assert_eq!(format_amount(&big(1_000_000_000), None), "1.00K");
        assert_eq!(format_amount(&big(999_500_000), None), "999.5");
        assert_eq!(format_amount(&big(12_340_000), None), "12.34");
        assert_eq!(format_amount(&big(500_000), None), "0.500000");
    }

    #[test]
    fn eighteen_decimal_amounts() {
        assert_eq!(format_amount(&big(1_500_000_000_000_000_000), None), "1.5");
        assert_eq!(format_amount(&big(250_000_000_000_000_000_000_000), None), "250.00K");
        assert_eq!(format_amount(&big(1_000_000_000_000), None), "0.000001");
        assert_eq!(format_amount(&big(2_500_000_000_000_000_000_000_000), None), "2.50M");
    }

    #[test]
    fn tiny_amounts_use_scientific_notation() {
        assert_eq!(format_amount(&big(5), Some(18)), "5.00e-18");
    }

    #[test]
    fn amount_suffix_buckets() {
        assert_eq!(format_amount(&big(999_990_000), None), "999.99");
        assert!(format_amount(&big(999_999_999_999), None).ends_with('K'));
        assert!(format_amount(&big(999_000_000_000_000_000_000_000), None).ends_with('K'));
        assert!(format_amount(&big(1_000_000_000_000_000_000_000_000), None).ends_with('M'));
    }

    #[test]
    fn known_decimals_override_detection() {
        // 1 WETH is short enough to be mistaken for a 6-decimal amount
        assert_eq!(format_amount(&big(1_000_000_000_000), Some(18)), "0.000001");
        assert_eq!(format_amount(&big(1_000_000), Some(6)), "1");
    }

    #[test]
    fn non_integer_amount_falls_back() {
        assert_eq!(format_amount(&ArgValue::from("abc"), None), "abc");
        assert_eq!(format_amount(&ArgValue::Bool(true), None), "true");
    }

    #[test]
    fn grouping() {
        assert_eq!(group_thousands("1000.00"), "1,000");
        assert_eq!(group_thousands("1234567.50"), "1,234,567.5");
        assert_eq!(group_thousands("12.00"), "12");
    }

    #[test]
    fn known_address_shows_name() {
        let usdc = ArgValue::from("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
        assert_eq!(format_address(&usdc, None), "USDC Token");
        assert_eq!(format_address(&usdc, Some("to ")), "to USDC Token");
    }

    #[test]
    fn unknown_address_is_shortened() {
        let addr = ArgValue::from("0x0000000000000000000000000000000000000001");
        assert_eq!(format_address(&addr, None), "0x0000...0001");

        let vitalik = ArgValue::from("0xd8da6bf26964af9d7eed9e03e53415d37aa96045");
        assert_eq!(format_address(&vitalik, None), "0xd8dA...6045");
    }

    #[test]
    fn malformed_address_is_unchanged() {
        // 19 bytes
        let short = ArgValue::from("0x00000000000000000000000000000000000001");
        assert_eq!(format_address(&short, None), "0x00000000000000000000000000000000000001");
        // bad EIP-55 checksum
        let bad = ArgValue::from("0xA0B86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
        assert_eq!(format_address(&bad, None), "0xA0B86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
        assert_eq!(format_address(&ArgValue::from("hello"), None), "hello");
    }

    #[test]
    fn near_future_dates_are_relative() {
        let now = FixedClock::at_unix(NOW).now();
        let at = |secs: i64| format_date_at(&ArgValue::Number((NOW + secs) as u64), now);

        assert_eq!(at(1800), "in 30 minutes");
        assert_eq!(at(3 * 3600 + 59), "in 3 hours");
        assert_eq!(at(2 * 86_400), "in 2 days");
        assert_eq!(at(30), "in 0 minutes");
    }

    #[test]
    fn past_and_distant_dates_are_absolute() {
        let now = FixedClock::at_unix(NOW).now();
        assert_eq!(
            format_date_at(&ArgValue::Number(1_700_000_000), now),
            "Nov 14, 2023, 10:13 PM"
        );
        assert_eq!(
            format_date_at(&ArgValue::Number((NOW + 8 * 86_400) as u64), now),
            "Oct 17, 2025, 08:53 AM"
        );
    }

    #[test]
    fn unparseable_dates_fall_back() {
        let now = FixedClock::at_unix(NOW).now();
        assert_eq!(format_date_at(&ArgValue::from("soon"), now), "soon");
        assert_eq!(
            format_date_at(&ArgValue::BigInt(U256::MAX), now),
            U256::MAX.to_string()
        );
    }

    #[test]
    fn missing_values_are_not_available() {
        let formatter = ValueFormatter::with_clock(Arc::new(FixedClock::at_unix(NOW)));
        assert_eq!(formatter.format(None, Some(&FormatKind::Amount), FormatHints::default()), "N/A");
        assert_eq!(
            formatter.format(Some(&ArgValue::Null), None, FormatHints::default()),
            "N/A"
        );
        assert_eq!(
            formatter.format(Some(&ArgValue::from(42u64)), None, FormatHints::default()),
            "42"
        );
    }

    #[test]
    fn synonyms_map_to_kinds() {
        assert_eq!(FormatKind::from_synonym("tokenAmount"), FormatKind::Amount);
        assert_eq!(FormatKind::from_synonym("recipientAddress"), FormatKind::Address);
        assert_eq!(FormatKind::from_synonym("timestamp"), FormatKind::Date);
        assert_eq!(FormatKind::from_synonym("enum"), FormatKind::Raw);
        assert_eq!(FormatKind::from_definition_type("raw"), Some(FormatKind::Raw));
        assert_eq!(FormatKind::from_definition_type("date"), Some(FormatKind::Date));
        assert_eq!(FormatKind::from_definition_type("enum"), None);
    }
}
