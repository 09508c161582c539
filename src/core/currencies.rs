//! ISO 4217 currency codes and their minor units.
//!
//! Tolerances are expressed in minor currency units, so every amount
//! comparison needs to know how many decimal places a currency uses.

use rust_decimal::Decimal;

/// Check whether `code` is a known ISO 4217 currency code.
pub fn is_known_currency_code(code: &str) -> bool {
    minor_unit_digits(code).is_some()
}

/// Number of decimal places of the currency's minor unit, if known.
pub fn minor_unit_digits(code: &str) -> Option<u32> {
    CURRENCIES
        .binary_search_by(|(c, _)| (*c).cmp(code))
        .ok()
        .map(|i| CURRENCIES[i].1)
}

/// Value of one minor unit (e.g. 0.01 for DKK, 1 for JPY), if known.
pub fn minor_unit(code: &str) -> Option<Decimal> {
    minor_unit_digits(code).map(|dp| Decimal::new(1, dp))
}

/// Sorted list of common ISO 4217 codes with their minor-unit digits.
/// Sorted for binary search.
static CURRENCIES: &[(&str, u32)] = &[
    ("AED", 2), // UAE Dirham
    ("AUD", 2), // Australian Dollar
    ("BGN", 2), // Bulgarian Lev
    ("BHD", 3), // Bahraini Dinar
    ("BRL", 2), // Brazilian Real
    ("CAD", 2), // Canadian Dollar
    ("CHF", 2), // Swiss Franc
    ("CNY", 2), // Chinese Yuan
    ("CZK", 2), // Czech Koruna
    ("DKK", 2), // Danish Krone
    ("EUR", 2), // Euro
    ("GBP", 2), // Pound Sterling
    ("HKD", 2), // Hong Kong Dollar
    ("HUF", 2), // Hungarian Forint
    ("INR", 2), // Indian Rupee
    ("ISK", 0), // Icelandic Krona
    ("JPY", 0), // Japanese Yen
    ("KRW", 0), // South Korean Won
    ("KWD", 3), // Kuwaiti Dinar
    ("MXN", 2), // Mexican Peso
    ("NOK", 2), // Norwegian Krone
    ("NZD", 2), // New Zealand Dollar
    ("PLN", 2), // Polish Zloty
    ("RON", 2), // Romanian Leu
    ("SEK", 2), // Swedish Krona
    ("SGD", 2), // Singapore Dollar
    ("THB", 2), // Thai Baht
    ("TRY", 2), // Turkish Lira
    ("USD", 2), // US Dollar
    ("ZAR", 2), // South African Rand
];
