//! Currency code helpers.
//!
//! Amounts are never converted between currencies; these helpers only make
//! sure the codes attached to amounts are real ISO 4217 codes and compare
//! equal regardless of case or surrounding whitespace.

use rusty_money::iso;
use tracing::trace;

/// Returns the canonical ISO 4217 alpha code for `code`, or `None` when the
/// code is not a known currency.
pub fn normalize_currency_code(code: &str) -> Option<String> {
    let candidate = code.trim().to_ascii_uppercase();
    let found = iso::find(&candidate).map(|currency| currency.iso_alpha_code.to_string());
    trace!(code, known = found.is_some(), "Normalized currency code");
    found
}

/// Returns true when `code` is a known ISO 4217 currency.
pub fn is_known_currency(code: &str) -> bool {
    normalize_currency_code(code).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_known_codes() {
        assert_eq!(normalize_currency_code("JPY"), Some("JPY".to_string()));
        assert_eq!(normalize_currency_code(" usd "), Some("USD".to_string()));
    }

    #[test]
    fn test_unknown_codes() {
        assert_eq!(normalize_currency_code("XXQ"), None);
        assert!(!is_known_currency(""));
        assert!(is_known_currency("eur"));
    }
}
