//! Recipient number normalization.
//!
//! The gateway expects Indonesian numbers in international form without a
//! leading `+`, e.g. `6281234567890`.

/// Country calling code for Indonesia.
pub const INDONESIA_CALLING_CODE: &str = "62";

/// Normalize a recipient number to `62XXXXXXXXX`.
///
/// Non-digits are stripped first. A national `0` trunk prefix is replaced
/// with the calling code, and a bare subscriber number starting with `8` gets
/// the calling code prepended. Anything else is returned as digits only.
///
/// # Examples
///
/// ```
/// use wappin_core::phone::normalize_id;
///
/// assert_eq!(normalize_id("081213141516"), "6281213141516");
/// assert_eq!(normalize_id("+62 812-1314-1516"), "6281213141516");
/// assert_eq!(normalize_id("81213141516"), "6281213141516");
/// ```
pub fn normalize_id(number: &str) -> String {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();

    if digits.starts_with(INDONESIA_CALLING_CODE) {
        digits
    } else if let Some(rest) = digits.strip_prefix('0') {
        format!("{}{}", INDONESIA_CALLING_CODE, rest)
    } else if digits.starts_with('8') {
        format!("{}{}", INDONESIA_CALLING_CODE, digits)
    } else {
        digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_national_prefix_replaced() {
        assert_eq!(normalize_id("089891234123"), "6289891234123");
    }

    #[test]
    fn test_already_international_kept() {
        assert_eq!(normalize_id("6289891234123"), "6289891234123");
        assert_eq!(normalize_id("+6289891234123"), "6289891234123");
    }

    #[test]
    fn test_separators_stripped() {
        assert_eq!(normalize_id("(0812) 1314-1516"), "6281213141516");
    }

    #[test]
    fn test_other_country_left_as_digits() {
        assert_eq!(normalize_id("+1 415 555 0100"), "14155550100");
        assert_eq!(normalize_id(""), "");
    }

    #[test]
    fn test_idempotent() {
        let once = normalize_id("0812-1314-1516");
        assert_eq!(normalize_id(&once), once);
    }
}
