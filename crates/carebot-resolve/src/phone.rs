//! Phone-number candidate expansion.
//!
//! Phone numbers reach the tools in whatever format the caller typed: local
//! with a leading zero, international with `+`, bare digits, or with spaces
//! and dashes. Rather than normalize to one canonical form (and guess wrong),
//! the resolver probes the backend with every plausible variation in order.

/// Country code prepended to bare local numbers.
const COUNTRY_CODE: &str = "971";

/// Build the ordered lookup candidates for a raw phone string.
///
/// The order is: the input verbatim, the digits-only form, the digits with a
/// `+` prefix, the digits without their leading zero (if any), and finally
/// the digits with the country code prepended (when long enough to be a full
/// local number). Duplicates are kept; order matters more than economy here.
pub fn phone_candidates(raw: &str) -> Vec<String> {
    let clean: String = raw.chars().filter(char::is_ascii_digit).collect();

    let mut candidates = vec![raw.to_string(), clean.clone(), format!("+{clean}")];
    if clean.starts_with('0') {
        candidates.push(clean[1..].to_string());
    }
    if !clean.starts_with(COUNTRY_CODE) && clean.len() >= 9 {
        candidates.push(format!("{COUNTRY_CODE}{clean}"));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_number_with_leading_zero_expands_fully() {
        let candidates = phone_candidates("0509998888");
        assert_eq!(
            candidates,
            vec![
                "0509998888",
                "0509998888",
                "+0509998888",
                "509998888",
                "971509998888",
            ]
        );
    }

    #[test]
    fn formatted_international_number_is_cleaned() {
        let candidates = phone_candidates("+971 50 999 8888");
        assert_eq!(
            candidates,
            vec!["+971 50 999 8888", "971509998888", "+971509998888"]
        );
    }

    #[test]
    fn short_number_gets_no_country_code() {
        let candidates = phone_candidates("12345");
        assert_eq!(candidates, vec!["12345", "12345", "+12345"]);
    }

    #[test]
    fn zero_only_prefix_strips_and_prefixes() {
        let candidates = phone_candidates("050-999-8888");
        assert_eq!(
            candidates,
            vec![
                "050-999-8888",
                "0509998888",
                "+0509998888",
                "509998888",
                "971509998888",
            ]
        );
    }
}
