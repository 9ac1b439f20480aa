//! Locale-specific patterns.
//!
//! The defaults fit the marketplace's home region (Indian mobile numbers and
//! postal codes). Deployments elsewhere override them through configuration;
//! the validator never hard-codes a pattern itself.

use regex::Regex;

use super::rule::Pattern;

/// Letters, spaces, hyphens and apostrophes.
pub const DEFAULT_CITY_PATTERN: &str = r"^[A-Za-z][A-Za-z\s\-']*$";
/// Ten-digit mobile number starting with 6-9, optional +91 prefix.
pub const DEFAULT_PHONE_PATTERN: &str = r"^(\+91[\s-]?)?[6-9]\d{9}$";
/// Five to ten digit postal code.
pub const DEFAULT_PINCODE_PATTERN: &str = r"^\d{5,10}$";
/// Characters allowed in a free-form contact number.
const CONTACT_NUMBER_PATTERN: &str = r"^\+?[0-9\s\-()]+$";

/// Regional patterns used by the address and profile rule sets.
#[derive(Debug, Clone)]
pub struct LocalePatterns {
    /// City names.
    pub city: Pattern,
    /// Profile phone numbers.
    pub phone: Pattern,
    /// Postal codes.
    pub pincode: Pattern,
    /// Characters allowed in an address contact number; digit count is
    /// checked separately.
    pub contact_number: Pattern,
}

impl LocalePatterns {
    /// Build patterns, replacing any default for which an override is given.
    ///
    /// # Errors
    ///
    /// Returns the regex error for the first override that does not compile.
    pub fn with_overrides(
        city: Option<&str>,
        phone: Option<&str>,
        pincode: Option<&str>,
    ) -> Result<Self, regex::Error> {
        let defaults = Self::default();
        Ok(Self {
            city: match city {
                Some(source) => Pattern::new(Regex::new(source)?, defaults.city.message()),
                None => defaults.city,
            },
            phone: match phone {
                Some(source) => Pattern::new(Regex::new(source)?, defaults.phone.message()),
                None => defaults.phone,
            },
            pincode: match pincode {
                Some(source) => Pattern::new(Regex::new(source)?, defaults.pincode.message()),
                None => defaults.pincode,
            },
            contact_number: defaults.contact_number,
        })
    }
}

impl Default for LocalePatterns {
    #[allow(clippy::expect_used)] // compile-time constant patterns
    fn default() -> Self {
        let compile = |source: &str| Regex::new(source).expect("built-in pattern compiles");
        Self {
            city: Pattern::new(
                compile(DEFAULT_CITY_PATTERN),
                "City can only contain letters, spaces, hyphens and apostrophes",
            ),
            phone: Pattern::new(
                compile(DEFAULT_PHONE_PATTERN),
                "Enter a valid 10-digit mobile number",
            ),
            pincode: Pattern::new(
                compile(DEFAULT_PINCODE_PATTERN),
                "Pincode must be 5 to 10 digits",
            ),
            contact_number: Pattern::new(
                compile(CONTACT_NUMBER_PATTERN),
                "Phone number can only contain digits, spaces, dashes and brackets",
            ),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_city_pattern() {
        let patterns = LocalePatterns::default();
        assert!(patterns.city.is_match("New Delhi"));
        assert!(patterns.city.is_match("Bishop's Stortford"));
        assert!(patterns.city.is_match("Stratford-upon-Avon"));
        assert!(!patterns.city.is_match("Pune 411001"));
    }

    #[test]
    fn test_default_phone_pattern() {
        let patterns = LocalePatterns::default();
        assert!(patterns.phone.is_match("9876543210"));
        assert!(patterns.phone.is_match("+91 9876543210"));
        assert!(!patterns.phone.is_match("1234567890"));
        assert!(!patterns.phone.is_match("98765"));
    }

    #[test]
    fn test_overrides_replace_only_given_patterns() {
        let patterns = LocalePatterns::with_overrides(None, Some(r"^\d{3}-\d{4}$"), None).unwrap();
        assert!(patterns.phone.is_match("555-1234"));
        assert!(!patterns.phone.is_match("9876543210"));
        assert!(patterns.pincode.is_match("411001"));
    }

    #[test]
    fn test_invalid_override_is_an_error() {
        assert!(LocalePatterns::with_overrides(Some("(unclosed"), None, None).is_err());
    }
}
