//! Rule sets for every marketplace form.

use rust_decimal::Decimal;

use super::patterns::LocalePatterns;
use super::rule::{Pattern, Rule};
use super::rule_set::RuleSet;
use crate::forms;

const fn at_least(value: Decimal) -> Rule {
    Rule::Min {
        value,
        inclusive: true,
    }
}

const fn greater_than(value: Decimal) -> Rule {
    Rule::Min {
        value,
        inclusive: false,
    }
}

const fn at_most(value: Decimal) -> Rule {
    Rule::Max {
        value,
        inclusive: true,
    }
}

#[allow(clippy::expect_used)] // compile-time constant patterns
fn literal(source: &str, message: &str) -> Rule {
    Rule::Pattern(Pattern::new(
        regex::Regex::new(source).expect("built-in pattern compiles"),
        message,
    ))
}

fn web_url() -> Rule {
    literal(r"^https?://\S+$", "Enter a valid http(s) URL")
}

/// Add/edit product.
///
/// Sale price, when given and nonzero, must be strictly below price.
#[must_use]
pub fn product() -> RuleSet {
    RuleSet::from_controls(&forms::product_controls())
        .required("title")
        .rules("title", [Rule::MinLength(3), Rule::MaxLength(100)])
        .required("description")
        .rule("description", Rule::MinLength(10))
        .required("category")
        .required("subcategory")
        .required("price")
        .rules("price", [Rule::Numeric, greater_than(Decimal::ZERO)])
        .rules(
            "salePrice",
            [
                Rule::Numeric,
                at_least(Decimal::ZERO),
                Rule::LessThanField {
                    other: "price".into(),
                    message: "Sale price must be less than the regular price".into(),
                },
            ],
        )
        .required("totalStock")
        .rules("totalStock", [Rule::Integer, at_least(Decimal::ZERO)])
        .rule("image", Rule::MaxLength(2048))
}

/// Address book entry.
#[must_use]
pub fn address(patterns: &LocalePatterns) -> RuleSet {
    RuleSet::from_controls(&forms::address_controls())
        .required("address")
        .rule("address", Rule::MinLength(5))
        .required("city")
        .rules(
            "city",
            [
                Rule::MinLength(2),
                Rule::MaxLength(50),
                Rule::pattern(&patterns.city),
            ],
        )
        .rules(
            "phone",
            [
                Rule::pattern(&patterns.contact_number),
                Rule::DigitCount { min: 8, max: 15 },
            ],
        )
        .required("pincode")
        .rule("pincode", Rule::pattern(&patterns.pincode))
}

/// Seller portfolio showcase entry.
#[must_use]
pub fn portfolio() -> RuleSet {
    RuleSet::from_controls(&forms::portfolio_controls())
        .required("name")
        .rules("name", [Rule::MinLength(3), Rule::MaxLength(100)])
        .required("description")
        .rule("description", Rule::MinLength(20))
        .required("price")
        .rules("price", [Rule::Numeric, greater_than(Decimal::ZERO)])
        .required("image")
        .rule("image", web_url())
        .rules(
            "rating",
            [Rule::Numeric, at_least(Decimal::ZERO), at_most(Decimal::from(5))],
        )
        .rules("reviews", [Rule::Integer, at_least(Decimal::ZERO)])
        .rules("sold", [Rule::Integer, at_least(Decimal::ZERO)])
        .required("category")
        .required("craftType")
        .rules("craftType", [Rule::MinLength(2), Rule::MaxLength(50)])
        .required("materials")
        .rule("materials", Rule::NonBlankEntries)
}

/// Profile settings.
#[must_use]
pub fn profile(patterns: &LocalePatterns) -> RuleSet {
    RuleSet::from_controls(&forms::profile_controls())
        .required("userName")
        .rules("userName", [Rule::MinLength(3), Rule::MaxLength(30)])
        .required("email")
        .rule("email", Rule::Email)
        .rule("phone", Rule::pattern(&patterns.phone))
        .rule("location", Rule::MaxLength(100))
}

/// Change password.
#[must_use]
pub fn password_change() -> RuleSet {
    RuleSet::from_controls(&forms::password_controls())
        .required("currentPassword")
        .required("newPassword")
        .rules(
            "newPassword",
            [
                Rule::MinLength(8),
                Rule::MaxLength(64),
                literal("[A-Za-z]", "Password must contain a letter"),
                literal("[0-9]", "Password must contain a digit"),
                Rule::DiffersFromField {
                    other: "currentPassword".into(),
                    message: "New password must differ from the current one".into(),
                },
            ],
        )
        .required("confirmPassword")
        .rule(
            "confirmPassword",
            Rule::EqualsField {
                other: "newPassword".into(),
                message: "Passwords do not match".into(),
            },
        )
}

/// Tip a seller.
#[must_use]
pub fn donation() -> RuleSet {
    RuleSet::from_controls(&forms::donation_controls())
        .required("amount")
        .rules(
            "amount",
            [
                Rule::Numeric,
                at_least(Decimal::ONE),
                at_most(Decimal::from(10_000)),
            ],
        )
        .field("sellerId", "Seller")
        .required("sellerId")
        .rule(
            "sellerId",
            Rule::DiffersFromField {
                other: "buyerId".into(),
                message: "You cannot tip yourself".into(),
            },
        )
        .field("buyerId", "Buyer")
        .required("buyerId")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FormValues;

    fn valid_product() -> FormValues {
        FormValues::new()
            .with("title", "Terracotta vase")
            .with("description", "Hand thrown and glazed in Khurja")
            .with("category", "pottery")
            .with("subcategory", "vases")
            .with("price", "1200")
            .with("totalStock", "4")
    }

    #[test]
    fn test_valid_product_passes() {
        assert!(product().validate(&valid_product()).is_valid());
    }

    #[test]
    fn test_sale_price_must_be_below_price() {
        for sale in ["1200", "1500"] {
            let errors = product().validate(&valid_product().with("salePrice", sale));
            assert_eq!(
                errors.get("salePrice"),
                Some("Sale price must be less than the regular price"),
                "sale price {sale}"
            );
        }

        let errors = product().validate(&valid_product().with("salePrice", "999"));
        assert!(errors.is_valid());

        let errors = product().validate(&valid_product().with("salePrice", "0"));
        assert!(errors.is_valid());
    }

    #[test]
    fn test_product_stock_must_be_whole_and_non_negative() {
        let errors = product().validate(&valid_product().with("totalStock", "-1"));
        assert_eq!(errors.get("totalStock"), Some("Total stock must be at least 0"));

        let errors = product().validate(&valid_product().with("totalStock", "2.5"));
        assert_eq!(
            errors.get("totalStock"),
            Some("Total stock must be a whole number")
        );
    }

    #[test]
    fn test_product_price_must_be_positive() {
        let errors = product().validate(&valid_product().with("price", "0"));
        assert_eq!(errors.get("price"), Some("Price must be greater than 0"));
    }

    #[test]
    fn test_address_optional_fields() {
        let rules = address(&LocalePatterns::default());
        let values = FormValues::new()
            .with("address", "12 Lake Road")
            .with("city", "Pune")
            .with("pincode", "411001")
            .with("phone", "")
            .with("notes", "");
        assert!(rules.validate(&values).is_valid());

        let errors = rules.validate(&values.with("phone", "12345"));
        assert_eq!(errors.get("phone"), Some("Phone must have 8 to 15 digits"));
    }

    #[test]
    fn test_address_city_and_pincode_patterns() {
        let rules = address(&LocalePatterns::default());
        let values = FormValues::new()
            .with("address", "12 Lake Road")
            .with("city", "Pune2")
            .with("pincode", "41-001");
        let errors = rules.validate(&values);
        assert!(errors.get("city").is_some());
        assert_eq!(errors.get("pincode"), Some("Pincode must be 5 to 10 digits"));
    }

    #[test]
    fn test_portfolio_rules() {
        let values = FormValues::new()
            .with("name", "Madhubani panel")
            .with("description", "too short")
            .with("price", "2500")
            .with("image", "ftp://example.com/a.png")
            .with("rating", "6")
            .with("category", "topRated")
            .with("craftType", "Painting")
            .with("materials", vec!["canvas".to_owned(), String::new()]);
        let errors = portfolio().validate(&values);

        assert_eq!(
            errors.get("description"),
            Some("Description must be at least 20 characters")
        );
        assert_eq!(errors.get("image"), Some("Enter a valid http(s) URL"));
        assert_eq!(errors.get("rating"), Some("Rating must be at most 5"));
        assert_eq!(
            errors.get("materials"),
            Some("Materials cannot contain blank entries")
        );
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_password_change() {
        let values = FormValues::new()
            .with("currentPassword", "oldpass12")
            .with("newPassword", "newpass34")
            .with("confirmPassword", "newpass35");
        let errors = password_change().validate(&values);
        assert_eq!(errors.get("confirmPassword"), Some("Passwords do not match"));
        assert_eq!(errors.len(), 1);

        let values = values
            .with("newPassword", "oldpass12")
            .with("confirmPassword", "oldpass12");
        let errors = password_change().validate(&values);
        assert_eq!(
            errors.get("newPassword"),
            Some("New password must differ from the current one")
        );

        let values = values
            .with("newPassword", "lettersonly")
            .with("confirmPassword", "lettersonly");
        let errors = password_change().validate(&values);
        assert_eq!(errors.get("newPassword"), Some("Password must contain a digit"));
    }

    #[test]
    fn test_profile_rules() {
        let rules = profile(&LocalePatterns::default());
        let values = FormValues::new()
            .with("userName", "meera_crafts")
            .with("email", "meera@example.com")
            .with("interestedCategories", vec!["art".to_owned(), "cars".to_owned()]);
        let errors = rules.validate(&values);
        assert_eq!(
            errors.get("interestedCategories"),
            Some("Select a valid interested categories")
        );
        assert_eq!(errors.len(), 1);

        let errors = rules.validate(&values.with("email", "meera@"));
        assert!(errors.get("email").is_some());
    }

    #[test]
    fn test_donation_rules() {
        let values = FormValues::new()
            .with("amount", "0.5")
            .with("buyerId", "u1")
            .with("sellerId", "u1");
        let errors = donation().validate(&values);
        assert_eq!(errors.get("amount"), Some("Amount must be at least 1"));
        assert_eq!(errors.get("sellerId"), Some("You cannot tip yourself"));
    }
}
