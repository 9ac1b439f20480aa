//! Typed form-control configuration.
//!
//! Each control kind carries only the fields it needs. Select-style controls
//! know their options, so the rule they imply (value must be one of the
//! options) is derived here instead of being repeated in every rule set.

use crate::models::PortfolioCategory;
use crate::types::Category;
use crate::validation::{OptionsLookup, Rule};

/// HTML input flavours used by the marketplace forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Text,
    Number,
    Email,
    Tel,
    Url,
    Password,
}

/// One option of a select control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// A form control.
#[derive(Debug, Clone)]
pub enum FormControl {
    Input {
        name: &'static str,
        label: &'static str,
        input_type: InputType,
        placeholder: Option<&'static str>,
    },
    Textarea {
        name: &'static str,
        label: &'static str,
        rows: u8,
        max_chars: Option<usize>,
    },
    Select {
        name: &'static str,
        label: &'static str,
        options: Vec<SelectOption>,
    },
    /// A select whose options depend on another field's value.
    DependentSelect {
        name: &'static str,
        label: &'static str,
        parent: &'static str,
        options_for: OptionsLookup,
    },
    MultiSelect {
        name: &'static str,
        label: &'static str,
        options: Vec<SelectOption>,
    },
    /// Comma-separated entries collected into a list.
    TagList {
        name: &'static str,
        label: &'static str,
    },
    Checkbox {
        name: &'static str,
        label: &'static str,
    },
}

impl FormControl {
    /// The field name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Input { name, .. }
            | Self::Textarea { name, .. }
            | Self::Select { name, .. }
            | Self::DependentSelect { name, .. }
            | Self::MultiSelect { name, .. }
            | Self::TagList { name, .. }
            | Self::Checkbox { name, .. } => name,
        }
    }

    /// The display label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Input { label, .. }
            | Self::Textarea { label, .. }
            | Self::Select { label, .. }
            | Self::DependentSelect { label, .. }
            | Self::MultiSelect { label, .. }
            | Self::TagList { label, .. }
            | Self::Checkbox { label, .. } => label,
        }
    }

    /// The rule a control implies by construction.
    #[must_use]
    pub fn implied_rule(&self) -> Option<Rule> {
        match self {
            Self::Select { options, .. } | Self::MultiSelect { options, .. } => Some(Rule::OneOf(
                options.iter().map(|option| option.value.to_owned()).collect(),
            )),
            Self::DependentSelect {
                parent,
                options_for,
                ..
            } => Some(Rule::OneOfFor {
                parent: (*parent).to_owned(),
                lookup: *options_for,
            }),
            Self::Textarea {
                max_chars: Some(max),
                ..
            } => Some(Rule::MaxLength(*max)),
            Self::Checkbox { .. } => Some(Rule::OneOf(vec!["true".into(), "false".into()])),
            Self::Input { .. } | Self::Textarea { .. } | Self::TagList { .. } => None,
        }
    }
}

const fn input(name: &'static str, label: &'static str, input_type: InputType) -> FormControl {
    FormControl::Input {
        name,
        label,
        input_type,
        placeholder: None,
    }
}

fn category_options() -> Vec<SelectOption> {
    Category::ALL
        .iter()
        .map(|category| SelectOption {
            value: category.as_str(),
            label: category.label(),
        })
        .collect()
}

/// Controls of the add/edit product form.
#[must_use]
pub fn product_controls() -> Vec<FormControl> {
    vec![
        input("title", "Title", InputType::Text),
        FormControl::Textarea {
            name: "description",
            label: "Description",
            rows: 4,
            max_chars: Some(2000),
        },
        FormControl::Select {
            name: "category",
            label: "Category",
            options: category_options(),
        },
        FormControl::DependentSelect {
            name: "subcategory",
            label: "Subcategory",
            parent: "category",
            options_for: Category::subcategories_for,
        },
        input("price", "Price", InputType::Number),
        input("salePrice", "Sale price", InputType::Number),
        input("totalStock", "Total stock", InputType::Number),
        input("image", "Image", InputType::Url),
    ]
}

/// Controls of the address book form.
#[must_use]
pub fn address_controls() -> Vec<FormControl> {
    vec![
        FormControl::Textarea {
            name: "address",
            label: "Address",
            rows: 2,
            max_chars: Some(200),
        },
        input("city", "City", InputType::Text),
        FormControl::Input {
            name: "phone",
            label: "Phone",
            input_type: InputType::Tel,
            placeholder: Some("+91 98765 43210"),
        },
        input("pincode", "Pincode", InputType::Text),
        FormControl::Textarea {
            name: "notes",
            label: "Notes",
            rows: 2,
            max_chars: Some(200),
        },
    ]
}

/// Controls of the seller portfolio form.
#[must_use]
pub fn portfolio_controls() -> Vec<FormControl> {
    vec![
        input("name", "Name", InputType::Text),
        FormControl::Textarea {
            name: "description",
            label: "Description",
            rows: 4,
            max_chars: Some(1000),
        },
        input("price", "Price", InputType::Number),
        input("image", "Image URL", InputType::Url),
        input("rating", "Rating", InputType::Number),
        input("reviews", "Reviews", InputType::Number),
        input("sold", "Sold", InputType::Number),
        FormControl::Select {
            name: "category",
            label: "Collection",
            options: PortfolioCategory::ALL
                .iter()
                .map(|category| SelectOption {
                    value: category.as_str(),
                    label: category.label(),
                })
                .collect(),
        },
        input("craftType", "Craft type", InputType::Text),
        FormControl::TagList {
            name: "materials",
            label: "Materials",
        },
    ]
}

/// Controls of the profile settings form.
#[must_use]
pub fn profile_controls() -> Vec<FormControl> {
    vec![
        input("userName", "Username", InputType::Text),
        input("email", "Email", InputType::Email),
        input("phone", "Phone", InputType::Tel),
        FormControl::Textarea {
            name: "bio",
            label: "Bio",
            rows: 3,
            max_chars: Some(300),
        },
        input("location", "Location", InputType::Text),
        FormControl::MultiSelect {
            name: "interestedCategories",
            label: "Interested categories",
            options: category_options(),
        },
        FormControl::Checkbox {
            name: "emailNotifications",
            label: "Email notifications",
        },
        FormControl::Checkbox {
            name: "smsNotifications",
            label: "SMS notifications",
        },
        FormControl::Checkbox {
            name: "orderUpdates",
            label: "Order updates",
        },
        FormControl::Checkbox {
            name: "promotions",
            label: "Promotions",
        },
    ]
}

/// Controls of the change-password form.
#[must_use]
pub fn password_controls() -> Vec<FormControl> {
    vec![
        input("currentPassword", "Current password", InputType::Password),
        input("newPassword", "New password", InputType::Password),
        input("confirmPassword", "Confirm password", InputType::Password),
    ]
}

/// Controls of the tip-a-seller form.
#[must_use]
pub fn donation_controls() -> Vec<FormControl> {
    vec![
        input("amount", "Amount", InputType::Number),
        FormControl::Textarea {
            name: "message",
            label: "Message",
            rows: 3,
            max_chars: Some(200),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{FormValues, RuleSet};

    #[test]
    fn test_control_names_are_unique_per_form() {
        for controls in [
            product_controls(),
            address_controls(),
            portfolio_controls(),
            profile_controls(),
            password_controls(),
            donation_controls(),
        ] {
            let mut names: Vec<_> = controls.iter().map(FormControl::name).collect();
            let before = names.len();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), before);
        }
    }

    #[test]
    fn test_select_implies_one_of_rule() {
        let rules = RuleSet::from_controls(&product_controls());
        let errors = rules.validate(&FormValues::new().with("category", "furniture"));
        assert_eq!(errors.get("category"), Some("Select a valid category"));
    }

    #[test]
    fn test_dependent_select_follows_parent() {
        let rules = RuleSet::from_controls(&product_controls());
        let ok = FormValues::new()
            .with("category", "pottery")
            .with("subcategory", "vases");
        assert!(rules.validate(&ok).get("subcategory").is_none());

        let mismatched = FormValues::new()
            .with("category", "jewelry")
            .with("subcategory", "vases");
        assert_eq!(
            rules.validate(&mismatched).get("subcategory"),
            Some("Select a valid subcategory for jewelry")
        );
    }

    #[test]
    fn test_textarea_limit_becomes_max_length() {
        let rules = RuleSet::from_controls(&profile_controls());
        let errors = rules.validate(&FormValues::new().with("bio", "x".repeat(301)));
        assert_eq!(errors.get("bio"), Some("Bio must be at most 300 characters"));
    }
}
