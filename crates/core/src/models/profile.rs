//! User profile and account settings.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::UserId;
use crate::validation::{FieldValue, FormValues, LocalePatterns, RuleSet, Validate, rule_sets};

/// Marketplace role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum UserRole {
    #[default]
    Buyer,
    Seller,
    Admin,
}

impl UserRole {
    #[must_use]
    pub const fn can_sell(&self) -> bool {
        matches!(self, Self::Seller | Self::Admin)
    }
}

/// Notification preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub email: bool,
    pub sms: bool,
    pub order_updates: bool,
    pub promotions: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email: true,
            sms: false,
            order_updates: true,
            promotions: false,
        }
    }
}

/// The signed-in user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    pub user_name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub interested_categories: BTreeSet<String>,
    #[serde(default)]
    pub notifications: NotificationSettings,
}

impl UserProfile {
    #[must_use]
    pub fn to_form(&self) -> ProfileForm {
        ProfileForm {
            user_name: self.user_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            bio: self.bio.clone(),
            location: self.location.clone(),
            interested_categories: self.interested_categories.clone(),
            notifications: self.notifications,
        }
    }
}

/// The body of a profile update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    pub user_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub interested_categories: BTreeSet<String>,
    #[serde(default)]
    pub notifications: NotificationSettings,
}

impl Validate for ProfileForm {
    fn to_form_values(&self) -> FormValues {
        FormValues::new()
            .with("userName", self.user_name.as_str())
            .with("email", self.email.as_str())
            .with("phone", self.phone.as_str())
            .with("bio", self.bio.as_str())
            .with("location", self.location.as_str())
            .with(
                "interestedCategories",
                FieldValue::List(self.interested_categories.iter().cloned().collect()),
            )
            .with("emailNotifications", self.notifications.email)
            .with("smsNotifications", self.notifications.sms)
            .with("orderUpdates", self.notifications.order_updates)
            .with("promotions", self.notifications.promotions)
    }

    fn rule_set(patterns: &LocalePatterns) -> RuleSet {
        rule_sets::profile(patterns)
    }
}

/// A password change request.
///
/// Only the current and new password go over the wire; the confirmation is
/// checked locally.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    #[serde(skip)]
    pub confirm_password: String,
}

impl std::fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordChange")
            .field("current_password", &"[REDACTED]")
            .field("new_password", &"[REDACTED]")
            .field("confirm_password", &"[REDACTED]")
            .finish()
    }
}

impl Validate for PasswordChange {
    fn to_form_values(&self) -> FormValues {
        FormValues::new()
            .with("currentPassword", self.current_password.as_str())
            .with("newPassword", self.new_password.as_str())
            .with("confirmPassword", self.confirm_password.as_str())
    }

    fn rule_set(_patterns: &LocalePatterns) -> RuleSet {
        rule_sets::password_change()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_defaults() {
        let json = serde_json::json!({
            "_id": "u1",
            "userName": "meera_crafts",
            "email": "meera@example.com"
        });
        let profile: UserProfile = serde_json::from_value(json).unwrap();
        assert_eq!(profile.role, UserRole::Buyer);
        assert!(profile.notifications.email);
        assert!(!profile.notifications.promotions);
        assert!(profile.to_form().validate(&LocalePatterns::default()).is_valid());
    }

    #[test]
    fn test_partial_notification_settings() {
        let json = serde_json::json!({"sms": true});
        let settings: NotificationSettings = serde_json::from_value(json).unwrap();
        assert!(settings.sms);
        assert!(settings.order_updates);
    }

    #[test]
    fn test_password_change_hides_confirmation_and_secrets() {
        let change = PasswordChange {
            current_password: "oldpass12".into(),
            new_password: "newpass34".into(),
            confirm_password: "newpass34".into(),
        };
        assert!(change.validate(&LocalePatterns::default()).is_valid());

        let body = serde_json::to_value(&change).unwrap();
        assert!(body.get("confirmPassword").is_none());
        assert_eq!(body["newPassword"], "newpass34");

        let debug = format!("{change:?}");
        assert!(!debug.contains("oldpass12"));
        assert!(debug.contains("REDACTED"));
    }
}
