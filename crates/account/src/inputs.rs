//! Inputs accepted by the account actions.
//!
//! Non-secret inputs serialize straight into GraphQL input objects.
//! Password-bearing inputs hold [`SecretString`]s and are exposed only when
//! the query builders assemble the request variables.

use secrecy::SecretString;
use serde::Serialize;
use serde_json::{Map, Value};
use storefront_account_core::Email;

/// Credentials for signing in.
#[derive(Debug, Clone)]
pub struct SignInInput {
    /// Account email.
    pub email: Email,
    /// Account password.
    pub password: SecretString,
}

impl SignInInput {
    /// Create sign-in credentials.
    #[must_use]
    pub fn new(email: Email, password: impl Into<SecretString>) -> Self {
        Self {
            email,
            password: password.into(),
        }
    }
}

/// Profile fields to change. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CustomerUpdateInput {
    /// First name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    /// Last name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    /// Newsletter subscription.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_subscribed: Option<bool>,
    /// Date of birth (`YYYY-MM-DD`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    /// Any other backend-specific profile fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Profile of a customer being registered.
#[derive(Debug, Clone, Serialize)]
pub struct NewCustomer {
    /// Account email, also used for the follow-up sign-in.
    pub email: Email,
    /// First name.
    pub firstname: String,
    /// Last name.
    pub lastname: String,
    /// Newsletter subscription.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_subscribed: Option<bool>,
}

/// Registration request.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Profile of the new customer.
    pub customer: NewCustomer,
    /// Password for the new account.
    pub password: SecretString,
}

/// Password change request for the signed-in customer.
#[derive(Debug, Clone)]
pub struct ChangePasswordInput {
    /// Password currently in use.
    pub current_password: SecretString,
    /// Replacement password.
    pub new_password: SecretString,
}

/// Region of an address.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AddressRegionInput {
    /// Region name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Region code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
    /// Backend region ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_id: Option<i64>,
}

/// Input for creating or updating an address.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AddressInput {
    /// First name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    /// Last name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    /// Company name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Street lines.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub street: Vec<String>,
    /// City.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<AddressRegionInput>,
    /// Postal/ZIP code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    /// ISO country code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// Phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    /// Use as default shipping address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_shipping: Option<bool>,
    /// Use as default billing address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_billing: Option<bool>,
}

/// Forgot-password request.
#[derive(Debug, Clone)]
pub struct ForgotPasswordInput {
    /// Email of the account to recover.
    pub email: Email,
}

/// Password reset request from the emailed reset link.
#[derive(Debug, Clone)]
pub struct ResetPasswordInput {
    /// Reset token from the link.
    pub token: SecretString,
    /// New password.
    pub password: SecretString,
    /// New password, repeated.
    pub password_confirmation: SecretString,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_customer_update_skips_unset_fields() {
        let mut input = CustomerUpdateInput {
            firstname: Some("Ada".to_string()),
            ..CustomerUpdateInput::default()
        };
        input.extra.insert("gender".to_string(), json!(2));

        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({ "firstname": "Ada", "gender": 2 })
        );
    }

    #[test]
    fn test_address_input_shape() {
        let input = AddressInput {
            street: vec!["1 Main St".to_string()],
            city: Some("Springfield".to_string()),
            region: Some(AddressRegionInput {
                region_code: Some("IL".to_string()),
                ..AddressRegionInput::default()
            }),
            default_shipping: Some(true),
            ..AddressInput::default()
        };

        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({
                "street": ["1 Main St"],
                "city": "Springfield",
                "region": { "region_code": "IL" },
                "default_shipping": true
            })
        );
    }

    #[test]
    fn test_sign_in_debug_redacts_password() {
        let input = SignInInput::new(Email::parse("a@b.com").unwrap(), "hunter2".to_string());
        let debug_output = format!("{input:?}");
        assert!(debug_output.contains("a@b.com"));
        assert!(!debug_output.contains("hunter2"));
    }
}
