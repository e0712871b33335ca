//! GraphQL request builders for account operations.
//!
//! Each builder returns an [`Operation`] ready for a
//! [`Transport`](crate::transport::Transport). Response field aliases
//! (`password`, `addresses`) are part of the contract with
//! [`AccountActions`](crate::AccountActions), which decodes by alias.

use graphql_client::QueryBody;
use secrecy::ExposeSecret;
use serde_json::json;
use storefront_account_core::{AddressId, Customer};

use crate::inputs::{
    AddressInput, ChangePasswordInput, CreateAccountInput, CustomerUpdateInput,
    ForgotPasswordInput, ResetPasswordInput, SignInInput,
};
use crate::transport::Operation;

const GET_CUSTOMER: &str = r"
    query GetCustomer {
        customer {
            id
            email
            firstname
            lastname
            is_subscribed
            date_of_birth
            addresses {
                id
                firstname
                lastname
                company
                street
                city
                region {
                    region
                    region_code
                    region_id
                }
                postcode
                country_code
                telephone
                default_shipping
                default_billing
            }
        }
    }
";

const UPDATE_CUSTOMER: &str = r"
    mutation UpdateCustomer($input: CustomerInput!) {
        updateCustomer(input: $input) {
            customer {
                id
                email
                firstname
                lastname
                is_subscribed
                date_of_birth
                addresses {
                    id
                    firstname
                    lastname
                    company
                    street
                    city
                    region {
                        region
                        region_code
                        region_id
                    }
                    postcode
                    country_code
                    telephone
                    default_shipping
                    default_billing
                }
            }
        }
    }
";

const CHANGE_CUSTOMER_PASSWORD: &str = r"
    mutation ChangeCustomerPassword($id: Int, $currentPassword: String!, $newPassword: String!) {
        password: changeCustomerPassword(
            id: $id
            currentPassword: $currentPassword
            newPassword: $newPassword
        ) {
            id
            email
        }
    }
";

const CREATE_CUSTOMER_ADDRESS: &str = r"
    mutation CreateCustomerAddress($input: CustomerAddressInput!) {
        addresses: createCustomerAddress(input: $input) {
            id
            firstname
            lastname
            company
            street
            city
            region {
                region
                region_code
                region_id
            }
            postcode
            country_code
            telephone
            default_shipping
            default_billing
        }
    }
";

const UPDATE_CUSTOMER_ADDRESS: &str = r"
    mutation UpdateCustomerAddress($id: Int!, $input: CustomerAddressInput) {
        addresses: updateCustomerAddress(id: $id, input: $input) {
            id
            firstname
            lastname
            company
            street
            city
            region {
                region
                region_code
                region_id
            }
            postcode
            country_code
            telephone
            default_shipping
            default_billing
        }
    }
";

const DELETE_CUSTOMER_ADDRESS: &str = r"
    mutation DeleteCustomerAddress($id: Int!) {
        deleteCustomerAddress(id: $id)
    }
";

const FORGOT_PASSWORD: &str = r"
    mutation ForgotPassword($email: String!) {
        forgotPassword(email: $email) {
            status
        }
    }
";

const RESET_PASSWORD: &str = r"
    mutation ResetPassword($token: String!, $password: String!, $password_confirmation: String!) {
        resetPassword(
            token: $token
            password: $password
            password_confirmation: $password_confirmation
        ) {
            status
        }
    }
";

const CREATE_CUSTOMER: &str = r"
    mutation CreateCustomer($input: CustomerInput!) {
        createCustomer(input: $input) {
            customer {
                id
                email
                firstname
                lastname
            }
        }
    }
";

const GENERATE_CUSTOMER_TOKEN: &str = r"
    mutation GenerateCustomerToken($email: String!, $password: String!) {
        generateCustomerToken(email: $email, password: $password) {
            token
        }
    }
";

/// Current customer with addresses.
#[must_use]
pub fn customer() -> Operation {
    QueryBody {
        variables: json!({}),
        query: GET_CUSTOMER,
        operation_name: "GetCustomer",
    }
}

/// Update profile fields. Responds with `updateCustomer.customer`.
#[must_use]
pub fn update_customer(input: &CustomerUpdateInput) -> Operation {
    QueryBody {
        variables: json!({ "input": input }),
        query: UPDATE_CUSTOMER,
        operation_name: "UpdateCustomer",
    }
}

/// Change the password of `customer`. Responds with `password`.
#[must_use]
pub fn change_customer_password(input: &ChangePasswordInput, customer: &Customer) -> Operation {
    QueryBody {
        variables: json!({
            "id": customer.id(),
            "currentPassword": input.current_password.expose_secret(),
            "newPassword": input.new_password.expose_secret(),
        }),
        query: CHANGE_CUSTOMER_PASSWORD,
        operation_name: "ChangeCustomerPassword",
    }
}

/// Create an address. Responds with `addresses`.
#[must_use]
pub fn create_customer_address(input: &AddressInput) -> Operation {
    QueryBody {
        variables: json!({ "input": input }),
        query: CREATE_CUSTOMER_ADDRESS,
        operation_name: "CreateCustomerAddress",
    }
}

/// Update an address. Responds with `addresses`.
#[must_use]
pub fn update_customer_address(id: AddressId, input: &AddressInput) -> Operation {
    QueryBody {
        variables: json!({ "id": id, "input": input }),
        query: UPDATE_CUSTOMER_ADDRESS,
        operation_name: "UpdateCustomerAddress",
    }
}

/// Delete an address. Responds with `deleteCustomerAddress: Boolean`.
#[must_use]
pub fn delete_customer_address(id: AddressId) -> Operation {
    QueryBody {
        variables: json!({ "id": id }),
        query: DELETE_CUSTOMER_ADDRESS,
        operation_name: "DeleteCustomerAddress",
    }
}

/// Request a password reset email.
#[must_use]
pub fn forgot_password(input: &ForgotPasswordInput) -> Operation {
    QueryBody {
        variables: json!({ "email": input.email }),
        query: FORGOT_PASSWORD,
        operation_name: "ForgotPassword",
    }
}

/// Set a new password from a reset token. Responds with `resetPassword.status`.
#[must_use]
pub fn reset_password(input: &ResetPasswordInput) -> Operation {
    QueryBody {
        variables: json!({
            "token": input.token.expose_secret(),
            "password": input.password.expose_secret(),
            "password_confirmation": input.password_confirmation.expose_secret(),
        }),
        query: RESET_PASSWORD,
        operation_name: "ResetPassword",
    }
}

/// Register a customer. The password travels inside the customer input.
#[must_use]
pub fn create_customer(input: &CreateAccountInput) -> Operation {
    let mut customer = json!(input.customer);
    if let Some(fields) = customer.as_object_mut() {
        fields.insert(
            "password".to_string(),
            json!(input.password.expose_secret()),
        );
    }

    QueryBody {
        variables: json!({ "input": customer }),
        query: CREATE_CUSTOMER,
        operation_name: "CreateCustomer",
    }
}

/// Exchange credentials for a token. Responds with `generateCustomerToken.token`.
#[must_use]
pub fn generate_customer_token(input: &SignInInput) -> Operation {
    QueryBody {
        variables: json!({
            "email": input.email,
            "password": input.password.expose_secret(),
        }),
        query: GENERATE_CUSTOMER_TOKEN,
        operation_name: "GenerateCustomerToken",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use storefront_account_core::Email;

    use super::*;
    use crate::inputs::NewCustomer;

    fn email() -> Email {
        Email::parse("a@b.com").unwrap()
    }

    #[test]
    fn test_operation_names_match_documents() {
        let operations = [
            customer(),
            update_customer(&CustomerUpdateInput::default()),
            create_customer_address(&AddressInput::default()),
            update_customer_address(AddressId::new(5), &AddressInput::default()),
            delete_customer_address(AddressId::new(5)),
            forgot_password(&ForgotPasswordInput { email: email() }),
        ];

        for op in operations {
            assert!(
                op.query.contains(op.operation_name),
                "{} missing from its document",
                op.operation_name
            );
        }
    }

    #[test]
    fn test_sign_in_variables() {
        let op = generate_customer_token(&SignInInput::new(email(), "x"));
        assert_eq!(op.variables, json!({ "email": "a@b.com", "password": "x" }));
    }

    #[test]
    fn test_change_password_uses_customer_context() {
        let customer = Customer::from(json!({ "id": 7, "email": "a@b.com" }));
        let input = ChangePasswordInput {
            current_password: SecretString::from("old"),
            new_password: SecretString::from("new"),
        };

        let op = change_customer_password(&input, &customer);
        assert_eq!(
            op.variables,
            json!({ "id": 7, "currentPassword": "old", "newPassword": "new" })
        );
        assert!(op.query.contains("password: changeCustomerPassword"));
    }

    #[test]
    fn test_create_customer_merges_password_into_input() {
        let input = CreateAccountInput {
            customer: NewCustomer {
                email: email(),
                firstname: "Ada".to_string(),
                lastname: "Lovelace".to_string(),
                is_subscribed: None,
            },
            password: SecretString::from("s3cret!"),
        };

        let op = create_customer(&input);
        assert_eq!(
            op.variables,
            json!({
                "input": {
                    "email": "a@b.com",
                    "firstname": "Ada",
                    "lastname": "Lovelace",
                    "password": "s3cret!"
                }
            })
        );
    }

    #[test]
    fn test_reset_password_variables() {
        let op = reset_password(&ResetPasswordInput {
            token: SecretString::from("reset-token"),
            password: SecretString::from("pw"),
            password_confirmation: SecretString::from("pw"),
        });
        assert_eq!(op.variables["token"], "reset-token");
        assert_eq!(op.variables["password_confirmation"], "pw");
    }

    #[test]
    fn test_update_address_variables() {
        let op = update_customer_address(
            AddressId::new(5),
            &AddressInput {
                city: Some("Springfield".to_string()),
                ..AddressInput::default()
            },
        );
        assert_eq!(
            op.variables,
            json!({ "id": 5, "input": { "city": "Springfield" } })
        );
    }
}
