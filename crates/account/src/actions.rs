//! Account actions.
//!
//! Every action has the same shape: build an operation with [`queries`],
//! execute it on the [`Transport`], then either dispatch a store update or
//! dispatch an error notification carrying the backend's first error
//! message. Failures are not returned to the caller, except from
//! [`AccountActions::sign_in`] (and [`AccountActions::create_account`],
//! which signs in on success).
//!
//! # Preserved backend-contract quirks
//!
//! These mirror the existing client behaviour and are kept until product
//! decides otherwise:
//!
//! - [`AccountActions::change_password`] dispatches the password-change
//!   payload as customer details.
//! - [`AccountActions::create_address`] dispatches the created address as
//!   customer details.
//! - [`AccountActions::update_address`] dispatches nothing on success.

use std::sync::Arc;

use secrecy::SecretString;
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use storefront_account_core::{AddressId, Customer, Notification, PasswordResetStatus};
use tracing::{debug, instrument, warn};

use crate::cache::{LocalCache, MokaLocalCache};
use crate::config::{AccountConfig, CacheSettings};
use crate::error::{SignInError, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::inputs::{
    AddressInput, ChangePasswordInput, CreateAccountInput, CustomerUpdateInput,
    ForgotPasswordInput, ResetPasswordInput, SignInInput,
};
use crate::queries;
use crate::reset::InitialStateReset;
use crate::store::{Dispatch, StoreUpdate};
use crate::token::{InMemoryTokenStorage, TokenStorage};
use crate::transport::{HttpTransport, Operation, Transport, TransportError};

const BREADCRUMB_CATEGORY: &str = "account";

// ─────────────────────────────────────────────────────────────────────────────
// Response Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CustomerResponse {
    customer: Customer,
}

#[derive(Deserialize)]
struct UpdateCustomerResponse {
    #[serde(rename = "updateCustomer")]
    update_customer: CustomerResponse,
}

#[derive(Deserialize)]
struct ChangePasswordResponse {
    password: Customer,
}

#[derive(Deserialize)]
struct AddressesResponse {
    addresses: Customer,
}

#[derive(Deserialize)]
struct DeleteAddressResponse {
    #[serde(rename = "deleteCustomerAddress")]
    deleted: bool,
}

#[derive(Deserialize)]
struct ResetPasswordResponse {
    #[serde(rename = "resetPassword")]
    reset_password: StatusPayload,
}

#[derive(Deserialize)]
struct StatusPayload {
    status: String,
}

#[derive(Deserialize)]
struct SignInResponse {
    #[serde(rename = "generateCustomerToken")]
    generate_customer_token: Option<TokenPayload>,
}

#[derive(Deserialize)]
struct TokenPayload {
    token: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// AccountActions
// ─────────────────────────────────────────────────────────────────────────────

/// Orchestrates account requests and reconciles their results into state.
///
/// Cheap to clone; all collaborators are shared.
#[derive(Clone)]
pub struct AccountActions {
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStorage>,
    cache: Arc<dyn LocalCache>,
    cart: Arc<dyn InitialStateReset>,
    wishlist: Arc<dyn InitialStateReset>,
    cache_settings: CacheSettings,
}

impl AccountActions {
    /// Create actions over the given collaborators, caching the customer
    /// snapshot under the default key and TTL.
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        tokens: Arc<dyn TokenStorage>,
        cache: Arc<dyn LocalCache>,
        cart: Arc<dyn InitialStateReset>,
        wishlist: Arc<dyn InitialStateReset>,
    ) -> Self {
        Self {
            transport,
            tokens,
            cache,
            cart,
            wishlist,
            cache_settings: CacheSettings::default(),
        }
    }

    /// Wire the default HTTP transport, in-memory token storage and `moka`
    /// cache from configuration.
    #[must_use]
    pub fn from_config(
        config: &AccountConfig,
        cart: Arc<dyn InitialStateReset>,
        wishlist: Arc<dyn InitialStateReset>,
    ) -> Self {
        let tokens: Arc<dyn TokenStorage> = Arc::new(InMemoryTokenStorage::default());
        let transport = Arc::new(HttpTransport::new(config, Arc::clone(&tokens)));
        let cache = Arc::new(MokaLocalCache::new(config.cache.capacity));

        Self::new(transport, tokens, cache, cart, wishlist)
            .with_cache_settings(config.cache.clone())
    }

    /// Override where and for how long the customer snapshot is cached.
    #[must_use]
    pub fn with_cache_settings(mut self, cache_settings: CacheSettings) -> Self {
        self.cache_settings = cache_settings;
        self
    }

    /// The token storage shared with the transport.
    #[must_use]
    pub fn tokens(&self) -> &Arc<dyn TokenStorage> {
        &self.tokens
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Customer
    // ─────────────────────────────────────────────────────────────────────────

    /// Load the signed-in customer.
    ///
    /// A cached snapshot, if one exists, is dispatched before the request is
    /// sent. The backend's answer is then dispatched and becomes the new
    /// snapshot with a fresh TTL.
    #[instrument(skip_all)]
    pub async fn fetch_customer(&self, dispatch: &dyn Dispatch) {
        add_breadcrumb(BREADCRUMB_CATEGORY, "Fetch customer", None);
        let operation = queries::customer();

        if let Some(cached) = self.cached_customer().await {
            debug!("Dispatching cached customer snapshot");
            dispatch.dispatch(StoreUpdate::CustomerDetails(cached));
        }

        match self.execute::<CustomerResponse>(&operation).await {
            Ok(CustomerResponse { customer }) => {
                if let Some(id) = customer.id() {
                    set_sentry_user(&id, customer.email());
                }
                self.store_snapshot(&customer).await;
                dispatch.dispatch(StoreUpdate::CustomerDetails(customer));
            }
            Err(error) => notify_failure(dispatch, "fetch_customer", &error),
        }
    }

    /// Update profile fields and refresh the snapshot.
    #[instrument(skip_all)]
    pub async fn update_customer(&self, input: &CustomerUpdateInput, dispatch: &dyn Dispatch) {
        add_breadcrumb(BREADCRUMB_CATEGORY, "Update customer", None);
        let operation = queries::update_customer(input);

        match self.execute::<UpdateCustomerResponse>(&operation).await {
            Ok(response) => {
                let customer = response.update_customer.customer;
                self.store_snapshot(&customer).await;
                dispatch.dispatch(StoreUpdate::CustomerDetails(customer));
            }
            Err(error) => notify_failure(dispatch, "update_customer", &error),
        }
    }

    /// Change the password of `customer`.
    ///
    /// On success the password-change payload is dispatched as customer
    /// details, replacing the stored customer with the partial record the
    /// mutation returns.
    #[instrument(skip_all, fields(customer_id = ?customer.id()))]
    pub async fn change_password(
        &self,
        input: &ChangePasswordInput,
        customer: &Customer,
        dispatch: &dyn Dispatch,
    ) {
        add_breadcrumb(BREADCRUMB_CATEGORY, "Change password", None);
        let operation = queries::change_customer_password(input, customer);

        match self.execute::<ChangePasswordResponse>(&operation).await {
            Ok(response) => dispatch.dispatch(StoreUpdate::CustomerDetails(response.password)),
            Err(error) => notify_failure(dispatch, "change_password", &error),
        }
    }

    /// Sign out locally and reset cart and wishlist to guest state.
    ///
    /// The backend session is not invalidated.
    #[instrument(skip_all)]
    pub async fn logout(&self, dispatch: &dyn Dispatch) {
        add_breadcrumb(BREADCRUMB_CATEGORY, "Logout", None);

        dispatch.dispatch(StoreUpdate::SignInStatus(false));
        self.tokens.clear();
        clear_sentry_user();

        self.cart.reset_initial_state(dispatch).await;
        self.wishlist.reset_initial_state(dispatch).await;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Addresses
    // ─────────────────────────────────────────────────────────────────────────

    /// Create an address.
    ///
    /// On success the created address is dispatched as customer details.
    #[instrument(skip_all)]
    pub async fn create_address(&self, input: &AddressInput, dispatch: &dyn Dispatch) {
        add_breadcrumb(BREADCRUMB_CATEGORY, "Create address", None);
        let operation = queries::create_customer_address(input);

        match self.execute::<AddressesResponse>(&operation).await {
            Ok(response) => dispatch.dispatch(StoreUpdate::CustomerDetails(response.addresses)),
            Err(error) => notify_failure(dispatch, "create_address", &error),
        }
    }

    /// Update an address.
    ///
    /// Only failures reach the store; a successful update dispatches nothing.
    #[instrument(skip(self, input, dispatch), fields(address_id = %id))]
    pub async fn update_address(
        &self,
        id: AddressId,
        input: &AddressInput,
        dispatch: &dyn Dispatch,
    ) {
        add_breadcrumb(BREADCRUMB_CATEGORY, "Update address", None);
        let operation = queries::update_customer_address(id, input);

        match self.execute::<IgnoredAny>(&operation).await {
            Ok(_) => debug!("Address updated"),
            Err(error) => notify_failure(dispatch, "update_address", &error),
        }
    }

    /// Delete an address, then reload the customer so the store and the
    /// snapshot drop it.
    #[instrument(skip(self, dispatch), fields(address_id = %id))]
    pub async fn delete_address(&self, id: AddressId, dispatch: &dyn Dispatch) {
        add_breadcrumb(BREADCRUMB_CATEGORY, "Delete address", None);
        let operation = queries::delete_customer_address(id);

        match self.execute::<DeleteAddressResponse>(&operation).await {
            Ok(DeleteAddressResponse { deleted: true }) => self.fetch_customer(dispatch).await,
            Ok(DeleteAddressResponse { deleted: false }) => {
                warn!("Backend declined to delete address");
                dispatch.dispatch(StoreUpdate::Notification(Notification::error(
                    "The address could not be deleted",
                )));
            }
            Err(error) => notify_failure(dispatch, "delete_address", &error),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Passwords
    // ─────────────────────────────────────────────────────────────────────────

    /// Request a password reset email.
    #[instrument(skip_all)]
    pub async fn forgot_password(&self, input: &ForgotPasswordInput, dispatch: &dyn Dispatch) {
        add_breadcrumb(BREADCRUMB_CATEGORY, "Forgot password", None);
        let operation = queries::forgot_password(input);

        match self.execute::<IgnoredAny>(&operation).await {
            Ok(_) => dispatch.dispatch(StoreUpdate::PasswordForgotCompleted),
            Err(error) => notify_failure(dispatch, "forgot_password", &error),
        }
    }

    /// Set a new password from a reset token.
    ///
    /// Both outcomes land in the password reset status: the backend's status
    /// string on success, [`PasswordResetStatus::Error`] on any failure. No
    /// notification is dispatched.
    #[instrument(skip_all)]
    pub async fn reset_password(&self, input: &ResetPasswordInput, dispatch: &dyn Dispatch) {
        add_breadcrumb(BREADCRUMB_CATEGORY, "Reset password", None);
        let operation = queries::reset_password(input);

        let status = match self.execute::<ResetPasswordResponse>(&operation).await {
            Ok(response) => PasswordResetStatus::from(response.reset_password.status),
            Err(error) => {
                warn!(error = %error, "Password reset failed");
                PasswordResetStatus::Error
            }
        };

        dispatch.dispatch(StoreUpdate::PasswordResetStatus(status));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authentication
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a customer, then sign in with the same credentials.
    ///
    /// A failed registration is reported as a notification and yields
    /// `Ok(())`.
    ///
    /// # Errors
    ///
    /// Returns the follow-up [`sign_in`](Self::sign_in) error.
    #[instrument(skip_all)]
    pub async fn create_account(
        &self,
        input: &CreateAccountInput,
        dispatch: &dyn Dispatch,
    ) -> Result<(), SignInError> {
        add_breadcrumb(BREADCRUMB_CATEGORY, "Create account", None);
        let operation = queries::create_customer(input);

        match self.execute::<IgnoredAny>(&operation).await {
            Ok(_) => {
                let credentials = SignInInput {
                    email: input.customer.email.clone(),
                    password: input.password.clone(),
                };
                self.sign_in(&credentials, dispatch).await
            }
            Err(error) => {
                notify_failure(dispatch, "create_account", &error);
                Ok(())
            }
        }
    }

    /// Exchange credentials for a token and mark the customer signed in.
    ///
    /// On success the token is stored before the sign-in status is
    /// dispatched, then the cart is reset for the signed-in customer.
    ///
    /// # Errors
    ///
    /// Returns [`SignInError::Rejected`] with the backend's first error when
    /// the credentials are refused. Nothing is dispatched and no token is
    /// written on failure.
    #[instrument(skip_all, fields(email_domain = %input.email.domain()))]
    pub async fn sign_in(
        &self,
        input: &SignInInput,
        dispatch: &dyn Dispatch,
    ) -> Result<(), SignInError> {
        add_breadcrumb(BREADCRUMB_CATEGORY, "Sign in", None);
        let operation = queries::generate_customer_token(input);

        let response: SignInResponse = self.execute(&operation).await.map_err(|error| {
            warn!(error = %error, "Sign-in rejected");
            SignInError::from(error)
        })?;

        let token = response
            .generate_customer_token
            .and_then(|payload| payload.token)
            .filter(|token| !token.is_empty())
            .ok_or(SignInError::MissingToken)?;

        self.tokens.set(SecretString::from(token));
        dispatch.dispatch(StoreUpdate::SignInStatus(true));
        self.cart.reset_initial_state(dispatch).await;

        debug!("Customer signed in");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Execute an operation and decode its `data` object.
    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &Operation,
    ) -> Result<T, TransportError> {
        let data = self.transport.execute(operation).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// The cached customer, if one is stored and identifies a customer.
    async fn cached_customer(&self) -> Option<Customer> {
        let customer = Customer::from(self.cache.get(&self.cache_settings.key).await?);

        if customer.is_identified() {
            Some(customer)
        } else {
            debug!("Ignoring customer snapshot without an id");
            None
        }
    }

    /// Overwrite the customer snapshot with the payload as received,
    /// restarting its TTL.
    async fn store_snapshot(&self, customer: &Customer) {
        self.cache
            .set(
                customer.as_value().clone(),
                &self.cache_settings.key,
                self.cache_settings.ttl,
            )
            .await;
    }
}

impl std::fmt::Debug for AccountActions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountActions")
            .field("cache_settings", &self.cache_settings)
            .finish_non_exhaustive()
    }
}

/// Surface a failed request as an error notification.
fn notify_failure(dispatch: &dyn Dispatch, action: &'static str, error: &TransportError) {
    warn!(action, error = %error, "Account action failed");
    dispatch.dispatch(StoreUpdate::Notification(Notification::error(
        error.first_message(),
    )));
}
