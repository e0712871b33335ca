//! Client-side account state and the dispatch seam.
//!
//! Actions never own state. They hand [`StoreUpdate`]s to whatever
//! [`Dispatch`] the caller passed in: a UI store, a test recorder, or the
//! in-memory [`AccountStore`] shipped here.

use std::sync::{PoisonError, RwLock};

use storefront_account_core::{Customer, Notification, PasswordResetStatus};

/// An update delivered to the client-side state store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreUpdate {
    /// Whether a customer is signed in.
    SignInStatus(bool),
    /// Replace the customer details.
    CustomerDetails(Customer),
    /// Result of a password reset request.
    PasswordResetStatus(PasswordResetStatus),
    /// The forgot-password request went through.
    PasswordForgotCompleted,
    /// Show a message to the user.
    Notification(Notification),
}

/// Receives state updates.
pub trait Dispatch: Send + Sync {
    /// Deliver an update.
    fn dispatch(&self, update: StoreUpdate);
}

impl<F> Dispatch for F
where
    F: Fn(StoreUpdate) + Send + Sync,
{
    fn dispatch(&self, update: StoreUpdate) {
        self(update);
    }
}

/// Account slice of the client state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountState {
    /// Whether a customer is signed in.
    pub signed_in: bool,
    /// Last known customer details.
    pub customer: Option<Customer>,
    /// Result of the last password reset request.
    pub password_reset_status: Option<PasswordResetStatus>,
    /// Whether the last forgot-password request went through.
    pub password_forgot_completed: bool,
    /// Notifications not yet shown.
    pub notifications: Vec<Notification>,
}

impl AccountState {
    /// Apply an update. Last write wins.
    pub fn apply(&mut self, update: StoreUpdate) {
        match update {
            StoreUpdate::SignInStatus(signed_in) => self.signed_in = signed_in,
            StoreUpdate::CustomerDetails(customer) => self.customer = Some(customer),
            StoreUpdate::PasswordResetStatus(status) => self.password_reset_status = Some(status),
            StoreUpdate::PasswordForgotCompleted => self.password_forgot_completed = true,
            StoreUpdate::Notification(notification) => self.notifications.push(notification),
        }
    }
}

/// In-memory [`Dispatch`] target holding an [`AccountState`].
#[derive(Debug, Default)]
pub struct AccountStore {
    state: RwLock<AccountState>,
}

impl AccountStore {
    /// A copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> AccountState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove and return pending notifications.
    pub fn take_notifications(&self) -> Vec<Notification> {
        std::mem::take(
            &mut self
                .state
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .notifications,
        )
    }
}

impl Dispatch for AccountStore {
    fn dispatch(&self, update: StoreUpdate) {
        tracing::trace!(?update, "Applying account store update");
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(update);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    fn customer(id: i64) -> Customer {
        Customer::from(json!({ "id": id }))
    }

    #[test]
    fn test_apply_last_write_wins() {
        let store = AccountStore::default();
        store.dispatch(StoreUpdate::CustomerDetails(customer(1)));
        store.dispatch(StoreUpdate::CustomerDetails(customer(2)));
        store.dispatch(StoreUpdate::SignInStatus(true));
        store.dispatch(StoreUpdate::SignInStatus(false));

        let state = store.snapshot();
        assert_eq!(state.customer, Some(customer(2)));
        assert!(!state.signed_in);
    }

    #[test]
    fn test_password_flow_updates() {
        let store = AccountStore::default();
        store.dispatch(StoreUpdate::PasswordForgotCompleted);
        store.dispatch(StoreUpdate::PasswordResetStatus(PasswordResetStatus::Error));

        let state = store.snapshot();
        assert!(state.password_forgot_completed);
        assert_eq!(
            state.password_reset_status.unwrap().as_str(),
            PasswordResetStatus::ERROR
        );
    }

    #[test]
    fn test_take_notifications_drains() {
        let store = AccountStore::default();
        store.dispatch(StoreUpdate::Notification(Notification::error("one")));
        store.dispatch(StoreUpdate::Notification(Notification::error("two")));

        let taken = store.take_notifications();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0].message, "one");
        assert!(store.snapshot().notifications.is_empty());
    }

    #[test]
    fn test_closure_dispatch() {
        let seen = Mutex::new(Vec::new());
        let dispatch = |update: StoreUpdate| seen.lock().unwrap().push(update);

        Dispatch::dispatch(&dispatch, StoreUpdate::SignInStatus(true));

        assert_eq!(
            seen.into_inner().unwrap(),
            vec![StoreUpdate::SignInStatus(true)]
        );
    }
}
