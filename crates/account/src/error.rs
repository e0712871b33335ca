//! Sign-in error type and Sentry helpers.
//!
//! Most account actions report failures as notifications through the store.
//! Sign-in is the exception: its error is returned so the caller can show it
//! inline on the form.

use thiserror::Error;

use crate::config::AccountConfig;
use crate::transport::{GraphQLError, TransportError};

/// Why a sign-in attempt failed.
#[derive(Debug, Error)]
pub enum SignInError {
    /// The backend rejected the credentials; carries its first error.
    #[error("{}", .0.message)]
    Rejected(GraphQLError),

    /// The request failed without a backend error list.
    #[error(transparent)]
    Transport(TransportError),

    /// The backend accepted the credentials but returned no token.
    #[error("sign-in response did not include a token")]
    MissingToken,
}

impl SignInError {
    /// The message to show next to the sign-in form.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Rejected(error) => error.message.clone(),
            Self::Transport(error) => error.first_message(),
            Self::MissingToken => self.to_string(),
        }
    }
}

impl From<TransportError> for SignInError {
    fn from(error: TransportError) -> Self {
        match error.into_first_graphql_error() {
            Ok(first) => Self::Rejected(first),
            Err(other) => Self::Transport(other),
        }
    }
}

/// Initialize Sentry error tracking from the configured DSN.
///
/// Returns `None` when no DSN is configured. The guard must be kept alive for
/// events to be flushed.
#[must_use]
pub fn init_sentry(config: &AccountConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Set the Sentry user context for the signed-in customer.
///
/// Call this once the customer is known so errors are associated with them.
pub fn set_sentry_user(customer_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(customer_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the customer.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for an account action.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_takes_first_backend_error() {
        let err = SignInError::from(TransportError::GraphQL(vec![
            GraphQLError::from_message("The account sign-in was incorrect"),
            GraphQLError::from_message("ignored"),
        ]));

        assert!(matches!(err, SignInError::Rejected(_)));
        assert_eq!(err.to_string(), "The account sign-in was incorrect");
        assert_eq!(err.message(), "The account sign-in was incorrect");
    }

    #[test]
    fn test_non_graphql_failure_is_transport() {
        let err = SignInError::from(TransportError::MissingData);
        assert!(matches!(err, SignInError::Transport(TransportError::MissingData)));
        assert_eq!(err.message(), "No data in response");
    }

    #[test]
    fn test_empty_error_list_is_transport() {
        let err = SignInError::from(TransportError::GraphQL(vec![]));
        assert!(matches!(err, SignInError::Transport(_)));
    }

    #[test]
    fn test_init_sentry_without_dsn() {
        let config = AccountConfig {
            endpoint: url::Url::parse("https://shop.example.com/graphql").unwrap(),
            store_code: None,
            cache: crate::config::CacheSettings::default(),
            sentry_dsn: None,
        };
        assert!(init_sentry(&config).is_none());
    }

    #[test]
    fn test_breadcrumb_helpers_without_client() {
        // No Sentry client is bound in tests; these must be no-ops.
        add_breadcrumb("account", "Sign in", Some(&[("email_domain", "b.com")]));
        set_sentry_user(&1, Some("a@b.com"));
        clear_sentry_user();
    }
}
