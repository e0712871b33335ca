//! Customer authorization token storage.

use std::sync::{PoisonError, RwLock};

use secrecy::SecretString;

/// Holds the customer authorization token.
///
/// Written by sign-in and logout, read by the transport on every request.
pub trait TokenStorage: Send + Sync {
    /// Store a freshly issued token, replacing any previous one.
    fn set(&self, token: SecretString);

    /// The current token, if the customer is signed in.
    fn get(&self) -> Option<SecretString>;

    /// Forget the token.
    fn clear(&self);
}

/// Process-local [`TokenStorage`].
#[derive(Default)]
pub struct InMemoryTokenStorage {
    token: RwLock<Option<SecretString>>,
}

impl InMemoryTokenStorage {
    /// Whether a token is currently stored.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl std::fmt::Debug for InMemoryTokenStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTokenStorage")
            .field("token", &if self.has_token() { "[REDACTED]" } else { "None" })
            .finish()
    }
}

impl TokenStorage for InMemoryTokenStorage {
    fn set(&self, token: SecretString) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    fn get(&self) -> Option<SecretString> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_set_get_clear() {
        let storage = InMemoryTokenStorage::default();
        assert!(storage.get().is_none());

        storage.set(SecretString::from("tok123"));
        assert_eq!(storage.get().unwrap().expose_secret(), "tok123");

        storage.set(SecretString::from("tok456"));
        assert_eq!(storage.get().unwrap().expose_secret(), "tok456");

        storage.clear();
        assert!(!storage.has_token());
    }

    #[test]
    fn test_debug_redacts_token() {
        let storage = InMemoryTokenStorage::default();
        storage.set(SecretString::from("super_secret_token"));

        let debug_output = format!("{storage:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token"));
    }
}
