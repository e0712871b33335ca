//! Seam to the cart and wishlist state owners.

use async_trait::async_trait;

use crate::store::Dispatch;

/// Something that can put its client state back to the initial state for
/// the current session (guest or freshly signed-in customer).
///
/// Implemented by the cart and wishlist layers. Account actions call it on
/// sign-in and logout so those slices reload for the new identity.
#[async_trait]
pub trait InitialStateReset: Send + Sync {
    /// Reset and reload, reporting through `dispatch`.
    async fn reset_initial_state(&self, dispatch: &dyn Dispatch);
}
