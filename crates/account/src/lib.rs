//! Storefront account library.
//!
//! Translates account intents (sign in, update profile, reset password,
//! manage addresses) into GraphQL calls against the commerce backend and
//! pushes the outcome into a client-side state store.
//!
//! # Architecture
//!
//! [`AccountActions`] owns no state of its own. Every collaborator is
//! injected so callers (and tests) decide how requests are sent and where
//! results land:
//!
//! - [`transport::Transport`] - executes an [`transport::Operation`]
//! - [`token::TokenStorage`] - holds the customer authorization token
//! - [`store::Dispatch`] - receives [`store::StoreUpdate`]s
//! - [`cache::LocalCache`] - keeps the customer snapshot between sessions
//! - [`reset::InitialStateReset`] - resets cart and wishlist to guest state
//!
//! Request descriptors come from [`queries`].
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_account::{AccountActions, AccountConfig, AccountStore};
//!
//! let config = AccountConfig::from_env()?;
//! let _sentry_guard = storefront_account::init_sentry(&config);
//! let actions = AccountActions::from_config(&config, cart, wishlist);
//! let store = AccountStore::default();
//!
//! actions.sign_in(&SignInInput::new(email, password), &store).await?;
//! actions.fetch_customer(&store).await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod actions;
pub mod cache;
pub mod config;
pub mod error;
pub mod inputs;
pub mod queries;
pub mod reset;
pub mod store;
pub mod token;
pub mod transport;

pub use actions::AccountActions;
pub use config::{AccountConfig, CUSTOMER_CACHE_KEY, CUSTOMER_CACHE_TTL, CacheSettings};
pub use error::{SignInError, init_sentry};
pub use store::{AccountState, AccountStore, Dispatch, StoreUpdate};
