//! Storefront Account Core - Shared account types.
//!
//! This crate provides the value types that flow between the account actions
//! and the client-side state store:
//! - [`Customer`] and [`Address`] as returned by the commerce backend
//! - [`Notification`] for user-facing failure messages
//! - [`PasswordResetStatus`] for the password reset flow
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no caches.
//! This keeps it lightweight and allows it to be used by any store or UI layer.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs and emails, customer and status types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
