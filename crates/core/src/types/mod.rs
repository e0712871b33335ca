//! Core types for storefront accounts.
//!
//! This module provides type-safe wrappers for common account concepts.

pub mod customer;
pub mod email;
pub mod id;
pub mod notification;
pub mod status;

pub use customer::{Address, Customer};
pub use email::{Email, EmailError};
pub use id::*;
pub use notification::{Notification, NotificationSeverity};
pub use status::PasswordResetStatus;
