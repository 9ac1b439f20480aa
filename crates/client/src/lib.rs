//! Bazaar Client - Backend synchronization for the marketplace.
//!
//! This crate is the I/O half of the client core:
//!
//! - [`store`] - The injectable entity store views read from and subscribe to
//! - [`sync`] - The coordinator that validates, submits and refetches
//! - [`donations`] - Tipping a seller through an external payment step
//! - [`api`] - The REST envelope, the [`Transport`] seam and its HTTP impl
//! - [`config`] - Environment-driven configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use bazaar_client::{ClientConfig, SyncCoordinator};
//!
//! let config = ClientConfig::from_env()?;
//! let sync = SyncCoordinator::from_config(&config)?;
//! let products = sync.refresh_products().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod donations;
pub mod error;
pub mod store;
pub mod sync;

#[cfg(test)]
mod testing;

pub use api::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};
pub use config::{ClientConfig, ConfigError, patterns_from_env};
pub use donations::{DonationReceipt, PaymentConfirmer, PaymentDeclined, PaymentIntent};
pub use error::{ApiError, SyncError};
pub use store::{
    Action, EntityKey, EntityKind, ListKind, ListTicket, LoadStatus, Session, Store, StoreState,
};
pub use sync::SyncCoordinator;
