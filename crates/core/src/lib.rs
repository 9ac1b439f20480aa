//! Bazaar Core - Shared marketplace types, form validation and reporting.
//!
//! This crate provides the I/O-free half of the Bazaar marketplace client.
//! It is shared by:
//! - `bazaar-client` - Backend synchronization, entity store and configuration
//! - `bazaar-cli` - Command-line reports and offline form validation
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no global state. Validators and report builders can be called
//! on every keystroke or every refetch without accumulating anything.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, emails, statuses and the category table
//! - [`models`] - Marketplace entities and their editable drafts
//! - [`validation`] - Declarative field rules and the form validator
//! - [`forms`] - Typed form-control configuration
//! - [`report`] - Sales and product report aggregation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod forms;
pub mod models;
pub mod report;
pub mod types;
pub mod validation;

pub use types::*;
