//! Greenstem Core - Shared types library.
//!
//! This crate provides common types used across all Greenstem components:
//! - `api` - Catalog and identity HTTP API
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, slugs, roles, and statuses
//! - [`catalog`] - Product and review domain records
//! - [`identity`] - User domain records
//! - [`filter`] - Catalog filter and ordering builders
//! - [`page`] - Pagination window and result types
//! - [`store`] - Storage traits implemented by the api crate

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod filter;
pub mod identity;
pub mod page;
pub mod store;
pub mod types;

pub use catalog::*;
pub use filter::*;
pub use identity::*;
pub use page::*;
pub use store::*;
pub use types::*;
