//! Domain services.
//!
//! Services sit between the HTTP routes and the storage traits: they own
//! input validation and business rules, and return domain values that the
//! routes wrap in response envelopes.

pub mod auth;
pub mod catalog;
