//! HTTP middleware stack for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors, trace transactions)
//! 2. `TraceLayer` (request tracing)
//!
//! Authentication is extractor-based rather than layered: routes opt in by
//! taking [`RequireAuth`], [`RequireAdmin`], or [`OptionalAuth`] parameters.

pub mod auth;

pub use auth::{OptionalAuth, RequireAdmin, RequireAuth};
