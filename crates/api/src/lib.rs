//! Greenstem catalog and identity API.
//!
//! Library crate backing the `greenstem-api` binary. Exposes the HTTP
//! router, configuration, storage backends, and domain services so
//! integration tests can drive the full stack in-process.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
