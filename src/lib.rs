//! Attire Backend Library
//!
//! Exposes the authentication and session-lifecycle subsystem for the
//! dress rental catalog API. Binaries and integration tests build on these
//! modules; catalog data access lives behind routes this crate only guards.

pub mod auth;
pub mod config;
pub mod middleware;
pub mod server;
