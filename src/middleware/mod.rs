//! HTTP middleware shared across the router.

pub mod logging;

pub use logging::request_logging;
