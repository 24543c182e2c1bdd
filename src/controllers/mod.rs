//! Inbound adapters
//!
//! The HTTP API is the only way the config changes at runtime.

mod http;

pub use http::{ApiContext, api_router};
