//! Utility functions shared across the codebase

pub mod http;

pub use http::{HttpClientConfig, endpoint};
