//! Live adapters that reach real endpoints.

pub mod http;
