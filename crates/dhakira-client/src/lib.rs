//! dhakira-client: backend access for the dhakira client.
//!
//! Implements the `Backend` trait over the REST API, loads the client
//! configuration, and provides an in-memory mock for tests.

pub mod config;
pub mod http;
pub mod mock;

pub use config::{load_config, load_config_from, DhakiraConfig};
pub use http::HttpBackend;
pub use mock::MockBackend;
