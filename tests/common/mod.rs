//! Common test utilities for sight integration tests

#[allow(dead_code)]
pub mod fixtures;
#[allow(dead_code)]
pub mod service;

#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use service::*;
