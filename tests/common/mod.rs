//! Shared by the suites under tests/api.

pub mod helpers;

#[allow(unused_imports)]
pub use test_app::{TestApp, spawn_app};
