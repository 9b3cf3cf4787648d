//! Test helpers module
//!
//! Fixtures for the four school tables and a wiremock-backed record store
//! server.

#![allow(dead_code)]

pub mod store_mock;
pub mod test_data;

pub use store_mock::*;
pub use test_data::*;
