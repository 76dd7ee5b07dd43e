//! Data Models Module
//!
//! Response DTOs for the observability endpoints.

pub mod responses;

pub use responses::*;
