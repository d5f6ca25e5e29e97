//! # DFD Common Library
//!
//! Shared code for the deepfake detection dashboard crates:
//! - Error type and result alias
//! - Bootstrap configuration (TOML + environment + CLI)
//! - Event types (DashEvent enum) and EventBus
//! - Verdict wire type returned by the classification backend
//! - Timestamp utilities

pub mod config;
pub mod error;
pub mod events;
pub mod time;
pub mod verdict;

pub use error::{Error, Result};
pub use verdict::{Verdict, VerdictLabel};
