//! Client code for mushaf.
//!
//! This crate provides the HTTP client for the origin document API and maps
//! its responses into the core document model.

pub mod origin;

pub use origin::{OriginClient, OriginConfig, OriginError};
