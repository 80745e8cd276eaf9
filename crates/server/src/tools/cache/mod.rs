//! Cache administration MCP tools.
//!
//! Status and probes are read-only; invalidation and warm-up write.

pub mod invalidate;
pub mod status;
pub mod warm;

pub use invalidate::{CacheInvalidateParams, invalidate_impl};
pub use status::{CacheProbeParams, probe_impl, status_impl};
pub use warm::warm_impl;
