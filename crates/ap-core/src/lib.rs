//! ap-core: shared foundation for the autopilot crates.
//!
//! Contains:
//! - numeric (Real + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;

pub use error::{CoreError, CoreResult};
pub use numeric::*;
