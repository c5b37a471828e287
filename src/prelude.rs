//! Convenience re-exports for common usage patterns.
//!
//! ```
//! use step_rail::prelude::*;
//! ```
//!
//! # What's Included
//!
//! - **Macros**: [`step_error!`], [`bail_step!`]
//! - **Types**: [`Chain`], [`ResourceChain`], [`ChainResult`], [`StepError`], [`StepResult`]
//! - **Traits**: [`Step`], [`Closeable`], [`Pipeline`]
//!
//! # Examples
//!
//! ```
//! use step_rail::prelude::*;
//!
//! fn port(raw: &'static str) -> StepResult<u16> {
//!     Chain::of(raw)
//!         .map(|s| Ok(s.trim().parse::<u16>()?))
//!         .filter_safe(|port| *port != 0)
//!         .get()
//! }
//!
//! assert_eq!(port(" 8080 ").unwrap(), 8080);
//! assert!(port("0").is_err());
//! ```

// Macros
pub use crate::{bail_step, step_error};

// Core types
pub use crate::types::{Chain, ChainResult, ResourceChain, StepError, StepResult};

// Traits
pub use crate::traits::{Closeable, Pipeline};
pub use crate::types::Step;
