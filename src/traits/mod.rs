//! Traits at the seams of the chain engine.
//!
//! - [`Closeable`]: release contract for the resource of a
//!   [`ResourceChain`](crate::ResourceChain)
//! - [`Pipeline`]: anything `flat_map` can force, either kind of chain
//!
//! # Examples
//!
//! ```
//! use step_rail::traits::Pipeline;
//! use step_rail::Chain;
//!
//! let nested = Chain::of(2).map_safe(|n| n + 1);
//! assert_eq!(nested.force().value(), Some(&3));
//! ```

pub mod closeable;
pub mod pipeline;

pub use closeable::{CloseWith, Closeable};
pub use pipeline::Pipeline;
