//! Lazy, replayable step pipelines that turn failures into values.
//!
//! A [`Chain`] is built from steps (`map`, `filter`, `flat_map`, `consume`,
//! and error-recovery hooks) and runs only when forced. Forcing yields a
//! [`ChainResult`]: the value or the captured [`StepError`], together with a
//! linked [`HistoryNode`] record of every executed step and the source
//! location that added it. The history stands in for the stack trace that
//! closures would otherwise flatten.
//!
//! A [`ResourceChain`] binds one [`Closeable`] resource to a chain and
//! releases it exactly once per forcing, reporting release failures through
//! the same result.
//!
//! Each submodule re-exports its public surface from here, so consumers can
//! simply depend on `step_rail::*` or pick focused pieces as needed.
//!
//! # Examples
//!
//! ## Short-circuit and fallback
//!
//! ```
//! use step_rail::Chain;
//!
//! let chain = Chain::of(1)
//!     .filter_safe(|n| *n > 0)
//!     .map_safe(|n| n - 4)
//!     .filter_safe(|n| *n > 0)
//!     .map_safe(|n| n + 100)
//!     .fallback_for_empty(|| Ok(996));
//!
//! assert_eq!(chain.get().unwrap(), 996);
//! ```
//!
//! ## Escalating a failure
//!
//! ```
//! use std::num::ParseIntError;
//! use step_rail::Chain;
//!
//! let chain = Chain::of("12x").map(|s| Ok(s.parse::<i32>()?));
//! let err: ParseIntError = chain.get_or_spec_error(|_| unreachable!()).unwrap_err();
//! assert_eq!(err.to_string(), "invalid digit found in string");
//! ```
//!
//! ## Reading the history
//!
//! ```
//! use step_rail::{Chain, HistoryFormatConfig};
//!
//! let result = Chain::of(3).map_safe(|n| n * 3).get_result();
//! let text = result.render(&HistoryFormatConfig::compact());
//! assert!(text.contains("out: 9"));
//! ```

/// Conversions between plain results and chains
pub mod convert;
/// Macros for ad-hoc step failures
pub mod macros;
/// Convenience re-exports for quick starts
pub mod prelude;
/// Traits at the seams of the chain engine
pub mod traits;
/// Chain, result and history types
pub mod types;

/// Advanced API level for library authors
pub mod advanced;

pub use convert::*;
pub use traits::*;
pub use types::{
    CallSite, Chain, ChainResult, HistoryFormatConfig, HistoryNode, MessageError, NoValue,
    ResourceChain, ResourceUnavailable, Step, StepError, StepResult, StepValue, StepVec,
    TraceReport,
};
