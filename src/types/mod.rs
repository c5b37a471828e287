//! Chain, result and history types.
//!
//! This module holds the two chain engines ([`Chain`] and [`ResourceChain`]),
//! the result they force into ([`ChainResult`]), the linked history that
//! result carries ([`HistoryNode`]), and the failure type every step speaks
//! ([`StepError`]).
//!
//! # Examples
//!
//! ```
//! use step_rail::{Chain, Step};
//!
//! let result = Chain::of(10)
//!     .map(|n| if *n > 5 { Err(step_rail::step_error!("too big: {}", n)) } else { Ok(*n) })
//!     .map_safe(|n| n + 1)
//!     .get_result();
//!
//! assert!(result.is_failure());
//! assert_eq!(result.history().as_step().errors().count(), 1);
//! ```
use smallvec::SmallVec;

pub mod call_site;
pub mod chain;
pub mod chain_result;
pub mod history;
pub mod history_formatter;
pub(crate) mod link;
pub mod report;
pub mod resource_chain;
pub mod step_error;

pub use call_site::CallSite;
pub use chain::Chain;
pub use chain_result::ChainResult;
pub use history::{HistoryNode, Step, StepValue, Steps};
pub use history_formatter::{HistoryFormatConfig, HistoryFormatter};
pub use report::{StepRecord, TraceReport};
pub use resource_chain::{ResourceChain, ResourceNode};
pub use step_error::{MessageError, NoValue, ResourceUnavailable, StepError, StepResult};

/// SmallVec-backed collection used for history trails and reports.
///
/// Uses inline storage for up to 8 elements, which covers most chains without
/// a heap allocation.
pub type StepVec<T> = SmallVec<[T; 8]>;
