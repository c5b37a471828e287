//! Advanced API level for library authors and power users.
//!
//! This module exposes the history internals and formatting building blocks.
//! Use these types when you walk histories yourself or render them in a
//! custom way.

// History internals
pub use crate::types::history::{HistoryNode, Step, StepValue, Steps};
pub use crate::types::resource_chain::ResourceNode;
pub use crate::types::StepVec;

// Rendering and reporting
pub use crate::types::history_formatter::{HistoryFormatConfig, HistoryFormatter};
pub use crate::types::report::{StepRecord, TraceReport};

// Call sites and crate error kinds
pub use crate::types::call_site::CallSite;
pub use crate::types::step_error::{MessageError, NoValue, ResourceUnavailable};
