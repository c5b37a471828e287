//! Owned snapshot of a history.
//!
//! A [`HistoryNode`](crate::HistoryNode) borrows nothing but is not `Send`
//! and holds arbitrary values. [`TraceReport`] copies what a diagnostic
//! consumer needs into plain strings, so it can outlive the result, cross
//! threads, or be serialized with the `serde` feature.
//!
//! # Examples
//!
//! ```
//! use step_rail::Chain;
//!
//! let report = Chain::of(4).map_safe(|n| n + 1).get_result().report();
//! assert_eq!(report.len(), 2);
//! assert_eq!(report.steps[0].output.as_deref(), Some("5"));
//! assert!(report.first_failure().is_none());
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::history::{Step, StepValue};
use crate::types::StepVec;

/// One step of a [`TraceReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepRecord {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub label: Option<String>,
    /// `Debug` rendering of the input value.
    pub input: Option<String>,
    /// `Debug` rendering of the output value.
    pub output: Option<String>,
    /// `Display` rendering of the captured error.
    pub error: Option<String>,
    /// Report of the nested pipeline spliced in by `flat_map`.
    pub child: Option<Box<TraceReport>>,
}

/// Steps of a history, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceReport {
    pub steps: StepVec<StepRecord>,
}

impl TraceReport {
    /// Snapshots `last` and every step before it.
    pub fn from_step(last: &dyn Step) -> Self {
        Self { steps: last.steps().map(StepRecord::from_step).collect() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The most recent failed step, if any.
    pub fn first_failure(&self) -> Option<&StepRecord> {
        self.steps.iter().find(|record| record.error.is_some())
    }
}

impl StepRecord {
    fn from_step(step: &dyn Step) -> Self {
        let call_site = step.call_site();
        Self {
            file: call_site.file().to_owned(),
            line: call_site.line(),
            column: call_site.column(),
            label: call_site.label().map(str::to_owned),
            input: step.input().map(debug_string),
            output: step.output().map(debug_string),
            error: step.error().map(ToString::to_string),
            child: step.child().map(|child| Box::new(TraceReport::from_step(child))),
        }
    }
}

fn debug_string(value: &dyn StepValue) -> String {
    format!("{:?}", value)
}
