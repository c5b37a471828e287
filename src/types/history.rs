//! Linked record of the steps a chain executed.
//!
//! Forcing a chain builds one [`HistoryNode`] per step. Each node points at
//! the node of the step before it, so the terminal node held by a
//! [`ChainResult`](crate::ChainResult) reaches the whole run, most recent step
//! first. A `flat_map` step additionally links the terminal node of the nested
//! pipeline it forced as its `child`.
//!
//! Nodes of different steps carry different value types, so the links are
//! type-erased through the [`Step`] trait and values are exposed as
//! [`StepValue`]s, which can be printed and downcast.
//!
//! # Examples
//!
//! ```
//! use step_rail::{Chain, Step};
//!
//! let result = Chain::of(2).map_safe(|n| n * 10).filter_safe(|n| *n > 5).get_result();
//! let history = result.history();
//!
//! assert_eq!(history.depth(), 2);
//! assert_eq!(history.output_as::<i32>(), Some(&20));
//! assert_eq!(history.input_as::<i32>(), Some(&2));
//! ```

use core::any::Any;
use core::fmt::Debug;
use std::rc::Rc;

use crate::types::call_site::CallSite;
use crate::types::step_error::StepError;
use crate::types::StepVec;

/// A value recorded in the history: printable and downcastable.
pub trait StepValue: Any + Debug {
    fn as_any(&self) -> &dyn Any;
}

impl<T> StepValue for T
where
    T: Any + Debug,
{
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn StepValue {
    /// Returns `true` if the recorded value is a `U`.
    #[inline]
    pub fn is<U: Any>(&self) -> bool {
        self.as_any().is::<U>()
    }

    /// Borrows the recorded value as a `U`.
    #[inline]
    pub fn downcast_ref<U: Any>(&self) -> Option<&U> {
        self.as_any().downcast_ref::<U>()
    }
}

/// Type-erased read view of one history node.
pub trait Step: Debug {
    /// Where the step was added to its chain.
    fn call_site(&self) -> CallSite;

    /// The node of the step that ran before this one.
    fn previous(&self) -> Option<&dyn Step>;

    /// The value that flowed into this step.
    fn input(&self) -> Option<&dyn StepValue>;

    /// The value this step produced. `None` means the step produced no value.
    fn output(&self) -> Option<&dyn StepValue>;

    /// The failure captured at this step.
    fn error(&self) -> Option<&StepError>;

    /// Terminal node of the nested pipeline spliced in by `flat_map`.
    fn child(&self) -> Option<&dyn Step>;

    #[inline]
    fn is_error(&self) -> bool {
        self.error().is_some()
    }

    /// Whether the node carries an open resource.
    #[inline]
    fn holds_resource(&self) -> bool {
        false
    }
}

impl<'s> dyn Step + 's {
    /// Borrows this step's output as a `U`.
    #[inline]
    pub fn output_as<U: Any>(&self) -> Option<&U> {
        self.output()?.downcast_ref::<U>()
    }

    /// Borrows this step's input as a `U`.
    #[inline]
    pub fn input_as<U: Any>(&self) -> Option<&U> {
        self.input()?.downcast_ref::<U>()
    }

    /// Walks from this node back to the first step of the chain.
    #[inline]
    pub fn steps(&self) -> Steps<'_> {
        Steps { next: Some(self) }
    }

    /// Collects [`steps`](Self::steps), most recent first.
    pub fn trail(&self) -> StepVec<&dyn Step> {
        self.steps().collect()
    }

    /// Number of nodes from this one back to the origin, children excluded.
    pub fn depth(&self) -> usize {
        self.steps().count()
    }

    /// The failed nodes along the trail, most recent first.
    pub fn errors(&self) -> impl Iterator<Item = &dyn Step> {
        self.steps().filter(failed)
    }
}

fn failed(step: &&dyn Step) -> bool {
    step.is_error()
}

/// Iterator over a node and its predecessors.
///
/// Created by [`steps`](trait.Step.html#method.steps).
#[derive(Debug, Clone)]
pub struct Steps<'a> {
    next: Option<&'a dyn Step>,
}

impl<'a> Iterator for Steps<'a> {
    type Item = &'a dyn Step;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.previous();
        Some(current)
    }
}

/// One executed step.
///
/// A failed node never carries an output. Nodes are immutable once the step
/// that built them returns; each node is owned by the node after it, and the
/// terminal node by the [`ChainResult`](crate::ChainResult).
#[derive(Debug)]
pub struct HistoryNode<T> {
    pub(crate) call_site: CallSite,
    pub(crate) previous: Option<Box<dyn Step>>,
    pub(crate) input: Option<Rc<dyn StepValue>>,
    pub(crate) output: Option<Rc<T>>,
    pub(crate) error: Option<StepError>,
    pub(crate) child: Option<Box<dyn Step>>,
}

impl<T> HistoryNode<T> {
    /// First node of a chain.
    pub(crate) fn origin(
        call_site: CallSite,
        output: Option<Rc<T>>,
        error: Option<StepError>,
    ) -> Self {
        Self { call_site, previous: None, input: None, output, error, child: None }
    }

    /// Typed output of this step.
    #[inline]
    pub fn value(&self) -> Option<&T> {
        self.output.as_deref()
    }

    #[inline]
    pub(crate) fn value_rc(&self) -> Option<&Rc<T>> {
        self.output.as_ref()
    }

    /// The same node viewed as a value of another type.
    ///
    /// Only called on nodes without an output (failed or empty), so nothing
    /// is lost.
    pub(crate) fn retype<U>(self) -> HistoryNode<U> {
        HistoryNode {
            call_site: self.call_site,
            previous: self.previous,
            input: self.input,
            output: None,
            error: self.error,
            child: self.child,
        }
    }
}

impl<T> HistoryNode<T>
where
    T: Debug + 'static,
{
    /// This node as a type-erased [`Step`].
    #[inline]
    pub fn as_step(&self) -> &dyn Step {
        self
    }

    /// See [`steps`](trait.Step.html#method.steps).
    #[inline]
    pub fn steps(&self) -> Steps<'_> {
        self.as_step().steps()
    }

    /// See [`trail`](trait.Step.html#method.trail).
    #[inline]
    pub fn trail(&self) -> StepVec<&dyn Step> {
        self.as_step().trail()
    }

    /// See [`depth`](trait.Step.html#method.depth).
    #[inline]
    pub fn depth(&self) -> usize {
        self.as_step().depth()
    }

    /// See [`output_as`](trait.Step.html#method.output_as).
    #[inline]
    pub fn output_as<U: Any>(&self) -> Option<&U> {
        self.as_step().output_as::<U>()
    }

    /// See [`input_as`](trait.Step.html#method.input_as).
    #[inline]
    pub fn input_as<U: Any>(&self) -> Option<&U> {
        self.as_step().input_as::<U>()
    }
}

impl<T> Step for HistoryNode<T>
where
    T: Debug + 'static,
{
    #[inline]
    fn call_site(&self) -> CallSite {
        self.call_site
    }

    #[inline]
    fn previous(&self) -> Option<&dyn Step> {
        self.previous.as_deref()
    }

    #[inline]
    fn input(&self) -> Option<&dyn StepValue> {
        self.input.as_deref()
    }

    #[inline]
    fn output(&self) -> Option<&dyn StepValue> {
        self.output.as_deref().map(|value| value as &dyn StepValue)
    }

    #[inline]
    fn error(&self) -> Option<&StepError> {
        self.error.as_ref()
    }

    #[inline]
    fn child(&self) -> Option<&dyn Step> {
        self.child.as_deref()
    }
}
