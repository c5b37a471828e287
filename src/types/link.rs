//! Step rules shared by [`Chain`](crate::Chain) and
//! [`ResourceChain`](crate::ResourceChain).
//!
//! Every rule receives the node produced by the previous step and returns the
//! node for the new step. A failed or empty node short-circuits: it is passed
//! on as the very same node, only retyped, so the history keeps exactly one
//! record of the failure.

use core::fmt::Debug;
use std::rc::Rc;

use crate::traits::Pipeline;
use crate::types::call_site::CallSite;
use crate::types::history::{HistoryNode, Step, StepValue};
use crate::types::step_error::{StepError, StepResult};

/// What a step adds on top of the node it extends.
pub(crate) struct Record<U> {
    pub(crate) input: Option<Rc<dyn StepValue>>,
    pub(crate) output: Option<Rc<U>>,
    pub(crate) error: Option<StepError>,
    pub(crate) child: Option<Box<dyn Step>>,
}

impl<U> Record<U> {
    pub(crate) fn new(
        input: Option<Rc<dyn StepValue>>,
        outcome: StepResult<Option<Rc<U>>>,
    ) -> Self {
        match outcome {
            Ok(output) => Self { input, output, error: None, child: None },
            Err(error) => Self { input, output: None, error: Some(error), child: None },
        }
    }

    fn with_child(self, child: Box<dyn Step>) -> Self {
        Self { child: Some(child), ..self }
    }
}

/// A history node that a chain can grow.
pub(crate) trait Link: Step + Sized + 'static {
    type Value: Debug + 'static;
    type Retyped<U: Debug + 'static>: Link<Value = U>;

    fn node(&self) -> &HistoryNode<Self::Value>;

    /// Passes a node without output on under another value type.
    fn retype<U: Debug + 'static>(self) -> Self::Retyped<U>;

    /// Passes the node on unchanged.
    fn keep(self) -> Self::Retyped<Self::Value>;

    /// Appends a node for a step that ran.
    fn extend<U: Debug + 'static>(self, call_site: CallSite, record: Record<U>) -> Self::Retyped<U>;
}

impl<T> Link for HistoryNode<T>
where
    T: Debug + 'static,
{
    type Value = T;
    type Retyped<U: Debug + 'static> = HistoryNode<U>;

    #[inline]
    fn node(&self) -> &HistoryNode<T> {
        self
    }

    #[inline]
    fn retype<U: Debug + 'static>(self) -> HistoryNode<U> {
        HistoryNode::retype(self)
    }

    #[inline]
    fn keep(self) -> HistoryNode<T> {
        self
    }

    #[inline]
    fn extend<U: Debug + 'static>(self, call_site: CallSite, record: Record<U>) -> HistoryNode<U> {
        HistoryNode::linked(call_site, Box::new(self), record)
    }
}

impl<U> HistoryNode<U> {
    /// Node for a step that ran after `previous`.
    pub(crate) fn linked(call_site: CallSite, previous: Box<dyn Step>, record: Record<U>) -> Self {
        let Record { input, output, error, child } = record;
        Self { call_site, previous: Some(previous), input, output, error, child }
    }
}

/// The value a step may run on, or `None` when the node short-circuits.
fn live_value<L: Link>(link: &L) -> Option<Rc<L::Value>> {
    if link.is_error() {
        return None;
    }
    link.node().value_rc().cloned()
}

fn as_input<V: Debug + 'static>(value: &Rc<V>) -> Option<Rc<dyn StepValue>> {
    Some(Rc::clone(value) as Rc<dyn StepValue>)
}

pub(crate) fn map<L, U, F>(link: L, call_site: CallSite, f: F) -> L::Retyped<U>
where
    L: Link,
    U: Debug + 'static,
    F: FnOnce(&L::Value) -> StepResult<Option<U>>,
{
    let Some(value) = live_value(&link) else {
        return link.retype::<U>();
    };

    let outcome = f(&*value).map(|output| output.map(Rc::new));
    link.extend(call_site, Record::new(as_input(&value), outcome))
}

pub(crate) fn consume<L, F>(link: L, call_site: CallSite, f: F) -> L::Retyped<L::Value>
where
    L: Link,
    F: FnOnce(&L::Value) -> StepResult<()>,
{
    let Some(value) = live_value(&link) else {
        return link.keep();
    };

    let outcome = f(&*value).map(|()| Some(Rc::clone(&value)));
    link.extend(call_site, Record::new(as_input(&value), outcome))
}

pub(crate) fn filter<L, F>(link: L, call_site: CallSite, predicate: F) -> L::Retyped<L::Value>
where
    L: Link,
    F: FnOnce(&L::Value) -> StepResult<bool>,
{
    let Some(value) = live_value(&link) else {
        return link.keep();
    };

    match predicate(&*value) {
        Ok(true) => link.keep(),
        Ok(false) => link.extend::<L::Value>(call_site, Record::new(None, Ok(None))),
        Err(error) => link.extend::<L::Value>(call_site, Record::new(as_input(&value), Err(error))),
    }
}

pub(crate) fn fallback_for_empty<L, F>(
    link: L,
    call_site: CallSite,
    supplier: F,
) -> L::Retyped<L::Value>
where
    L: Link,
    F: FnOnce() -> StepResult<L::Value>,
{
    if link.is_error() {
        return link.keep();
    }

    let record = match link.node().value_rc() {
        Some(value) => Record::new(as_input(value), Ok(Some(Rc::clone(value)))),
        None => Record::new(None, supplier().map(|value| Some(Rc::new(value)))),
    };
    link.extend(call_site, record)
}

pub(crate) fn map_on_error<L, F>(link: L, call_site: CallSite, f: F) -> L::Retyped<L::Value>
where
    L: Link,
    F: FnOnce(&StepError) -> StepResult<L::Value>,
{
    let Some(error) = link.node().error.as_ref() else {
        return link.keep();
    };

    let outcome = f(error).map(|value| Some(Rc::new(value)));
    let input: Rc<dyn StepValue> = Rc::new(error.share());
    link.extend(call_site, Record::new(Some(input), outcome))
}

pub(crate) fn do_on_error<L, F>(link: L, call_site: CallSite, observer: F) -> L::Retyped<L::Value>
where
    L: Link,
    F: FnOnce(&StepError) -> StepResult<()>,
{
    let Some(error) = link.node().error.as_ref() else {
        return link.keep();
    };

    let error = match observer(error) {
        Ok(()) => error.share(),
        Err(replacement) => replacement,
    };
    link.extend::<L::Value>(call_site, Record::new(None, Err(error)))
}

pub(crate) fn flat_map<L, U, P, F>(link: L, call_site: CallSite, f: F) -> L::Retyped<U>
where
    L: Link,
    U: Debug + 'static,
    P: Pipeline<U>,
    F: FnOnce(&L::Value) -> P,
{
    let Some(value) = live_value(&link) else {
        return link.retype::<U>();
    };

    let (outcome, nested) = f(&*value).force().into_parts();
    let record = Record::new(as_input(&value), outcome).with_child(Box::new(nested));
    link.extend(call_site, record)
}

pub(crate) fn continue_with_optional<L>(
    link: L,
    call_site: CallSite,
) -> L::Retyped<Option<L::Value>>
where
    L: Link,
    L::Value: Clone,
{
    if link.is_error() {
        return link.retype::<Option<L::Value>>();
    }

    let record = match link.node().value_rc() {
        Some(value) => {
            let copy = <L::Value as Clone>::clone(value);
            Record::new(as_input(value), Ok(Some(Rc::new(Some(copy)))))
        }
        None => Record::new(None, Ok(Some(Rc::new(None)))),
    };
    link.extend(call_site, record)
}
