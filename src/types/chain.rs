//! Lazy, replayable step pipeline.
//!
//! A [`Chain`] is a recipe: every combinator returns a new chain that wraps
//! the previous one, and nothing runs until a terminal call forces it. Each
//! forcing re-runs every step from the start, side effects included; there is
//! no cached result.
//!
//! Forcing walks the steps in order and records one
//! [`HistoryNode`](crate::HistoryNode) per executed step. Once a step fails or
//! produces no value, the steps after it are skipped and the node is passed
//! through to the end, so the [`ChainResult`] points straight at the step that
//! decided the outcome.
//!
//! # Examples
//!
//! ```
//! use step_rail::Chain;
//!
//! let chain = Chain::of(1)
//!     .filter_safe(|n| *n > 0)
//!     .map_safe(|n| n - 4)
//!     .filter_safe(|n| *n > 0)
//!     .map_safe(|n| n + 100);
//!
//! assert_eq!(chain.get_option().unwrap(), None);
//! assert_eq!(chain.fallback_for_empty(|| Ok(996)).get().unwrap(), 996);
//! ```

use core::fmt::{self, Debug};
use std::error::Error;
use std::rc::Rc;

use crate::traits::Pipeline;
use crate::types::call_site::CallSite;
use crate::types::chain_result::ChainResult;
use crate::types::history::HistoryNode;
use crate::types::link;
use crate::types::step_error::{StepError, StepResult};

type Thunk<'a, T> = Rc<dyn Fn() -> HistoryNode<T> + 'a>;

/// A deferred pipeline of steps producing a `T`.
///
/// Cloning is cheap and shares the steps, so one chain can be extended along
/// several branches.
#[must_use = "chains are lazy and do nothing until forced"]
pub struct Chain<'a, T> {
    thunk: Thunk<'a, T>,
}

impl<T> Clone for Chain<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        Self { thunk: Rc::clone(&self.thunk) }
    }
}

impl<T> Debug for Chain<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").finish_non_exhaustive()
    }
}

impl<'a, T> Chain<'a, T>
where
    T: Debug + 'static,
{
    fn from_thunk<F>(thunk: F) -> Self
    where
        F: Fn() -> HistoryNode<T> + 'a,
    {
        Self { thunk: Rc::new(thunk) }
    }

    /// Adds a step that rewrites the node of the previous step.
    fn then<U, F>(&self, step: F) -> Chain<'a, U>
    where
        U: Debug + 'static,
        F: Fn(HistoryNode<T>) -> HistoryNode<U> + 'a,
    {
        let previous = Rc::clone(&self.thunk);
        Chain::from_thunk(move || step(previous()))
    }

    /// Starts a chain from a value. The step cannot fail.
    #[track_caller]
    pub fn of(value: T) -> Self {
        Self::of_option(Some(value))
    }

    /// Starts a chain from a value that may be absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use step_rail::Chain;
    ///
    /// let empty = Chain::<i32>::of_option(None).map_safe(|n| n * 2);
    /// assert_eq!(empty.get_option().unwrap(), None);
    /// ```
    #[track_caller]
    pub fn of_option(value: Option<T>) -> Self {
        let call_site = CallSite::caller();
        let value = value.map(Rc::new);
        Self::from_thunk(move || HistoryNode::origin(call_site, value.clone(), None))
    }

    /// Starts a chain from a fallible producer, run once per forcing.
    ///
    /// # Examples
    ///
    /// ```
    /// use step_rail::Chain;
    ///
    /// let parsed = Chain::on(|| Ok("42".parse::<i32>()?));
    /// assert_eq!(parsed.get().unwrap(), 42);
    /// ```
    #[track_caller]
    pub fn on<F>(supplier: F) -> Self
    where
        F: Fn() -> StepResult<T> + 'a,
    {
        let call_site = CallSite::caller();
        Self::from_thunk(move || match supplier() {
            Ok(value) => HistoryNode::origin(call_site, Some(Rc::new(value)), None),
            Err(error) => HistoryNode::origin(call_site, None, Some(error)),
        })
    }

    /// Starts a chain from an existing `Result`.
    ///
    /// The error is cloned into a fresh [`StepError`] on every forcing, so
    /// escalation can hand back an owned `E`.
    #[track_caller]
    pub fn from_result<E>(result: Result<T, E>) -> Self
    where
        E: Error + Clone + Send + Sync + 'static,
    {
        let call_site = CallSite::caller();
        let result = result.map(Rc::new);
        Self::from_thunk(move || match &result {
            Ok(value) => HistoryNode::origin(call_site, Some(Rc::clone(value)), None),
            Err(error) => HistoryNode::origin(call_site, None, Some(StepError::new(error.clone()))),
        })
    }

    /// Tags the most recent step's call site with `label`.
    ///
    /// The tag goes on the node the chain currently ends with. A step that
    /// passes its input node on (a passing `filter`, or any step skipped after
    /// a failure) leaves an earlier node there; a label that node already
    /// carries is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use step_rail::{Chain, Step};
    ///
    /// let result = Chain::of(1).labeled("seed").get_result();
    /// assert_eq!(result.history().as_step().call_site().label(), Some("seed"));
    /// ```
    pub fn labeled(&self, label: &'static str) -> Self {
        self.then(move |mut node| {
            if node.call_site.label().is_none() {
                node.call_site = node.call_site.with_label(label);
            }
            node
        })
    }

    /// Applies a fallible function to the value.
    ///
    /// Skipped when the previous step failed or produced no value. A failure
    /// is recorded with the previous value as this step's input.
    ///
    /// # Examples
    ///
    /// ```
    /// use step_rail::Chain;
    ///
    /// let chain = Chain::of("7").map(|s| Ok(s.parse::<u8>()?));
    /// assert_eq!(chain.get().unwrap(), 7);
    ///
    /// let bad = Chain::of("x").map(|s| Ok(s.parse::<u8>()?));
    /// assert!(bad.get_result().is_failure());
    /// ```
    #[track_caller]
    pub fn map<U, F>(&self, f: F) -> Chain<'a, U>
    where
        U: Debug + 'static,
        F: Fn(&T) -> StepResult<U> + 'a,
    {
        let call_site = CallSite::caller();
        self.then(move |node| link::map(node, call_site, |value| f(value).map(Some)))
    }

    /// Infallible [`map`](Self::map).
    #[track_caller]
    pub fn map_safe<U, F>(&self, f: F) -> Chain<'a, U>
    where
        U: Debug + 'static,
        F: Fn(&T) -> U + 'a,
    {
        let call_site = CallSite::caller();
        self.then(move |node| link::map(node, call_site, |value| Ok(Some(f(value)))))
    }

    /// [`map`](Self::map) whose function may produce no value.
    #[track_caller]
    pub fn map_option<U, F>(&self, f: F) -> Chain<'a, U>
    where
        U: Debug + 'static,
        F: Fn(&T) -> StepResult<Option<U>> + 'a,
    {
        let call_site = CallSite::caller();
        self.then(move |node| link::map(node, call_site, |value| f(value)))
    }

    /// Runs a fallible side effect on the value and passes the value on.
    #[track_caller]
    pub fn consume<F>(&self, f: F) -> Self
    where
        F: Fn(&T) -> StepResult<()> + 'a,
    {
        let call_site = CallSite::caller();
        self.then(move |node| link::consume(node, call_site, |value| f(value)))
    }

    /// Keeps the value when `predicate` holds, otherwise leaves no value.
    ///
    /// A predicate failure is recorded like a [`map`](Self::map) failure.
    #[track_caller]
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&T) -> StepResult<bool> + 'a,
    {
        let call_site = CallSite::caller();
        self.then(move |node| link::filter(node, call_site, |value| predicate(value)))
    }

    /// Infallible [`filter`](Self::filter).
    #[track_caller]
    pub fn filter_safe<F>(&self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + 'a,
    {
        let call_site = CallSite::caller();
        self.then(move |node| link::filter(node, call_site, |value| Ok(predicate(value))))
    }

    /// Supplies a value when the chain reached this step without one.
    ///
    /// Failures pass through untouched.
    #[track_caller]
    pub fn fallback_for_empty<F>(&self, supplier: F) -> Self
    where
        F: Fn() -> StepResult<T> + 'a,
    {
        let call_site = CallSite::caller();
        self.then(move |node| link::fallback_for_empty(node, call_site, &supplier))
    }

    /// Recovers from a failure of an earlier step.
    ///
    /// Runs only when the chain failed. On success the error is cleared and
    /// the returned value continues down the chain; if `f` fails, its error
    /// replaces the original one.
    ///
    /// # Examples
    ///
    /// ```
    /// use step_rail::{step_error, Chain};
    ///
    /// let chain = Chain::of(10)
    ///     .map(|_| Err::<i32, _>(step_error!("lookup failed")))
    ///     .map_on_error(|err| Ok(err.to_string().len() as i32));
    ///
    /// assert_eq!(chain.get().unwrap(), 13);
    /// ```
    #[track_caller]
    pub fn map_on_error<F>(&self, f: F) -> Self
    where
        F: Fn(&StepError) -> StepResult<T> + 'a,
    {
        let call_site = CallSite::caller();
        self.then(move |node| link::map_on_error(node, call_site, |error| f(error)))
    }

    /// Observes a failure of an earlier step without recovering from it.
    ///
    /// If the observer itself fails, its error replaces the original one.
    #[track_caller]
    pub fn do_on_error<F>(&self, observer: F) -> Self
    where
        F: Fn(&StepError) -> StepResult<()> + 'a,
    {
        let call_site = CallSite::caller();
        self.then(move |node| link::do_on_error(node, call_site, |error| observer(error)))
    }

    /// Runs a nested pipeline built from the value.
    ///
    /// The nested pipeline is forced once per forcing of this chain. Its
    /// outcome becomes this step's outcome and its history is kept as the
    /// `child` of this step's node.
    ///
    /// # Examples
    ///
    /// ```
    /// use step_rail::{Chain, Step};
    ///
    /// let result = Chain::of(2).flat_map(|n| Chain::of(n + 1).map_safe(|m| m + 2)).get_result();
    ///
    /// assert_eq!(result.value(), Some(&5));
    /// assert!(result.history().as_step().child().is_some());
    /// ```
    #[track_caller]
    pub fn flat_map<U, P, F>(&self, f: F) -> Chain<'a, U>
    where
        U: Debug + 'static,
        P: Pipeline<U>,
        F: Fn(&T) -> P + 'a,
    {
        let call_site = CallSite::caller();
        self.then(move |node| link::flat_map(node, call_site, |value| f(value)))
    }

    /// Turns absence into a value: the output becomes `Some(value)` or `None`.
    ///
    /// Failures still pass through. The value is cloned into the new
    /// `Option`, since the earlier node keeps its own shared copy in the
    /// history. For a value that is not `Clone`, map to the part you need
    /// first.
    ///
    /// # Examples
    ///
    /// ```
    /// use step_rail::Chain;
    ///
    /// #[derive(Debug)]
    /// struct Ticket {
    ///     seat: u32,
    /// }
    ///
    /// let seat = Chain::of(()).map_safe(|_| Ticket { seat: 12 }).map_safe(|t| t.seat);
    /// assert_eq!(seat.continue_with_optional().get().unwrap(), Some(12));
    /// assert_eq!(seat.filter_safe(|s| *s > 20).continue_with_optional().get().unwrap(), None);
    /// ```
    #[track_caller]
    pub fn continue_with_optional(&self) -> Chain<'a, Option<T>>
    where
        T: Clone,
    {
        let call_site = CallSite::caller();
        self.then(move |node| link::continue_with_optional(node, call_site))
    }

    /// Forces the chain.
    #[inline]
    pub fn get_result(&self) -> ChainResult<T> {
        ChainResult::from_history((self.thunk)())
    }

    /// Forces the chain and returns the value. An absent value is a
    /// [`NoValue`](crate::NoValue) error.
    #[inline]
    pub fn get(&self) -> StepResult<T>
    where
        T: Clone,
    {
        self.get_result().get()
    }

    /// Forces the chain and returns the value, `None` when absent.
    #[inline]
    pub fn get_option(&self) -> StepResult<Option<T>>
    where
        T: Clone,
    {
        self.get_result().get_option()
    }

    /// See [`ChainResult::get_or_spec_error`].
    pub fn get_or_spec_error<K, M>(&self, mapper: M) -> Result<T, K>
    where
        T: Clone,
        K: Error + Send + Sync + 'static,
        M: FnOnce(StepError) -> K,
    {
        self.get_result().get_or_spec_error(mapper)
    }

    /// See [`ChainResult::get_or_spec_error_by`].
    pub fn get_or_spec_error_by<K, M>(&self, mapper: M) -> Result<T, K>
    where
        T: Clone,
        K: Error + Send + Sync + 'static,
        M: FnOnce(&ChainResult<T>) -> K,
    {
        self.get_result().get_or_spec_error_by(mapper)
    }

    /// See [`ChainResult::get_option_or_spec_error`].
    pub fn get_option_or_spec_error<K, M>(&self, mapper: M) -> Result<Option<T>, K>
    where
        T: Clone,
        K: Error + Send + Sync + 'static,
        M: FnOnce(StepError) -> K,
    {
        self.get_result().get_option_or_spec_error(mapper)
    }

    /// See [`ChainResult::get_option_or_spec_error_by`].
    pub fn get_option_or_spec_error_by<K, M>(&self, mapper: M) -> Result<Option<T>, K>
    where
        T: Clone,
        K: Error + Send + Sync + 'static,
        M: FnOnce(&ChainResult<T>) -> K,
    {
        self.get_result().get_option_or_spec_error_by(mapper)
    }

    /// Forces the chain and maps a failure's error into `E`.
    pub fn get_result_mapped<E, M>(&self, mapper: M) -> ChainResult<T, E>
    where
        M: FnOnce(StepError) -> E,
    {
        self.get_result().map_error(mapper)
    }
}

impl<'a> Chain<'a, ()> {
    /// Starts a chain from a fallible side effect.
    ///
    /// The step produces no value; it exists for its effect and its failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::cell::Cell;
    /// use step_rail::Chain;
    ///
    /// let runs = Cell::new(0);
    /// let chain = Chain::do_run(|| {
    ///     runs.set(runs.get() + 1);
    ///     Ok(())
    /// });
    ///
    /// assert_eq!(runs.get(), 0);
    /// assert!(chain.get_result().is_success());
    /// assert_eq!(runs.get(), 1);
    /// ```
    #[track_caller]
    pub fn do_run<F>(action: F) -> Self
    where
        F: Fn() -> StepResult<()> + 'a,
    {
        let call_site = CallSite::caller();
        Self::from_thunk(move || match action() {
            Ok(()) => HistoryNode::origin(call_site, None, None),
            Err(error) => HistoryNode::origin(call_site, None, Some(error)),
        })
    }
}
