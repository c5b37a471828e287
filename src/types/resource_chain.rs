//! Chain bound to one resource that is released exactly once per forcing.
//!
//! [`ResourceChain::open`] describes how to obtain the resource; like every
//! chain step it runs only when the chain is forced, once per forcing. Steps
//! can borrow the resource next to the current value
//! ([`map_with_closeable`](ResourceChain::map_with_closeable),
//! [`fallback_empty`](ResourceChain::fallback_empty)). The `close_and_get*`
//! terminal calls run the steps, then release the resource, then report.
//!
//! Release outcomes:
//!
//! - steps ok, release ok: `Success`
//! - steps ok, release failed: `Failure` with the release error
//! - steps failed: `Failure` with the step error, even when the release fails
//!   too; that release error goes to the on-error hook and the log
//!
//! The history always ends with a release node. A panic in a step or in the
//! on-error hook still releases the resource while unwinding.
//!
//! # Examples
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use step_rail::{CloseWith, ResourceChain};
//!
//! let released = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&released);
//! let chain = ResourceChain::open(move || {
//!     let counter = Rc::clone(&counter);
//!     Ok(CloseWith::new(vec![3, 4, 5], move |_: &Vec<i32>| {
//!         counter.set(counter.get() + 1);
//!         Ok(())
//!     }))
//! })
//! .map_safe(|rows| rows.len());
//!
//! assert_eq!(chain.close_and_get().unwrap(), 3);
//! assert_eq!(released.get(), 1);
//! ```

use core::cell::Cell;
use core::fmt::{self, Debug};
use std::error::Error;
use std::rc::Rc;

use crate::traits::{Closeable, Pipeline};
use crate::types::call_site::CallSite;
use crate::types::chain_result::ChainResult;
use crate::types::history::{HistoryNode, Step, StepValue};
use crate::types::link::{self, Link, Record};
use crate::types::step_error::{ResourceUnavailable, StepError, StepResult};

/// The open resource of one run, shared by all of its nodes.
///
/// Released at most once: by the terminal call, or on drop when a panic
/// unwinds through the run before the terminal call is reached.
struct Lease<C> {
    resource: Rc<C>,
    release: fn(&C) -> StepResult<()>,
    released: Cell<bool>,
    opened_at: CallSite,
}

impl<C> Lease<C> {
    fn open(resource: Rc<C>, opened_at: CallSite) -> Self
    where
        C: Closeable,
    {
        Self { resource, release: C::close, released: Cell::new(false), opened_at }
    }

    #[inline]
    fn get(&self) -> &C {
        &self.resource
    }

    /// Closes the resource unless that already happened.
    fn release(&self) -> Option<StepError> {
        if self.released.replace(true) {
            return None;
        }
        (self.release)(&self.resource).err()
    }
}

impl<C> Drop for Lease<C> {
    fn drop(&mut self) {
        if self.released.get() {
            return;
        }
        tracing::warn!(call_site = %self.opened_at, "releasing resource of an interrupted run");
        if let Some(error) = self.release() {
            tracing::error!(call_site = %self.opened_at, %error, "release failed");
        }
    }
}

/// History node of a resource-scoped step: a [`HistoryNode`] plus the open
/// resource, which every node of the run shares until release.
pub struct ResourceNode<C, T> {
    node: HistoryNode<T>,
    resource: Option<Rc<Lease<C>>>,
}

impl<C, T> ResourceNode<C, T> {
    /// The plain history node.
    #[inline]
    pub fn node(&self) -> &HistoryNode<T> {
        &self.node
    }

    /// The resource, unless opening it failed.
    #[inline]
    pub fn resource(&self) -> Option<&C> {
        self.resource.as_deref().map(Lease::get)
    }
}

impl<C, T: Debug> Debug for ResourceNode<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceNode")
            .field("node", &self.node)
            .field("resource", &self.resource.is_some())
            .finish()
    }
}

impl<C, T> Step for ResourceNode<C, T>
where
    C: 'static,
    T: Debug + 'static,
{
    #[inline]
    fn call_site(&self) -> CallSite {
        self.node.call_site()
    }

    #[inline]
    fn previous(&self) -> Option<&dyn Step> {
        self.node.previous()
    }

    #[inline]
    fn input(&self) -> Option<&dyn StepValue> {
        self.node.input()
    }

    #[inline]
    fn output(&self) -> Option<&dyn StepValue> {
        self.node.output()
    }

    #[inline]
    fn error(&self) -> Option<&StepError> {
        self.node.error()
    }

    #[inline]
    fn child(&self) -> Option<&dyn Step> {
        self.node.child()
    }

    #[inline]
    fn holds_resource(&self) -> bool {
        self.resource.is_some()
    }
}

impl<C, T> Link for ResourceNode<C, T>
where
    C: 'static,
    T: Debug + 'static,
{
    type Value = T;
    type Retyped<U: Debug + 'static> = ResourceNode<C, U>;

    #[inline]
    fn node(&self) -> &HistoryNode<T> {
        &self.node
    }

    #[inline]
    fn retype<U: Debug + 'static>(self) -> ResourceNode<C, U> {
        ResourceNode { node: self.node.retype(), resource: self.resource }
    }

    #[inline]
    fn keep(self) -> ResourceNode<C, T> {
        self
    }

    fn extend<U>(self, call_site: CallSite, record: Record<U>) -> ResourceNode<C, U>
    where
        U: Debug + 'static,
    {
        let resource = self.resource.clone();
        ResourceNode { node: HistoryNode::linked(call_site, Box::new(self), record), resource }
    }
}

type Thunk<'a, C, T> = Rc<dyn Fn() -> ResourceNode<C, T> + 'a>;
type Hook<'a, C> = Rc<dyn Fn(Option<&C>, &StepError) + 'a>;

/// A deferred pipeline over a resource of type `C`, producing a `T`.
#[must_use = "chains are lazy and do nothing until forced"]
pub struct ResourceChain<'a, C, T> {
    thunk: Thunk<'a, C, T>,
    on_error: Hook<'a, C>,
}

impl<C, T> Clone for ResourceChain<'_, C, T> {
    #[inline]
    fn clone(&self) -> Self {
        Self { thunk: Rc::clone(&self.thunk), on_error: Rc::clone(&self.on_error) }
    }
}

impl<C, T> Debug for ResourceChain<'_, C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceChain").finish_non_exhaustive()
    }
}

impl<'a, C> ResourceChain<'a, C, C>
where
    C: Closeable + Debug + 'static,
{
    /// Describes how to open the resource. The first value of the chain is
    /// the resource itself.
    #[track_caller]
    pub fn open<S>(supplier: S) -> Self
    where
        S: Fn() -> StepResult<C> + 'a,
    {
        Self::open_with(supplier, |_, _| {})
    }

    /// Like [`open`](Self::open), with a hook that sees every failure of a
    /// forcing: the chain's own error and any release error.
    ///
    /// The hook receives the resource when it was opened.
    #[track_caller]
    pub fn open_with<S, H>(supplier: S, on_error: H) -> Self
    where
        S: Fn() -> StepResult<C> + 'a,
        H: Fn(Option<&C>, &StepError) + 'a,
    {
        let call_site = CallSite::caller();
        let thunk = move || match supplier() {
            Ok(resource) => {
                let resource = Rc::new(resource);
                let node = HistoryNode::origin(call_site, Some(Rc::clone(&resource)), None);
                ResourceNode { node, resource: Some(Rc::new(Lease::open(resource, call_site))) }
            }
            Err(error) => {
                let node = HistoryNode::origin(call_site, None, Some(error));
                ResourceNode { node, resource: None }
            }
        };
        Self { thunk: Rc::new(thunk), on_error: Rc::new(on_error) }
    }
}

impl<'a, C, T> ResourceChain<'a, C, T>
where
    C: Closeable + 'static,
    T: Debug + 'static,
{
    fn then<U, F>(&self, step: F) -> ResourceChain<'a, C, U>
    where
        U: Debug + 'static,
        F: Fn(ResourceNode<C, T>) -> ResourceNode<C, U> + 'a,
    {
        let previous = Rc::clone(&self.thunk);
        let on_error = Rc::clone(&self.on_error);
        ResourceChain { thunk: Rc::new(move || step(previous())), on_error }
    }

    /// See [`Chain::map`](crate::Chain::map).
    #[track_caller]
    pub fn map<U, F>(&self, f: F) -> ResourceChain<'a, C, U>
    where
        U: Debug + 'static,
        F: Fn(&T) -> StepResult<U> + 'a,
    {
        let call_site = CallSite::caller();
        self.then(move |node| link::map(node, call_site, |value| f(value).map(Some)))
    }

    /// See [`Chain::map_safe`](crate::Chain::map_safe).
    #[track_caller]
    pub fn map_safe<U, F>(&self, f: F) -> ResourceChain<'a, C, U>
    where
        U: Debug + 'static,
        F: Fn(&T) -> U + 'a,
    {
        let call_site = CallSite::caller();
        self.then(move |node| link::map(node, call_site, |value| Ok(Some(f(value)))))
    }

    /// Applies a fallible function to the resource and the value.
    ///
    /// # Examples
    ///
    /// ```
    /// use step_rail::{CloseWith, ResourceChain};
    ///
    /// let chain = ResourceChain::open(|| Ok(CloseWith::new(10, |_: &i32| Ok(()))))
    ///     .map_safe(|_| 3)
    ///     .map_with_closeable(|base, n| Ok(**base * n));
    ///
    /// assert_eq!(chain.close_and_get().unwrap(), 30);
    /// ```
    #[track_caller]
    pub fn map_with_closeable<U, F>(&self, f: F) -> ResourceChain<'a, C, U>
    where
        U: Debug + 'static,
        F: Fn(&C, &T) -> StepResult<U> + 'a,
    {
        let call_site = CallSite::caller();
        self.then(move |node| {
            let resource = node.resource.clone();
            link::map(node, call_site, |value| match resource.as_deref().map(Lease::get) {
                Some(resource) => f(resource, value).map(Some),
                None => Err(ResourceUnavailable::new(call_site).into()),
            })
        })
    }

    /// See [`Chain::consume`](crate::Chain::consume).
    #[track_caller]
    pub fn consume<F>(&self, f: F) -> Self
    where
        F: Fn(&T) -> StepResult<()> + 'a,
    {
        let call_site = CallSite::caller();
        self.then(move |node| link::consume(node, call_site, |value| f(value)))
    }

    /// See [`Chain::filter`](crate::Chain::filter).
    #[track_caller]
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&T) -> StepResult<bool> + 'a,
    {
        let call_site = CallSite::caller();
        self.then(move |node| link::filter(node, call_site, |value| predicate(value)))
    }

    /// See [`Chain::filter_safe`](crate::Chain::filter_safe).
    #[track_caller]
    pub fn filter_safe<F>(&self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + 'a,
    {
        let call_site = CallSite::caller();
        self.then(move |node| link::filter(node, call_site, |value| Ok(predicate(value))))
    }

    /// Supplies a value from the resource when the chain reached this step
    /// without one.
    #[track_caller]
    pub fn fallback_empty<F>(&self, supplier: F) -> Self
    where
        F: Fn(&C) -> StepResult<T> + 'a,
    {
        let call_site = CallSite::caller();
        self.then(move |node| {
            let resource = node.resource.clone();
            link::fallback_for_empty(node, call_site, || match resource.as_deref().map(Lease::get) {
                Some(resource) => supplier(resource),
                None => Err(ResourceUnavailable::new(call_site).into()),
            })
        })
    }

    /// Recovers from a failure of an earlier step, including a failed open.
    ///
    /// `f` receives the resource when it was opened.
    #[track_caller]
    pub fn map_on_error<F>(&self, f: F) -> Self
    where
        F: Fn(Option<&C>, &StepError) -> StepResult<T> + 'a,
    {
        let call_site = CallSite::caller();
        self.then(move |node| {
            let lease = node.resource.clone();
            let resource = lease.as_deref().map(Lease::get);
            link::map_on_error(node, call_site, |error| f(resource, error))
        })
    }

    /// Observes a failure of an earlier step without recovering from it.
    #[track_caller]
    pub fn do_on_error<F>(&self, observer: F) -> Self
    where
        F: Fn(Option<&C>, &StepError) -> StepResult<()> + 'a,
    {
        let call_site = CallSite::caller();
        self.then(move |node| {
            let lease = node.resource.clone();
            let resource = lease.as_deref().map(Lease::get);
            link::do_on_error(node, call_site, |error| observer(resource, error))
        })
    }

    /// See [`Chain::flat_map`](crate::Chain::flat_map).
    #[track_caller]
    pub fn flat_map<U, P, F>(&self, f: F) -> ResourceChain<'a, C, U>
    where
        U: Debug + 'static,
        P: Pipeline<U>,
        F: Fn(&T) -> P + 'a,
    {
        let call_site = CallSite::caller();
        self.then(move |node| link::flat_map(node, call_site, |value| f(value)))
    }

    /// See [`Chain::continue_with_optional`](crate::Chain::continue_with_optional).
    ///
    /// The value is cloned, so a chain still holding the resource itself
    /// maps to a `Clone` projection first.
    #[track_caller]
    pub fn continue_with_optional(&self) -> ResourceChain<'a, C, Option<T>>
    where
        T: Clone,
    {
        let call_site = CallSite::caller();
        self.then(move |node| link::continue_with_optional(node, call_site))
    }

    /// Forces the chain, releases the resource, and reports the outcome.
    #[track_caller]
    pub fn close_and_get_result(&self) -> ChainResult<T> {
        let call_site = CallSite::caller();
        let last = (self.thunk)();
        let lease = last.resource.clone();
        let resource = lease.as_deref().map(Lease::get);
        let failure = last.node.error.as_ref().map(StepError::share);

        if let Some(error) = &failure {
            (self.on_error)(resource, error);
        }

        let release_error = lease.as_deref().and_then(|lease| {
            tracing::debug!(%call_site, "releasing resource");
            lease.release()
        });
        if let Some(error) = &release_error {
            (self.on_error)(resource, error);
        }
        drop(lease);

        let value = last.node.output.clone();
        let record = match (failure, release_error) {
            (None, None) => {
                let input = value.clone().map(|value| value as Rc<dyn StepValue>);
                Record::new(input, Ok(value))
            }
            (None, Some(release_error)) => {
                let input = value.map(|value| value as Rc<dyn StepValue>);
                Record::new(input, Err(release_error))
            }
            // The step error stays; the release error is kept as the input.
            (Some(error), Some(release_error)) => {
                tracing::warn!(
                    %call_site,
                    error = %release_error,
                    "release failed after the chain had failed"
                );
                Record::new(Some(Rc::new(release_error) as Rc<dyn StepValue>), Err(error))
            }
            (Some(error), None) => Record::new(None, Err(error)),
        };

        ChainResult::from_history(HistoryNode::linked(call_site, Box::new(last), record))
    }

    /// Forces the chain, releases the resource, and returns the value.
    #[track_caller]
    pub fn close_and_get(&self) -> StepResult<T>
    where
        T: Clone,
    {
        self.close_and_get_result().get()
    }

    /// Like [`close_and_get`](Self::close_and_get), `None` when absent.
    #[track_caller]
    pub fn close_and_get_option(&self) -> StepResult<Option<T>>
    where
        T: Clone,
    {
        self.close_and_get_result().get_option()
    }

    /// See [`ChainResult::get_or_spec_error`].
    #[track_caller]
    pub fn close_and_get_or_spec_error<K, M>(&self, mapper: M) -> Result<T, K>
    where
        T: Clone,
        K: Error + Send + Sync + 'static,
        M: FnOnce(StepError) -> K,
    {
        self.close_and_get_result().get_or_spec_error(mapper)
    }

    /// Forces the chain, releases the resource, and maps a failure's error
    /// into `E`.
    #[track_caller]
    pub fn close_and_get_result_mapped<E, M>(&self, mapper: M) -> ChainResult<T, E>
    where
        M: FnOnce(StepError) -> E,
    {
        self.close_and_get_result().map_error(mapper)
    }
}
