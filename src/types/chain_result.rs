//! Outcome of forcing a chain.
//!
//! [`ChainResult`] is either a `Success` holding the value (which may be
//! absent) or a `Failure` holding the captured error. Both variants keep the
//! terminal [`HistoryNode`], so a caller can always inspect how the outcome was
//! reached.
//!
//! The extraction methods turn the result back into plain `Result`s. The
//! `*_spec_error` family escalates a failure into a caller-chosen error type
//! `K`: when the captured error already is a `K`, the original object is
//! returned; otherwise a mapper builds one.
//!
//! # Examples
//!
//! ```
//! use step_rail::{Chain, ChainResult};
//!
//! let result = Chain::of(21).map_safe(|n| n * 2).get_result();
//! assert!(result.is_success());
//! assert_eq!(result.value(), Some(&42));
//!
//! let failed = Chain::of(21).map(|_| Err::<i32, _>(std::fmt::Error.into())).get_result();
//! assert!(matches!(failed, ChainResult::Failure { .. }));
//! ```

use core::fmt::{Debug, Display};
use std::error::Error;
use std::rc::Rc;

use crate::types::history::HistoryNode;
use crate::types::history_formatter::{HistoryFormatConfig, HistoryFormatter};
use crate::types::report::TraceReport;
use crate::types::step_error::{NoValue, StepError, StepResult};

/// Success or failure of one forcing, plus the history that led to it.
#[must_use]
#[derive(Debug)]
pub enum ChainResult<T, E = StepError> {
    /// The chain ran to the end. `value` is `None` when the last step produced
    /// no value (for example a rejecting `filter`).
    Success { value: Option<Rc<T>>, history: HistoryNode<T> },
    /// A step failed and nothing recovered from it.
    Failure { error: E, history: HistoryNode<T> },
}

impl<T> ChainResult<T> {
    /// Reads the terminal node: a recorded error means failure.
    pub(crate) fn from_history(history: HistoryNode<T>) -> Self {
        match history.error.as_ref().map(StepError::share) {
            Some(error) => Self::Failure { error, history },
            None => Self::Success { value: history.output.clone(), history },
        }
    }
}

impl<T, E> ChainResult<T, E> {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// The success value, if the chain succeeded with one.
    #[inline]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success { value, .. } => value.as_deref(),
            Self::Failure { .. } => None,
        }
    }

    /// The captured error, if the chain failed.
    #[inline]
    pub fn error(&self) -> Option<&E> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }

    /// Terminal node of the run.
    #[inline]
    pub fn history(&self) -> &HistoryNode<T> {
        match self {
            Self::Success { history, .. } | Self::Failure { history, .. } => history,
        }
    }

    #[inline]
    pub fn into_history(self) -> HistoryNode<T> {
        match self {
            Self::Success { history, .. } | Self::Failure { history, .. } => history,
        }
    }

    /// Splits the result into its outcome and its history.
    pub fn into_parts(self) -> (Result<Option<Rc<T>>, E>, HistoryNode<T>) {
        match self {
            Self::Success { value, history } => (Ok(value), history),
            Self::Failure { error, history } => (Err(error), history),
        }
    }

    /// Returns the value, or the captured error.
    ///
    /// A success without a value is reported as [`NoValue`].
    ///
    /// # Examples
    ///
    /// ```
    /// use step_rail::{Chain, NoValue};
    ///
    /// assert_eq!(Chain::of(5).get_result().get().ok(), Some(5));
    ///
    /// let empty = Chain::of(5).filter_safe(|n| *n > 10).get_result();
    /// assert!(empty.get().unwrap_err().is::<NoValue>());
    /// ```
    pub fn get(self) -> Result<T, E>
    where
        T: Clone,
        E: From<NoValue>,
    {
        match self {
            Self::Success { value: Some(value), history } => {
                drop(history);
                Ok(Rc::unwrap_or_clone(value))
            }
            Self::Success { value: None, history } => Err(NoValue::new(history.call_site).into()),
            Self::Failure { error, .. } => Err(error),
        }
    }

    /// Returns the value, `None` when absent, or the captured error.
    pub fn get_option(self) -> Result<Option<T>, E>
    where
        T: Clone,
    {
        match self.into_parts() {
            (Ok(value), history) => {
                drop(history);
                Ok(value.map(Rc::unwrap_or_clone))
            }
            (Err(error), _) => Err(error),
        }
    }

    /// Returns the value, building one from the error on failure.
    ///
    /// # Arguments
    ///
    /// * `fallback` - Produces a replacement value from the captured error
    pub fn get_or_fallback_for_error<F>(self, fallback: F) -> Option<T>
    where
        T: Clone,
        F: FnOnce(&E) -> T,
    {
        match self.into_parts() {
            (Ok(value), history) => {
                drop(history);
                value.map(Rc::unwrap_or_clone)
            }
            (Err(error), _) => Some(fallback(&error)),
        }
    }

    /// Like [`get_option`](Self::get_option), but a failure is turned into an
    /// option by `mapper` instead of being returned.
    pub fn get_option_even_err<F>(self, mapper: F) -> Option<T>
    where
        T: Clone,
        F: FnOnce(&E) -> Option<T>,
    {
        match self.into_parts() {
            (Ok(value), history) => {
                drop(history);
                value.map(Rc::unwrap_or_clone)
            }
            (Err(error), _) => mapper(&error),
        }
    }

    /// Calls `observer` with the error if the chain failed.
    #[inline]
    pub fn if_error<F>(&self, observer: F)
    where
        F: FnOnce(&E),
    {
        if let Self::Failure { error, .. } = self {
            observer(error);
        }
    }

    /// Calls `observer` with the error if the chain failed and returns the
    /// result for further chaining.
    #[inline]
    pub fn do_if_error<F>(self, observer: F) -> Self
    where
        F: FnOnce(&E),
    {
        self.if_error(observer);
        self
    }

    /// Calls `observer` when `predicate` accepts the result.
    #[inline]
    pub fn do_if<P, F>(self, predicate: P, observer: F) -> Self
    where
        P: FnOnce(&Self) -> bool,
        F: FnOnce(&Self),
    {
        if predicate(&self) {
            observer(&self);
        }
        self
    }

    /// Replaces the error type of a failure. The history keeps the original
    /// error.
    ///
    /// # Examples
    ///
    /// ```
    /// use step_rail::{step_error, Chain};
    ///
    /// let result = Chain::of(1)
    ///     .map(|_| Err::<i32, _>(step_error!("boom")))
    ///     .get_result()
    ///     .map_error(|err| err.to_string());
    ///
    /// assert_eq!(result.error().map(String::as_str), Some("boom"));
    /// ```
    pub fn map_error<E2, F>(self, mapper: F) -> ChainResult<T, E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Self::Success { value, history } => ChainResult::Success { value, history },
            Self::Failure { error, history } => {
                ChainResult::Failure { error: mapper(error), history }
            }
        }
    }
}

impl<T, E> ChainResult<T, E>
where
    T: Debug + 'static,
{
    /// Renders the history with `config`.
    pub fn render(&self, config: &HistoryFormatConfig) -> String {
        config.format_history(self.history().as_step())
    }

    /// Owned snapshot of the history.
    pub fn report(&self) -> TraceReport {
        TraceReport::from_step(self.history().as_step())
    }

    /// Hands the rendered history to `debug_sink` on success (when
    /// `need_debug`) or to `error_sink` on failure (when `need_error`).
    ///
    /// A failing sink does not affect the result; its error is logged through
    /// `tracing` and dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::cell::RefCell;
    /// use step_rail::Chain;
    ///
    /// let seen = RefCell::new(String::new());
    /// let _ = Chain::of(3).get_result().trace_debug_or_error(
    ///     true,
    ///     |text| {
    ///         seen.borrow_mut().push_str(text);
    ///         Ok(())
    ///     },
    ///     true,
    ///     |_| Ok(()),
    /// );
    /// assert!(seen.borrow().contains("out: 3"));
    /// ```
    pub fn trace_debug_or_error<D, R>(
        &self,
        need_debug: bool,
        debug_sink: D,
        need_error: bool,
        error_sink: R,
    ) -> &Self
    where
        D: FnOnce(&str) -> StepResult<()>,
        R: FnOnce(&str) -> StepResult<()>,
    {
        let config = HistoryFormatConfig::default();
        let delivered = match self {
            Self::Success { .. } if need_debug => debug_sink(&self.render(&config)),
            Self::Failure { .. } if need_error => error_sink(&self.render(&config)),
            _ => Ok(()),
        };

        if let Err(sink_error) = delivered {
            tracing::error!(error = %sink_error, "history sink failed");
        }
        self
    }
}

impl<T, E> ChainResult<T, E>
where
    T: Debug + 'static,
    E: Display,
{
    /// Emits the rendered history through `tracing`: `debug` on success,
    /// `error` on failure.
    pub fn trace(&self) -> &Self {
        let history = self.render(&HistoryFormatConfig::default());
        match self {
            Self::Success { .. } => tracing::debug!(%history, "chain succeeded"),
            Self::Failure { error, .. } => tracing::error!(%error, %history, "chain failed"),
        }
        self
    }
}

/// Hands back `error` as a `K` when it is one, otherwise maps it.
fn escalate<K, M>(error: StepError, mapper: M) -> K
where
    K: Error + Send + Sync + 'static,
    M: FnOnce(StepError) -> K,
{
    match error.downcast::<K>() {
        Ok(original) => original,
        Err(error) => mapper(error),
    }
}

impl<T> ChainResult<T> {
    /// Returns the value, or escalates the failure into a `K`.
    ///
    /// A captured error that already is a `K` comes back as the very object
    /// the failing step returned. Any other error goes through `mapper`. An
    /// absent value escalates as a [`NoValue`] through the same rule.
    ///
    /// # Examples
    ///
    /// ```
    /// use step_rail::{Chain, MessageError, StepError};
    ///
    /// let result = Chain::of(1).map(|_| Err::<i32, _>(StepError::msg("bad input"))).get_result();
    /// let err = result.get_or_spec_error::<MessageError, _>(|_| unreachable!()).unwrap_err();
    /// assert_eq!(err.message(), "bad input");
    /// ```
    pub fn get_or_spec_error<K, M>(self, mapper: M) -> Result<T, K>
    where
        T: Clone,
        K: Error + Send + Sync + 'static,
        M: FnOnce(StepError) -> K,
    {
        match self {
            Self::Success { value: Some(value), history } => {
                drop(history);
                Ok(Rc::unwrap_or_clone(value))
            }
            Self::Success { value: None, history } => {
                Err(escalate(NoValue::new(history.call_site).into(), mapper))
            }
            Self::Failure { error, history } => {
                drop(history);
                Err(escalate(error, mapper))
            }
        }
    }

    /// Option counterpart of [`get_or_spec_error`](Self::get_or_spec_error):
    /// an absent value is `Ok(None)`.
    pub fn get_option_or_spec_error<K, M>(self, mapper: M) -> Result<Option<T>, K>
    where
        T: Clone,
        K: Error + Send + Sync + 'static,
        M: FnOnce(StepError) -> K,
    {
        match self {
            Self::Success { value, history } => {
                drop(history);
                Ok(value.map(Rc::unwrap_or_clone))
            }
            Self::Failure { error, history } => {
                drop(history);
                Err(escalate(error, mapper))
            }
        }
    }

    /// Like [`get_or_spec_error`](Self::get_or_spec_error), but `mapper` sees
    /// the whole result (history included) instead of the bare error.
    pub fn get_or_spec_error_by<K, M>(self, mapper: M) -> Result<T, K>
    where
        T: Clone,
        K: Error + Send + Sync + 'static,
        M: FnOnce(&Self) -> K,
    {
        match self {
            Self::Success { value: Some(value), history } => {
                drop(history);
                Ok(Rc::unwrap_or_clone(value))
            }
            other @ Self::Success { value: None, .. } => {
                let absent = StepError::from(NoValue::new(other.history().call_site));
                match absent.downcast::<K>() {
                    Ok(original) => Err(original),
                    Err(_) => Err(mapper(&other)),
                }
            }
            failure => Err(failure.escalate_by(mapper)),
        }
    }

    /// Option counterpart of
    /// [`get_or_spec_error_by`](Self::get_or_spec_error_by).
    pub fn get_option_or_spec_error_by<K, M>(self, mapper: M) -> Result<Option<T>, K>
    where
        T: Clone,
        K: Error + Send + Sync + 'static,
        M: FnOnce(&Self) -> K,
    {
        match self {
            Self::Success { value, history } => {
                drop(history);
                Ok(value.map(Rc::unwrap_or_clone))
            }
            failure => Err(failure.escalate_by(mapper)),
        }
    }

    fn escalate_by<K, M>(self, mapper: M) -> K
    where
        K: Error + Send + Sync + 'static,
        M: FnOnce(&Self) -> K,
    {
        match self {
            Self::Failure { error, history } if error.is::<K>() => {
                let call_site = history.call_site;
                drop(history);
                match error.downcast::<K>() {
                    Ok(original) => original,
                    // Still shared elsewhere; the history is gone, so the
                    // mapper sees a single-node stand-in.
                    Err(error) => {
                        let history = HistoryNode::origin(call_site, None, Some(error.share()));
                        mapper(&Self::Failure { error, history })
                    }
                }
            }
            other => mapper(&other),
        }
    }
}
