//! Conversion helpers between plain `Result`/`Option` values and chains.
//!
//! These adapters let code that already returns `Result` enter a chain, and
//! let a forced chain leave as a `Result` when it meets an API that knows
//! nothing about histories.
//!
//! # Examples
//!
//! ```
//! use step_rail::convert::*;
//!
//! let chain = result_to_chain(Ok::<i32, std::fmt::Error>(20)).map_safe(|n| n + 1);
//! assert_eq!(chain_result_to_result::<_, step_rail::StepError>(chain.get_result()).unwrap(), 21);
//!
//! let outcome: Result<Option<i32>, _> = option_to_chain(None::<i32>).get_result().into();
//! assert_eq!(outcome.unwrap(), None);
//! ```

use core::fmt::Debug;
use std::error::Error;

use crate::types::{Chain, ChainResult, NoValue, StepError};

/// Converts a forced chain into a `Result`, treating an absent value as
/// [`NoValue`].
///
/// # Arguments
///
/// * `result` - The chain result to convert
///
/// # Returns
///
/// * `Ok(value)` if the chain succeeded with a value
/// * `Err(NoValue.into())` if it succeeded without one
/// * `Err(error)` if it failed
#[inline]
pub fn chain_result_to_result<T, E>(result: ChainResult<T, E>) -> Result<T, E>
where
    T: Clone,
    E: From<NoValue>,
{
    result.get()
}

/// Starts a chain from a `Result`.
///
/// # Examples
///
/// ```
/// use step_rail::convert::result_to_chain;
///
/// let chain = result_to_chain(Err::<i32, _>(std::fmt::Error));
/// assert!(chain.get_result().is_failure());
/// ```
#[inline]
#[track_caller]
pub fn result_to_chain<T, E>(result: Result<T, E>) -> Chain<'static, T>
where
    T: Debug + 'static,
    E: Error + Clone + Send + Sync + 'static,
{
    Chain::from_result(result)
}

/// Starts a chain from an `Option`; `None` starts it without a value.
#[inline]
#[track_caller]
pub fn option_to_chain<T>(value: Option<T>) -> Chain<'static, T>
where
    T: Debug + 'static,
{
    Chain::of_option(value)
}

/// Lets a [`StepError`] leave as a boxed standard error.
///
/// # Examples
///
/// ```
/// use step_rail::convert::step_error_to_boxed;
/// use step_rail::step_error;
///
/// let boxed = step_error_to_boxed(step_error!("disk full"));
/// assert_eq!(boxed.to_string(), "disk full");
/// ```
#[inline]
pub fn step_error_to_boxed(error: StepError) -> Box<dyn Error + Send + Sync + 'static> {
    error.into()
}

impl<T, E> From<ChainResult<T, E>> for Result<Option<T>, E>
where
    T: Clone,
{
    fn from(result: ChainResult<T, E>) -> Self {
        result.get_option()
    }
}
