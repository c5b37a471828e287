//! Type-erased failure captured by a chain step.
//!
//! Every fallible step closure returns [`StepResult`]. Any error type that
//! implements [`std::error::Error`] converts into [`StepError`] through `?`,
//! so steps can mix I/O errors, parse errors and domain errors freely while the
//! chain keeps a single failure type.
//!
//! A [`StepError`] remembers the concrete type it was built from. Escalation
//! (`get_or_spec_error` and friends) uses that to hand back the original error
//! object when it already has the requested kind.
//!
//! # Examples
//!
//! ```
//! use step_rail::StepError;
//!
//! let err = StepError::new(std::fmt::Error);
//! assert!(err.is::<std::fmt::Error>());
//! assert_eq!(err.downcast::<std::fmt::Error>().ok(), Some(std::fmt::Error));
//! ```

use core::any::Any;
use core::fmt::{self, Debug, Display};
use std::borrow::Cow;
use std::error::Error;
use std::sync::Arc;

use crate::types::call_site::CallSite;

/// Result returned by every fallible step closure.
pub type StepResult<T> = Result<T, StepError>;

// `Arc<dyn ErrorObject>` is itself an `Error`, so calls through `inner` must
// deref first or they resolve against the `Arc`.
trait ErrorObject: Error + Send + Sync + 'static {
    fn as_any(&self) -> &(dyn Any + Send + Sync);
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
    fn as_error(&self) -> &(dyn Error + Send + Sync + 'static);
}

impl<E> ErrorObject for E
where
    E: Error + Send + Sync + 'static,
{
    #[inline]
    fn as_any(&self) -> &(dyn Any + Send + Sync) {
        self
    }

    #[inline]
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    #[inline]
    fn as_error(&self) -> &(dyn Error + Send + Sync + 'static) {
        self
    }
}

/// A failure captured while forcing a chain.
///
/// The error is shared between the result and the history nodes that
/// recorded it, so capturing it never clones the underlying value.
/// `StepError` does not implement [`std::error::Error`] itself
/// (that would collide with the blanket `From` conversion); use
/// [`as_error`](Self::as_error) when a `&dyn Error` is needed.
pub struct StepError {
    inner: Arc<dyn ErrorObject>,
}

impl StepError {
    /// Wraps a concrete error.
    #[inline]
    pub fn new<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self { inner: Arc::new(error) }
    }

    /// Builds an error from a plain message.
    ///
    /// # Examples
    ///
    /// ```
    /// use step_rail::{MessageError, StepError};
    ///
    /// let err = StepError::msg("quota exceeded");
    /// assert_eq!(err.to_string(), "quota exceeded");
    /// assert!(err.is::<MessageError>());
    /// ```
    #[inline]
    pub fn msg<M>(message: M) -> Self
    where
        M: Into<Cow<'static, str>>,
    {
        Self::new(MessageError(message.into()))
    }

    /// Returns `true` if the captured error has the concrete type `K`.
    #[inline]
    pub fn is<K>(&self) -> bool
    where
        K: Error + Send + Sync + 'static,
    {
        (*self.inner).as_any().is::<K>()
    }

    /// Borrows the captured error as `K`, if that is its concrete type.
    #[inline]
    pub fn downcast_ref<K>(&self) -> Option<&K>
    where
        K: Error + Send + Sync + 'static,
    {
        (*self.inner).as_any().downcast_ref::<K>()
    }

    /// Takes the captured error back out as `K`.
    ///
    /// Fails, returning `self` unchanged, when the concrete type is not `K` or
    /// when the error is still shared (for example by a history node that is
    /// still alive).
    pub fn downcast<K>(self) -> Result<K, Self>
    where
        K: Error + Send + Sync + 'static,
    {
        if !self.is::<K>() || Arc::strong_count(&self.inner) != 1 {
            return Err(self);
        }

        let kept = Arc::clone(&self.inner);
        match self.inner.into_any().downcast::<K>() {
            Ok(typed) => {
                drop(kept);
                Arc::try_unwrap(typed).map_err(|shared| Self { inner: shared })
            }
            Err(_) => Err(Self { inner: kept }),
        }
    }

    /// Borrows the captured error as a standard error trait object.
    #[inline]
    pub fn as_error(&self) -> &(dyn Error + Send + Sync + 'static) {
        (*self.inner).as_error()
    }

    /// Returns the lower-level source of the captured error, if any.
    #[inline]
    pub fn source(&self) -> Option<&(dyn Error + 'static)> {
        (*self.inner).source()
    }

    /// Iterates the captured error followed by its `source()` chain.
    pub fn chain(&self) -> impl Iterator<Item = &(dyn Error + 'static)> {
        let head: &(dyn Error + 'static) = self.as_error();
        core::iter::successors(Some(head), |err| (*err).source())
    }

    /// Returns `true` when both handles point at the same captured error.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Another handle to the same captured error, for history bookkeeping.
    #[inline]
    pub(crate) fn share(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<E> From<E> for StepError
where
    E: Error + Send + Sync + 'static,
{
    #[inline]
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

impl Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&*self.inner, f)
    }
}

impl Debug for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&*self.inner, f)
    }
}

impl From<StepError> for Box<dyn Error + Send + Sync + 'static> {
    fn from(error: StepError) -> Self {
        Box::new(Escaped(error))
    }
}

/// Lets a [`StepError`] leave the crate as a `Box<dyn Error>`.
struct Escaped(StepError);

impl Debug for Escaped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for Escaped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Error for Escaped {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

/// Plain-text failure produced by [`StepError::msg`] and [`step_error!`](crate::step_error).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageError(pub(crate) Cow<'static, str>);

impl MessageError {
    /// The message text.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for MessageError {}

/// A terminal `get` found the chain ended without a value.
///
/// Absence is not a failure inside the chain (a `filter` that rejects clears
/// the value); it only becomes an error when a caller asks for a value that
/// is not there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoValue {
    call_site: CallSite,
}

impl NoValue {
    #[inline]
    pub(crate) fn new(call_site: CallSite) -> Self {
        Self { call_site }
    }

    /// Where the last step of the empty chain was built.
    #[inline]
    pub fn call_site(&self) -> CallSite {
        self.call_site
    }
}

impl Display for NoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chain produced no value (last step at {})", self.call_site)
    }
}

impl Error for NoValue {}

/// A resource-aware step ran on a chain whose resource never opened.
///
/// This only happens after `map_on_error` recovered from a failed `open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceUnavailable {
    call_site: CallSite,
}

impl ResourceUnavailable {
    #[inline]
    pub(crate) fn new(call_site: CallSite) -> Self {
        Self { call_site }
    }

    /// Where the step that asked for the resource was built.
    #[inline]
    pub fn call_site(&self) -> CallSite {
        self.call_site
    }
}

impl Display for ResourceUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resource is not available (step at {})", self.call_site)
    }
}

impl Error for ResourceUnavailable {}
