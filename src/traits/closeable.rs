//! Release contract for resources bound to a [`ResourceChain`](crate::ResourceChain).

use core::fmt::{self, Debug};
use core::ops::Deref;

use crate::types::step_error::StepResult;

/// A resource that must be released exactly once.
///
/// [`ResourceChain`](crate::ResourceChain) calls [`close`](Self::close) once
/// per forcing, after the last step ran, whether or not the steps succeeded.
/// A failing release is reported through the chain result.
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
/// use step_rail::{Closeable, StepResult};
///
/// struct Handle {
///     closed: Cell<bool>,
/// }
///
/// impl Closeable for Handle {
///     fn close(&self) -> StepResult<()> {
///         self.closed.set(true);
///         Ok(())
///     }
/// }
///
/// let handle = Handle { closed: Cell::new(false) };
/// handle.close().unwrap();
/// assert!(handle.closed.get());
/// ```
pub trait Closeable {
    /// Releases the resource.
    fn close(&self) -> StepResult<()>;
}

impl<C> Closeable for Box<C>
where
    C: Closeable + ?Sized,
{
    #[inline]
    fn close(&self) -> StepResult<()> {
        (**self).close()
    }
}

/// Pairs a value that has no [`Closeable`] impl with a release function.
///
/// Dereferences to the wrapped value, so steps can use it directly.
///
/// # Examples
///
/// ```
/// use step_rail::{CloseWith, Closeable};
///
/// let buffer = CloseWith::new(vec![1, 2, 3], |buf: &Vec<i32>| {
///     assert_eq!(buf.len(), 3);
///     Ok(())
/// });
///
/// assert_eq!(buffer.len(), 3);
/// assert!(buffer.close().is_ok());
/// ```
pub struct CloseWith<R, F> {
    resource: R,
    release: F,
}

impl<R, F> CloseWith<R, F>
where
    F: Fn(&R) -> StepResult<()>,
{
    #[inline]
    pub fn new(resource: R, release: F) -> Self {
        Self { resource, release }
    }

    #[inline]
    pub fn get_ref(&self) -> &R {
        &self.resource
    }
}

impl<R, F> Closeable for CloseWith<R, F>
where
    F: Fn(&R) -> StepResult<()>,
{
    #[inline]
    fn close(&self) -> StepResult<()> {
        (self.release)(&self.resource)
    }
}

impl<R, F> Deref for CloseWith<R, F> {
    type Target = R;

    #[inline]
    fn deref(&self) -> &R {
        &self.resource
    }
}

impl<R: Debug, F> Debug for CloseWith<R, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloseWith").field("resource", &self.resource).finish_non_exhaustive()
    }
}
