use core::fmt::Debug;

use crate::traits::Closeable;
use crate::types::{Chain, ChainResult, ResourceChain};

/// Anything a `flat_map` step can force into a nested result.
///
/// Implemented by [`Chain`] and by [`ResourceChain`], which releases its
/// resource as part of forcing. The nested history becomes the `child` of the
/// `flat_map` node.
pub trait Pipeline<T> {
    /// Runs the pipeline once.
    fn force(&self) -> ChainResult<T>;
}

impl<T> Pipeline<T> for Chain<'_, T>
where
    T: Debug + 'static,
{
    #[inline]
    fn force(&self) -> ChainResult<T> {
        self.get_result()
    }
}

impl<C, T> Pipeline<T> for ResourceChain<'_, C, T>
where
    C: Closeable + 'static,
    T: Debug + 'static,
{
    #[inline]
    fn force(&self) -> ChainResult<T> {
        self.close_and_get_result()
    }
}
