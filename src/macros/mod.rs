//! Macros for ad-hoc failures inside step closures.
//!
//! - [`macro@crate::step_error`] - Builds a [`StepError`](crate::StepError) from a format string.
//! - [`macro@crate::bail_step`] - Returns such an error from the enclosing step closure.
//!
//! # Examples
//!
//! ```
//! use step_rail::{bail_step, Chain};
//!
//! let chain = Chain::of(-3).map(|n| {
//!     if *n < 0 {
//!         bail_step!("negative input: {}", n);
//!     }
//!     Ok(n * 2)
//! });
//!
//! let err = chain.get().unwrap_err();
//! assert_eq!(err.to_string(), "negative input: -3");
//! ```

/// Creates a [`StepError`](crate::StepError) carrying a formatted message.
///
/// The resulting error is a [`MessageError`](crate::MessageError), so it can
/// be matched with `is::<MessageError>()` or escalated as one.
///
/// # Arguments
///
/// Accepts the same arguments as the standard `format!` macro.
///
/// # Examples
///
/// ```
/// use step_rail::{step_error, MessageError};
///
/// let attempt = 3;
/// let err = step_error!("gave up after {} attempts", attempt);
/// assert!(err.is::<MessageError>());
/// assert_eq!(err.to_string(), "gave up after 3 attempts");
/// ```
#[macro_export]
macro_rules! step_error {
    ($($arg:tt)*) => {
        $crate::StepError::msg(format!($($arg)*))
    };
}

/// Returns early from a step closure with a [`step_error!`].
///
/// # Examples
///
/// ```
/// use step_rail::{bail_step, StepResult};
///
/// fn check(port: u16) -> StepResult<u16> {
///     if port == 0 {
///         bail_step!("port must be non-zero");
///     }
///     Ok(port)
/// }
///
/// assert!(check(0).is_err());
/// assert_eq!(check(8080).unwrap(), 8080);
/// ```
#[macro_export]
macro_rules! bail_step {
    ($($arg:tt)*) => {
        return Err($crate::step_error!($($arg)*))
    };
}
