//! Source location attached to every history node.
//!
//! Combinators are `#[track_caller]`, so the location recorded for a step is
//! the line in user code that added the step, not a frame inside this crate.

use core::fmt::{self, Display};
use std::panic::Location;

/// Where a step was added to a chain, plus an optional label.
///
/// Used for diagnostics only. Two call sites compare equal when they point at
/// the same source position and carry the same label.
///
/// # Examples
///
/// ```
/// use step_rail::CallSite;
///
/// let here = CallSite::caller();
/// assert_eq!(here.file(), file!());
/// assert_eq!(here.label(), None);
///
/// let named = here.with_label("load-config");
/// assert!(named.to_string().starts_with("load-config@"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallSite {
    location: &'static Location<'static>,
    label: Option<&'static str>,
}

impl CallSite {
    /// Captures the location of the caller.
    #[inline]
    #[track_caller]
    pub fn caller() -> Self {
        Self { location: Location::caller(), label: None }
    }

    /// Returns a copy tagged with `label`.
    #[inline]
    #[must_use]
    pub fn with_label(self, label: &'static str) -> Self {
        Self { label: Some(label), ..self }
    }

    #[inline]
    pub fn file(&self) -> &'static str {
        self.location.file()
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.location.line()
    }

    #[inline]
    pub fn column(&self) -> u32 {
        self.location.column()
    }

    #[inline]
    pub fn label(&self) -> Option<&'static str> {
        self.label
    }
}

impl Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = self.label {
            write!(f, "{}@", label)?;
        }
        write!(f, "{}:{}:{}", self.file(), self.line(), self.column())
    }
}
