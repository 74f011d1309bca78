// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Display;

/// A single invocation of the retried operation.
///
/// The index is 0-based: the first invocation has index `0`. After an invocation fails and the
/// retry continues, the number of failed attempts so far equals `index() + 1`, which is the value
/// handed to [`Backoff::next_delay`][crate::Backoff::next_delay].
///
/// # Examples
///
/// ```
/// use tenacious::Attempt;
///
/// let attempt = Attempt::new(0, false);
/// assert!(attempt.is_first());
/// assert!(!attempt.is_last());
///
/// let last = Attempt::new(2, true);
/// assert_eq!(last.index(), 2);
/// assert!(last.is_last());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Attempt {
    index: u32,
    is_last: bool,
}

impl Default for Attempt {
    fn default() -> Self {
        Self::new(0, true)
    }
}

impl Attempt {
    /// Creates a new attempt with the given index.
    #[must_use]
    pub fn new(index: u32, is_last: bool) -> Self {
        Self { index, is_last }
    }

    /// Returns true if this is the first invocation (index 0).
    #[must_use]
    pub fn is_first(self) -> bool {
        self.index == 0
    }

    /// Returns true if no further invocation is allowed after this one.
    #[must_use]
    pub fn is_last(self) -> bool {
        self.is_last
    }

    /// Returns the 0-based index of this invocation.
    #[must_use]
    pub fn index(self) -> u32 {
        self.index
    }

    /// Number of invocations made once this one has completed.
    pub(crate) fn count(self) -> u32 {
        self.index.saturating_add(1)
    }

    #[cfg_attr(test, mutants::skip)] // causes test timeouts
    pub(crate) fn increment(self, max_attempts: MaxAttempts) -> Option<Self> {
        let next = self.index.saturating_add(1);

        match max_attempts {
            MaxAttempts::Finite(max) => {
                if next >= max {
                    return None;
                }

                Some(Self::new(next, next == max.saturating_sub(1)))
            }
            MaxAttempts::Infinite => Some(Self::new(next, false)),
        }
    }
}

impl Display for Attempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.index.fmt(f)
    }
}

/// Upper bound on the total number of invocations of the retried operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum MaxAttempts {
    Finite(u32),
    #[default]
    Infinite,
}

impl MaxAttempts {
    pub fn first_attempt(self) -> Attempt {
        Attempt::new(0, matches!(self, Self::Finite(1)))
    }
}

impl From<u32> for MaxAttempts {
    fn from(value: u32) -> Self {
        Self::Finite(value)
    }
}
