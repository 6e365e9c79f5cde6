use std::fmt;

use crate::error::{ComputeError, Result};

/// Number of future business days to forecast, always within
/// [`Horizon::MIN`, `Horizon::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Horizon(u32);

impl Horizon {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 30;
    pub const STEP: u32 = 1;

    /// Accepts `days` only if it lies in the closed range.
    pub fn new(days: u32) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&days) {
            Ok(Self(days))
        } else {
            Err(ComputeError::Horizon(format!(
                "{} is outside [{}, {}]",
                days,
                Self::MIN,
                Self::MAX
            )))
        }
    }

    /// Clamps `days` into the range, like the bounded number input does.
    pub fn clamped(days: i64) -> Self {
        Self(days.clamp(Self::MIN as i64, Self::MAX as i64) as u32)
    }

    pub fn days(self) -> u32 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
