use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("resolution must be a positive even integer, got {0}")]
    NotPositive(i64),
    #[error("resolution must be an even integer, got {0}")]
    Odd(i64),
    #[error("resolution must be at most 100 steps per second, got {0}")]
    TooFine(i64),
}

/// Number of time steps per second of music.
///
/// Always a positive even integer no greater than [`Resolution::MAX`]; the
/// only way to obtain one is through [`Resolution::new`] (or [`Default`],
/// which is 10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution(u32);

impl Resolution {
    pub const DEFAULT: Self = Self(10);
    /// Finer steps than a terminal can redraw; grid and frame size grow
    /// linearly with this.
    pub const MAX: Self = Self(100);

    pub fn new(steps_per_second: i64) -> Result<Self, ResolutionError> {
        if steps_per_second <= 0 {
            return Err(ResolutionError::NotPositive(steps_per_second));
        }
        if steps_per_second > i64::from(Self::MAX.0) {
            return Err(ResolutionError::TooFine(steps_per_second));
        }
        if steps_per_second % 2 != 0 {
            return Err(ResolutionError::Odd(steps_per_second));
        }
        u32::try_from(steps_per_second)
            .map(Self)
            .map_err(|_| ResolutionError::TooFine(steps_per_second))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }

    /// Duration of one time step in seconds.
    pub fn step_seconds(self) -> f64 {
        1.0 / self.as_f64()
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i64> for Resolution {
    type Error = ResolutionError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} steps/s", self.0)
    }
}
