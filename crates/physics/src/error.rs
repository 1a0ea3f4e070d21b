//! Error types for the physics crate.

use thiserror::Error;

/// A tuning parameter failed validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    /// The value must be strictly positive.
    #[error("`{name}` must be positive, got {value}")]
    NotPositive { name: &'static str, value: f32 },

    /// The value must not be negative.
    #[error("`{name}` must not be negative, got {value}")]
    Negative { name: &'static str, value: f32 },

    /// The value is NaN or infinite.
    #[error("`{name}` must be finite")]
    NotFinite { name: &'static str },

    /// The value lies outside its allowed range.
    #[error("`{name}` must be within [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    /// The iteration budget must allow at least one pass.
    #[error("`max_iterations` must be at least 1")]
    ZeroIterations,
}

impl ParameterError {
    /// Check that `value` is finite and strictly positive.
    pub fn positive(name: &'static str, value: f32) -> Result<(), Self> {
        Self::finite(name, value)?;
        if value <= 0.0 {
            return Err(Self::NotPositive { name, value });
        }
        Ok(())
    }

    /// Check that `value` is finite and not negative.
    pub fn non_negative(name: &'static str, value: f32) -> Result<(), Self> {
        Self::finite(name, value)?;
        if value < 0.0 {
            return Err(Self::Negative { name, value });
        }
        Ok(())
    }

    /// Check that `value` is finite and within `[min, max]`.
    pub fn in_range(name: &'static str, value: f32, min: f32, max: f32) -> Result<(), Self> {
        Self::finite(name, value)?;
        if value < min || value > max {
            return Err(Self::OutOfRange {
                name,
                value,
                min,
                max,
            });
        }
        Ok(())
    }

    /// Check that `value` is not NaN or infinite.
    pub fn finite(name: &'static str, value: f32) -> Result<(), Self> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(Self::NotFinite { name })
        }
    }
}
