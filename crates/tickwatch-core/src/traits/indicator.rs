//! Indicator trait definition.

use crate::error::IndicatorError;

/// Trait for technical indicators.
///
/// Indicators are pure functions of their input: the value at index `i`
/// depends only on `data[..=i]`, and calling [`Indicator::calculate`] twice on
/// the same data yields identical output.
pub trait Indicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Calculate indicator values aligned to the input.
    ///
    /// # Arguments
    /// * `data` - Input data (typically close prices)
    ///
    /// # Returns
    /// One entry per input point; `None` for the first [`Indicator::warmup`]
    /// points, where the lookback window is not yet full.
    fn calculate(&self, data: &[f64]) -> Vec<Option<Self::Output>>;

    /// Number of leading points that carry no value.
    fn warmup(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;

    /// Check that the last input point will carry a value.
    fn validate_data(&self, data: &[f64]) -> Result<(), IndicatorError> {
        if data.len() <= self.warmup() {
            return Err(IndicatorError::InsufficientData {
                required: self.warmup() + 1,
                available: data.len(),
            });
        }
        Ok(())
    }
}
