//! Moving average indicators.

use tickwatch_core::traits::Indicator;

use crate::simd;

/// Simple Moving Average (SMA).
///
/// Calculates the arithmetic mean of the last N values.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    /// Create a new SMA with the specified period.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Indicator for Sma {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<Option<f64>> {
        let mut result = vec![None; data.len().min(self.period - 1)];
        result.extend(data.windows(self.period).map(|w| Some(simd::mean(w))));
        result
    }

    fn warmup(&self) -> usize {
        self.period - 1
    }

    fn name(&self) -> &str {
        "SMA"
    }
}

/// Exponential Moving Average (EMA).
///
/// Gives more weight to recent prices using an exponential decay with
/// smoothing factor `2 / (span + 1)`. The recursion is seeded with the first
/// input value, so the EMA is defined from the very first point:
///
/// ```text
/// ema[0] = x[0]
/// ema[i] = alpha * x[i] + (1 - alpha) * ema[i - 1]
/// ```
#[derive(Debug, Clone)]
pub struct Ema {
    multiplier: f64,
}

impl Ema {
    /// Create a new EMA with the specified span.
    pub fn new(span: usize) -> Self {
        assert!(span > 0, "Span must be greater than 0");
        let multiplier = 2.0 / (span as f64 + 1.0);
        Self { multiplier }
    }

    /// EMA of every input point.
    pub fn series(&self, data: &[f64]) -> Vec<f64> {
        let mut result = Vec::with_capacity(data.len());
        let Some(&first) = data.first() else {
            return result;
        };

        let one_minus_mult = 1.0 - self.multiplier;
        let mut ema = first;
        result.push(ema);

        for &price in &data[1..] {
            ema = price * self.multiplier + ema * one_minus_mult;
            result.push(ema);
        }

        result
    }
}

impl Indicator for Ema {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<Option<f64>> {
        self.series(data).into_iter().map(Some).collect()
    }

    fn warmup(&self) -> usize {
        0
    }

    fn name(&self) -> &str {
        "EMA"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma() {
        let sma = Sma::new(3);
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma.calculate(&data);

        assert_eq!(result.len(), 5);
        assert!(result[0].is_none());
        assert!(result[1].is_none());
        assert!((result[2].unwrap() - 2.0).abs() < 1e-10); // (1+2+3)/3
        assert!((result[3].unwrap() - 3.0).abs() < 1e-10); // (2+3+4)/3
        assert!((result[4].unwrap() - 4.0).abs() < 1e-10); // (3+4+5)/3
    }

    #[test]
    fn test_sma_insufficient_data() {
        let sma = Sma::new(5);
        let data = vec![1.0, 2.0, 3.0];
        let result = sma.calculate(&data);

        assert_eq!(result, vec![None, None, None]);
        assert!(sma.calculate(&[]).is_empty());
    }

    #[test]
    fn test_sma_matches_window_mean() {
        let sma = Sma::new(20);
        let data: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.37).sin() * 7.0)
            .collect();
        let result = sma.calculate(&data);

        for i in 19..data.len() {
            let expected = data[i - 19..=i].iter().sum::<f64>() / 20.0;
            assert!((result[i].unwrap() - expected).abs() < 1e-9);
        }
        assert!(result[..19].iter().all(Option::is_none));
    }

    #[test]
    fn test_ema_seeded_with_first_value() {
        let ema = Ema::new(3);
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = ema.series(&data);

        // mult = 2/(3+1) = 0.5
        assert_eq!(result.len(), 5);
        assert_eq!(result[0], 1.0);
        assert!((result[1] - 1.5).abs() < 1e-10); // 2*0.5 + 1*0.5
        assert!((result[2] - 2.25).abs() < 1e-10); // 3*0.5 + 1.5*0.5
    }

    #[test]
    fn test_ema_constant_input() {
        let ema = Ema::new(12);
        let result = ema.calculate(&[50.0; 30]);
        assert!(result.iter().all(|v| (v.unwrap() - 50.0).abs() < 1e-9));
        assert_eq!(ema.warmup(), 0);
    }
}
