//! # Signal filter
//!
//! Fixed window moving average used to smooth noisy sensor measurements before they reach a
//! controller.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::VecDeque;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Moving average over the last `window_size` samples.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    window: VecDeque<f64>,
    window_size: usize,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MovingAverage {
    /// Create a new empty filter. A window size of zero is treated as one.
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);

        Self {
            window: VecDeque::with_capacity(window_size),
            window_size,
        }
    }

    /// Add a sample to the window, evicting the oldest one if the window is full.
    pub fn observe(&mut self, raw: f64) {
        if self.window.len() == self.window_size {
            self.window.pop_front();
        }
        self.window.push_back(raw);
    }

    /// Mean of the samples in the window, or zero if the window is empty.
    pub fn value(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }

        self.window.iter().sum::<f64>() / self.window.len() as f64
    }

    /// Remove all samples.
    pub fn reset(&mut self) {
        self.window.clear();
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn mean(samples: &[f64]) -> f64 {
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    #[test]
    fn test_mean_of_last_samples() {
        let samples = [3.0, -7.5, 12.0, 0.25, 9.0, 4.0, -1.0, 100.0];

        for window_size in 1..=6 {
            let mut filter = MovingAverage::new(window_size);

            for n in 1..=samples.len() {
                filter.observe(samples[n - 1]);

                let start = n.saturating_sub(window_size);
                let expected = mean(&samples[start..n]);

                assert!((filter.value() - expected).abs() < 1e-12);
                assert_eq!(filter.len(), n.min(window_size));
            }
        }
    }

    #[test]
    fn test_empty_and_reset() {
        let mut filter = MovingAverage::new(3);
        assert_eq!(filter.value(), 0.0);

        filter.observe(10.0);
        filter.observe(20.0);
        assert_eq!(filter.value(), 15.0);

        filter.reset();
        assert!(filter.is_empty());
        assert_eq!(filter.value(), 0.0);

        // Stale samples don't leak into the new window
        filter.observe(-4.0);
        assert_eq!(filter.value(), -4.0);
    }

    #[test]
    fn test_zero_window() {
        let mut filter = MovingAverage::new(0);
        assert_eq!(filter.window_size(), 1);

        filter.observe(1.0);
        filter.observe(2.0);
        assert_eq!(filter.value(), 2.0);
    }
}
