//! Glucose smoothing
//!
//! Simple moving average over the last `W` raw readings. Not an exponential
//! filter: every value in the window has equal weight and drops out entirely
//! once `W` newer values have arrived.
//!
//! During warm-up (fewer than `W` readings) the mean is over however many
//! readings exist, so the first output equals the first input.

/// Rolling mean over a fixed window of raw glucose values
#[derive(Debug, Clone)]
pub struct SmoothingFilter<const W: usize> {
    values: [f32; W],
    /// Next slot to write
    index: usize,
    /// Values held, saturates at W
    count: usize,
}

impl<const W: usize> SmoothingFilter<W> {
    const NON_ZERO: () = assert!(W > 0, "Smoothing window must be non-zero");

    /// Create an empty filter
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_ZERO;

        Self {
            values: [0.0; W],
            index: 0,
            count: 0,
        }
    }

    /// Add a raw reading and return the mean of the window
    pub fn update(&mut self, raw_value: f32) -> f32 {
        self.values[self.index] = raw_value;
        self.index = (self.index + 1) % W;
        if self.count < W {
            self.count += 1;
        }

        self.mean()
    }

    /// Mean of the values currently held, `None` before the first update
    pub fn current(&self) -> Option<f32> {
        if self.count == 0 {
            None
        } else {
            Some(self.mean())
        }
    }

    /// Number of values currently held
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if no values have been added
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Check if the window is full
    pub fn is_warm(&self) -> bool {
        self.count == W
    }

    fn mean(&self) -> f32 {
        // While warming up the filled slots are exactly 0..count
        let sum: f32 = self.values[..self.count].iter().sum();
        sum / self.count as f32
    }
}

impl<const W: usize> Default for SmoothingFilter<W> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_output_equals_first_input() {
        let mut filter = SmoothingFilter::<3>::new();
        assert_eq!(filter.current(), None);
        assert_eq!(filter.update(50.0), 50.0);
    }

    #[test]
    fn warm_up_averages_available_samples() {
        let mut filter = SmoothingFilter::<3>::new();
        filter.update(90.0);
        assert_eq!(filter.update(110.0), 100.0);
        assert!(!filter.is_warm());
        assert_eq!(filter.update(130.0), 110.0);
        assert!(filter.is_warm());
    }

    #[test]
    fn oldest_value_evicted() {
        let mut filter = SmoothingFilter::<3>::new();
        for value in [100.0, 100.0, 100.0] {
            filter.update(value);
        }

        // 100 drops out, window is [100, 100, 160]
        assert_eq!(filter.update(160.0), 120.0);
        // window is [100, 160, 40]
        assert_eq!(filter.update(40.0), 100.0);
        assert_eq!(filter.len(), 3);
    }

    proptest! {
        #[test]
        fn output_is_mean_of_last_w(values in prop::collection::vec(20.0f32..600.0, 1..30)) {
            let mut filter = SmoothingFilter::<5>::new();
            let mut last = 0.0;
            for &value in &values {
                last = filter.update(value);
            }

            let tail = &values[values.len().saturating_sub(5)..];
            let expected = tail.iter().sum::<f32>() / tail.len() as f32;
            prop_assert!((last - expected).abs() < 1e-3);
        }
    }
}
