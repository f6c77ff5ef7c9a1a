//! Adaptive control mechanisms
//!
//! Rates adapt to feedback from the search process: population diversity
//! steers the balance between mutation (exploration) and crossover
//! (exploitation).

use serde::{Deserialize, Serialize};

/// Diversity-driven control of mutation and crossover rates
///
/// With `d = min(diversity / diversity_scale, 1)`:
/// - mutation = `base_mutation_rate * (2 - d)`
/// - crossover = `base_crossover_rate * d`
///
/// each clamped into its bounds. Low diversity raises mutation and lowers
/// crossover; high diversity does the opposite.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveRateControl {
    /// Mutation rate at full diversity is this value, doubling at zero diversity
    pub base_mutation_rate: f64,
    /// Crossover rate at full diversity
    pub base_crossover_rate: f64,
    /// Diversity treated as "full"
    pub diversity_scale: f64,
    /// Inclusive (min, max) for the mutation rate
    pub mutation_bounds: (f64, f64),
    /// Inclusive (min, max) for the crossover rate
    pub crossover_bounds: (f64, f64),
}

impl Default for AdaptiveRateControl {
    fn default() -> Self {
        Self {
            base_mutation_rate: 0.1,
            base_crossover_rate: 0.8,
            diversity_scale: 1.0,
            mutation_bounds: (0.01, 0.5),
            crossover_bounds: (0.1, 0.95),
        }
    }
}

impl AdaptiveRateControl {
    /// Create a controller with the default constants
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base rates
    pub fn with_base_rates(mut self, mutation: f64, crossover: f64) -> Self {
        self.base_mutation_rate = mutation;
        self.base_crossover_rate = crossover;
        self
    }

    /// Set the diversity treated as full
    pub fn with_diversity_scale(mut self, scale: f64) -> Self {
        self.diversity_scale = scale;
        self
    }

    /// Set the rate bounds
    pub fn with_bounds(mut self, mutation: (f64, f64), crossover: (f64, f64)) -> Self {
        self.mutation_bounds = mutation;
        self.crossover_bounds = crossover;
        self
    }

    /// Diversity mapped into `[0, 1]`
    ///
    /// A non-positive scale leaves diversity unscaled; NaN maps to zero.
    pub fn normalized_diversity(&self, diversity: f64) -> f64 {
        let scaled = if self.diversity_scale > 0.0 {
            diversity / self.diversity_scale
        } else {
            diversity
        };
        if scaled.is_nan() {
            0.0
        } else {
            scaled.clamp(0.0, 1.0)
        }
    }

    /// New `(mutation_rate, crossover_rate)` for the given diversity
    pub fn adapt(&self, diversity: f64) -> (f64, f64) {
        let d = self.normalized_diversity(diversity);
        let mutation = clamp_to(self.base_mutation_rate * (2.0 - d), self.mutation_bounds);
        let crossover = clamp_to(self.base_crossover_rate * d, self.crossover_bounds);
        (mutation, crossover)
    }
}

/// Clamp without panicking on inverted bounds
fn clamp_to(value: f64, (lo, hi): (f64, f64)) -> f64 {
    value.max(lo.min(hi)).min(hi.max(lo))
}
