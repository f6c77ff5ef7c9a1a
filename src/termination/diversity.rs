//! Diversity based conditions
//!
//! Diversity is the standard deviation of fitness in the current population.

use crate::termination::{EngineState, TerminationCondition};

/// Terminate when diversity drops below a threshold
///
/// The threshold is clamped into `[0, 1]`.
#[derive(Clone, Debug)]
pub struct DiversityThreshold {
    threshold: f64,
}

impl DiversityThreshold {
    /// Create a new diversity threshold condition
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    /// Effective threshold after clamping
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl TerminationCondition for DiversityThreshold {
    fn should_terminate(&mut self, state: &EngineState<'_>) -> bool {
        state.statistics().diversity < self.threshold
    }

    fn reason(&self) -> &'static str {
        "Diversity threshold reached"
    }
}

/// Terminate after `generations` consecutive checks without a new peak
/// diversity
#[derive(Clone, Debug)]
pub struct DiversityStagnation {
    generations: usize,
    peak: f64,
    stagnant: usize,
}

impl DiversityStagnation {
    /// Create a new diversity stagnation condition
    ///
    /// Windows below one are treated as one.
    pub fn new(generations: usize) -> Self {
        Self {
            generations: generations.max(1),
            peak: 0.0,
            stagnant: 0,
        }
    }
}

impl TerminationCondition for DiversityStagnation {
    fn should_terminate(&mut self, state: &EngineState<'_>) -> bool {
        let current = state.statistics().diversity;
        if current > self.peak {
            self.peak = current;
            self.stagnant = 0;
        } else {
            self.stagnant += 1;
        }
        self.stagnant >= self.generations
    }

    fn reason(&self) -> &'static str {
        "Diversity stagnation detected"
    }
}

/// Terminate when the relative change in diversity between two consecutive
/// checks drops below `threshold`
///
/// The first check only records a baseline. From a baseline of zero, the run
/// continues only if diversity rose.
#[derive(Clone, Debug)]
pub struct DiversityImprovement {
    threshold: f64,
    previous: Option<f64>,
}

impl DiversityImprovement {
    /// Create a new diversity improvement condition
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            previous: None,
        }
    }
}

impl TerminationCondition for DiversityImprovement {
    fn should_terminate(&mut self, state: &EngineState<'_>) -> bool {
        let current = state.statistics().diversity;
        let Some(previous) = self.previous.replace(current) else {
            return false;
        };

        if previous == 0.0 {
            return current <= 0.0;
        }
        (current - previous) / previous < self.threshold
    }

    fn reason(&self) -> &'static str {
        "Diversity improvement below threshold"
    }
}
