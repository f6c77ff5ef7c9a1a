//! Generation, time and fitness based conditions

use std::time::Duration;

use crate::termination::{EngineState, TerminationCondition};

/// Terminate once the history holds `n` snapshots
///
/// The history includes the initial population, so `GenerationCount(n)`
/// stops after `n - 1` evolved generations.
#[derive(Clone, Debug)]
pub struct GenerationCount(pub usize);

impl GenerationCount {
    /// Create a new generation count condition
    pub fn new(max: usize) -> Self {
        Self(max)
    }
}

impl TerminationCondition for GenerationCount {
    fn should_terminate(&mut self, state: &EngineState<'_>) -> bool {
        state.history.len() >= self.0
    }

    fn reason(&self) -> &'static str {
        "Maximum generations reached"
    }
}

/// Terminate once the run has been going for at least the given duration
///
/// Checked at generation boundaries only.
#[derive(Clone, Debug)]
pub struct TimeLimit(pub Duration);

impl TimeLimit {
    /// Create a new time limit condition
    pub fn new(limit: Duration) -> Self {
        Self(limit)
    }
}

impl TerminationCondition for TimeLimit {
    fn should_terminate(&mut self, state: &EngineState<'_>) -> bool {
        state.elapsed >= self.0
    }

    fn reason(&self) -> &'static str {
        "Time limit reached"
    }
}

/// Terminate when the current best fitness reaches a threshold
#[derive(Clone, Debug)]
pub struct FitnessThreshold(pub f64);

impl FitnessThreshold {
    /// Create a new fitness threshold condition
    pub fn new(threshold: f64) -> Self {
        Self(threshold)
    }
}

impl TerminationCondition for FitnessThreshold {
    fn should_terminate(&mut self, state: &EngineState<'_>) -> bool {
        state.statistics().best_fitness >= self.0
    }

    fn reason(&self) -> &'static str {
        "Fitness threshold reached"
    }
}

/// Terminate when best fitness moved less than `epsilon` over the last
/// `generations` generations
#[derive(Clone, Debug)]
pub struct Convergence {
    /// Look-back window in generations
    pub generations: usize,
    /// Minimum absolute change that counts as progress
    pub epsilon: f64,
}

impl Convergence {
    /// Create a new convergence condition
    pub fn new(generations: usize, epsilon: f64) -> Self {
        Self {
            generations,
            epsilon,
        }
    }
}

impl TerminationCondition for Convergence {
    fn should_terminate(&mut self, state: &EngineState<'_>) -> bool {
        let history = state.history.as_slice();
        if history.len() <= self.generations {
            return false;
        }

        let current = history[history.len() - 1].best_fitness;
        let past = history[history.len() - 1 - self.generations].best_fitness;
        (current - past).abs() < self.epsilon
    }

    fn reason(&self) -> &'static str {
        "Fitness converged"
    }
}

/// Terminate after `generations` consecutive checks without a new best fitness
#[derive(Clone, Debug)]
pub struct FitnessStagnation {
    generations: usize,
    best: Option<f64>,
    stagnant: usize,
}

impl FitnessStagnation {
    /// Create a new fitness stagnation condition
    ///
    /// Windows below one are treated as one.
    pub fn new(generations: usize) -> Self {
        Self {
            generations: generations.max(1),
            best: None,
            stagnant: 0,
        }
    }

    /// Consecutive checks without improvement so far
    pub fn stagnant_generations(&self) -> usize {
        self.stagnant
    }
}

impl TerminationCondition for FitnessStagnation {
    fn should_terminate(&mut self, state: &EngineState<'_>) -> bool {
        let current = state.statistics().best_fitness;
        match self.best {
            Some(best) if current <= best => self.stagnant += 1,
            _ => {
                self.best = Some(current);
                self.stagnant = 0;
            }
        }
        self.stagnant >= self.generations
    }

    fn reason(&self) -> &'static str {
        "Fitness stagnation detected"
    }
}

/// Terminate when the relative improvement of best fitness between two
/// consecutive checks drops below `threshold`
///
/// The first check only records a baseline. From a baseline of zero, any
/// increase counts as sufficient improvement.
#[derive(Clone, Debug)]
pub struct FitnessImprovement {
    threshold: f64,
    previous: Option<f64>,
}

impl FitnessImprovement {
    /// Create a new fitness improvement condition
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            previous: None,
        }
    }
}

impl TerminationCondition for FitnessImprovement {
    fn should_terminate(&mut self, state: &EngineState<'_>) -> bool {
        let current = state.statistics().best_fitness;
        let Some(previous) = self.previous.replace(current) else {
            return false;
        };

        if previous == 0.0 {
            return current <= previous;
        }
        (current - previous) / previous.abs() < self.threshold
    }

    fn reason(&self) -> &'static str {
        "Fitness improvement below threshold"
    }
}
