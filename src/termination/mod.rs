//! Termination criteria
//!
//! This module provides the termination predicate evaluated by the engine at
//! every generation boundary: atomic conditions over the run state and
//! `CompositeTermination` for AND/OR combinations.

pub mod composite;
pub mod conditions;
pub mod diversity;

use std::time::Duration;

use crate::diagnostics::History;
use crate::population::{Individual, Population, Statistics};

pub use composite::{CompositeOperator, CompositeTermination};
pub use conditions::{
    Convergence, FitnessImprovement, FitnessStagnation, FitnessThreshold, GenerationCount,
    TimeLimit,
};
pub use diversity::{DiversityImprovement, DiversityStagnation, DiversityThreshold};

/// Read-only snapshot of a running engine, handed to termination conditions
#[derive(Clone, Copy, Debug)]
pub struct EngineState<'a> {
    /// Current population with up-to-date statistics
    pub population: &'a Population,
    /// Statistics of every generation so far, initial population included
    pub history: &'a History,
    /// Wall-clock time since the run started
    pub elapsed: Duration,
    /// Generations completed in this run
    pub generation: usize,
    /// Best individual seen so far
    pub best: Option<&'a Individual>,
}

impl<'a> EngineState<'a> {
    /// Statistics of the current population
    pub fn statistics(&self) -> &'a Statistics {
        self.population.statistics()
    }
}

/// Termination condition trait
///
/// Called once per generation, in generation order. Conditions may keep
/// private counters, so an instance belongs to a single engine.
pub trait TerminationCondition: Send {
    /// Check if evolution should terminate
    fn should_terminate(&mut self, state: &EngineState<'_>) -> bool;

    /// Get a description of why termination occurred
    fn reason(&self) -> &'static str;
}

impl TerminationCondition for Box<dyn TerminationCondition> {
    fn should_terminate(&mut self, state: &EngineState<'_>) -> bool {
        (**self).should_terminate(state)
    }

    fn reason(&self) -> &'static str {
        (**self).reason()
    }
}

/// Never terminate; the generation cap governs
#[derive(Clone, Debug, Default)]
pub struct NeverTerminate;

impl TerminationCondition for NeverTerminate {
    fn should_terminate(&mut self, _state: &EngineState<'_>) -> bool {
        false
    }

    fn reason(&self) -> &'static str {
        "Never terminates"
    }
}

pub mod prelude {
    pub use super::composite::*;
    pub use super::conditions::*;
    pub use super::diversity::*;
    pub use super::{EngineState, NeverTerminate, TerminationCondition};
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::genome::{Encoding, Genotype};

    /// Population whose statistics have the given best fitness and diversity
    ///
    /// Two individuals at `best` and `best - 2 * diversity` give a population
    /// standard deviation of exactly `diversity`.
    pub(crate) fn population_with(best: f64, diversity: f64) -> Population {
        Population::from_individuals(vec![
            Individual::with_fitness(Genotype::new(vec![1], Encoding::Binary), best),
            Individual::with_fitness(
                Genotype::new(vec![0], Encoding::Binary),
                best - 2.0 * diversity,
            ),
        ])
    }

    pub(crate) fn history_of(best_fitnesses: &[f64]) -> History {
        best_fitnesses
            .iter()
            .map(|&best| Statistics {
                best_fitness: best,
                worst_fitness: best,
                average_fitness: best,
                diversity: 0.0,
            })
            .collect::<Vec<_>>()
            .into()
    }

    pub(crate) fn state<'a>(population: &'a Population, history: &'a History) -> EngineState<'a> {
        EngineState {
            population,
            history,
            elapsed: Duration::ZERO,
            generation: history.generations_completed(),
            best: population.best(),
        }
    }
}
