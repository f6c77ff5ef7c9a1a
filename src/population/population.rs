//! Population type
//!
//! This module provides the Population container and its fitness statistics.

use serde::{Deserialize, Serialize};

use crate::error::{EvoResult, EvolutionError};
use crate::population::individual::Individual;

/// Fitness statistics snapshot of a population
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Highest fitness
    pub best_fitness: f64,
    /// Lowest fitness
    pub worst_fitness: f64,
    /// Arithmetic mean fitness
    pub average_fitness: f64,
    /// Population standard deviation of fitness
    pub diversity: f64,
}

impl Statistics {
    /// Compute statistics over a set of fitness values
    ///
    /// Returns `None` for an empty set.
    pub fn from_fitnesses(fitnesses: &[f64]) -> Option<Self> {
        let (&first, rest) = fitnesses.split_first()?;

        let (best, worst, total) = rest.iter().fold(
            (first, first, first),
            |(best, worst, total), &f| (best.max(f), worst.min(f), total + f),
        );
        let n = fitnesses.len() as f64;
        let average = total / n;
        let variance = fitnesses
            .iter()
            .map(|f| (f - average).powi(2))
            .sum::<f64>()
            / n;

        Some(Self {
            best_fitness: best,
            worst_fitness: worst,
            average_fitness: average,
            diversity: variance.sqrt(),
        })
    }
}

/// A population of individuals
///
/// `statistics` reflects the individuals as of the last call to
/// [`Population::calculate_statistics`]; anything that replaces individuals
/// must recompute it.
#[derive(Clone, Debug, Default)]
pub struct Population {
    individuals: Vec<Individual>,
    statistics: Statistics,
}

impl Population {
    /// Create an empty population
    pub fn new() -> Self {
        Self::default()
    }

    /// Build `size` individuals with the given initializer
    pub fn generate<I>(size: usize, mut init: I) -> EvoResult<Self>
    where
        I: FnMut() -> Individual,
    {
        if size == 0 {
            return Err(EvolutionError::EmptyPopulation);
        }
        let individuals = (0..size).map(|_| init()).collect();
        Ok(Self::from_individuals(individuals))
    }

    /// Create a population from a vector of individuals
    ///
    /// Statistics are computed immediately.
    pub fn from_individuals(individuals: Vec<Individual>) -> Self {
        let mut population = Self {
            individuals,
            statistics: Statistics::default(),
        };
        population.calculate_statistics();
        population
    }

    /// Latest statistics snapshot
    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Recompute statistics over the evaluated individuals
    ///
    /// A no-op when no individual has been evaluated.
    pub fn calculate_statistics(&mut self) {
        let fitnesses: Vec<f64> = self.individuals.iter().filter_map(|i| i.fitness()).collect();
        if let Some(stats) = Statistics::from_fitnesses(&fitnesses) {
            self.statistics = stats;
        }
    }

    /// Get the population size
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Check if the population is empty
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Get an individual by index
    pub fn get(&self, index: usize) -> Option<&Individual> {
        self.individuals.get(index)
    }

    /// Get an iterator over the individuals
    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.individuals.iter()
    }

    /// Get the underlying individuals
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Mutable access to the individuals
    ///
    /// The caller must call `calculate_statistics` afterwards.
    pub fn individuals_mut(&mut self) -> &mut [Individual] {
        &mut self.individuals
    }

    /// Swap in a new generation and return the old one
    ///
    /// Statistics are left untouched.
    pub fn replace_individuals(&mut self, individuals: Vec<Individual>) -> Vec<Individual> {
        std::mem::replace(&mut self.individuals, individuals)
    }

    /// Replace the individual at `index`; out-of-range indices are ignored
    pub fn replace(&mut self, index: usize, individual: Individual) {
        if let Some(slot) = self.individuals.get_mut(index) {
            *slot = individual;
        }
    }

    /// Get the best individual (by fitness)
    pub fn best(&self) -> Option<&Individual> {
        let mut best: Option<&Individual> = None;
        for individual in self.individuals.iter().filter(|i| i.is_evaluated()) {
            if best.map_or(true, |b| individual.is_better_than(b)) {
                best = Some(individual);
            }
        }
        best
    }

    /// Get the worst individual (by fitness)
    pub fn worst(&self) -> Option<&Individual> {
        let mut worst: Option<&Individual> = None;
        for individual in self.individuals.iter().filter(|i| i.is_evaluated()) {
            if worst.map_or(true, |w| w.is_better_than(individual)) {
                worst = Some(individual);
            }
        }
        worst
    }

    /// Sort the population by fitness (best first, stable)
    pub fn sort_by_fitness(&mut self) {
        self.individuals.sort_by(|a, b| b.cmp_fitness(a));
    }

    /// Deep copies of the `count` fittest individuals
    ///
    /// Sorts the population in place.
    pub fn top(&mut self, count: usize) -> Vec<Individual> {
        self.sort_by_fitness();
        self.individuals.iter().take(count).cloned().collect()
    }

    /// Count the number of evaluated individuals
    pub fn count_evaluated(&self) -> usize {
        self.individuals.iter().filter(|i| i.is_evaluated()).count()
    }
}

impl std::ops::Index<usize> for Population {
    type Output = Individual;

    fn index(&self, index: usize) -> &Self::Output {
        &self.individuals[index]
    }
}

impl FromIterator<Individual> for Population {
    fn from_iter<I: IntoIterator<Item = Individual>>(iter: I) -> Self {
        Self::from_individuals(iter.into_iter().collect())
    }
}
