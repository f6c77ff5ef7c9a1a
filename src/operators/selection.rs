//! Selection operators
//!
//! This module provides various selection operators for genetic algorithms.
//! Every operator returns a mating pool as long as its input; an empty
//! population yields an empty pool.

use rand::Rng;
use rand_distr::{Distribution, WeightedIndex};

use crate::fitness::SENTINEL_FITNESS;
use crate::operators::traits::SelectionOperator;
use crate::population::Individual;

fn fitness_of(individual: &Individual) -> f64 {
    individual.fitness().unwrap_or(SENTINEL_FITNESS)
}

/// Fitness-proportionate weights, shifted so the weakest scored individual
/// keeps a non-zero share. Failed or unscored individuals get weight 0 and
/// take no part in the shift.
fn proportional_weights(population: &[Individual], offset: f64) -> Vec<f64> {
    let fitnesses: Vec<f64> = population.iter().map(fitness_of).collect();
    let min_fitness = fitnesses
        .iter()
        .copied()
        .filter(|&f| f > SENTINEL_FITNESS)
        .fold(f64::INFINITY, f64::min);
    let shift = if min_fitness <= 0.0 {
        -min_fitness + offset + 1.0
    } else {
        offset
    };

    fitnesses
        .iter()
        .map(|&f| if f > SENTINEL_FITNESS { f + shift } else { 0.0 })
        .collect()
}

fn usable_total(weights: &[f64]) -> Option<f64> {
    let total: f64 = weights.iter().sum();
    (total.is_finite() && total > 0.0).then_some(total)
}

/// Draw `count` individuals from `population` with the given weights,
/// falling back to uniform draws when the weights are unusable.
fn weighted_pool<R: Rng>(
    population: &[Individual],
    weights: &[f64],
    count: usize,
    rng: &mut R,
) -> Vec<Individual> {
    let dist = usable_total(weights).and_then(|_| WeightedIndex::new(weights).ok());

    match dist {
        Some(dist) => (0..count)
            .map(|_| population[dist.sample(rng)].clone())
            .collect(),
        None => (0..count)
            .map(|_| population[rng.gen_range(0..population.len())].clone())
            .collect(),
    }
}

/// Tournament selection operator
///
/// Each slot is filled by the best of `tournament_size` uniform draws (with
/// replacement).
#[derive(Clone, Debug)]
pub struct TournamentSelection {
    /// Tournament size (number of individuals competing)
    pub tournament_size: usize,
}

impl TournamentSelection {
    /// Create a new tournament selection with the given size
    ///
    /// Sizes below one are treated as one.
    pub fn new(tournament_size: usize) -> Self {
        Self {
            tournament_size: tournament_size.max(1),
        }
    }

    /// Create binary tournament selection (size = 2)
    pub fn binary() -> Self {
        Self::new(2)
    }
}

impl SelectionOperator for TournamentSelection {
    fn select<R: Rng>(&self, population: &[Individual], rng: &mut R) -> Vec<Individual> {
        if population.is_empty() {
            return Vec::new();
        }

        (0..population.len())
            .map(|_| {
                let mut best = &population[rng.gen_range(0..population.len())];
                for _ in 1..self.tournament_size {
                    let contender = &population[rng.gen_range(0..population.len())];
                    if fitness_of(contender) > fitness_of(best) {
                        best = contender;
                    }
                }
                best.clone()
            })
            .collect()
    }
}

/// Roulette wheel selection (fitness proportionate)
///
/// Non-positive fitness values are shifted so that every scored individual
/// keeps a non-zero chance; individuals holding the failure sentinel are
/// never drawn unless nothing else is left.
#[derive(Clone, Debug, Default)]
pub struct RouletteSelection {
    /// Extra offset added to every weight
    offset: f64,
}

impl RouletteSelection {
    /// Create a new roulette selection
    pub fn new() -> Self {
        Self { offset: 0.0 }
    }

    /// Create with a fitness offset
    pub fn with_offset(offset: f64) -> Self {
        Self { offset }
    }
}

impl SelectionOperator for RouletteSelection {
    fn select<R: Rng>(&self, population: &[Individual], rng: &mut R) -> Vec<Individual> {
        if population.is_empty() {
            return Vec::new();
        }

        let weights = proportional_weights(population, self.offset);
        weighted_pool(population, &weights, population.len(), rng)
    }
}

/// Stochastic universal sampling
///
/// Fitness-proportionate like roulette, but a single spin places `n` evenly
/// spaced pointers over the wheel, so the pool tracks the expected shares
/// closely.
#[derive(Clone, Debug, Default)]
pub struct StochasticUniversalSampling {
    offset: f64,
}

impl StochasticUniversalSampling {
    pub fn new() -> Self {
        Self { offset: 0.0 }
    }

    /// Create with a fitness offset
    pub fn with_offset(offset: f64) -> Self {
        Self { offset }
    }
}

impl SelectionOperator for StochasticUniversalSampling {
    fn select<R: Rng>(&self, population: &[Individual], rng: &mut R) -> Vec<Individual> {
        if population.is_empty() {
            return Vec::new();
        }

        let weights = proportional_weights(population, self.offset);
        let Some(total) = usable_total(&weights) else {
            return weighted_pool(population, &weights, population.len(), rng);
        };

        let n = population.len();
        let distance = total / n as f64;
        let start = rng.gen::<f64>() * distance;

        let mut selected = Vec::with_capacity(n);
        let mut index = 0;
        let mut cumulative = weights[0];
        for i in 0..n {
            let pointer = start + i as f64 * distance;
            while cumulative <= pointer && index + 1 < n {
                index += 1;
                cumulative += weights[index];
            }
            selected.push(population[index].clone());
        }
        selected
    }
}

/// Boltzmann selection
///
/// Draws with probability proportional to `exp(fitness / temperature)`.
/// High temperatures flatten the distribution, low temperatures push it
/// towards the best individual.
#[derive(Clone, Debug)]
pub struct BoltzmannSelection {
    /// Selection temperature, strictly positive
    pub temperature: f64,
}

impl BoltzmannSelection {
    /// Create a new Boltzmann selection
    ///
    /// Non-positive or NaN temperatures are raised to the smallest positive value.
    pub fn new(temperature: f64) -> Self {
        let temperature = if temperature > 0.0 {
            temperature
        } else {
            f64::MIN_POSITIVE
        };
        Self { temperature }
    }
}

impl SelectionOperator for BoltzmannSelection {
    fn select<R: Rng>(&self, population: &[Individual], rng: &mut R) -> Vec<Individual> {
        if population.is_empty() {
            return Vec::new();
        }

        let fitnesses: Vec<f64> = population.iter().map(fitness_of).collect();
        let max_fitness = fitnesses
            .iter()
            .copied()
            .filter(|&f| f > SENTINEL_FITNESS)
            .fold(f64::NEG_INFINITY, f64::max);

        // Shifting by the maximum keeps exp() from overflowing
        let weights: Vec<f64> = fitnesses
            .iter()
            .map(|&f| {
                if f > SENTINEL_FITNESS {
                    ((f - max_fitness) / self.temperature).exp()
                } else {
                    0.0
                }
            })
            .collect();

        weighted_pool(population, &weights, population.len(), rng)
    }
}

/// Linear rank selection
///
/// The worst individual gets weight 1, the best weight `n`.
#[derive(Clone, Debug, Default)]
pub struct RankSelection;

impl RankSelection {
    /// Create a new rank selection
    pub fn new() -> Self {
        Self
    }
}

impl SelectionOperator for RankSelection {
    fn select<R: Rng>(&self, population: &[Individual], rng: &mut R) -> Vec<Individual> {
        if population.is_empty() {
            return Vec::new();
        }

        let mut order: Vec<usize> = (0..population.len()).collect();
        order.sort_by(|&a, &b| population[a].cmp_fitness(&population[b]));

        let mut weights = vec![0.0; population.len()];
        for (rank, &index) in order.iter().enumerate() {
            weights[index] = (rank + 1) as f64;
        }

        weighted_pool(population, &weights, population.len(), rng)
    }
}

/// Truncation selection
///
/// Draws uniformly from the best `fraction` of the population.
#[derive(Clone, Debug)]
pub struct TruncationSelection {
    /// Fraction of the population eligible for mating, in (0, 1]
    pub fraction: f64,
}

impl TruncationSelection {
    /// Create a new truncation selection
    pub fn new(fraction: f64) -> Self {
        Self {
            fraction: fraction.clamp(f64::EPSILON, 1.0),
        }
    }
}

impl SelectionOperator for TruncationSelection {
    fn select<R: Rng>(&self, population: &[Individual], rng: &mut R) -> Vec<Individual> {
        if population.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<&Individual> = population.iter().collect();
        ranked.sort_by(|a, b| b.cmp_fitness(a));
        let cutoff = ((population.len() as f64 * self.fraction).ceil() as usize)
            .clamp(1, population.len());

        (0..population.len())
            .map(|_| ranked[rng.gen_range(0..cutoff)].clone())
            .collect()
    }
}
