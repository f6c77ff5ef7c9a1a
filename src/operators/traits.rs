//! Operator traits
//!
//! Selection, crossover and mutation are stateless strategies supplied by the
//! caller. The engine only sequences them and passes its current rates in
//! explicitly.

use rand::Rng;

use crate::population::Individual;

/// Selection operator trait
///
/// Picks a mating pool from the current population.
pub trait SelectionOperator: Send + Sync {
    /// Select a mating pool of the same length as `population`
    ///
    /// Selected individuals are copies; the population itself is left untouched.
    fn select<R: Rng>(&self, population: &[Individual], rng: &mut R) -> Vec<Individual>;
}

/// Crossover operator trait
///
/// Recombines the mating pool two at a time.
pub trait CrossoverOperator: Send + Sync {
    /// Produce offspring of the same length as `parents`
    ///
    /// Each pair `(2i, 2i + 1)` is recombined with probability `rate` and
    /// otherwise passes through unchanged.
    fn crossover<R: Rng>(&self, parents: Vec<Individual>, rate: f64, rng: &mut R)
        -> Vec<Individual>;
}

/// Mutation operator trait
///
/// Changes genomes in place. Phenotypes are left stale; the following
/// evaluation pass overwrites them.
pub trait MutationOperator: Send + Sync {
    /// Mutate each gene with probability `rate`
    fn mutate<R: Rng>(&self, offspring: &mut [Individual], rate: f64, rng: &mut R);
}
