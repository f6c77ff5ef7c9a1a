//! Mutation operators
//!
//! This module provides per-gene mutation operators for byte genomes. Each
//! gene is visited once and mutated with probability `rate`.

use rand::Rng;

use crate::genome::Encoding;
use crate::operators::traits::MutationOperator;
use crate::population::Individual;

/// Bit-flip mutation
///
/// A zero gene becomes one; any other value becomes zero.
#[derive(Clone, Debug, Default)]
pub struct BitFlipMutation;

impl BitFlipMutation {
    /// Create a new bit-flip mutation
    pub fn new() -> Self {
        Self
    }
}

impl MutationOperator for BitFlipMutation {
    fn mutate<R: Rng>(&self, offspring: &mut [Individual], rate: f64, rng: &mut R) {
        for individual in offspring.iter_mut() {
            for gene in individual.genotype.genes_mut() {
                if rng.gen::<f64>() < rate {
                    *gene = u8::from(*gene == 0);
                }
            }
        }
    }
}

/// Swap mutation
///
/// A selected gene trades places with a uniformly chosen gene of the same
/// genome (possibly itself). Keeps permutations valid.
#[derive(Clone, Debug, Default)]
pub struct SwapMutation;

impl SwapMutation {
    /// Create a new swap mutation
    pub fn new() -> Self {
        Self
    }
}

impl MutationOperator for SwapMutation {
    fn mutate<R: Rng>(&self, offspring: &mut [Individual], rate: f64, rng: &mut R) {
        for individual in offspring.iter_mut() {
            let genes = individual.genotype.genes_mut();
            let len = genes.len();
            for i in 0..len {
                if rng.gen::<f64>() < rate {
                    genes.swap(i, rng.gen_range(0..len));
                }
            }
        }
    }
}

/// Random-reset mutation
///
/// Replaces a selected gene with a fresh random value valid for the
/// encoding: a random bit for binary genomes, a random byte for integer and
/// real genomes. Permutation genomes are left alone.
#[derive(Clone, Debug, Default)]
pub struct RandomResetMutation;

impl RandomResetMutation {
    /// Create a new random-reset mutation
    pub fn new() -> Self {
        Self
    }
}

impl MutationOperator for RandomResetMutation {
    fn mutate<R: Rng>(&self, offspring: &mut [Individual], rate: f64, rng: &mut R) {
        for individual in offspring.iter_mut() {
            let encoding = individual.genotype.encoding();
            if encoding == Encoding::Permutation {
                continue;
            }
            for gene in individual.genotype.genes_mut() {
                if rng.gen::<f64>() < rate {
                    *gene = match encoding {
                        Encoding::Binary => rng.gen_range(0..=1),
                        _ => rng.gen(),
                    };
                }
            }
        }
    }
}
