//! Crossover operators
//!
//! This module provides pairwise crossover operators for byte genomes.

use rand::Rng;

use crate::operators::traits::CrossoverOperator;
use crate::population::Individual;

/// Walk the mating pool two at a time and recombine each pair with
/// probability `rate`.
///
/// Pairs that are not recombined, pairs with mismatched genome lengths and an
/// unpaired trailing individual pass through unchanged.
fn crossover_pairs<R, F>(
    parents: Vec<Individual>,
    rate: f64,
    rng: &mut R,
    mut recombine: F,
) -> Vec<Individual>
where
    R: Rng,
    F: FnMut(&[u8], &[u8], &mut R) -> (Vec<u8>, Vec<u8>),
{
    let mut offspring = Vec::with_capacity(parents.len());
    let mut iter = parents.into_iter();

    while let Some(first) = iter.next() {
        let Some(second) = iter.next() else {
            offspring.push(first);
            break;
        };

        let compatible = first.genotype.len() == second.genotype.len() && !first.genotype.is_empty();
        if compatible && rng.gen::<f64>() < rate {
            let (genes1, genes2) = recombine(first.genotype.genes(), second.genotype.genes(), rng);
            offspring.push(Individual::new(first.genotype.with_genes(genes1)));
            offspring.push(Individual::new(second.genotype.with_genes(genes2)));
        } else {
            offspring.push(first);
            offspring.push(second);
        }
    }

    offspring
}

/// Single-point crossover
///
/// Children swap tails after a random cut point.
#[derive(Clone, Debug, Default)]
pub struct SinglePointCrossover;

impl SinglePointCrossover {
    /// Create a new single-point crossover
    pub fn new() -> Self {
        Self
    }
}

impl CrossoverOperator for SinglePointCrossover {
    fn crossover<R: Rng>(
        &self,
        parents: Vec<Individual>,
        rate: f64,
        rng: &mut R,
    ) -> Vec<Individual> {
        crossover_pairs(parents, rate, rng, |p1, p2, rng| {
            let point = rng.gen_range(0..p1.len());
            let mut child1 = p1[..point].to_vec();
            child1.extend_from_slice(&p2[point..]);
            let mut child2 = p2[..point].to_vec();
            child2.extend_from_slice(&p1[point..]);
            (child1, child2)
        })
    }
}

/// Uniform crossover
///
/// Each gene is swapped between the children with probability 0.5.
#[derive(Clone, Debug, Default)]
pub struct UniformCrossover;

impl UniformCrossover {
    /// Create a new uniform crossover
    pub fn new() -> Self {
        Self
    }
}

impl CrossoverOperator for UniformCrossover {
    fn crossover<R: Rng>(
        &self,
        parents: Vec<Individual>,
        rate: f64,
        rng: &mut R,
    ) -> Vec<Individual> {
        crossover_pairs(parents, rate, rng, |p1, p2, rng| {
            p1.iter()
                .zip(p2)
                .map(|(&a, &b)| if rng.gen_bool(0.5) { (a, b) } else { (b, a) })
                .unzip()
        })
    }
}
