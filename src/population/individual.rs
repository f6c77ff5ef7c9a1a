//! Individual and phenotype types
//!
//! This module provides the Individual type that pairs a genotype with its
//! evaluated phenotype.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::genome::Genotype;

/// Observable traits of an evaluated genotype
///
/// Higher fitness is better throughout the crate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Phenotype {
    /// Scalar fitness
    pub fitness: f64,
    /// Named feature values reported by the evaluator
    pub features: BTreeMap<String, f64>,
}

impl Phenotype {
    /// Create a phenotype with the given fitness and no features
    pub fn new(fitness: f64) -> Self {
        Self {
            fitness,
            features: BTreeMap::new(),
        }
    }

    /// Add a named feature
    pub fn with_feature(mut self, name: impl Into<String>, value: f64) -> Self {
        self.features.insert(name.into(), value);
        self
    }
}

/// An individual in the population
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    /// The encoded solution
    pub genotype: Genotype,
    /// Evaluation result (None until evaluated, or after the genome changed)
    pub phenotype: Option<Phenotype>,
}

impl Individual {
    /// Create an unevaluated individual
    pub fn new(genotype: Genotype) -> Self {
        Self {
            genotype,
            phenotype: None,
        }
    }

    /// Create an individual with a known phenotype
    pub fn with_phenotype(genotype: Genotype, phenotype: Phenotype) -> Self {
        Self {
            genotype,
            phenotype: Some(phenotype),
        }
    }

    /// Create an individual with a known fitness
    pub fn with_fitness(genotype: Genotype, fitness: f64) -> Self {
        Self::with_phenotype(genotype, Phenotype::new(fitness))
    }

    /// Check if this individual has been evaluated
    pub fn is_evaluated(&self) -> bool {
        self.phenotype.is_some()
    }

    /// Fitness, if evaluated
    pub fn fitness(&self) -> Option<f64> {
        self.phenotype.as_ref().map(|p| p.fitness)
    }

    /// Get a reference to the genotype
    pub fn genotype(&self) -> &Genotype {
        &self.genotype
    }

    /// Mutable genotype access
    ///
    /// Clears the phenotype, since it no longer describes the genome.
    pub fn genotype_mut(&mut self) -> &mut Genotype {
        self.phenotype = None;
        &mut self.genotype
    }

    /// Replace the phenotype
    pub fn set_phenotype(&mut self, phenotype: Phenotype) {
        self.phenotype = Some(phenotype);
    }

    /// Check if this individual is better than another
    pub fn is_better_than(&self, other: &Self) -> bool {
        match (self.fitness(), other.fitness()) {
            (Some(f1), Some(f2)) => f1 > f2,
            (Some(_), None) => true,
            _ => false,
        }
    }

    /// Compare by fitness, unevaluated individuals ranking lowest
    pub fn cmp_fitness(&self, other: &Self) -> Ordering {
        let fa = self.fitness().unwrap_or(f64::NEG_INFINITY);
        let fb = other.fitness().unwrap_or(f64::NEG_INFINITY);
        fa.partial_cmp(&fb).unwrap_or(Ordering::Equal)
    }
}

impl fmt::Display for Individual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fitness() {
            Some(fitness) => write!(f, "Individual{{Fitness: {fitness:.6}}}"),
            None => write!(f, "Individual{{Fitness: unevaluated}}"),
        }
    }
}
