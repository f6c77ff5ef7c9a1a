//! Fitness traits
//!
//! This module defines the evaluator contract consumed by the engine.

use crate::error::EvaluationError;
use crate::genome::Genotype;
use crate::population::Phenotype;

/// Fitness assigned to individuals whose evaluation failed
///
/// Higher fitness is better, so the minimum representable value can never
/// displace a legitimately evaluated individual.
pub const SENTINEL_FITNESS: f64 = f64::MIN;

/// Fitness evaluation trait
///
/// Invoked once per individual per generation, possibly from several worker
/// threads at once.
pub trait Evaluator: Send + Sync {
    /// Evaluate a genotype (higher fitness = better)
    fn evaluate(&self, genotype: &Genotype) -> Result<Phenotype, EvaluationError>;
}

impl<F> Evaluator for F
where
    F: Fn(&Genotype) -> Result<Phenotype, EvaluationError> + Send + Sync,
{
    fn evaluate(&self, genotype: &Genotype) -> Result<Phenotype, EvaluationError> {
        self(genotype)
    }
}

/// A simple function wrapper for infallible scalar fitness
pub struct FnFitness<F>
where
    F: Fn(&Genotype) -> f64,
{
    f: F,
}

impl<F> FnFitness<F>
where
    F: Fn(&Genotype) -> f64,
{
    /// Create a new function-based evaluator
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Evaluator for FnFitness<F>
where
    F: Fn(&Genotype) -> f64 + Send + Sync,
{
    fn evaluate(&self, genotype: &Genotype) -> Result<Phenotype, EvaluationError> {
        Ok(Phenotype::new((self.f)(genotype)))
    }
}

/// A wrapper to negate a fitness function (for minimization problems)
pub struct MinimizeFitness<E> {
    inner: E,
}

impl<E> MinimizeFitness<E> {
    /// Create a minimization wrapper around an evaluator
    pub fn new(evaluator: E) -> Self {
        Self { inner: evaluator }
    }
}

impl<E: Evaluator> Evaluator for MinimizeFitness<E> {
    fn evaluate(&self, genotype: &Genotype) -> Result<Phenotype, EvaluationError> {
        let mut phenotype = self.inner.evaluate(genotype)?;
        phenotype.fitness = -phenotype.fitness;
        Ok(phenotype)
    }
}
