//! Benchmark fitness functions
//!
//! Standard test problems over byte-encoded genotypes.

use crate::error::EvaluationError;
use crate::fitness::traits::Evaluator;
use crate::genome::Genotype;
use crate::population::Phenotype;

/// OneMax: number of set genes
#[derive(Clone, Debug, Default)]
pub struct OneMax;

impl OneMax {
    /// Create a new OneMax function
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for OneMax {
    fn evaluate(&self, genotype: &Genotype) -> Result<Phenotype, EvaluationError> {
        Ok(Phenotype::new(genotype.count_ones() as f64))
    }
}

/// LeadingOnes: number of set genes before the first zero
#[derive(Clone, Debug, Default)]
pub struct LeadingOnes;

impl LeadingOnes {
    /// Create a new LeadingOnes function
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for LeadingOnes {
    fn evaluate(&self, genotype: &Genotype) -> Result<Phenotype, EvaluationError> {
        let leading = genotype.genes().iter().take_while(|&&g| g != 0).count();
        Ok(Phenotype::new(leading as f64))
    }
}

/// Sphere function over a real-encoded genotype: -Σxᵢ²
///
/// Negated for maximization. Fails on genotypes that are not real-encoded.
#[derive(Clone, Debug, Default)]
pub struct Sphere;

impl Sphere {
    /// Create a new Sphere function
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for Sphere {
    fn evaluate(&self, genotype: &Genotype) -> Result<Phenotype, EvaluationError> {
        let mut sum = 0.0;
        for position in 0..genotype.len() {
            let x = genotype
                .real_value(position)
                .map_err(|e| EvaluationError::Failed(e.to_string()))?;
            sum += x * x;
        }
        Ok(Phenotype::new(-sum).with_feature("sum_of_squares", sum))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::Encoding;

    #[test]
    fn test_onemax() {
        let g = Genotype::new(vec![1, 1, 0, 1], Encoding::Binary);
        assert_eq!(OneMax::new().evaluate(&g).unwrap().fitness, 3.0);
    }

    #[test]
    fn test_leading_ones() {
        let g = Genotype::new(vec![1, 1, 0, 1], Encoding::Binary);
        assert_eq!(LeadingOnes::new().evaluate(&g).unwrap().fitness, 2.0);
    }

    #[test]
    fn test_sphere_optimum() {
        let g = Genotype::new(vec![0, 0], Encoding::Real)
            .with_bounds(vec![0.0, 0.0], vec![1.0, 1.0])
            .unwrap();
        let phenotype = Sphere::new().evaluate(&g).unwrap();
        assert_eq!(phenotype.fitness, 0.0);
        assert_eq!(phenotype.features["sum_of_squares"], 0.0);
    }

    #[test]
    fn test_sphere_rejects_binary() {
        let g = Genotype::new(vec![0, 1], Encoding::Binary);
        assert!(matches!(
            Sphere::new().evaluate(&g),
            Err(EvaluationError::Failed(_))
        ));
    }
}
