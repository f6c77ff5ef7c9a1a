//! Byte-encoded genotype
//!
//! A genotype is a fixed-length sequence of bytes tagged with the encoding used
//! to interpret it. Integer and real encodings carry per-position bounds as
//! parallel arrays of the same length as the genome.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GenomeError;

/// Largest permutation a byte genome can hold
const MAX_PERMUTATION_SIZE: usize = 256;

/// Genome encoding tag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Encoding {
    /// Genes are 0 or 1
    Binary,
    /// Genes map onto an integer range
    Integer,
    /// Genes map onto a real range in 1/255 steps
    Real,
    /// Genes form a permutation of `0..len`
    Permutation,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Encoding::Binary => "Binary",
            Encoding::Integer => "Integer",
            Encoding::Real => "Real",
            Encoding::Permutation => "Permutation",
        };
        f.write_str(name)
    }
}

/// Encoded candidate solution
///
/// The genome length never changes after construction. `Clone` produces a
/// fully independent copy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Genotype {
    genome: Vec<u8>,
    encoding: Encoding,
    min_values: Vec<f64>,
    max_values: Vec<f64>,
}

impl Genotype {
    /// Create a genotype without bounds from raw genes
    pub fn new(genome: Vec<u8>, encoding: Encoding) -> Self {
        Self {
            genome,
            encoding,
            min_values: Vec::new(),
            max_values: Vec::new(),
        }
    }

    /// Attach per-position bounds
    ///
    /// Both arrays must have exactly one entry per gene.
    pub fn with_bounds(
        mut self,
        min_values: Vec<f64>,
        max_values: Vec<f64>,
    ) -> Result<Self, GenomeError> {
        if min_values.len() != self.genome.len() || max_values.len() != self.genome.len() {
            return Err(GenomeError::BoundsMismatch {
                genome: self.genome.len(),
                min: min_values.len(),
                max: max_values.len(),
            });
        }
        self.min_values = min_values;
        self.max_values = max_values;
        Ok(self)
    }

    /// All-zeros binary genotype
    pub fn binary(length: usize) -> Result<Self, GenomeError> {
        check_length(length)?;
        Ok(Self::new(vec![0; length], Encoding::Binary))
    }

    /// Binary genotype with uniformly random bits
    pub fn random_binary<R: Rng>(length: usize, rng: &mut R) -> Result<Self, GenomeError> {
        check_length(length)?;
        let genome = (0..length).map(|_| rng.gen_range(0..=1u8)).collect();
        Ok(Self::new(genome, Encoding::Binary))
    }

    /// Integer genotype with every position bounded by `[min_value, max_value]`
    ///
    /// Inverted bounds are swapped.
    pub fn integer<R: Rng>(
        length: usize,
        min_value: i64,
        max_value: i64,
        rng: &mut R,
    ) -> Result<Self, GenomeError> {
        check_length(length)?;
        let (lo, hi) = if min_value > max_value {
            (max_value, min_value)
        } else {
            (min_value, max_value)
        };
        let genome = (0..length).map(|_| rng.gen::<u8>()).collect();
        Self::new(genome, Encoding::Integer)
            .with_bounds(vec![lo as f64; length], vec![hi as f64; length])
    }

    /// Real genotype with per-position bounds
    ///
    /// Inverted bounds at a position are swapped.
    pub fn real<R: Rng>(
        length: usize,
        min_values: &[f64],
        max_values: &[f64],
        rng: &mut R,
    ) -> Result<Self, GenomeError> {
        check_length(length)?;
        if min_values.len() != length || max_values.len() != length {
            return Err(GenomeError::BoundsMismatch {
                genome: length,
                min: min_values.len(),
                max: max_values.len(),
            });
        }

        let (lo, hi): (Vec<f64>, Vec<f64>) = min_values
            .iter()
            .zip(max_values)
            .map(|(&a, &b)| if a > b { (b, a) } else { (a, b) })
            .unzip();
        let genome = (0..length)
            .map(|_| (255.0 * rng.gen::<f64>()) as u8)
            .collect();

        Self::new(genome, Encoding::Real).with_bounds(lo, hi)
    }

    /// Shuffled permutation of `0..size`
    pub fn permutation<R: Rng>(size: usize, rng: &mut R) -> Result<Self, GenomeError> {
        check_length(size)?;
        if size > MAX_PERMUTATION_SIZE {
            return Err(GenomeError::InvalidLength(size));
        }
        let mut genome: Vec<u8> = (0..size).map(|i| i as u8).collect();
        genome.shuffle(rng);
        Ok(Self::new(genome, Encoding::Permutation))
    }

    /// Raw genes
    pub fn genes(&self) -> &[u8] {
        &self.genome
    }

    /// Mutable raw genes (length is fixed)
    pub fn genes_mut(&mut self) -> &mut [u8] {
        &mut self.genome
    }

    /// Encoding tag
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Per-position lower bounds (empty when unbounded)
    pub fn min_values(&self) -> &[f64] {
        &self.min_values
    }

    /// Per-position upper bounds (empty when unbounded)
    pub fn max_values(&self) -> &[f64] {
        &self.max_values
    }

    /// Whether bounds are attached
    pub fn has_bounds(&self) -> bool {
        !self.min_values.is_empty()
    }

    /// Genome length
    pub fn len(&self) -> usize {
        self.genome.len()
    }

    /// Whether the genome has no genes
    pub fn is_empty(&self) -> bool {
        self.genome.is_empty()
    }

    /// Number of non-zero genes
    pub fn count_ones(&self) -> usize {
        self.genome.iter().filter(|&&g| g != 0).count()
    }

    /// Copy of this genotype's shape with new genes
    ///
    /// Used by crossover to build children that keep the parent's encoding
    /// and bounds.
    pub fn with_genes(&self, genes: Vec<u8>) -> Self {
        debug_assert_eq!(genes.len(), self.genome.len());
        Self {
            genome: genes,
            encoding: self.encoding,
            min_values: self.min_values.clone(),
            max_values: self.max_values.clone(),
        }
    }

    /// Binary gene at `position`
    pub fn binary_value(&self, position: usize) -> Result<u8, GenomeError> {
        self.check(Encoding::Binary, position)?;
        Ok(self.genome[position])
    }

    /// Integer decoded from the gene at `position`
    pub fn integer_value(&self, position: usize) -> Result<i64, GenomeError> {
        self.check(Encoding::Integer, position)?;
        self.check_bounds_present(position)?;
        let min = self.min_values[position] as i64;
        let max = self.max_values[position] as i64;
        let range = max - min + 1;
        Ok(min + (self.genome[position] as i64 * range) / 256)
    }

    /// Real value decoded from the gene at `position`
    pub fn real_value(&self, position: usize) -> Result<f64, GenomeError> {
        self.check(Encoding::Real, position)?;
        self.check_bounds_present(position)?;
        let normalized = self.genome[position] as f64 / 255.0;
        let min = self.min_values[position];
        Ok(min + normalized * (self.max_values[position] - min))
    }

    /// Encode `value` into the gene at `position`, clamped to its bounds
    pub fn set_real_value(&mut self, position: usize, value: f64) -> Result<(), GenomeError> {
        self.check(Encoding::Real, position)?;
        self.check_bounds_present(position)?;
        let min = self.min_values[position];
        let max = self.max_values[position];
        let span = max - min;
        let normalized = if span > 0.0 {
            (value.clamp(min, max) - min) / span
        } else {
            0.0
        };
        self.genome[position] = (normalized * 255.0) as u8;
        Ok(())
    }

    /// The permutation as indices
    pub fn permutation_indices(&self) -> Result<Vec<usize>, GenomeError> {
        if self.encoding != Encoding::Permutation {
            return Err(GenomeError::EncodingMismatch {
                expected: Encoding::Permutation,
                actual: self.encoding,
            });
        }
        Ok(self.genome.iter().map(|&g| g as usize).collect())
    }

    fn check(&self, expected: Encoding, position: usize) -> Result<(), GenomeError> {
        if self.encoding != expected {
            return Err(GenomeError::EncodingMismatch {
                expected,
                actual: self.encoding,
            });
        }
        if position >= self.genome.len() {
            return Err(GenomeError::InvalidPosition {
                position,
                length: self.genome.len(),
            });
        }
        Ok(())
    }

    fn check_bounds_present(&self, position: usize) -> Result<(), GenomeError> {
        if position >= self.min_values.len() || position >= self.max_values.len() {
            return Err(GenomeError::BoundsMismatch {
                genome: self.genome.len(),
                min: self.min_values.len(),
                max: self.max_values.len(),
            });
        }
        Ok(())
    }
}

fn check_length(length: usize) -> Result<(), GenomeError> {
    if length == 0 {
        Err(GenomeError::InvalidLength(length))
    } else {
        Ok(())
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Genotype{{Type: {}, Length: {}}}",
            self.encoding,
            self.genome.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_binary_zeros() {
        let g = Genotype::binary(8).unwrap();
        assert_eq!(g.len(), 8);
        assert_eq!(g.count_ones(), 0);
        assert_eq!(g.encoding(), Encoding::Binary);
        assert!(!g.has_bounds());
    }

    #[test]
    fn test_zero_length_rejected() {
        assert_eq!(Genotype::binary(0), Err(GenomeError::InvalidLength(0)));
        let mut rng = StdRng::seed_from_u64(1);
        assert!(Genotype::permutation(0, &mut rng).is_err());
        assert!(Genotype::permutation(257, &mut rng).is_err());
    }

    #[test]
    fn test_random_binary_is_binary() {
        let mut rng = StdRng::seed_from_u64(7);
        let g = Genotype::random_binary(64, &mut rng).unwrap();
        assert!(g.genes().iter().all(|&b| b <= 1));
    }

    #[test]
    fn test_integer_swaps_inverted_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let g = Genotype::integer(4, 10, -5, &mut rng).unwrap();
        assert_eq!(g.min_values(), &[-5.0; 4]);
        assert_eq!(g.max_values(), &[10.0; 4]);
        for i in 0..4 {
            let v = g.integer_value(i).unwrap();
            assert!((-5..=10).contains(&v));
        }
    }

    #[test]
    fn test_integer_decoding_extremes() {
        let g = Genotype::new(vec![0, 255], Encoding::Integer)
            .with_bounds(vec![0.0, 0.0], vec![9.0, 9.0])
            .unwrap();
        assert_eq!(g.integer_value(0).unwrap(), 0);
        assert_eq!(g.integer_value(1).unwrap(), 9);
    }

    #[test]
    fn test_real_roundtrip_is_quantized() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut g = Genotype::real(3, &[0.0, -1.0, 5.0], &[1.0, 1.0, 2.0], &mut rng).unwrap();
        assert_eq!(g.min_values(), &[0.0, -1.0, 2.0]);

        g.set_real_value(0, 1.0).unwrap();
        assert_relative_eq!(g.real_value(0).unwrap(), 1.0);

        g.set_real_value(1, 42.0).unwrap();
        assert_relative_eq!(g.real_value(1).unwrap(), 1.0);

        g.set_real_value(1, 0.0).unwrap();
        assert!((g.real_value(1).unwrap() - 0.0).abs() <= 2.0 / 255.0);
    }

    #[test]
    fn test_real_bounds_mismatch() {
        let mut rng = StdRng::seed_from_u64(11);
        let err = Genotype::real(3, &[0.0], &[1.0, 1.0, 1.0], &mut rng).unwrap_err();
        assert!(matches!(err, GenomeError::BoundsMismatch { genome: 3, min: 1, max: 3 }));
    }

    #[test]
    fn test_encoding_mismatch() {
        let g = Genotype::binary(4).unwrap();
        assert!(matches!(
            g.real_value(0),
            Err(GenomeError::EncodingMismatch { .. })
        ));
        assert!(g.permutation_indices().is_err());
        assert_eq!(
            g.binary_value(4),
            Err(GenomeError::InvalidPosition {
                position: 4,
                length: 4
            })
        );
    }

    #[test]
    fn test_permutation_is_valid() {
        let mut rng = StdRng::seed_from_u64(5);
        let g = Genotype::permutation(20, &mut rng).unwrap();
        let mut indices = g.permutation_indices().unwrap();
        indices.sort_unstable();
        assert_eq!(indices, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_clone_is_independent() {
        let original = Genotype::new(vec![1, 0, 1], Encoding::Binary);
        let mut copy = original.clone();
        copy.genes_mut()[1] = 1;
        assert_eq!(original.genes(), &[1, 0, 1]);
        assert_eq!(copy.genes(), &[1, 1, 1]);
    }

    #[test]
    fn test_display() {
        let g = Genotype::binary(8).unwrap();
        assert_eq!(g.to_string(), "Genotype{Type: Binary, Length: 8}");
    }
}
