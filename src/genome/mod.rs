//! Genome representation
//!
//! This module provides the byte-encoded `Genotype` and its encoding tags.

pub mod genotype;

pub use genotype::{Encoding, Genotype};

pub mod prelude {
    pub use super::genotype::*;
}
