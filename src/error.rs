//! Error types for evolve-core
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

use crate::genome::Encoding;

/// Error type for genome construction and decoding
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenomeError {
    /// Genome length must be positive
    #[error("Invalid genome length: {0}")]
    InvalidLength(usize),

    /// Position outside the genome
    #[error("Invalid genome position: {position} (length: {length})")]
    InvalidPosition { position: usize, length: usize },

    /// Decoder called on a genome with another encoding
    #[error("Invalid genome type: expected {expected}, got {actual}")]
    EncodingMismatch { expected: Encoding, actual: Encoding },

    /// Bounds arrays do not match the genome length
    #[error("min/max values length must match genome length: genome {genome}, min {min}, max {max}")]
    BoundsMismatch { genome: usize, min: usize, max: usize },
}

/// Error raised while evaluating a single individual
///
/// These never cross the evaluation pool boundary as engine errors; the
/// affected individual receives the sentinel fitness instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvaluationError {
    /// The evaluator reported a failure
    #[error("Fitness evaluation failed: {0}")]
    Failed(String),

    /// The evaluator panicked
    #[error("Panic during fitness evaluation: {0}")]
    Panicked(String),

    /// The job was dropped because the pool was torn down first
    #[error("Evaluation cancelled")]
    Cancelled,
}

/// Top-level error type for evolution operations
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// Invalid configuration or missing collaborator
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// `evolve` was called before `initialize`
    #[error("Engine has not been initialized")]
    NotInitialized,

    /// Population construction with no individuals
    #[error("Empty population")]
    EmptyPopulation,

    /// An operator produced no individuals
    #[error("{stage} operator returned empty population at generation {generation}")]
    DegenerateGeneration {
        /// Generation number; the initial population is generation 0
        generation: usize,
        /// Operator that produced the empty result
        stage: &'static str,
    },

    /// No evaluated individual survived a generation
    #[error("Population contains no valid individuals at generation {generation}")]
    NoValidIndividuals { generation: usize },

    /// Genome error
    #[error("Genome error: {0}")]
    Genome(#[from] GenomeError),

    /// The evaluation worker pool could not be created
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

/// Result type alias for evolution operations
pub type EvoResult<T> = Result<T, EvolutionError>;
