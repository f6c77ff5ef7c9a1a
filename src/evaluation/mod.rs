//! Parallel fitness evaluation
//!
//! This module provides the worker pool that scores offspring, isolating
//! per-individual failures behind the sentinel fitness.

pub mod cancel;
pub mod pool;

pub use cancel::CancellationToken;
pub use pool::EvaluationPool;

use crate::error::EvaluationError;

/// A failed evaluation and the slot it belongs to
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationFailure {
    /// Index of the individual in the evaluated slice
    pub index: usize,
    /// What went wrong
    pub error: EvaluationError,
}

/// Summary of one evaluation pass
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvaluationReport {
    /// Individuals that received a computed phenotype
    pub evaluated: usize,
    /// Individuals that received the sentinel fitness
    pub failures: Vec<EvaluationFailure>,
    /// Jobs completed by each active worker
    pub jobs_per_worker: Vec<usize>,
}

impl EvaluationReport {
    /// Number of workers that took part
    pub fn workers(&self) -> usize {
        self.jobs_per_worker.len()
    }

    /// Whether every evaluation succeeded
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub mod prelude {
    pub use super::{
        CancellationToken, EvaluationFailure, EvaluationPool, EvaluationReport,
    };
}
