//! Diagnostics and statistics
//!
//! This module provides the per-generation statistics log of an evolutionary run.

use serde::{Deserialize, Serialize};

use crate::population::Statistics;

/// Append-only log of population statistics
///
/// One entry per generation, starting with the initial population, so
/// `len() == generations_completed + 1` while a run is in progress.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    entries: Vec<Statistics>,
}

impl History {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty history with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Record a generation's statistics
    pub fn record(&mut self, stats: Statistics) {
        self.entries.push(stats);
    }

    /// Number of recorded snapshots
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Generations completed after the initial snapshot
    pub fn generations_completed(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    /// Snapshot at `index`
    pub fn get(&self, index: usize) -> Option<&Statistics> {
        self.entries.get(index)
    }

    /// Most recent snapshot
    pub fn last(&self) -> Option<&Statistics> {
        self.entries.last()
    }

    /// All snapshots in generation order
    pub fn as_slice(&self) -> &[Statistics] {
        &self.entries
    }

    /// Iterate over snapshots in generation order
    pub fn iter(&self) -> impl Iterator<Item = &Statistics> {
        self.entries.iter()
    }

    /// Best fitness per generation
    pub fn best_fitness_history(&self) -> Vec<f64> {
        self.entries.iter().map(|s| s.best_fitness).collect()
    }

    /// Diversity per generation
    pub fn diversity_history(&self) -> Vec<f64> {
        self.entries.iter().map(|s| s.diversity).collect()
    }

    /// Best fitness across all generations
    pub fn best_fitness(&self) -> Option<f64> {
        self.entries
            .iter()
            .map(|s| s.best_fitness)
            .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }
}

impl From<Vec<Statistics>> for History {
    fn from(entries: Vec<Statistics>) -> Self {
        Self { entries }
    }
}

pub mod prelude {
    pub use super::History;
}
