//! Fitness evaluation and benchmarks
//!
//! This module provides the evaluator abstraction and benchmark functions.

pub mod benchmarks;
pub mod traits;

pub use traits::{Evaluator, FnFitness, MinimizeFitness, SENTINEL_FITNESS};

pub mod prelude {
    pub use super::benchmarks::*;
    pub use super::traits::*;
}
