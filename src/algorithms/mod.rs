//! Evolutionary algorithms
//!
//! This module provides the generational evolution engine.

pub mod engine;

pub use engine::{EngineConfig, EnginePhase, EvolutionEngine, EvolutionEngineBuilder};

pub mod prelude {
    pub use super::engine::*;
}
