//! # evolve-core
//!
//! A generational evolutionary-computation engine for Rust.
//!
//! The engine evolves a population of byte-encoded genotypes with pluggable
//! selection, crossover and mutation strategies, scoring offspring on a
//! bounded worker pool until a composable termination condition fires.
//!
//! ## Core Concepts
//!
//! - **Operators as strategies**: selection, crossover and mutation are traits; the engine
//!   only sequences them and passes its current rates in explicitly
//! - **Failure isolation**: an evaluation that fails or panics costs one individual the
//!   sentinel fitness, never the run
//! - **Elitism and adaptive rates**: the top individuals survive each generation unchanged,
//!   and rates can follow population diversity
//! - **Composable termination**: atomic conditions combined with AND/OR
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use evolve_core::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//!
//! let mut engine = EvolutionEngine::builder()
//!     .population_size(50)
//!     .generations(200)
//!     .elitism_count(2)
//!     .selection(TournamentSelection::new(3))
//!     .crossover(SinglePointCrossover::new())
//!     .mutation(BitFlipMutation::new())
//!     .termination(FitnessThreshold::new(32.0))
//!     .build()?;
//!
//! engine.initialize(|rng| Genotype::random_binary(32, rng).unwrap(), &OneMax, &mut rng)?;
//! let best = engine.evolve(&OneMax, &mut rng)?;
//! ```

pub mod algorithms;
pub mod diagnostics;
pub mod error;
pub mod evaluation;
pub mod fitness;
pub mod genome;
pub mod hyperparameter;
pub mod operators;
pub mod population;
pub mod termination;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::prelude::*;
    pub use crate::diagnostics::prelude::*;
    pub use crate::error::*;
    pub use crate::evaluation::prelude::*;
    pub use crate::fitness::prelude::*;
    pub use crate::genome::prelude::*;
    pub use crate::hyperparameter::prelude::*;
    pub use crate::operators::prelude::*;
    pub use crate::population::prelude::*;
    pub use crate::termination::prelude::*;
}
