//! Maximise f(x) = x·sin(x) on [0, π]
//!
//! x is encoded as a 16-bit unsigned integer in a binary genome and scaled
//! onto the interval. The maximum is f(2.0288) ≈ 1.8197.
//!
//! Run with `RUST_LOG=debug` to see evaluation events.

use std::f64::consts::PI;

use evolve_core::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

const GENOME_LENGTH: usize = 16;
const LOWER_BOUND: f64 = 0.0;
const UPPER_BOUND: f64 = PI;

fn decode(genotype: &Genotype) -> f64 {
    let value = genotype
        .genes()
        .iter()
        .fold(0u64, |acc, &bit| (acc << 1) | u64::from(bit & 1));
    let max = ((1u64 << GENOME_LENGTH) - 1) as f64;
    LOWER_BOUND + (UPPER_BOUND - LOWER_BOUND) * value as f64 / max
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Find the maximum of x·sin(x) ===\n");

    let mut rng = StdRng::seed_from_u64(42);

    let objective = |genotype: &Genotype| -> Result<Phenotype, EvaluationError> {
        let x = decode(genotype);
        Ok(Phenotype::new(x * x.sin()).with_feature("x", x))
    };

    let termination = CompositeTermination::any(vec![
        Box::new(FitnessThreshold::new(1.8197)),
        Box::new(FitnessStagnation::new(25)),
    ]);

    let mut engine = EvolutionEngine::builder()
        .population_size(50)
        .generations(100)
        .crossover_rate(0.7)
        .mutation_rate(0.01)
        .elitism_count(2)
        .termination(termination)
        .selection(TournamentSelection::new(3))
        .crossover(SinglePointCrossover::new())
        .mutation(BitFlipMutation::new())
        .build()?;

    let template = Genotype::binary(GENOME_LENGTH)?;
    engine.initialize(
        |rng: &mut StdRng| template.with_genes((0..GENOME_LENGTH).map(|_| rng.gen_range(0..=1)).collect()),
        &objective,
        &mut rng,
    )?;
    let best = engine.evolve(&objective, &mut rng)?;

    println!(
        "\nBest x: {:.6}, Fitness: {:.6}",
        decode(best.genotype()),
        best.fitness().unwrap_or(SENTINEL_FITNESS)
    );
    println!("Total generations: {}", engine.generations_completed());
    println!("Total runtime: {:?}", engine.runtime());
    if let Some(reason) = engine.termination_reason() {
        println!("Stopped early: {}", reason);
    }

    Ok(())
}
