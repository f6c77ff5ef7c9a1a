//! End-to-end scenarios for the evolution engine

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use evolve_core::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn all_ones(len: usize) -> Genotype {
    Genotype::new(vec![1; len], Encoding::Binary)
}

fn single_individual_state<'a>(population: &'a Population, history: &'a History) -> EngineState<'a> {
    EngineState {
        population,
        history,
        elapsed: Duration::ZERO,
        generation: history.generations_completed(),
        best: population.best(),
    }
}

#[test]
fn test_elites_survive_with_full_crossover() {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut engine = EvolutionEngine::builder()
        .population_size(10)
        .generations(1)
        .crossover_rate(1.0)
        .mutation_rate(0.0)
        .elitism_count(2)
        .num_parallel_evals(1)
        .logging(false)
        .selection(TournamentSelection::new(2))
        .crossover(SinglePointCrossover::new())
        .mutation(BitFlipMutation::new())
        .build()
        .unwrap();

    let seeded = AtomicUsize::new(0);
    engine
        .initialize(
            |rng: &mut StdRng| {
                if seeded.fetch_add(1, Ordering::SeqCst) < 2 {
                    all_ones(8)
                } else {
                    // Never all ones, so the seeded pair is the unique best
                    let mut genes: Vec<u8> = (0..8).map(|_| rng.gen_range(0..=1)).collect();
                    genes[0] = 0;
                    Genotype::new(genes, Encoding::Binary)
                }
            },
            &OneMax,
            &mut rng,
        )
        .unwrap();

    // Zero is out of range and replaced by the default
    assert_eq!(engine.mutation_rate(), 0.1);

    engine.evolve(&OneMax, &mut rng).unwrap();

    let survivors = engine
        .population()
        .iter()
        .filter(|i| i.genotype().genes() == [1; 8] && i.fitness() == Some(8.0))
        .count();
    assert!(survivors >= 2, "only {} all-ones individuals", survivors);
    assert_eq!(engine.history().len(), 2);
}

#[test]
fn test_fitness_threshold_boundary() {
    let history: History = vec![Statistics::default()].into();
    let mut condition = FitnessThreshold::new(5.0);

    let exact = Population::from_individuals(vec![Individual::with_fitness(all_ones(1), 5.0)]);
    assert_eq!(exact.statistics().best_fitness, 5.0);
    assert!(condition.should_terminate(&single_individual_state(&exact, &history)));

    let below = Population::from_individuals(vec![Individual::with_fitness(all_ones(1), 4.999)]);
    assert!(!condition.should_terminate(&single_individual_state(&below, &history)));
}

#[test]
fn test_generation_count_boundary() {
    let population = Population::from_individuals(vec![Individual::with_fitness(all_ones(1), 1.0)]);
    let mut condition = GenerationCount::new(5);

    for len in 1..=8 {
        let history: History = vec![*population.statistics(); len].into();
        let fired = condition.should_terminate(&single_individual_state(&population, &history));
        assert_eq!(fired, len >= 5, "history length {}", len);
    }
}

#[test]
fn test_panicking_evaluator_is_contained() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut engine = EvolutionEngine::builder()
        .population_size(12)
        .generations(5)
        .num_parallel_evals(4)
        .logging(false)
        .selection(TournamentSelection::new(2))
        .crossover(UniformCrossover::new())
        .mutation(BitFlipMutation::new())
        .build()
        .unwrap();

    // Panics on the all-zero genome
    let fragile = |g: &Genotype| -> Result<Phenotype, EvaluationError> {
        let ones = g.count_ones();
        if ones == 0 {
            panic!("zero genome");
        }
        Ok(Phenotype::new(ones as f64))
    };

    let created = AtomicUsize::new(0);
    engine
        .initialize(
            |rng: &mut StdRng| {
                if created.fetch_add(1, Ordering::SeqCst) == 0 {
                    Genotype::binary(6).unwrap()
                } else {
                    Genotype::random_binary(6, rng).unwrap()
                }
            },
            &fragile,
            &mut rng,
        )
        .unwrap();

    assert_eq!(engine.population().len(), 12);
    assert_eq!(engine.statistics().worst_fitness, SENTINEL_FITNESS);
    assert!(engine
        .population()
        .iter()
        .filter(|i| i.genotype().count_ones() > 0)
        .all(|i| i.fitness() == Some(i.genotype().count_ones() as f64)));

    let best = engine.evolve(&fragile, &mut rng).unwrap();
    assert!(best.fitness().unwrap() > 0.0);
    assert_eq!(engine.history().len(), 6);
}

#[test]
fn test_empty_crossover_aborts_run() {
    struct Sterile;

    impl CrossoverOperator for Sterile {
        fn crossover<R: Rng>(
            &self,
            _parents: Vec<Individual>,
            _rate: f64,
            _rng: &mut R,
        ) -> Vec<Individual> {
            Vec::new()
        }
    }

    let mut rng = StdRng::seed_from_u64(3);
    let mut engine = EvolutionEngine::builder()
        .population_size(8)
        .generations(3)
        .num_parallel_evals(1)
        .logging(false)
        .selection(RankSelection::new())
        .crossover(Sterile)
        .mutation(BitFlipMutation::new())
        .build()
        .unwrap();
    engine
        .initialize(|rng| Genotype::random_binary(8, rng).unwrap(), &OneMax, &mut rng)
        .unwrap();

    let err = engine.evolve(&OneMax, &mut rng).unwrap_err();
    assert!(matches!(
        err,
        EvolutionError::DegenerateGeneration {
            generation: 1,
            stage: "crossover"
        }
    ));
    assert_eq!(engine.history().len(), 1);
    assert_eq!(engine.phase(), EnginePhase::Ready);
}

#[test]
fn test_composite_termination_in_engine() {
    let mut rng = StdRng::seed_from_u64(11);
    let termination = CompositeTermination::any(vec![
        Box::new(TimeLimit::new(Duration::from_secs(3600))),
        Box::new(GenerationCount::new(6)),
    ]);
    let mut engine = EvolutionEngine::builder()
        .population_size(10)
        .generations(100)
        .num_parallel_evals(1)
        .logging(false)
        .termination(termination)
        .selection(RouletteSelection::new())
        .crossover(SinglePointCrossover::new())
        .mutation(BitFlipMutation::new())
        .build()
        .unwrap();
    engine
        .initialize(|rng| Genotype::random_binary(12, rng).unwrap(), &OneMax, &mut rng)
        .unwrap();
    engine.evolve(&OneMax, &mut rng).unwrap();

    assert_eq!(engine.history().len(), 6);
    assert_eq!(engine.termination_reason(), Some("Maximum generations reached"));
    assert_eq!(engine.phase(), EnginePhase::Terminated);
}

#[test]
fn test_diversity_threshold_stops_converged_population() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut engine = EvolutionEngine::builder()
        .population_size(10)
        .generations(50)
        .num_parallel_evals(1)
        .logging(false)
        .termination(DiversityThreshold::new(0.5))
        .selection(TournamentSelection::new(2))
        .crossover(UniformCrossover::new())
        .mutation(RandomResetMutation::new())
        .mutation_rate(0.01)
        .build()
        .unwrap();

    // Identical individuals: zero diversity from the start
    engine
        .initialize(|_| all_ones(8), &OneMax, &mut rng)
        .unwrap();
    engine.evolve(&OneMax, &mut rng).unwrap();

    assert_eq!(engine.termination_reason(), Some("Diversity threshold reached"));
    assert!(engine.generations_completed() < 50);
}

#[test]
fn test_sphere_on_real_genome() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut engine = EvolutionEngine::builder()
        .population_size(40)
        .generations(60)
        .elitism_count(2)
        .num_parallel_evals(2)
        .logging(false)
        .selection(TournamentSelection::new(3))
        .crossover(UniformCrossover::new())
        .mutation(RandomResetMutation::new())
        .mutation_rate(0.1)
        .build()
        .unwrap();

    let min = [-5.0; 3];
    let max = [5.0; 3];
    engine
        .initialize(
            |rng| Genotype::real(3, &min, &max, rng).unwrap(),
            &Sphere,
            &mut rng,
        )
        .unwrap();
    let initial_best = engine.statistics().best_fitness;

    let best = engine.evolve(&Sphere, &mut rng).unwrap();
    let fitness = best.fitness().unwrap();

    assert!(fitness <= 0.0);
    assert!(fitness >= initial_best);
    let sum_of_squares = best.phenotype.as_ref().unwrap().features["sum_of_squares"];
    assert!((sum_of_squares + fitness).abs() < 1e-9);
}

#[test]
fn test_permutation_problem_with_swap_mutation() {
    // Recombining permutations would break them
    struct Cloning;

    impl CrossoverOperator for Cloning {
        fn crossover<R: Rng>(
            &self,
            parents: Vec<Individual>,
            _rate: f64,
            _rng: &mut R,
        ) -> Vec<Individual> {
            parents
        }
    }

    // Reward genes sitting at their own index
    let in_place = FnFitness::new(|g: &Genotype| {
        g.genes()
            .iter()
            .enumerate()
            .filter(|&(i, &gene)| i == gene as usize)
            .count() as f64
    });

    let mut rng = StdRng::seed_from_u64(17);
    let mut engine = EvolutionEngine::builder()
        .population_size(30)
        .generations(40)
        .elitism_count(1)
        .num_parallel_evals(1)
        .logging(false)
        .selection(TruncationSelection::new(0.5))
        .crossover(Cloning)
        .mutation(SwapMutation::new())
        .mutation_rate(0.05)
        .build()
        .unwrap();
    engine
        .initialize(|rng| Genotype::permutation(10, rng).unwrap(), &in_place, &mut rng)
        .unwrap();
    let initial_best = engine.statistics().best_fitness;

    let best = engine.evolve(&in_place, &mut rng).unwrap();

    assert!(best.fitness().unwrap() >= initial_best);
    for individual in engine.population().iter() {
        let mut indices = individual.genotype().permutation_indices().unwrap();
        indices.sort_unstable();
        assert_eq!(indices, (0..10).collect::<Vec<_>>());
    }
}

#[test]
fn test_reinitialize_starts_fresh_run() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut engine = EvolutionEngine::builder()
        .population_size(6)
        .generations(4)
        .num_parallel_evals(1)
        .logging(false)
        .selection(TournamentSelection::binary())
        .crossover(SinglePointCrossover::new())
        .mutation(BitFlipMutation::new())
        .build()
        .unwrap();

    engine
        .initialize(|rng| Genotype::random_binary(8, rng).unwrap(), &OneMax, &mut rng)
        .unwrap();
    engine.evolve(&OneMax, &mut rng).unwrap();
    assert_eq!(engine.history().len(), 5);

    engine
        .initialize(|_| Genotype::binary(8).unwrap(), &OneMax, &mut rng)
        .unwrap();
    assert_eq!(engine.history().len(), 1);
    assert_eq!(engine.phase(), EnginePhase::Ready);
    assert_eq!(engine.best_individual().and_then(Individual::fitness), Some(0.0));
}

#[test]
fn test_time_limit_counts_from_evolve() {
    let mut rng = StdRng::seed_from_u64(21);
    let mut engine = EvolutionEngine::builder()
        .population_size(8)
        .generations(5)
        .num_parallel_evals(1)
        .logging(false)
        .termination(TimeLimit::new(Duration::from_millis(200)))
        .selection(TournamentSelection::binary())
        .crossover(SinglePointCrossover::new())
        .mutation(BitFlipMutation::new())
        .build()
        .unwrap();
    engine
        .initialize(|rng| Genotype::random_binary(8, rng).unwrap(), &OneMax, &mut rng)
        .unwrap();

    // Idle longer than the limit before evolving
    std::thread::sleep(Duration::from_millis(300));

    engine.evolve(&OneMax, &mut rng).unwrap();
    assert_eq!(engine.history().len(), 6);
    assert_eq!(engine.termination_reason(), None);

    // A continued run gets a fresh clock as well
    engine.evolve(&OneMax, &mut rng).unwrap();
    assert_eq!(engine.history().len(), 11);
    assert_eq!(engine.termination_reason(), None);
}
