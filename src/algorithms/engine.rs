//! Generational evolution engine
//!
//! This module implements the generational loop: selection, crossover,
//! mutation, elitism, adaptive rates, parallel evaluation, statistics and
//! termination.

use std::fmt;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::diagnostics::History;
use crate::error::{EvoResult, EvolutionError};
use crate::evaluation::{EvaluationPool, EvaluationReport};
use crate::fitness::Evaluator;
use crate::genome::Genotype;
use crate::hyperparameter::AdaptiveRateControl;
use crate::operators::traits::{CrossoverOperator, MutationOperator, SelectionOperator};
use crate::population::{Individual, Population, Statistics};
use crate::termination::{EngineState, NeverTerminate, TerminationCondition};

const DEFAULT_MUTATION_RATE: f64 = 0.1;
const DEFAULT_CROSSOVER_RATE: f64 = 0.8;

/// Configuration for the evolution engine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Population size
    pub population_size: usize,
    /// Maximum generations per call to `evolve`
    pub generations: usize,
    /// Number of elite individuals carried over unchanged
    pub elitism_count: usize,
    /// Evaluation workers; zero means the host's available parallelism
    pub num_parallel_evals: usize,
    /// Per-gene mutation probability, in (0, 1]
    pub mutation_rate: f64,
    /// Per-pair crossover probability, in (0, 1]
    pub crossover_rate: f64,
    /// Whether rates follow population diversity
    pub adaptive_params: bool,
    /// Constants for diversity-driven rate adaptation
    pub adaptive: AdaptiveRateControl,
    /// Whether per-generation events are logged
    pub logging: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            generations: 100,
            elitism_count: 0,
            num_parallel_evals: 0,
            mutation_rate: DEFAULT_MUTATION_RATE,
            crossover_rate: DEFAULT_CROSSOVER_RATE,
            adaptive_params: false,
            adaptive: AdaptiveRateControl::default(),
            logging: true,
        }
    }
}

/// Lifecycle of an engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnginePhase {
    /// Built, no population yet
    Uninitialized,
    /// Initial population evaluated
    Ready,
    /// Inside `evolve`
    Evolving,
    /// `evolve` finished; calling it again continues from the current population
    Terminated,
}

impl fmt::Display for EnginePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EnginePhase::Uninitialized => "uninitialized",
            EnginePhase::Ready => "ready",
            EnginePhase::Evolving => "evolving",
            EnginePhase::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Builder for EvolutionEngine
pub struct EvolutionEngineBuilder<S, C, M> {
    config: EngineConfig,
    selection: Option<S>,
    crossover: Option<C>,
    mutation: Option<M>,
    termination: Option<Box<dyn TerminationCondition>>,
}

impl EvolutionEngineBuilder<(), (), ()> {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            selection: None,
            crossover: None,
            mutation: None,
            termination: None,
        }
    }
}

impl Default for EvolutionEngineBuilder<(), (), ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, C, M> EvolutionEngineBuilder<S, C, M> {
    /// Replace the whole configuration
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the population size
    pub fn population_size(mut self, size: usize) -> Self {
        self.config.population_size = size;
        self
    }

    /// Set the generation cap per call to `evolve`
    pub fn generations(mut self, generations: usize) -> Self {
        self.config.generations = generations;
        self
    }

    /// Set the number of elite individuals
    pub fn elitism_count(mut self, count: usize) -> Self {
        self.config.elitism_count = count;
        self
    }

    /// Set the number of evaluation workers
    pub fn num_parallel_evals(mut self, workers: usize) -> Self {
        self.config.num_parallel_evals = workers;
        self
    }

    /// Set the mutation rate
    pub fn mutation_rate(mut self, rate: f64) -> Self {
        self.config.mutation_rate = rate;
        self
    }

    /// Set the crossover rate
    pub fn crossover_rate(mut self, rate: f64) -> Self {
        self.config.crossover_rate = rate;
        self
    }

    /// Enable or disable diversity-driven rate adaptation
    pub fn adaptive_params(mut self, enabled: bool) -> Self {
        self.config.adaptive_params = enabled;
        self
    }

    /// Set the adaptation constants
    pub fn adaptive(mut self, control: AdaptiveRateControl) -> Self {
        self.config.adaptive = control;
        self
    }

    /// Enable or disable per-generation logging
    pub fn logging(mut self, enabled: bool) -> Self {
        self.config.logging = enabled;
        self
    }

    /// Set the termination condition
    pub fn termination<T>(mut self, termination: T) -> Self
    where
        T: TerminationCondition + 'static,
    {
        self.termination = Some(Box::new(termination));
        self
    }

    /// Set the selection operator
    pub fn selection<NewS>(self, selection: NewS) -> EvolutionEngineBuilder<NewS, C, M>
    where
        NewS: SelectionOperator,
    {
        EvolutionEngineBuilder {
            config: self.config,
            selection: Some(selection),
            crossover: self.crossover,
            mutation: self.mutation,
            termination: self.termination,
        }
    }

    /// Set the crossover operator
    pub fn crossover<NewC>(self, crossover: NewC) -> EvolutionEngineBuilder<S, NewC, M>
    where
        NewC: CrossoverOperator,
    {
        EvolutionEngineBuilder {
            config: self.config,
            selection: self.selection,
            crossover: Some(crossover),
            mutation: self.mutation,
            termination: self.termination,
        }
    }

    /// Set the mutation operator
    pub fn mutation<NewM>(self, mutation: NewM) -> EvolutionEngineBuilder<S, C, NewM>
    where
        NewM: MutationOperator,
    {
        EvolutionEngineBuilder {
            config: self.config,
            selection: self.selection,
            crossover: self.crossover,
            mutation: Some(mutation),
            termination: self.termination,
        }
    }
}

impl<S, C, M> EvolutionEngineBuilder<S, C, M>
where
    S: SelectionOperator,
    C: CrossoverOperator,
    M: MutationOperator,
{
    /// Build the engine
    ///
    /// Without a termination condition the generation cap governs.
    pub fn build(self) -> EvoResult<EvolutionEngine<S, C, M>> {
        let selection = self.selection.ok_or_else(|| {
            EvolutionError::Configuration("Selection operator must be specified".to_string())
        })?;

        let crossover = self.crossover.ok_or_else(|| {
            EvolutionError::Configuration("Crossover operator must be specified".to_string())
        })?;

        let mutation = self.mutation.ok_or_else(|| {
            EvolutionError::Configuration("Mutation operator must be specified".to_string())
        })?;

        let termination = self
            .termination
            .unwrap_or_else(|| Box::new(NeverTerminate));

        Ok(EvolutionEngine {
            mutation_rate: self.config.mutation_rate,
            crossover_rate: self.config.crossover_rate,
            elitism_count: self.config.elitism_count,
            config: self.config,
            selection,
            crossover,
            mutation,
            termination,
            phase: EnginePhase::Uninitialized,
            population: Population::new(),
            history: History::new(),
            best: None,
            pool: None,
            started: None,
            termination_reason: None,
        })
    }
}

/// Generational evolution engine
///
/// `initialize` builds and scores the first population; `evolve` runs up to
/// `generations` generations and returns the best individual found.
pub struct EvolutionEngine<S, C, M> {
    config: EngineConfig,
    selection: S,
    crossover: C,
    mutation: M,
    termination: Box<dyn TerminationCondition>,
    phase: EnginePhase,
    population: Population,
    history: History,
    best: Option<Individual>,
    mutation_rate: f64,
    crossover_rate: f64,
    elitism_count: usize,
    pool: Option<EvaluationPool>,
    started: Option<Instant>,
    termination_reason: Option<&'static str>,
}

impl EvolutionEngine<(), (), ()> {
    /// Create a builder for EvolutionEngine
    pub fn builder() -> EvolutionEngineBuilder<(), (), ()> {
        EvolutionEngineBuilder::new()
    }
}

impl<S, C, M> EvolutionEngine<S, C, M>
where
    S: SelectionOperator,
    C: CrossoverOperator,
    M: MutationOperator,
{
    /// Build, evaluate and record the initial population
    ///
    /// Out-of-range rates are replaced by defaults, the elitism count is
    /// clamped to the population size and a worker count of zero becomes the
    /// host's available parallelism. Calling this again starts a fresh run.
    #[instrument(level = "info", skip_all, fields(population_size = self.config.population_size))]
    pub fn initialize<R, I, E>(
        &mut self,
        mut initializer: I,
        evaluator: &E,
        rng: &mut R,
    ) -> EvoResult<()>
    where
        R: Rng,
        I: FnMut(&mut R) -> Genotype,
        E: Evaluator + ?Sized,
    {
        if self.config.population_size == 0 {
            return Err(EvolutionError::Configuration(
                "Population size must be greater than zero".to_string(),
            ));
        }

        self.mutation_rate = normalize_rate(
            "mutation_rate",
            self.config.mutation_rate,
            DEFAULT_MUTATION_RATE,
        );
        self.crossover_rate = normalize_rate(
            "crossover_rate",
            self.config.crossover_rate,
            DEFAULT_CROSSOVER_RATE,
        );
        self.elitism_count = self.config.elitism_count.min(self.config.population_size);

        let workers = match self.config.num_parallel_evals {
            0 => std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            n => n,
        };
        let pool = EvaluationPool::new(workers)?;

        let mut population = Population::generate(self.config.population_size, || {
            Individual::new(initializer(rng))
        })?;
        let report = pool.evaluate(population.individuals_mut(), evaluator);
        report_failures(0, &report);
        population.calculate_statistics();

        let mut history = History::with_capacity(self.config.generations + 1);
        history.record(*population.statistics());

        self.best = population.best().cloned();
        self.population = population;
        self.history = history;
        self.pool = Some(pool);
        self.started = Some(Instant::now());
        self.termination_reason = None;
        self.phase = EnginePhase::Ready;

        tracing::info!(
            generations = self.config.generations,
            population_size = self.config.population_size,
            mutation_rate = self.mutation_rate,
            crossover_rate = self.crossover_rate,
            elitism_count = self.elitism_count,
            adaptive_params = self.config.adaptive_params,
            workers,
            "Evolution engine initialized"
        );

        Ok(())
    }

    /// Run up to `generations` generations and return the best individual
    ///
    /// Stops early when the termination condition fires. On error the engine
    /// keeps the population and history of the last completed generation and
    /// returns to [`EnginePhase::Ready`].
    #[instrument(level = "info", skip_all, fields(generations = self.config.generations))]
    pub fn evolve<R, E>(&mut self, evaluator: &E, rng: &mut R) -> EvoResult<Individual>
    where
        R: Rng,
        E: Evaluator + ?Sized,
    {
        if self.phase == EnginePhase::Uninitialized {
            return Err(EvolutionError::NotInitialized);
        }

        self.phase = EnginePhase::Evolving;
        self.termination_reason = None;
        // Time limits count from the start of this call
        self.started = Some(Instant::now());

        match self.run_generations(evaluator, rng) {
            Ok(best) => {
                self.phase = EnginePhase::Terminated;
                Ok(best)
            }
            Err(err) => {
                tracing::error!(error = %err, generation = self.generations_completed(), "Evolution aborted");
                self.phase = EnginePhase::Ready;
                Err(err)
            }
        }
    }

    fn run_generations<R, E>(&mut self, evaluator: &E, rng: &mut R) -> EvoResult<Individual>
    where
        R: Rng,
        E: Evaluator + ?Sized,
    {
        let mut stagnant = 0usize;

        for _ in 0..self.config.generations {
            let generation = self.history.generations_completed() + 1;
            let previous_best = self.best.as_ref().and_then(Individual::fitness);

            self.step(generation, evaluator, rng)?;

            let improved = match (self.best.as_ref().and_then(Individual::fitness), previous_best) {
                (Some(current), Some(previous)) => current > previous,
                (Some(_), None) => true,
                _ => false,
            };
            stagnant = if improved { 0 } else { stagnant + 1 };

            if self.config.logging {
                let stats = self.population.statistics();
                tracing::info!(
                    generation,
                    best_fitness = stats.best_fitness,
                    average_fitness = stats.average_fitness,
                    diversity = stats.diversity,
                    no_improvement = stagnant,
                    "Generation completed"
                );
            }

            let state = EngineState {
                population: &self.population,
                history: &self.history,
                elapsed: self.runtime(),
                generation,
                best: self.best.as_ref(),
            };
            if self.termination.should_terminate(&state) {
                let reason = self.termination.reason();
                self.termination_reason = Some(reason);
                tracing::info!(
                    reason,
                    generation,
                    runtime_ms = state.elapsed.as_millis() as u64,
                    "Termination condition met"
                );
                break;
            }
        }

        self.best.clone().ok_or(EvolutionError::EmptyPopulation)
    }

    /// One generation, in strict order: selection, crossover, elite snapshot,
    /// mutation, rate adaptation, evaluation, elite reinsertion, statistics,
    /// history.
    fn step<R, E>(&mut self, generation: usize, evaluator: &E, rng: &mut R) -> EvoResult<()>
    where
        R: Rng,
        E: Evaluator + ?Sized,
    {
        if self.pool.is_none() {
            return Err(EvolutionError::NotInitialized);
        }

        let selected = self.selection.select(self.population.individuals(), rng);
        if selected.is_empty() {
            return Err(EvolutionError::DegenerateGeneration {
                generation,
                stage: "selection",
            });
        }

        let mut offspring = self.crossover.crossover(selected, self.crossover_rate, rng);
        if offspring.is_empty() {
            return Err(EvolutionError::DegenerateGeneration {
                generation,
                stage: "crossover",
            });
        }

        // Deep copies, so mutation and replacement cannot reach them
        let elites = if self.elitism_count > 0 {
            self.population.top(self.elitism_count)
        } else {
            Vec::new()
        };

        self.mutation.mutate(&mut offspring, self.mutation_rate, rng);

        if self.config.adaptive_params {
            self.adapt_rates(generation);
        }

        let pool = self.pool.as_ref().ok_or(EvolutionError::NotInitialized)?;
        let eval_start = Instant::now();
        let report = pool.evaluate(&mut offspring, evaluator);
        tracing::debug!(
            generation,
            elapsed_ms = eval_start.elapsed().as_millis() as u64,
            workers = report.workers(),
            evaluated = report.evaluated,
            "Evaluation pass finished"
        );
        report_failures(generation, &report);

        let next = next_generation(offspring, elites, generation)?;
        self.population.replace_individuals(next);
        self.population.calculate_statistics();
        self.history.record(*self.population.statistics());

        if let Some(current) = self.population.best() {
            let better = self
                .best
                .as_ref()
                .map_or(true, |best| current.is_better_than(best));
            if better {
                self.best = Some(current.clone());
            }
        }

        Ok(())
    }

    fn adapt_rates(&mut self, generation: usize) {
        let diversity = self.population.statistics().diversity;
        let (mutation_rate, crossover_rate) = self.config.adaptive.adapt(diversity);

        if self.config.logging {
            tracing::debug!(
                generation,
                diversity,
                old_mutation_rate = self.mutation_rate,
                new_mutation_rate = mutation_rate,
                old_crossover_rate = self.crossover_rate,
                new_crossover_rate = crossover_rate,
                "Adaptive parameters updated"
            );
        }

        self.mutation_rate = mutation_rate;
        self.crossover_rate = crossover_rate;
    }

    /// Current population
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Statistics of every generation, initial population included
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Statistics of the current population
    pub fn statistics(&self) -> &Statistics {
        self.population.statistics()
    }

    /// Best individual seen so far
    pub fn best_individual(&self) -> Option<&Individual> {
        self.best.as_ref()
    }

    /// Time since the current `evolve` call started, or since `initialize`
    /// before the first one
    pub fn runtime(&self) -> Duration {
        self.started.map(|t| t.elapsed()).unwrap_or_default()
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    /// Mutation rate in effect (after normalisation and adaptation)
    pub fn mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    /// Crossover rate in effect (after normalisation and adaptation)
    pub fn crossover_rate(&self) -> f64 {
        self.crossover_rate
    }

    /// Elitism count after clamping
    pub fn elitism_count(&self) -> usize {
        self.elitism_count
    }

    /// Evaluation workers, or zero before `initialize`
    pub fn num_parallel_evals(&self) -> usize {
        self.pool.as_ref().map_or(0, EvaluationPool::workers)
    }

    pub fn generations_completed(&self) -> usize {
        self.history.generations_completed()
    }

    /// Why the last `evolve` stopped early, if it did
    pub fn termination_reason(&self) -> Option<&'static str> {
        self.termination_reason
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

fn normalize_rate(name: &'static str, rate: f64, default: f64) -> f64 {
    if rate > 0.0 && rate <= 1.0 {
        rate
    } else {
        tracing::warn!(parameter = name, value = rate, default, "Rate out of range, using default");
        default
    }
}

/// Overlay the elites on the first offspring slots
///
/// Fails without touching the current population when nothing in the next
/// generation carries a phenotype. The evaluation pool scores every slot, so
/// this only guards against an operator contract being broken.
fn next_generation(
    mut offspring: Vec<Individual>,
    elites: Vec<Individual>,
    generation: usize,
) -> EvoResult<Vec<Individual>> {
    for (slot, elite) in offspring.iter_mut().zip(elites) {
        *slot = elite;
    }

    if offspring.iter().any(Individual::is_evaluated) {
        Ok(offspring)
    } else {
        Err(EvolutionError::NoValidIndividuals { generation })
    }
}

fn report_failures(generation: usize, report: &EvaluationReport) {
    if report.is_clean() {
        return;
    }
    tracing::error!(
        generation,
        failures = report.failures.len(),
        "Errors occurred during evaluation"
    );
    for failure in &report.failures {
        tracing::error!(generation, index = failure.index, error = %failure.error, "Evaluation failed");
    }
}
