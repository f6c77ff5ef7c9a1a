//! Bounded worker pool for fitness evaluation
//!
//! Every individual becomes one job tagged with its index. Jobs go into a
//! bounded queue that is closed before any worker starts; workers drain it and
//! publish index-tagged outcomes, so results land in the right slot no matter
//! which worker finishes first.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, PoisonError};

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{EvaluationError, EvoResult, EvolutionError};
use crate::evaluation::cancel::CancellationToken;
use crate::evaluation::{EvaluationFailure, EvaluationReport};
use crate::fitness::{Evaluator, SENTINEL_FITNESS};
use crate::genome::Genotype;
use crate::population::{Individual, Phenotype};

type Job<'a> = (usize, &'a Genotype);
type Outcome = Result<Phenotype, EvaluationError>;

struct TaggedOutcome {
    index: usize,
    worker: usize,
    outcome: Outcome,
}

/// Worker pool evaluating individuals with up to `workers` threads
///
/// With a single worker, evaluation runs on the calling thread in population
/// order.
pub struct EvaluationPool {
    workers: usize,
    pool: Option<ThreadPool>,
}

impl EvaluationPool {
    /// Create a pool with `workers` threads; zero is treated as one
    pub fn new(workers: usize) -> EvoResult<Self> {
        let workers = workers.max(1);
        let pool = if workers > 1 {
            let pool = ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("eval-worker-{i}"))
                .build()
                .map_err(|e| EvolutionError::WorkerPool(e.to_string()))?;
            Some(pool)
        } else {
            None
        };

        tracing::debug!(workers, "evaluation pool ready");
        Ok(Self { workers, pool })
    }

    /// Sequential pool evaluating on the calling thread
    pub fn sequential() -> Self {
        Self {
            workers: 1,
            pool: None,
        }
    }

    /// Configured worker count
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Evaluate every individual
    ///
    /// Returns only once every individual has a phenotype. Failed or panicking
    /// evaluations get [`SENTINEL_FITNESS`] and are listed in the report.
    pub fn evaluate<E>(&self, individuals: &mut [Individual], evaluator: &E) -> EvaluationReport
    where
        E: Evaluator + ?Sized,
    {
        self.evaluate_with_token(individuals, evaluator, &CancellationToken::new())
    }

    /// Evaluate every individual, skipping the evaluator for jobs taken after
    /// `token` was cancelled
    ///
    /// Skipped jobs count as failures with [`EvaluationError::Cancelled`].
    pub fn evaluate_with_token<E>(
        &self,
        individuals: &mut [Individual],
        evaluator: &E,
        token: &CancellationToken,
    ) -> EvaluationReport
    where
        E: Evaluator + ?Sized,
    {
        if individuals.is_empty() {
            return EvaluationReport::default();
        }

        let (outcomes, jobs_per_worker) = match &self.pool {
            Some(pool) => run_parallel(pool, self.workers, individuals, evaluator, token),
            None => run_sequential(individuals, evaluator, token),
        };

        assign_phenotypes(individuals, outcomes, jobs_per_worker)
    }
}

impl std::fmt::Debug for EvaluationPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationPool")
            .field("workers", &self.workers)
            .field("parallel", &self.pool.is_some())
            .finish()
    }
}

fn run_sequential<E>(
    individuals: &[Individual],
    evaluator: &E,
    token: &CancellationToken,
) -> (Vec<Option<Outcome>>, Vec<usize>)
where
    E: Evaluator + ?Sized,
{
    let outcomes = individuals
        .iter()
        .map(|individual| Some(run_job(&individual.genotype, evaluator, token)))
        .collect();
    (outcomes, vec![individuals.len()])
}

fn run_parallel<E>(
    pool: &ThreadPool,
    workers: usize,
    individuals: &[Individual],
    evaluator: &E,
    token: &CancellationToken,
) -> (Vec<Option<Outcome>>, Vec<usize>)
where
    E: Evaluator + ?Sized,
{
    let active = workers.min(individuals.len());

    let (job_tx, job_rx) = mpsc::sync_channel::<Job<'_>>(individuals.len());
    for (index, individual) in individuals.iter().enumerate() {
        // Capacity covers every job, so this never blocks.
        if job_tx.send((index, &individual.genotype)).is_err() {
            break;
        }
    }
    drop(job_tx);

    let job_rx = Mutex::new(job_rx);
    let (result_tx, result_rx) = mpsc::channel::<TaggedOutcome>();

    pool.scope(|scope| {
        for worker in 0..active {
            let result_tx = result_tx.clone();
            let job_rx = &job_rx;
            scope.spawn(move |_| worker_loop(worker, job_rx, &result_tx, evaluator, token));
        }
    });
    drop(result_tx);

    let mut outcomes: Vec<Option<Outcome>> = individuals.iter().map(|_| None).collect();
    let mut jobs_per_worker = vec![0; active];
    for tagged in result_rx {
        jobs_per_worker[tagged.worker] += 1;
        outcomes[tagged.index] = Some(tagged.outcome);
    }
    (outcomes, jobs_per_worker)
}

fn worker_loop<E>(
    worker: usize,
    jobs: &Mutex<Receiver<Job<'_>>>,
    results: &Sender<TaggedOutcome>,
    evaluator: &E,
    token: &CancellationToken,
) where
    E: Evaluator + ?Sized,
{
    loop {
        let next = jobs.lock().unwrap_or_else(PoisonError::into_inner).recv();
        let Ok((index, genotype)) = next else {
            // Queue closed and drained
            break;
        };

        let outcome = run_job(genotype, evaluator, token);
        if results
            .send(TaggedOutcome {
                index,
                worker,
                outcome,
            })
            .is_err()
        {
            break;
        }
    }
}

fn run_job<E>(genotype: &Genotype, evaluator: &E, token: &CancellationToken) -> Outcome
where
    E: Evaluator + ?Sized,
{
    if token.is_cancelled() {
        return Err(EvaluationError::Cancelled);
    }
    panic::catch_unwind(AssertUnwindSafe(|| evaluator.evaluate(genotype)))
        .unwrap_or_else(|payload| Err(EvaluationError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Write outcomes back by index; a missing outcome counts as cancelled
fn assign_phenotypes(
    individuals: &mut [Individual],
    outcomes: Vec<Option<Outcome>>,
    jobs_per_worker: Vec<usize>,
) -> EvaluationReport {
    let mut report = EvaluationReport {
        evaluated: 0,
        failures: Vec::new(),
        jobs_per_worker,
    };

    for (index, (individual, outcome)) in individuals.iter_mut().zip(outcomes).enumerate() {
        match outcome.unwrap_or(Err(EvaluationError::Cancelled)) {
            Ok(phenotype) => {
                individual.set_phenotype(phenotype);
                report.evaluated += 1;
            }
            Err(error) => {
                individual.set_phenotype(Phenotype::new(SENTINEL_FITNESS));
                report.failures.push(EvaluationFailure { index, error });
            }
        }
    }

    report
}
