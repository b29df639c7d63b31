//! Random baseline generator.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::point::{OPTIMUM_KEY, Point};
use crate::rng_util;
use crate::schema::ProblemSchema;
use crate::types::{Direction, GeneratorState};

use super::common::{self, Fitness, Incumbent};
use super::{
    Capabilities, FieldPolicy, Generator, IdLedger, Lifecycle, check_compatibility,
    validate_results,
};

const NAME: &str = "RandomGenerator";

/// Default per-call proposal limit.
pub const DEFAULT_MAX_BATCH: usize = 1024;

/// A generator that samples every variable uniformly at random.
///
/// It ignores results when choosing points but keeps a history of every
/// feasible result and tracks the best one on the first objective that has a
/// direction. Each time an issued point becomes the new best,
/// [`report_updates`](Generator::report_updates) surfaces it once, annotated
/// with [`OPTIMUM_KEY`].
///
/// Handles every schema feature: discrete variables, constraints, multiple
/// and `Explore` objectives.
///
/// # Examples
///
/// ```
/// use optgen::prelude::*;
///
/// let schema = ProblemSchema::builder()
///     .variable("x", 0.0, 1.0)
///     .objective("f", Direction::Minimize)
///     .build()
///     .unwrap();
///
/// let mut generator = RandomGenerator::builder()
///     .seed(42)
///     .batch_size(4)
///     .max_batch(100)
///     .build(schema)
///     .unwrap();
///
/// assert_eq!(generator.propose(None).unwrap().len(), 4);
/// assert!(matches!(
///     generator.propose(Some(1000)),
///     Err(Error::Capacity { requested: 1000, available: 100 })
/// ));
/// ```
pub struct RandomGenerator {
    schema: Arc<ProblemSchema>,
    rng: fastrand::Rng,
    batch_size: usize,
    max_batch: usize,
    primary: Option<(String, Direction)>,
    ledger: IdLedger,
    lifecycle: Lifecycle,
    history: Vec<Point>,
    incumbent: Incumbent,
    updates: Vec<Point>,
}

impl RandomGenerator {
    /// Creates a random generator with default settings and a random seed.
    ///
    /// # Errors
    ///
    /// Never fails for a valid schema; returns `Result` for symmetry with
    /// the other generators.
    pub fn new(schema: impl Into<Arc<ProblemSchema>>) -> Result<Self> {
        Self::builder().build(schema)
    }

    /// Creates a random generator with a fixed seed for reproducibility.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn with_seed(schema: impl Into<Arc<ProblemSchema>>, seed: u64) -> Result<Self> {
        Self::builder().seed(seed).build(schema)
    }

    /// Creates a builder for configuring a `RandomGenerator`.
    #[must_use]
    pub fn builder() -> RandomGeneratorBuilder {
        RandomGeneratorBuilder::new()
    }

    /// Every feasible result ingested so far, in arrival order.
    #[must_use]
    pub fn history(&self) -> &[Point] {
        &self.history
    }

    /// The best feasible result on the primary objective.
    #[must_use]
    pub fn best_point(&self) -> Option<&Point> {
        self.incumbent.point()
    }

    fn sample(&mut self, count: usize) -> Vec<Point> {
        (0..count)
            .map(|_| {
                let values: Vec<_> = self
                    .schema
                    .variables()
                    .iter()
                    .map(|(name, var)| {
                        (name.clone(), rng_util::sample_variable(&mut self.rng, var))
                    })
                    .collect();
                let id = self.ledger.issue();
                common::point_from_values(&self.schema, values, id)
            })
            .collect()
    }

    fn absorb(&mut self, points: &[Point]) -> Result<()> {
        validate_results(&self.schema, points, FieldPolicy::STRICT, &self.ledger)?;
        self.ledger.resolve_batch(points);

        for point in points {
            if !self.schema.is_feasible(point) {
                continue;
            }
            self.history.push(point.clone());
            if let Some((objective, direction)) = &self.primary {
                let fitness = Fitness::evaluate(&self.schema, objective, *direction, point);
                if self.incumbent.offer(point, fitness) {
                    trace_debug!(generator = NAME, "new best point");
                    if point.id().is_some() {
                        self.updates.push(point.clone().with(OPTIMUM_KEY, true));
                    }
                }
            }
        }

        trace_info!(
            generator = NAME,
            received = points.len(),
            history = self.history.len(),
            "ingested results"
        );
        Ok(())
    }
}

impl Generator for RandomGenerator {
    fn name(&self) -> &'static str {
        NAME
    }

    fn schema(&self) -> &ProblemSchema {
        &self.schema
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::ALL
    }

    fn state(&self) -> GeneratorState {
        self.lifecycle.state()
    }

    fn outstanding(&self) -> Vec<u64> {
        self.ledger.outstanding()
    }

    fn capacity(&self) -> Option<usize> {
        Some(self.max_batch)
    }

    fn propose(&mut self, count: Option<usize>) -> Result<Vec<Point>> {
        self.lifecycle.begin(GeneratorState::Proposing)?;
        let count = count.unwrap_or(self.batch_size);
        let result = common::check_count(count, self.capacity()).map(|()| self.sample(count));
        self.lifecycle.end();

        trace_debug!(
            generator = NAME,
            count,
            outstanding = self.ledger.n_outstanding(),
            "proposed points"
        );
        result
    }

    fn ingest(&mut self, points: &[Point]) -> Result<()> {
        self.lifecycle.begin(GeneratorState::Ingesting)?;
        let result = self.absorb(points);
        self.lifecycle.end();
        result
    }

    fn report_updates(&mut self) -> Result<Vec<Point>> {
        self.lifecycle.ensure_live()?;
        Ok(core::mem::take(&mut self.updates))
    }

    fn finalize(&mut self, points: Option<&[Point]>) -> Result<Option<Vec<Point>>> {
        self.lifecycle.begin(GeneratorState::Ingesting)?;
        if let Some(points) = points
            && let Err(err) = self.absorb(points)
        {
            self.lifecycle.end();
            return Err(err);
        }
        self.lifecycle.finish();

        trace_info!(
            generator = NAME,
            history = self.history.len(),
            abandoned = self.ledger.n_outstanding(),
            "finalized"
        );
        Ok(Some(core::mem::take(&mut self.history)))
    }
}

/// Builder for configuring a [`RandomGenerator`].
///
/// Defaults:
/// - `seed`: random
/// - `batch_size`: 1 (points returned by `propose(None)`)
/// - `max_batch`: [`DEFAULT_MAX_BATCH`] (largest accepted `count`)
#[derive(Debug, Clone)]
pub struct RandomGeneratorBuilder {
    seed: Option<u64>,
    batch_size: usize,
    max_batch: usize,
}

impl Default for RandomGeneratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomGeneratorBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            seed: None,
            batch_size: 1,
            max_batch: DEFAULT_MAX_BATCH,
        }
    }

    /// Sets the random seed for reproducibility.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the natural batch size returned by `propose(None)`.
    #[must_use]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the largest `count` a single `propose` call accepts.
    #[must_use]
    pub fn max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = max_batch;
        self
    }

    /// Builds the generator for `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `batch_size` or `max_batch` is zero,
    /// or if `batch_size` exceeds `max_batch`.
    pub fn build(self, schema: impl Into<Arc<ProblemSchema>>) -> Result<RandomGenerator> {
        let schema = schema.into();
        check_compatibility(NAME, &schema, Capabilities::ALL)?;
        if self.max_batch == 0 {
            return Err(Error::config("max_batch", "must be positive"));
        }
        if self.batch_size == 0 {
            return Err(Error::config("batch_size", "must be positive"));
        }
        if self.batch_size > self.max_batch {
            return Err(Error::config(
                "batch_size",
                format!("{} exceeds max_batch {}", self.batch_size, self.max_batch),
            ));
        }

        trace_info!(
            generator = NAME,
            variables = schema.n_variables(),
            batch_size = self.batch_size,
            "generator built"
        );
        Ok(RandomGenerator {
            primary: common::primary_objective(&schema),
            schema,
            rng: self.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed),
            batch_size: self.batch_size,
            max_batch: self.max_batch,
            ledger: IdLedger::new(),
            lifecycle: Lifecycle::new(),
            history: Vec::new(),
            incumbent: Incumbent::default(),
            updates: Vec::new(),
        })
    }
}
