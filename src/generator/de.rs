//! Differential Evolution (DE) generator.
//!
//! DE is a population-based metaheuristic that maintains a pool of candidate
//! solutions and creates new candidates through **mutation** (combining
//! difference vectors of existing members) and **binomial crossover**. A
//! trial vector replaces its target only if it does at least as well, so the
//! population never gets worse.
//!
//! # Algorithm overview
//!
//! The first generation is sampled uniformly from the domain. Each later
//! generation, for every population member *xᵢ*:
//! 1. **Mutation**: create a mutant vector *v* from other population
//!    members using the selected [`DifferentialEvolutionStrategy`]:
//!    - `Rand1`:  `v = x_r1 + F * (x_r2 - x_r3)`
//!    - `Best1`:  `v = x_best + F * (x_r1 - x_r2)`
//!    - `CurrentToBest1`:  `v = x_i + F * (x_best - x_i) + F * (x_r1 - x_r2)`
//! 2. **Crossover**: create a trial vector *u* by mixing *v* and *xᵢ*
//!    dimension-by-dimension with probability CR. One random dimension
//!    always comes from *v*.
//! 3. **Selection**: once every trial has a result, replace *xᵢ* with *u*
//!    if *u* is at least as good.
//!
//! # Constraints
//!
//! Results are compared with feasibility rules: a feasible result beats an
//! infeasible one, feasible results compare by objective, and infeasible
//! results compare by total constraint violation.
//!
//! # Configuration
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `population_size` | `max(10n, 15)` | Candidates per generation, at least 4 |
//! | `mutation_factor` (F) | 0.8 | Differential amplification, in `(0, 2]` |
//! | `crossover_rate` (CR) | 0.9 | Probability of taking a dimension from the mutant, in `[0, 1]` |
//! | `strategy` | `Rand1` | Mutation strategy (see [`DifferentialEvolutionStrategy`]) |
//! | `seed` | random | RNG seed for reproducibility |
//!
//! The natural batch is every unevaluated member of the current generation,
//! and [`capacity`](Generator::capacity) is that same number. Asking again
//! before results arrive re-emits in-flight members with their original
//! identifiers.
//!
//! # Examples
//!
//! ```
//! use optgen::generator::de::{DifferentialEvolutionGenerator, DifferentialEvolutionStrategy};
//! use optgen::prelude::*;
//!
//! let schema = ProblemSchema::builder()
//!     .variable("x", -3.0, 3.0)
//!     .variable("y", -3.0, 3.0)
//!     .objective("f", Direction::Minimize)
//!     .build()?;
//!
//! let mut generator = DifferentialEvolutionGenerator::builder()
//!     .population_size(20)
//!     .mutation_factor(0.7)
//!     .crossover_rate(0.9)
//!     .strategy(DifferentialEvolutionStrategy::Best1)
//!     .seed(42)
//!     .build(schema)?;
//!
//! let first = generator.propose(None)?;
//! assert_eq!(first.len(), 20);
//! # Ok::<(), optgen::Error>(())
//! ```

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::point::Point;
use crate::rng_util;
use crate::schema::ProblemSchema;
use crate::types::{Direction, GeneratorState};

use super::common::{self, Fitness, Incumbent};
use super::{
    Capabilities, FieldPolicy, Generator, IdLedger, Lifecycle, check_compatibility,
    validate_results,
};

const NAME: &str = "DifferentialEvolutionGenerator";

const CAPABILITIES: Capabilities = Capabilities {
    constraints: true,
    ..Capabilities::CONTINUOUS_SINGLE_OBJECTIVE
};

/// Differential Evolution mutation strategy.
///
/// Controls how mutant vectors are created from the current population.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DifferentialEvolutionStrategy {
    /// DE/rand/1: `v = x_r1 + F * (x_r2 - x_r3)`
    ///
    /// The most robust strategy. Uses three random population members.
    #[default]
    Rand1,
    /// DE/best/1: `v = x_best + F * (x_r1 - x_r2)`
    ///
    /// Greedier strategy that biases toward the current best solution.
    Best1,
    /// DE/current-to-best/1: `v = x_i + F * (x_best - x_i) + F * (x_r1 - x_r2)`
    ///
    /// Balances exploration and exploitation by blending the current
    /// individual with the best.
    CurrentToBest1,
}

/// An evaluated population member.
#[derive(Clone, Debug)]
struct Member {
    x: Vec<f64>,
    fitness: Fitness,
}

/// A candidate of the current generation. Slot `i` competes against
/// population member `i`.
#[derive(Clone, Debug)]
struct Slot {
    x: Vec<f64>,
    id: Option<u64>,
    fitness: Option<Fitness>,
}

impl Slot {
    fn new(x: Vec<f64>) -> Self {
        Self {
            x,
            id: None,
            fitness: None,
        }
    }

    fn is_pending(&self) -> bool {
        self.fitness.is_none()
    }
}

/// Differential Evolution generator for a single continuous objective.
///
/// Accepts constraints; rejects multiple objectives, `Explore` objectives,
/// and discrete variables with [`Error::SchemaCompatibility`].
///
/// Finalizing returns the best point ingested, or `None` if nothing was.
pub struct DifferentialEvolutionGenerator {
    schema: Arc<ProblemSchema>,
    objective: String,
    direction: Direction,
    bounds: Vec<(f64, f64)>,
    rng: fastrand::Rng,
    mutation_factor: f64,
    crossover_rate: f64,
    strategy: DifferentialEvolutionStrategy,
    population: Vec<Member>,
    best_idx: usize,
    slots: Vec<Slot>,
    generation: usize,
    ledger: IdLedger,
    lifecycle: Lifecycle,
    incumbent: Incumbent,
}

impl DifferentialEvolutionGenerator {
    /// Creates a DE generator with default settings and a random seed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaCompatibility`] for unsupported schemas.
    pub fn new(schema: impl Into<Arc<ProblemSchema>>) -> Result<Self> {
        Self::builder().build(schema)
    }

    /// Creates a DE generator with a fixed seed for reproducibility.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn with_seed(schema: impl Into<Arc<ProblemSchema>>, seed: u64) -> Result<Self> {
        Self::builder().seed(seed).build(schema)
    }

    /// Creates a builder for configuring a `DifferentialEvolutionGenerator`.
    #[must_use]
    pub fn builder() -> DifferentialEvolutionGeneratorBuilder {
        DifferentialEvolutionGeneratorBuilder::new()
    }

    /// The best result ingested so far.
    #[must_use]
    pub fn best_point(&self) -> Option<&Point> {
        self.incumbent.point()
    }

    /// Number of completed generations, counting the initial one.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Number of members per generation.
    #[must_use]
    pub fn population_size(&self) -> usize {
        self.slots.len()
    }

    fn pending(&self) -> usize {
        self.slots.iter().filter(|s| s.is_pending()).count()
    }

    fn create_mutant(&mut self, target: usize) -> Vec<f64> {
        let pop = &self.population;
        let weight = self.mutation_factor;
        let best = &pop[self.best_idx].x;
        let current = &pop[target].x;
        let dims = current.len();

        match self.strategy {
            DifferentialEvolutionStrategy::Rand1 => {
                let picks = rng_util::distinct_indices(&mut self.rng, pop.len(), 3, target);
                let (r1, r2, r3) = (&pop[picks[0]].x, &pop[picks[1]].x, &pop[picks[2]].x);
                (0..dims)
                    .map(|j| r1[j] + weight * (r2[j] - r3[j]))
                    .collect()
            }
            DifferentialEvolutionStrategy::Best1 => {
                let picks = rng_util::distinct_indices(&mut self.rng, pop.len(), 2, target);
                let (r1, r2) = (&pop[picks[0]].x, &pop[picks[1]].x);
                (0..dims)
                    .map(|j| best[j] + weight * (r1[j] - r2[j]))
                    .collect()
            }
            DifferentialEvolutionStrategy::CurrentToBest1 => {
                let picks = rng_util::distinct_indices(&mut self.rng, pop.len(), 2, target);
                let (r1, r2) = (&pop[picks[0]].x, &pop[picks[1]].x);
                (0..dims)
                    .map(|j| {
                        current[j] + weight * (best[j] - current[j]) + weight * (r1[j] - r2[j])
                    })
                    .collect()
            }
        }
    }

    /// Mutation plus binomial crossover for every member.
    fn trial_vectors(&mut self) -> Vec<Vec<f64>> {
        let dims = self.bounds.len();
        (0..self.population.len())
            .map(|i| {
                let mutant = self.create_mutant(i);
                let j_rand = self.rng.usize(0..dims);
                let mut trial: Vec<f64> = (0..dims)
                    .map(|j| {
                        if j == j_rand || self.rng.f64() < self.crossover_rate {
                            mutant[j]
                        } else {
                            self.population[i].x[j]
                        }
                    })
                    .collect();
                common::clamp_to_bounds(&mut trial, &self.bounds);
                trial
            })
            .collect()
    }

    fn refresh_best(&mut self) {
        self.best_idx = (1..self.population.len()).fold(0, |best, i| {
            if self.population[i].fitness.beats(&self.population[best].fitness)
                && !self.population[best].fitness.beats(&self.population[i].fitness)
            {
                i
            } else {
                best
            }
        });
    }

    /// Selects survivors from the completed generation and breeds the next.
    fn advance(&mut self) {
        let evaluated = self.slots.drain(..).map(|s| Member {
            x: s.x,
            fitness: s.fitness.unwrap_or(Fitness {
                loss: f64::INFINITY,
                violation: f64::INFINITY,
                feasible: false,
            }),
        });

        if self.population.is_empty() {
            self.population = evaluated.collect();
        } else {
            for (member, trial) in self.population.iter_mut().zip(evaluated) {
                if trial.fitness.beats(&member.fitness) {
                    *member = trial;
                }
            }
        }
        self.refresh_best();
        self.generation += 1;

        let trials = self.trial_vectors();
        self.slots = trials.into_iter().map(Slot::new).collect();

        trace_debug!(
            generator = NAME,
            generation = self.generation,
            best_loss = self.population[self.best_idx].fitness.loss,
            "generation complete"
        );
    }

    fn absorb(&mut self, points: &[Point]) -> Result<()> {
        validate_results(&self.schema, points, FieldPolicy::STRICT, &self.ledger)?;
        self.ledger.resolve_batch(points);

        for point in points {
            let fitness = Fitness::evaluate(&self.schema, &self.objective, self.direction, point);
            if self.incumbent.offer(point, fitness) {
                trace_debug!(generator = NAME, loss = fitness.loss, "new best point");
            }
            if let Some(id) = point.id()
                && let Some(slot) = self
                    .slots
                    .iter_mut()
                    .find(|s| s.id == Some(id) && s.is_pending())
            {
                slot.fitness = Some(fitness);
            }
        }

        trace_info!(
            generator = NAME,
            received = points.len(),
            pending = self.pending(),
            "ingested results"
        );
        if self.pending() == 0 {
            self.advance();
        }
        Ok(())
    }
}

impl Generator for DifferentialEvolutionGenerator {
    fn name(&self) -> &'static str {
        NAME
    }

    fn schema(&self) -> &ProblemSchema {
        &self.schema
    }

    fn capabilities(&self) -> Capabilities {
        CAPABILITIES
    }

    fn state(&self) -> GeneratorState {
        self.lifecycle.state()
    }

    fn outstanding(&self) -> Vec<u64> {
        self.ledger.outstanding()
    }

    fn capacity(&self) -> Option<usize> {
        Some(self.pending())
    }

    fn propose(&mut self, count: Option<usize>) -> Result<Vec<Point>> {
        self.lifecycle.begin(GeneratorState::Proposing)?;
        let pending = self.pending();
        let count = count.unwrap_or(pending);
        if let Err(err) = common::check_count(count, Some(pending)) {
            self.lifecycle.end();
            return Err(err);
        }

        let fresh = (0..self.slots.len()).filter(|&i| self.slots[i].id.is_none());
        let in_flight = (0..self.slots.len())
            .filter(|&i| self.slots[i].id.is_some() && self.slots[i].is_pending());
        let order: Vec<usize> = fresh.chain(in_flight).take(count).collect();

        let points = order
            .into_iter()
            .map(|i| {
                let id = *self.slots[i].id.get_or_insert_with(|| self.ledger.issue());
                common::point_from_vector(&self.schema, &self.slots[i].x, id)
            })
            .collect();
        self.lifecycle.end();

        trace_debug!(
            generator = NAME,
            count,
            generation = self.generation,
            "proposed points"
        );
        Ok(points)
    }

    fn ingest(&mut self, points: &[Point]) -> Result<()> {
        self.lifecycle.begin(GeneratorState::Ingesting)?;
        let result = self.absorb(points);
        self.lifecycle.end();
        result
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

        trace_info!(generator = NAME, generation = self.generation, "finalized");
        Ok(self.incumbent.point().map(|p| vec![p.clone()]))
    }
}

/// Builder for configuring a [`DifferentialEvolutionGenerator`].
///
/// Defaults:
/// - `population_size`: `max(10 * n_variables, 15)`
/// - `mutation_factor` (F): 0.8
/// - `crossover_rate` (CR): 0.9
/// - `strategy`: [`DifferentialEvolutionStrategy::Rand1`]
/// - `seed`: random
#[derive(Debug, Clone)]
pub struct DifferentialEvolutionGeneratorBuilder {
    population_size: Option<usize>,
    mutation_factor: f64,
    crossover_rate: f64,
    strategy: DifferentialEvolutionStrategy,
    seed: Option<u64>,
}

impl Default for DifferentialEvolutionGeneratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DifferentialEvolutionGeneratorBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            population_size: None,
            mutation_factor: 0.8,
            crossover_rate: 0.9,
            strategy: DifferentialEvolutionStrategy::default(),
            seed: None,
        }
    }

    /// Sets the number of members per generation. Must be at least 4.
    #[must_use]
    pub fn population_size(mut self, size: usize) -> Self {
        self.population_size = Some(size);
        self
    }

    /// Sets the mutation factor (F).
    ///
    /// Must lie in `(0, 2]`. Typical values are 0.5 to 1.0.
    #[must_use]
    pub fn mutation_factor(mut self, f: f64) -> Self {
        self.mutation_factor = f;
        self
    }

    /// Sets the crossover rate (CR).
    ///
    /// Must lie in `[0, 1]`.
    #[must_use]
    pub fn crossover_rate(mut self, cr: f64) -> Self {
        self.crossover_rate = cr;
        self
    }

    /// Sets the mutation strategy.
    #[must_use]
    pub fn strategy(mut self, strategy: DifferentialEvolutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets a random seed for reproducibility.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds the generator for `schema` and samples its first generation.
    ///
    /// # Errors
    ///
    /// - [`Error::SchemaCompatibility`] if the schema has more than one
    ///   objective, an `Explore` objective, or a discrete variable.
    /// - [`Error::InvalidConfig`] for a population below 4, a mutation
    ///   factor outside `(0, 2]`, or a crossover rate outside `[0, 1]`.
    pub fn build(
        self,
        schema: impl Into<Arc<ProblemSchema>>,
    ) -> Result<DifferentialEvolutionGenerator> {
        let schema = schema.into();
        check_compatibility(NAME, &schema, CAPABILITIES)?;
        let (objective, direction) = common::primary_objective(&schema)
            .ok_or(Error::Internal("compatible schema without a directed objective"))?;
        let bounds = common::continuous_bounds(&schema)?;

        let population_size = self
            .population_size
            .unwrap_or_else(|| (10 * bounds.len()).max(15));
        if population_size < 4 {
            return Err(Error::config(
                "population_size",
                format!("must be at least 4, got {population_size}"),
            ));
        }
        if !(self.mutation_factor > 0.0 && self.mutation_factor <= 2.0) {
            return Err(Error::config(
                "mutation_factor",
                format!("must lie in (0, 2], got {}", self.mutation_factor),
            ));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(Error::config(
                "crossover_rate",
                format!("must lie in [0, 1], got {}", self.crossover_rate),
            ));
        }

        let mut rng = self
            .seed
            .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        let slots = (0..population_size)
            .map(|_| {
                let x = bounds
                    .iter()
                    .map(|(lo, hi)| rng_util::f64_range(&mut rng, *lo, *hi))
                    .collect();
                Slot::new(x)
            })
            .collect();

        trace_info!(
            generator = NAME,
            variables = bounds.len(),
            population_size,
            "generator built"
        );
        Ok(DifferentialEvolutionGenerator {
            schema,
            objective,
            direction,
            bounds,
            rng,
            mutation_factor: self.mutation_factor,
            crossover_rate: self.crossover_rate,
            strategy: self.strategy,
            population: Vec::with_capacity(population_size),
            best_idx: 0,
            slots,
            generation: 0,
            ledger: IdLedger::new(),
            lifecycle: Lifecycle::new(),
            incumbent: Incumbent::default(),
        })
    }
}
