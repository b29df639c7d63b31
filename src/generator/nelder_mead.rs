//! Nelder-Mead simplex generator.
//!
//! An ask/tell rendition of the downhill simplex method. The simplex holds
//! `n + 1` evaluated vertices; each iteration proposes one or more trial
//! points and moves on once all of them have results:
//!
//! - **Reflect** the worst vertex through the centroid of the others.
//! - **Expand** further if the reflection beat the best vertex.
//! - **Contract** (outside or inside) if the reflection was poor.
//! - **Shrink** every vertex towards the best if contraction failed too.
//!
//! # Configuration
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `initial_point` | defaults, else midpoints | First simplex vertex |
//! | `initial_step` | 0.05 | Offset of the other vertices, as a fraction of each domain width |
//!
//! Coefficients are fixed at reflection 1, expansion 2, contraction 0.5 and
//! shrink 0.5. Trial points are clamped to the variable domains.
//!
//! # Batches
//!
//! The natural batch is every unevaluated point of the current step: `n + 1`
//! for the initial simplex, one for reflection, expansion and contraction,
//! `n` for a shrink. [`capacity`](Generator::capacity) is that same number.
//! Asking again before the results arrive re-emits in-flight points with
//! their original identifiers.
//!
//! # Examples
//!
//! ```
//! use optgen::prelude::*;
//!
//! let schema = ProblemSchema::builder()
//!     .variable("x", -5.0, 5.0)
//!     .variable("y", -5.0, 5.0)
//!     .objective("f", Direction::Minimize)
//!     .build()?;
//! let mut generator = NelderMeadGenerator::builder()
//!     .initial_point(vec![3.0, -2.0])
//!     .initial_step(0.1)
//!     .build(schema)?;
//!
//! for _ in 0..200 {
//!     let mut points = generator.propose(None)?;
//!     for p in &mut points {
//!         let (x, y) = (p.get_f64("x").unwrap(), p.get_f64("y").unwrap());
//!         p.insert("f", (x - 1.0).powi(2) + (y + 0.5).powi(2));
//!     }
//!     generator.ingest(&points)?;
//! }
//!
//! let best = generator.best_point().unwrap();
//! assert!((best.get_f64("x").unwrap() - 1.0).abs() < 1e-3);
//! # Ok::<(), optgen::Error>(())
//! ```

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::point::Point;
use crate::schema::ProblemSchema;
use crate::types::{Direction, GeneratorState};

use super::common::{self, Fitness, Incumbent};
use super::{
    Capabilities, FieldPolicy, Generator, IdLedger, Lifecycle, check_compatibility,
    validate_results,
};

const NAME: &str = "NelderMeadGenerator";

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// An evaluated simplex vertex. `loss` is lower-is-better.
#[derive(Clone, Debug)]
struct Vertex {
    x: Vec<f64>,
    loss: f64,
}

/// A trial point of the current step.
#[derive(Clone, Debug)]
struct Slot {
    x: Vec<f64>,
    /// Set once the point has been proposed.
    id: Option<u64>,
    /// Set once a result for `id` has been ingested.
    loss: Option<f64>,
}

impl Slot {
    fn new(x: Vec<f64>) -> Self {
        Self {
            x,
            id: None,
            loss: None,
        }
    }

    fn is_pending(&self) -> bool {
        self.loss.is_none()
    }
}

#[derive(Clone, Debug)]
enum Stage {
    Initial,
    Reflect,
    Expand { reflected: Vertex },
    ContractOutside { reflected: Vertex },
    ContractInside,
    Shrink,
}

impl Stage {
    fn label(&self) -> &'static str {
        match self {
            Stage::Initial => "initial",
            Stage::Reflect => "reflect",
            Stage::Expand { .. } => "expand",
            Stage::ContractOutside { .. } => "contract_outside",
            Stage::ContractInside => "contract_inside",
            Stage::Shrink => "shrink",
        }
    }
}

/// Nelder-Mead simplex generator for a single continuous objective.
///
/// Requires exactly one `Minimize` or `Maximize` objective, only continuous
/// variables, and no constraints; [`NelderMeadGenerator::builder`] rejects
/// anything else with [`Error::SchemaCompatibility`].
///
/// Finalizing returns the best point ingested, or `None` if nothing was.
pub struct NelderMeadGenerator {
    schema: Arc<ProblemSchema>,
    objective: String,
    direction: Direction,
    bounds: Vec<(f64, f64)>,
    simplex: Vec<Vertex>,
    centroid: Vec<f64>,
    stage: Stage,
    slots: Vec<Slot>,
    iterations: usize,
    ledger: IdLedger,
    lifecycle: Lifecycle,
    incumbent: Incumbent,
}

impl NelderMeadGenerator {
    /// Creates a generator with the default starting point and step.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaCompatibility`] for unsupported schemas.
    pub fn new(schema: impl Into<Arc<ProblemSchema>>) -> Result<Self> {
        Self::builder().build(schema)
    }

    /// Creates a builder for configuring a `NelderMeadGenerator`.
    #[must_use]
    pub fn builder() -> NelderMeadGeneratorBuilder {
        NelderMeadGeneratorBuilder::new()
    }

    /// The best result ingested so far.
    #[must_use]
    pub fn best_point(&self) -> Option<&Point> {
        self.incumbent.point()
    }

    /// Number of completed simplex iterations.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    fn pending(&self) -> usize {
        self.slots.iter().filter(|s| s.is_pending()).count()
    }

    /// `centroid + t * (target - centroid)`, clamped to the domain.
    fn along(&self, target: &[f64], t: f64) -> Vec<f64> {
        let mut x: Vec<f64> = self
            .centroid
            .iter()
            .zip(target)
            .map(|(c, v)| c + t * (v - c))
            .collect();
        common::clamp_to_bounds(&mut x, &self.bounds);
        x
    }

    fn enter(&mut self, stage: Stage, points: Vec<Vec<f64>>) {
        trace_debug!(
            generator = NAME,
            stage = stage.label(),
            iteration = self.iterations,
            "simplex step"
        );
        self.stage = stage;
        self.slots = points.into_iter().map(Slot::new).collect();
    }

    /// Orders the simplex and proposes the reflection of its worst vertex.
    fn begin_iteration(&mut self) {
        self.simplex.sort_by(|a, b| a.loss.total_cmp(&b.loss));
        let n = self.simplex.len() - 1;
        let dims = self.bounds.len();

        let mut centroid = vec![0.0; dims];
        for vertex in &self.simplex[..n] {
            for (c, v) in centroid.iter_mut().zip(&vertex.x) {
                *c += v;
            }
        }
        #[allow(clippy::cast_precision_loss)]
        let scale = 1.0 / n as f64;
        centroid.iter_mut().for_each(|c| *c *= scale);
        self.centroid = centroid;

        let reflected = self.along(&self.simplex[n].x, -REFLECTION);
        self.enter(Stage::Reflect, vec![reflected]);
    }

    fn replace_worst(&mut self, vertex: Vertex) {
        if let Some(worst) = self.simplex.last_mut() {
            *worst = vertex;
        }
        self.iterations += 1;
        self.begin_iteration();
    }

    fn shrink(&mut self) {
        let best = self.simplex[0].x.clone();
        let points = self.simplex[1..]
            .iter()
            .map(|v| {
                best.iter()
                    .zip(&v.x)
                    .map(|(b, x)| b + SHRINK * (x - b))
                    .collect()
            })
            .collect();
        self.enter(Stage::Shrink, points);
    }

    /// Consumes the completed step and sets up the next one.
    fn advance(&mut self) -> Result<()> {
        let mut evaluated: Vec<Vertex> = self
            .slots
            .drain(..)
            .map(|s| Vertex {
                x: s.x,
                loss: s.loss.unwrap_or(f64::INFINITY),
            })
            .collect();

        match core::mem::replace(&mut self.stage, Stage::Initial) {
            Stage::Initial => {
                self.simplex = evaluated;
                self.begin_iteration();
            }
            Stage::Shrink => {
                self.simplex.truncate(1);
                self.simplex.extend(evaluated);
                self.iterations += 1;
                self.begin_iteration();
            }
            stage => {
                let trial = evaluated
                    .pop()
                    .ok_or(Error::Internal("simplex step finished without a trial point"))?;
                self.settle(stage, trial);
            }
        }
        Ok(())
    }

    fn settle(&mut self, stage: Stage, trial: Vertex) {
        let n = self.simplex.len() - 1;
        let best = self.simplex[0].loss;
        let second_worst = self.simplex[n.saturating_sub(1)].loss;
        let worst = self.simplex[n].loss;

        match stage {
            Stage::Reflect => {
                if trial.loss < best {
                    let expanded = self.along(&trial.x, EXPANSION);
                    self.enter(Stage::Expand { reflected: trial }, vec![expanded]);
                } else if trial.loss < second_worst {
                    self.replace_worst(trial);
                } else if trial.loss < worst {
                    let contracted = self.along(&trial.x, CONTRACTION);
                    self.enter(Stage::ContractOutside { reflected: trial }, vec![contracted]);
                } else {
                    let contracted = self.along(&self.simplex[n].x, CONTRACTION);
                    self.enter(Stage::ContractInside, vec![contracted]);
                }
            }
            Stage::Expand { reflected } => {
                let keep = if trial.loss < reflected.loss {
                    trial
                } else {
                    reflected
                };
                self.replace_worst(keep);
            }
            Stage::ContractOutside { reflected } => {
                if trial.loss <= reflected.loss {
                    self.replace_worst(trial);
                } else {
                    self.shrink();
                }
            }
            Stage::ContractInside => {
                if trial.loss < worst {
                    self.replace_worst(trial);
                } else {
                    self.shrink();
                }
            }
            Stage::Initial | Stage::Shrink => {}
        }
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
                slot.loss = Some(fitness.loss);
            }
        }

        trace_info!(
            generator = NAME,
            received = points.len(),
            pending = self.pending(),
            "ingested results"
        );
        if self.pending() == 0 {
            self.advance()?;
        }
        Ok(())
    }
}

impl Generator for NelderMeadGenerator {
    fn name(&self) -> &'static str {
        NAME
    }

    fn schema(&self) -> &ProblemSchema {
        &self.schema
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::CONTINUOUS_SINGLE_OBJECTIVE
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

        // Fresh points first, then re-emit the ones already in flight.
        let fresh = (0..self.slots.len()).filter(|&i| self.slots[i].id.is_none());
        let in_flight = (0..self.slots.len())
            .filter(|&i| self.slots[i].id.is_some() && self.slots[i].is_pending());
        let order: Vec<usize> = fresh.chain(in_flight).take(count).collect();

        let mut points = Vec::with_capacity(count);
        for i in order {
            let id = match self.slots[i].id {
                Some(id) => id,
                None => {
                    let id = self.ledger.issue();
                    self.slots[i].id = Some(id);
                    id
                }
            };
            points.push(common::point_from_vector(&self.schema, &self.slots[i].x, id));
        }
        self.lifecycle.end();

        trace_debug!(
            generator = NAME,
            count,
            stage = self.stage.label(),
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

        trace_info!(
            generator = NAME,
            iterations = self.iterations,
            "finalized"
        );
        Ok(self.incumbent.point().map(|p| vec![p.clone()]))
    }
}

/// Builder for configuring a [`NelderMeadGenerator`].
///
/// Defaults:
/// - `initial_point`: each variable's default value, else its domain midpoint
/// - `initial_step`: 0.05
#[derive(Debug, Clone)]
pub struct NelderMeadGeneratorBuilder {
    initial_point: Option<Vec<f64>>,
    initial_step: f64,
}

impl Default for NelderMeadGeneratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NelderMeadGeneratorBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            initial_point: None,
            initial_step: 0.05,
        }
    }

    /// Sets the first simplex vertex, one value per variable in name order.
    #[must_use]
    pub fn initial_point(mut self, point: Vec<f64>) -> Self {
        self.initial_point = Some(point);
        self
    }

    /// Sets the offset of the remaining vertices as a fraction of each
    /// domain's width. Must lie in `(0, 1]`.
    #[must_use]
    pub fn initial_step(mut self, step: f64) -> Self {
        self.initial_step = step;
        self
    }

    /// Builds the generator for `schema`.
    ///
    /// # Errors
    ///
    /// - [`Error::SchemaCompatibility`] if the schema has constraints, more than
    ///   one objective, an `Explore` objective, or a discrete variable.
    /// - [`Error::InvalidConfig`] if `initial_step` is outside `(0, 1]` or
    ///   `initial_point` has the wrong length or leaves the domain.
    pub fn build(self, schema: impl Into<Arc<ProblemSchema>>) -> Result<NelderMeadGenerator> {
        let schema = schema.into();
        check_compatibility(NAME, &schema, Capabilities::CONTINUOUS_SINGLE_OBJECTIVE)?;
        let (objective, direction) = common::primary_objective(&schema)
            .ok_or(Error::Internal("compatible schema without a directed objective"))?;
        let bounds = common::continuous_bounds(&schema)?;

        if !(self.initial_step > 0.0 && self.initial_step <= 1.0) {
            return Err(Error::config(
                "initial_step",
                format!("must lie in (0, 1], got {}", self.initial_step),
            ));
        }
        let start = match self.initial_point {
            Some(x) => {
                if x.len() != bounds.len() {
                    return Err(Error::config(
                        "initial_point",
                        format!("expected {} values, got {}", bounds.len(), x.len()),
                    ));
                }
                let names = schema.variables().keys();
                for ((value, (lo, hi)), name) in x.iter().zip(&bounds).zip(names) {
                    if !(*lo..=*hi).contains(value) {
                        return Err(Error::config(
                            "initial_point",
                            format!("{value} for '{name}' is outside [{lo}, {hi}]"),
                        ));
                    }
                }
                x
            }
            None => common::default_vector(&schema),
        };

        let mut vertices = vec![start.clone()];
        for (i, (lo, hi)) in bounds.iter().enumerate() {
            let step = self.initial_step * (hi - lo);
            let mut x = start.clone();
            x[i] = if x[i] + step <= *hi {
                x[i] + step
            } else {
                x[i] - step
            };
            common::clamp_to_bounds(&mut x, &bounds);
            vertices.push(x);
        }

        trace_info!(
            generator = NAME,
            variables = bounds.len(),
            objective = objective.as_str(),
            "generator built"
        );
        let dims = bounds.len();
        let mut generator = NelderMeadGenerator {
            schema,
            objective,
            direction,
            bounds,
            simplex: Vec::with_capacity(dims + 1),
            centroid: vec![0.0; dims],
            stage: Stage::Initial,
            slots: Vec::new(),
            iterations: 0,
            ledger: IdLedger::new(),
            lifecycle: Lifecycle::new(),
            incumbent: Incumbent::default(),
        };
        generator.enter(Stage::Initial, vertices);
        Ok(generator)
    }
}
