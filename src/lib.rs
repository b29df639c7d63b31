#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! A portable contract between optimization algorithms and the code that
//! evaluates their proposals.
//!
//! A [`ProblemSchema`] declares an optimization problem once: its variables
//! and their domains, constants, objectives, constraints and observables. Any
//! [`Generator`](generator::Generator) built against that schema can then be
//! driven through the same ask/tell loop, so orchestration code never needs
//! to know which algorithm sits behind it.
//!
//! # Getting Started
//!
//! ```
//! use optgen::prelude::*;
//!
//! let schema = ProblemSchema::builder()
//!     .variable("x", -10.0, 10.0)
//!     .objective("f", Direction::Minimize)
//!     .build()?;
//! let mut generator = NelderMeadGenerator::new(schema)?;
//!
//! for _ in 0..100 {
//!     let mut points = generator.propose(None)?;
//!     for point in &mut points {
//!         let x = point.get_f64("x").unwrap();
//!         point.insert("f", (x - 3.0).powi(2));
//!     }
//!     generator.ingest(&points)?;
//! }
//!
//! let best = generator.finalize(None)?.unwrap();
//! println!("best: {:?}", best[0]);
//! # Ok::<(), optgen::Error>(())
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`ProblemSchema`] | Validated declaration of variables, constants, objectives, constraints and observables. |
//! | [`Point`] | A record of named [`Scalar`] fields exchanged with a generator. |
//! | [`Generator`](generator::Generator) | The propose / ingest / report updates / finalize protocol. |
//! | [`ID_KEY`] | Reserved field correlating results with the proposals they answer. |
//! | [`Direction`] | Whether an objective is minimized, maximized, or explored. |
//!
//! # Generators
//!
//! | Generator | Algorithm | Schema support |
//! |-----------|-----------|----------------|
//! | [`RandomGenerator`](generator::RandomGenerator) | Uniform random | Everything |
//! | [`NelderMeadGenerator`](generator::NelderMeadGenerator) | Simplex | One objective, continuous, unconstrained |
//! | [`DifferentialEvolutionGenerator`](generator::DifferentialEvolutionGenerator) | Differential Evolution | One objective, continuous, constrained |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `serde` | `Serialize`/`Deserialize` on [`Point`], [`Scalar`] and [`ProblemSchema`] | off |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) at key generator transitions | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

mod error;
pub mod generator;
mod point;
mod rng_util;
pub mod schema;
mod types;

pub use error::{Error, Result};
pub use point::{ID_KEY, OPTIMUM_KEY, Point, Scalar};
pub use schema::ProblemSchema;
pub use types::{Direction, GeneratorState};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use optgen::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::generator::{
        Capabilities, DifferentialEvolutionGenerator, DifferentialEvolutionStrategy, Generator,
        NelderMeadGenerator, RandomGenerator,
    };
    pub use crate::point::{ID_KEY, OPTIMUM_KEY, Point, Scalar};
    pub use crate::schema::{Constraint, ProblemSchema, Role, Variable};
    pub use crate::types::{Direction, GeneratorState};
}
