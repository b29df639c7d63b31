//! Ask-and-ingest loop: the same orchestration code drives every generator.
//!
//! Points come out of `propose`, get evaluated however you like (workers,
//! simulations, lab equipment), and go back in through `ingest` carrying the
//! identifier they were issued with.
//!
//! Run with: `cargo run --example ask_and_ingest`

use std::sync::Arc;

use optgen::prelude::*;

fn himmelblau(x: f64, y: f64) -> f64 {
    (x * x + y - 11.0).powi(2) + (x + y * y - 7.0).powi(2)
}

fn run(generator: &mut dyn Generator, rounds: usize) -> optgen::Result<()> {
    for _ in 0..rounds {
        let mut points = generator.propose(None)?;
        for point in &mut points {
            let x = point.get_f64("x").unwrap_or_default();
            let y = point.get_f64("y").unwrap_or_default();
            point.insert("f", himmelblau(x, y));
        }
        generator.ingest(&points)?;
    }
    Ok(())
}

fn main() -> optgen::Result<()> {
    let schema = Arc::new(
        ProblemSchema::builder()
            .variable("x", -5.0, 5.0)
            .variable("y", -5.0, 5.0)
            .objective("f", Direction::Minimize)
            .build()?,
    );

    let mut generators: Vec<Box<dyn Generator>> = vec![
        Box::new(
            RandomGenerator::builder()
                .batch_size(20)
                .seed(42)
                .build(Arc::clone(&schema))?,
        ),
        Box::new(NelderMeadGenerator::new(Arc::clone(&schema))?),
        Box::new(DifferentialEvolutionGenerator::with_seed(
            Arc::clone(&schema),
            42,
        )?),
    ];

    for generator in &mut generators {
        run(generator.as_mut(), 40)?;
        let name = generator.name();
        let summary = generator.finalize(None)?.unwrap_or_default();
        let best = summary
            .iter()
            .filter_map(|p| p.get_f64("f").map(|f| (f, p)))
            .min_by(|a, b| a.0.total_cmp(&b.0));
        match best {
            Some((f, p)) => println!(
                "{name:>32}: f({:.4}, {:.4}) = {f:.6}",
                p.get_f64("x").unwrap_or_default(),
                p.get_f64("y").unwrap_or_default(),
            ),
            None => println!("{name:>32}: no results"),
        }
    }

    Ok(())
}
