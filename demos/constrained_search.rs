//! Constrained search with a mixed set of outputs.
//!
//! Minimizes material cost of a box with a minimum volume, records the
//! surface area as an observable, and prints each new optimum the random
//! generator reports along the way.
//!
//! Run with: `cargo run --example constrained_search`

use std::sync::Arc;

use optgen::prelude::*;

fn evaluate(point: &mut Point) {
    let (w, h, d) = (
        point.get_f64("width").unwrap_or_default(),
        point.get_f64("height").unwrap_or_default(),
        point.get_f64("depth").unwrap_or_default(),
    );
    let area = 2.0 * (w * h + w * d + h * d);
    let price = point.get_f64("price_per_m2").unwrap_or(1.0);
    point.insert("cost", area * price);
    point.insert("volume", w * h * d);
    point.insert("area", area);
}

fn main() -> optgen::Result<()> {
    let schema = Arc::new(
        ProblemSchema::builder()
            .variable("width", 0.1, 3.0)
            .variable("height", 0.1, 3.0)
            .variable("depth", 0.1, 3.0)
            .constant("price_per_m2", 12.5)
            .objective("cost", Direction::Minimize)
            .constraint("volume", Constraint::GreaterThan(1.0))
            .observable("area")
            .build()?,
    );

    let mut random = RandomGenerator::builder()
        .batch_size(25)
        .seed(7)
        .build(Arc::clone(&schema))?;
    for _ in 0..20 {
        let mut points = random.propose(None)?;
        points.iter_mut().for_each(evaluate);
        random.ingest(&points)?;
        for update in random.report_updates()? {
            println!(
                "random: new optimum #{} cost {:.3}",
                update.id().unwrap_or_default(),
                update.get_f64("cost").unwrap_or_default()
            );
        }
    }

    let mut de = DifferentialEvolutionGenerator::with_seed(Arc::clone(&schema), 7)?;
    for _ in 0..60 {
        let mut points = de.propose(None)?;
        points.iter_mut().for_each(evaluate);
        de.ingest(&points)?;
    }
    if let Some(best) = de.finalize(None)?.and_then(|mut v| v.pop()) {
        println!(
            "de: {:.3} x {:.3} x {:.3}, cost {:.3}, volume {:.3}",
            best.get_f64("width").unwrap_or_default(),
            best.get_f64("height").unwrap_or_default(),
            best.get_f64("depth").unwrap_or_default(),
            best.get_f64("cost").unwrap_or_default(),
            best.get_f64("volume").unwrap_or_default(),
        );
    }

    Ok(())
}
