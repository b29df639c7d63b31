use std::sync::Arc;

use optgen::prelude::*;

/// Two continuous variables, one constant of each kind, one objective.
pub(crate) fn continuous_schema() -> Arc<ProblemSchema> {
    Arc::new(
        ProblemSchema::builder()
            .variable("x", -5.0, 5.0)
            .variable("y", -5.0, 5.0)
            .constant("label", "lab-7")
            .constant("replicas", 3)
            .constant("scale", 0.25)
            .objective("f", Direction::Minimize)
            .build()
            .unwrap(),
    )
}

/// One generator of each kind, all built against `schema`.
pub(crate) fn every_generator(schema: &Arc<ProblemSchema>) -> Vec<Box<dyn Generator>> {
    vec![
        Box::new(RandomGenerator::with_seed(Arc::clone(schema), 1).unwrap()),
        Box::new(NelderMeadGenerator::new(Arc::clone(schema)).unwrap()),
        Box::new(DifferentialEvolutionGenerator::with_seed(Arc::clone(schema), 1).unwrap()),
    ]
}

/// Shifted sphere over every continuous variable.
pub(crate) fn sphere(schema: &ProblemSchema, point: &Point) -> f64 {
    schema
        .variables()
        .iter()
        .filter(|(_, v)| v.is_continuous())
        .map(|(name, _)| (point.get_f64(name).unwrap() - 1.0).powi(2))
        .sum()
}

/// Fills every objective with `sphere`, every constraint with 0, and every
/// observable with the evaluation count.
pub(crate) fn evaluate(schema: &ProblemSchema, points: &mut [Point]) {
    for (i, point) in points.iter_mut().enumerate() {
        let value = sphere(schema, point);
        for name in schema.objective_names() {
            point.insert(name, value);
        }
        for name in schema.constraint_names() {
            point.insert(name, 0.0);
        }
        for name in schema.observable_names() {
            point.insert(name, i as i64);
        }
    }
}

/// Proposes and evaluates `rounds` natural batches.
pub(crate) fn drive(generator: &mut dyn Generator, rounds: usize) {
    for _ in 0..rounds {
        let mut points = generator.propose(None).unwrap();
        let schema = generator.schema().clone();
        evaluate(&schema, &mut points);
        generator.ingest(&points).unwrap();
    }
}
