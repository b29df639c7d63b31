use optgen::prelude::*;

use crate::support::{drive, sphere};

fn schema(dims: usize) -> ProblemSchema {
    (0..dims)
        .fold(ProblemSchema::builder(), |b, i| {
            b.variable(format!("x{i}"), -4.0, 4.0)
        })
        .objective("f", Direction::Minimize)
        .build()
        .unwrap()
}

#[test]
fn minimizes_shifted_sphere() {
    let schema = schema(3);
    let mut generator = NelderMeadGenerator::new(schema.clone()).unwrap();
    drive(&mut generator, 600);
    let best = generator.best_point().unwrap();
    assert!(sphere(&schema, best) < 1e-4, "{best:?}");
}

#[test]
fn starts_from_default_values() {
    let schema = ProblemSchema::builder()
        .variable_with_default("x", 0.0, 10.0, 2.0)
        .variable("y", 0.0, 10.0)
        .objective("f", Direction::Minimize)
        .build()
        .unwrap();
    let mut generator = NelderMeadGenerator::new(schema).unwrap();
    let first = generator.propose(Some(1)).unwrap();
    assert_eq!(first[0].get_f64("x"), Some(2.0));
    assert_eq!(first[0].get_f64("y"), Some(5.0));
}

#[test]
fn natural_batch_shrinks_after_initial_simplex() {
    let schema = schema(4);
    let mut generator = NelderMeadGenerator::new(schema).unwrap();
    assert_eq!(generator.propose(None).unwrap().len(), 5);

    let mut generator = NelderMeadGenerator::new(crate::support::continuous_schema()).unwrap();
    drive(&mut generator, 1);
    assert_eq!(generator.propose(None).unwrap().len(), 1);
}

#[test]
fn results_may_arrive_in_pieces() {
    let schema = schema(2);
    let mut generator = NelderMeadGenerator::new(schema.clone()).unwrap();
    let mut points = generator.propose(None).unwrap();
    for p in &mut points {
        let value = sphere(&schema, p);
        p.insert("f", value);
    }
    generator.ingest(&points[2..]).unwrap();
    generator.ingest(&points[..1]).unwrap();
    assert_eq!(generator.iterations(), 0);
    assert_eq!(generator.capacity(), Some(1));
    generator.ingest(&points[1..2]).unwrap();
    assert_eq!(generator.capacity(), Some(1));
    assert!(generator.outstanding().is_empty());
}

#[test]
fn nan_objective_counts_as_worst() {
    let schema = schema(1);
    let mut generator = NelderMeadGenerator::new(schema).unwrap();
    let mut points = generator.propose(None).unwrap();
    points[0].insert("f", f64::NAN);
    points[1].insert("f", 1.0);
    generator.ingest(&points).unwrap();
    assert_eq!(generator.best_point(), Some(&points[1]));
}
