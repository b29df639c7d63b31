use optgen::generator::de::{DifferentialEvolutionGenerator, DifferentialEvolutionStrategy};
use optgen::prelude::*;

use crate::support::{drive, sphere};

#[test]
fn minimizes_shifted_sphere() {
    let schema = crate::support::continuous_schema();
    let mut generator = DifferentialEvolutionGenerator::builder()
        .strategy(DifferentialEvolutionStrategy::CurrentToBest1)
        .seed(42)
        .build(schema.clone())
        .unwrap();
    drive(&mut generator, 50);
    let best = generator.best_point().unwrap();
    assert!(sphere(&schema, best) < 1e-2, "{best:?}");
}

#[test]
fn maximizes_with_constraint() {
    // maximize x * y subject to x + y <= 4 on [0, 4]^2; optimum at (2, 2).
    let schema = ProblemSchema::builder()
        .variable("x", 0.0, 4.0)
        .variable("y", 0.0, 4.0)
        .objective("area", Direction::Maximize)
        .constraint("perimeter", Constraint::LessThan(4.0))
        .build()
        .unwrap();
    let mut generator = DifferentialEvolutionGenerator::with_seed(schema.clone(), 9).unwrap();
    for _ in 0..80 {
        let mut points = generator.propose(None).unwrap();
        for p in &mut points {
            let (x, y) = (p.get_f64("x").unwrap(), p.get_f64("y").unwrap());
            p.insert("area", x * y);
            p.insert("perimeter", x + y);
        }
        generator.ingest(&points).unwrap();
    }
    let best = generator.finalize(None).unwrap().unwrap().remove(0);
    assert!(schema.is_feasible(&best));
    assert!(best.get_f64("area").unwrap() > 3.95, "{best:?}");
}

#[test]
fn small_population_is_honored() {
    let schema = crate::support::continuous_schema();
    let mut generator = DifferentialEvolutionGenerator::builder()
        .population_size(4)
        .seed(1)
        .build(schema)
        .unwrap();
    assert_eq!(generator.propose(None).unwrap().len(), 4);
    assert_eq!(
        generator.propose(Some(5)),
        Err(Error::Capacity {
            requested: 5,
            available: 4
        })
    );
}

#[test]
fn explore_objectives_are_rejected() {
    let schema = ProblemSchema::builder()
        .variable("x", 0.0, 1.0)
        .objective("f", Direction::Explore)
        .build()
        .unwrap();
    let err = DifferentialEvolutionGenerator::new(schema).err().unwrap();
    assert!(err.to_string().contains("EXPLORE objective 'f'"), "{err}");
}
