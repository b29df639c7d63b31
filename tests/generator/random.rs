use std::sync::Arc;

use optgen::prelude::*;

use crate::support::evaluate;

fn scenario_schema() -> Arc<ProblemSchema> {
    Arc::new(
        ProblemSchema::builder()
            .variable("x1", 0.0, 1.0)
            .variable("x2", 0.0, 10.0)
            .objective("y1", Direction::Minimize)
            .constraint("c1", Constraint::GreaterThan(0.5))
            .constant("a", "dummy_constant")
            .build()
            .unwrap(),
    )
}

#[test]
fn ask_then_over_ask() {
    let mut generator = RandomGenerator::builder()
        .seed(42)
        .max_batch(100)
        .build(scenario_schema())
        .unwrap();

    let points = generator.propose(Some(3)).unwrap();
    assert_eq!(points.len(), 3);
    for p in &points {
        assert!((0.0..=1.0).contains(&p.get_f64("x1").unwrap()));
        assert!((0.0..=10.0).contains(&p.get_f64("x2").unwrap()));
        assert_eq!(p.get("a"), Some(&Scalar::from("dummy_constant")));
        assert!(p.id().is_some());
    }

    assert_eq!(
        generator.propose(Some(1000)),
        Err(Error::Capacity {
            requested: 1000,
            available: 100
        })
    );
    assert_eq!(generator.outstanding().len(), 3);
}

#[test]
fn default_limit_is_1024() {
    let mut generator = RandomGenerator::with_seed(scenario_schema(), 1).unwrap();
    assert_eq!(generator.capacity(), Some(1024));
    assert_eq!(generator.propose(Some(1024)).unwrap().len(), 1024);
    assert!(generator.propose(Some(1025)).is_err());
}

#[test]
fn natural_batch_follows_batch_size() {
    let mut generator = RandomGenerator::builder()
        .batch_size(7)
        .seed(0)
        .build(scenario_schema())
        .unwrap();
    assert_eq!(generator.propose(None).unwrap().len(), 7);
}

#[test]
fn history_keeps_feasible_results_only() {
    let schema = scenario_schema();
    let mut generator = RandomGenerator::with_seed(Arc::clone(&schema), 5).unwrap();
    let mut points = generator.propose(Some(4)).unwrap();
    evaluate(&schema, &mut points);
    for (i, p) in points.iter_mut().enumerate() {
        p.insert("c1", if i % 2 == 0 { 1.0 } else { 0.0 });
    }
    generator.ingest(&points).unwrap();
    assert_eq!(generator.history().len(), 2);

    let history = generator.finalize(None).unwrap().unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|p| schema.is_feasible(p)));
}

#[test]
fn constraint_values_are_required() {
    let schema = scenario_schema();
    let mut generator = RandomGenerator::with_seed(Arc::clone(&schema), 5).unwrap();
    let mut points = generator.propose(Some(1)).unwrap();
    points[0].insert("y1", 1.0);
    assert_eq!(
        generator.ingest(&points),
        Err(Error::MissingField {
            index: 0,
            field: "c1".into()
        })
    );
}

#[test]
fn observables_are_required() {
    let schema = ProblemSchema::builder()
        .variable("x", 0.0, 1.0)
        .objective("f", Direction::Minimize)
        .observable("wall_time")
        .build()
        .unwrap();
    let mut generator = RandomGenerator::with_seed(schema, 5).unwrap();
    let mut points = generator.propose(Some(1)).unwrap();
    points[0].insert("f", 1.0);
    assert!(matches!(
        generator.ingest(&points),
        Err(Error::MissingField { ref field, .. }) if field == "wall_time"
    ));
    points[0].insert("wall_time", "12s");
    generator.ingest(&points).unwrap();
}

#[test]
fn updates_report_each_new_optimum() {
    let schema = ProblemSchema::builder()
        .variable("x", 0.0, 1.0)
        .objective("f", Direction::Maximize)
        .build()
        .unwrap();
    let mut generator = RandomGenerator::with_seed(schema, 8).unwrap();
    assert!(generator.supports_updates());

    let mut points = generator.propose(Some(3)).unwrap();
    for (p, f) in points.iter_mut().zip([1.0, 3.0, 2.0]) {
        p.insert("f", f);
    }
    generator.ingest(&points).unwrap();

    let updates = generator.report_updates().unwrap();
    let ids: Vec<u64> = updates.iter().map(|p| p.id().unwrap()).collect();
    assert_eq!(ids, vec![points[0].id().unwrap(), points[1].id().unwrap()]);
    assert!(
        updates
            .iter()
            .all(|p| p.get(OPTIMUM_KEY) == Some(&Scalar::Bool(true)))
    );
    assert_eq!(generator.best_point(), Some(&points[1]));
    assert!(generator.report_updates().unwrap().is_empty());
}

#[test]
fn discrete_and_explore_schemas_work() {
    let schema = ProblemSchema::builder()
        .discrete_variable("solver", ["lbfgs", "adam"])
        .discrete_variable("layers", [1, 2, 4])
        .objective("coverage", Direction::Explore)
        .build()
        .unwrap();
    let mut generator = RandomGenerator::with_seed(schema.clone(), 3).unwrap();
    let mut points = generator.propose(Some(20)).unwrap();
    for p in &mut points {
        assert!(schema.variables()["solver"].contains(p.get("solver").unwrap()));
        assert!(schema.variables()["layers"].contains(p.get("layers").unwrap()));
        p.insert("coverage", 0.0);
    }
    generator.ingest(&points).unwrap();
    assert_eq!(generator.history().len(), 20);
    assert!(generator.best_point().is_none());
    assert!(generator.report_updates().unwrap().is_empty());
}
