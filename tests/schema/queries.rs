use optgen::prelude::*;

fn schema() -> ProblemSchema {
    ProblemSchema::builder()
        .variable("x1", 0.0, 1.0)
        .variable("x2", -2.0, 2.0)
        .discrete_variable("mode", ["fast", "slow"])
        .constant("alpha", 0.5)
        .objective("cost", Direction::Minimize)
        .objective("yield", Direction::Maximize)
        .constraint("temp", Constraint::LessThan(100.0))
        .constraint("pressure", Constraint::Bounds(1.0, 2.0))
        .observable("log")
        .build()
        .unwrap()
}

#[test]
fn roles() {
    let schema = schema();
    assert_eq!(schema.role("x1"), Some(Role::Variable));
    assert_eq!(schema.role("mode"), Some(Role::Variable));
    assert_eq!(schema.role("alpha"), Some(Role::Constant));
    assert_eq!(schema.role("yield"), Some(Role::Objective));
    assert_eq!(schema.role("temp"), Some(Role::Constraint));
    assert_eq!(schema.role("log"), Some(Role::Observable));
    assert_eq!(schema.role("missing"), None);
    assert!(schema.contains("pressure"));
    assert!(!schema.contains(ID_KEY));
}

#[test]
fn names_and_counts() {
    let schema = schema();
    assert_eq!(schema.variable_names(), vec!["mode", "x1", "x2"]);
    assert_eq!(schema.constant_names(), vec!["alpha"]);
    assert_eq!(
        schema.output_names(),
        vec!["cost", "yield", "pressure", "temp", "log"]
    );
    assert_eq!(schema.n_inputs(), 4);
    assert_eq!(schema.n_outputs(), 5);
    assert_eq!(schema.all_names().len(), 9);
}

#[test]
fn bounds_cover_continuous_variables_only() {
    assert_eq!(schema().bounds(), vec![(0.0, 1.0), (-2.0, 2.0)]);
}

#[test]
fn feasibility_and_violation() {
    let schema = schema();
    let ok = Point::from([("temp", 50.0), ("pressure", 1.5)]);
    assert!(schema.is_feasible(&ok));
    assert_eq!(schema.total_violation(&ok), 0.0);

    let hot = Point::from([("temp", 120.0), ("pressure", 2.5)]);
    assert!(!schema.is_feasible(&hot));
    assert!((schema.total_violation(&hot) - 20.5).abs() < 1e-12);

    let missing = Point::from([("temp", 50.0)]);
    assert!(!schema.is_feasible(&missing));
    assert!(schema.total_violation(&missing).is_infinite());
}

#[test]
fn equality_uses_relative_tolerance() {
    let c = Constraint::EqualTo(1e12);
    assert!(c.check(1e12 + 1.0));
    assert!(!c.check(1e12 + 1e4));
    assert!(Constraint::EqualTo(0.0).check(1e-10));
}

#[test]
fn constant_point_holds_declared_values() {
    let point = schema().constant_point();
    assert_eq!(point.len(), 1);
    assert_eq!(point.get_f64("alpha"), Some(0.5));
}
