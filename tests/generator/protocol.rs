use std::sync::Arc;

use optgen::prelude::*;

use crate::support::{continuous_schema, evaluate, every_generator};

#[test]
fn generators_are_send() {
    fn assert_send<T: Send + ?Sized>() {}
    assert_send::<dyn Generator>();
    assert_send::<RandomGenerator>();
    assert_send::<NelderMeadGenerator>();
    assert_send::<DifferentialEvolutionGenerator>();
}

#[test]
fn new_generators_are_ready() {
    let schema = continuous_schema();
    for generator in every_generator(&schema) {
        assert_eq!(generator.state(), GeneratorState::Ready, "{}", generator.name());
        assert!(generator.outstanding().is_empty());
        assert_eq!(generator.schema(), &*schema);
    }
}

#[test]
fn propose_returns_exact_count() {
    let schema = continuous_schema();
    for count in 1..=3 {
        for mut generator in every_generator(&schema) {
            let points = generator.propose(Some(count)).unwrap();
            assert_eq!(points.len(), count, "{}", generator.name());
            assert_eq!(generator.outstanding().len(), count);
        }
    }
    for mut generator in every_generator(&schema) {
        assert_eq!(generator.propose(Some(0)), Err(Error::InvalidCount));
    }
}

#[test]
fn proposals_hold_variables_constants_and_id() {
    let schema = continuous_schema();
    for mut generator in every_generator(&schema) {
        let points = generator.propose(None).unwrap();
        assert!(!points.is_empty());
        for point in &points {
            for name in schema.variable_names() {
                assert!(schema.variables()[name].contains(point.get(name).unwrap()));
            }
            assert_eq!(point.get("label"), Some(&Scalar::from("lab-7")));
            assert_eq!(point.get("replicas"), Some(&Scalar::Int(3)));
            assert_eq!(point.get("scale"), Some(&Scalar::Float(0.25)));
            assert!(point.id().is_some());
            assert_eq!(point.len(), schema.n_inputs() + 1);
        }
    }
}

#[test]
fn capacity_error_changes_nothing() {
    let schema = continuous_schema();
    for mut generator in every_generator(&schema) {
        let first = generator.propose(Some(1)).unwrap();
        let before = generator.outstanding();
        let available = generator.capacity().unwrap();

        let err = generator.propose(Some(available + 1)).unwrap_err();
        assert_eq!(
            err,
            Error::Capacity {
                requested: available + 1,
                available
            },
            "{}",
            generator.name()
        );
        assert_eq!(generator.outstanding(), before);
        assert_eq!(generator.capacity(), Some(available));
        assert_eq!(generator.state(), GeneratorState::Ready);
        assert_eq!(first.len(), 1);
    }
}

#[test]
fn ingest_resolves_outstanding_identifiers() {
    let schema = continuous_schema();
    for mut generator in every_generator(&schema) {
        let mut points = generator.propose(Some(2)).unwrap();
        let ids: Vec<u64> = points.iter().map(|p| p.id().unwrap()).collect();
        assert!(ids[0] < ids[1]);
        assert_eq!(generator.outstanding(), ids);

        evaluate(&schema, &mut points[..1]);
        generator.ingest(&points[..1]).unwrap();
        assert_eq!(generator.outstanding(), vec![ids[1]], "{}", generator.name());
    }
}

#[test]
fn identifiers_are_never_reused() {
    let schema = continuous_schema();
    let mut generator = RandomGenerator::with_seed(Arc::clone(&schema), 4).unwrap();
    let mut seen = Vec::new();
    for _ in 0..5 {
        let mut points = generator.propose(Some(3)).unwrap();
        seen.extend(points.iter().map(|p| p.id().unwrap()));
        evaluate(&schema, &mut points);
        generator.ingest(&points).unwrap();
    }
    let mut sorted = seen.clone();
    sorted.dedup();
    assert_eq!(sorted, seen);
    assert!(seen.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn unknown_identifiers_reject_the_batch() {
    let schema = continuous_schema();
    for mut generator in every_generator(&schema) {
        let mut points = generator.propose(Some(2)).unwrap();
        evaluate(&schema, &mut points);
        let mut stray = points[0].clone();
        stray.insert(ID_KEY, 9_999_i64);
        let batch = vec![points[0].clone(), stray, points[1].clone()];

        assert_eq!(
            generator.ingest(&batch),
            Err(Error::UnknownIdentifier { indices: vec![1] })
        );
        assert_eq!(generator.outstanding().len(), 2, "{}", generator.name());

        generator.ingest(&points).unwrap();
        assert_eq!(
            generator.ingest(&points[..1]),
            Err(Error::UnknownIdentifier { indices: vec![0] })
        );
    }
}

#[test]
fn duplicate_identifier_in_batch_is_rejected() {
    let schema = continuous_schema();
    let mut generator = RandomGenerator::with_seed(Arc::clone(&schema), 2).unwrap();
    let mut points = generator.propose(Some(1)).unwrap();
    evaluate(&schema, &mut points);
    let batch = vec![points[0].clone(), points[0].clone()];
    assert_eq!(
        generator.ingest(&batch),
        Err(Error::UnknownIdentifier { indices: vec![1] })
    );
    assert_eq!(generator.outstanding().len(), 1);
}

#[test]
fn missing_objective_rejects_the_batch() {
    let schema = continuous_schema();
    for mut generator in every_generator(&schema) {
        let mut points = generator.propose(Some(2)).unwrap();
        evaluate(&schema, &mut points[..1]);
        assert_eq!(
            generator.ingest(&points),
            Err(Error::MissingField {
                index: 1,
                field: "f".into()
            })
        );
        assert_eq!(generator.outstanding().len(), 2, "{}", generator.name());
    }
}

#[test]
fn dropped_variable_rejects_the_batch() {
    let schema = continuous_schema();
    for mut generator in every_generator(&schema) {
        let mut points = generator.propose(Some(2)).unwrap();
        evaluate(&schema, &mut points);
        points[1].remove("y");
        assert_eq!(
            generator.ingest(&points),
            Err(Error::MissingField {
                index: 1,
                field: "y".into()
            }),
            "{}",
            generator.name()
        );
        assert_eq!(generator.outstanding().len(), 2);
    }
}

#[test]
fn constants_survive_every_round() {
    let schema = continuous_schema();
    for mut generator in every_generator(&schema) {
        for round in 0..12 {
            let mut points = generator.propose(None).unwrap();
            assert!(!points.is_empty());
            for point in &points {
                assert_eq!(
                    point.get("label"),
                    Some(&Scalar::from("lab-7")),
                    "{} round {round}",
                    generator.name()
                );
                assert_eq!(point.get("replicas"), Some(&Scalar::Int(3)));
                assert_eq!(point.get("scale"), Some(&Scalar::Float(0.25)));
                assert_eq!(point.len(), schema.n_inputs() + 1);
            }
            evaluate(&schema, &mut points);
            generator.ingest(&points).unwrap();
        }
    }
}

#[test]
fn non_numeric_objective_is_invalid() {
    let schema = continuous_schema();
    for mut generator in every_generator(&schema) {
        let mut points = generator.propose(Some(1)).unwrap();
        points[0].insert("f", "n/a");
        assert!(matches!(
            generator.ingest(&points),
            Err(Error::InvalidField { index: 0, .. })
        ));
    }
}

#[test]
fn external_results_are_accepted() {
    let schema = continuous_schema();
    for mut generator in every_generator(&schema) {
        let external = Point::from([("x", 1.0), ("y", 1.0), ("f", 0.0)]);
        generator.ingest(&[external]).unwrap();
        assert!(generator.outstanding().is_empty());
    }
}

#[test]
fn empty_batch_is_a_no_op() {
    let schema = continuous_schema();
    for mut generator in every_generator(&schema) {
        generator.propose(Some(1)).unwrap();
        generator.ingest(&[]).unwrap();
        assert_eq!(generator.outstanding().len(), 1);
    }
}

#[test]
fn updates_are_empty_without_support() {
    let schema = continuous_schema();
    for mut generator in every_generator(&schema) {
        let mut points = generator.propose(Some(1)).unwrap();
        evaluate(&schema, &mut points);
        generator.ingest(&points).unwrap();

        let updates = generator.report_updates().unwrap();
        if generator.supports_updates() {
            assert!(updates.iter().all(|p| p.id().is_some()));
        } else {
            assert!(updates.is_empty(), "{}", generator.name());
        }
        assert!(generator.report_updates().unwrap().is_empty());
    }
}

#[test]
fn finalize_is_terminal() {
    let schema = continuous_schema();
    for mut generator in every_generator(&schema) {
        let mut points = generator.propose(Some(1)).unwrap();
        evaluate(&schema, &mut points);
        assert!(generator.finalize(Some(&points)).unwrap().is_some());
        assert_eq!(generator.state(), GeneratorState::Finalized);

        assert_eq!(generator.propose(None), Err(Error::TerminalState));
        assert_eq!(generator.propose(Some(1)), Err(Error::TerminalState));
        assert_eq!(generator.ingest(&points), Err(Error::TerminalState));
        assert_eq!(generator.report_updates(), Err(Error::TerminalState));
        assert_eq!(generator.finalize(None), Err(Error::TerminalState));
        assert_eq!(generator.state(), GeneratorState::Finalized);
    }
}

#[test]
fn failed_finalize_leaves_generator_ready() {
    let schema = continuous_schema();
    for mut generator in every_generator(&schema) {
        let points = generator.propose(Some(1)).unwrap();
        assert!(matches!(
            generator.finalize(Some(&points)),
            Err(Error::MissingField { .. })
        ));
        assert_eq!(generator.state(), GeneratorState::Ready);
        assert_eq!(generator.outstanding().len(), 1);
        assert!(generator.propose(Some(1)).is_ok());
    }
}

#[test]
fn incompatible_schemas_are_rejected_at_construction() {
    let schema = Arc::new(
        ProblemSchema::builder()
            .variable("x", 0.0, 1.0)
            .objective("f", Direction::Minimize)
            .objective("g", Direction::Maximize)
            .build()
            .unwrap(),
    );
    assert!(RandomGenerator::new(Arc::clone(&schema)).is_ok());
    assert_eq!(
        NelderMeadGenerator::new(Arc::clone(&schema)).err(),
        Some(Error::SchemaCompatibility {
            generator: "NelderMeadGenerator",
            feature: "2 objectives".into()
        })
    );
    assert!(DifferentialEvolutionGenerator::new(schema).is_err());
}

#[test]
fn orchestration_loop_is_algorithm_agnostic() {
    let schema = continuous_schema();
    for mut generator in every_generator(&schema) {
        crate::support::drive(generator.as_mut(), 30);
        let summary = generator.finalize(None).unwrap().unwrap();
        assert!(!summary.is_empty(), "{}", generator.name());
    }
}
