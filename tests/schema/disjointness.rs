use optgen::prelude::*;

fn base() -> optgen::schema::ProblemSchemaBuilder {
    ProblemSchema::builder()
        .variable("x", 0.0, 1.0)
        .objective("f", Direction::Minimize)
}

fn rejected_reason(builder: optgen::schema::ProblemSchemaBuilder) -> String {
    match builder.build() {
        Err(Error::SchemaValidation { reason, .. }) => reason,
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn name_shared_between_namespaces_is_rejected() {
    let cases = [
        base().constant("x", 1.0),
        base().observable("x"),
        base().constraint("f", Constraint::LessThan(0.0)),
        base().observable("f"),
        base().constant("c", 1.0).constraint("c", Constraint::GreaterThan(0.0)),
        base().objective("x", Direction::Maximize),
    ];
    for builder in cases {
        let reason = rejected_reason(builder);
        assert!(reason.contains("declared in both"), "{reason}");
    }
}

#[test]
fn name_repeated_within_namespace_is_rejected() {
    let reason = rejected_reason(base().variable("x", 0.0, 2.0));
    assert_eq!(reason, "declared twice in variables");

    let reason = rejected_reason(base().observable("o").observable("o"));
    assert_eq!(reason, "declared twice in observables");
}

#[test]
fn every_name_has_exactly_one_role() {
    let schema = base()
        .constant("k", 1)
        .constraint("c", Constraint::LessThan(0.0))
        .observable("o")
        .build()
        .unwrap();
    let names = schema.all_names();
    assert_eq!(names.len(), 5);
    for name in names {
        assert!(schema.role(name).is_some());
    }
}
