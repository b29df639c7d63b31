//! Serialized form of [`ProblemSchema`].
//!
//! Deserialization goes through the builder so every validation rule runs.
//! Accepted shapes:
//!
//! ```json
//! {
//!   "variables": {"x": [0.0, 1.0], "y": {"domain": [-5.0, 5.0], "default_value": 0.0},
//!                 "z": ["a", "b", "c"], "k": {"values": [1, 2]},
//!                 "w": {"type": "ContinuousVariable", "domain": [0.0, 2.0]}},
//!   "objectives": {"f": "MINIMIZE"},
//!   "constraints": {"c": ["LESS_THAN", 1.0], "d": ["BOUNDS", [0.0, 1.0]]},
//!   "constants": {"alpha": 1.0},
//!   "observables": ["temp"]
//! }
//! ```
//!
//! A bare list is a discrete domain, except that a list of exactly two numbers
//! is always read as a continuous `[low, high]` domain. Write a two-number
//! discrete domain as `{"values": [a, b]}`; serialization always does.
//!
//! Observables may also be a map from name to a dtype string or to
//! `{"type": "Observable", "dtype": ...}`. Dtype annotations are accepted but
//! not kept.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Constraint, ProblemSchema, Variable};
use crate::error::Error;
use crate::point::Scalar;

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct SchemaDef {
    variables: BTreeMap<String, VariableDef>,
    #[serde(default)]
    objectives: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    constraints: BTreeMap<String, Vec<ConstraintArg>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    constants: BTreeMap<String, Scalar>,
    #[serde(default, skip_serializing_if = "ObservablesDef::is_empty")]
    observables: ObservablesDef,
}

// Variant order matters: `[low, high]` must win over a two-element list.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum VariableDef {
    Domain([f64; 2]),
    List(Vec<Scalar>),
    Typed(TypedVariable),
    Detailed(DetailedDomain),
    Values(ValueSet),
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct DetailedDomain {
    domain: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_value: Option<f64>,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ValueSet {
    values: Vec<Scalar>,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", deny_unknown_fields)]
enum TypedVariable {
    ContinuousVariable {
        domain: [f64; 2],
        #[serde(default)]
        default_value: Option<f64>,
        #[serde(default)]
        dtype: Option<String>,
    },
    DiscreteVariable {
        values: Vec<Scalar>,
        #[serde(default)]
        dtype: Option<String>,
    },
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ObservablesDef {
    Names(Vec<String>),
    Typed(BTreeMap<String, ObservableDef>),
}

impl Default for ObservablesDef {
    fn default() -> Self {
        ObservablesDef::Names(Vec::new())
    }
}

impl ObservablesDef {
    fn is_empty(&self) -> bool {
        match self {
            ObservablesDef::Names(names) => names.is_empty(),
            ObservablesDef::Typed(map) => map.is_empty(),
        }
    }

    fn into_names(self) -> Vec<String> {
        match self {
            ObservablesDef::Names(names) => names,
            ObservablesDef::Typed(map) => map.into_keys().collect(),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ObservableDef {
    Dtype(String),
    Typed(TypedObservable),
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", deny_unknown_fields)]
enum TypedObservable {
    Observable {
        #[serde(default)]
        dtype: Option<String>,
    },
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ConstraintArg {
    Tag(String),
    Number(f64),
    Range([f64; 2]),
}

impl From<VariableDef> for Variable {
    fn from(def: VariableDef) -> Self {
        match def {
            VariableDef::Domain([low, high]) => Variable::continuous(low, high),
            VariableDef::Detailed(DetailedDomain {
                domain: [low, high],
                default_value,
            })
            | VariableDef::Typed(TypedVariable::ContinuousVariable {
                domain: [low, high],
                default_value,
                ..
            }) => Variable::Continuous {
                low,
                high,
                default_value,
            },
            VariableDef::List(values)
            | VariableDef::Values(ValueSet { values })
            | VariableDef::Typed(TypedVariable::DiscreteVariable { values, .. }) => {
                Variable::Discrete { values }
            }
        }
    }
}

impl From<&Variable> for VariableDef {
    fn from(var: &Variable) -> Self {
        match var {
            Variable::Continuous {
                low,
                high,
                default_value: None,
            } => VariableDef::Domain([*low, *high]),
            Variable::Continuous {
                low,
                high,
                default_value,
            } => VariableDef::Detailed(DetailedDomain {
                domain: [*low, *high],
                default_value: *default_value,
            }),
            Variable::Discrete { values } => VariableDef::Values(ValueSet {
                values: values.clone(),
            }),
        }
    }
}

fn parse_constraint(name: &str, args: &[ConstraintArg]) -> Result<Constraint, Error> {
    let Some((ConstraintArg::Tag(tag), rest)) = args.split_first() else {
        return Err(Error::schema(
            name,
            "constraint must start with a type string",
        ));
    };
    let mut numbers = Vec::with_capacity(2);
    for arg in rest {
        match arg {
            ConstraintArg::Number(v) => numbers.push(*v),
            ConstraintArg::Range([lo, hi]) => numbers.extend([*lo, *hi]),
            ConstraintArg::Tag(_) => {
                return Err(Error::schema(
                    name,
                    "constraint arguments must be numbers",
                ));
            }
        }
    }
    Constraint::parse(name, tag, &numbers)
}

impl TryFrom<SchemaDef> for ProblemSchema {
    type Error = Error;

    fn try_from(def: SchemaDef) -> Result<Self, Self::Error> {
        let mut builder = ProblemSchema::builder();
        for (name, var) in def.variables {
            builder = builder.variable_domain(name, var.into());
        }
        for (name, tag) in def.objectives {
            let direction = tag.parse().map_err(|_| {
                Error::schema(
                    name.as_str(),
                    format!("objective type '{tag}' is not supported"),
                )
            })?;
            builder = builder.objective(name, direction);
        }
        for (name, args) in def.constraints {
            let constraint = parse_constraint(&name, &args)?;
            builder = builder.constraint(name, constraint);
        }
        for (name, value) in def.constants {
            builder = builder.constant(name, value);
        }
        for name in def.observables.into_names() {
            builder = builder.observable(name);
        }
        builder.build()
    }
}

impl From<ProblemSchema> for SchemaDef {
    fn from(schema: ProblemSchema) -> Self {
        SchemaDef {
            variables: schema
                .variables
                .iter()
                .map(|(k, v)| (k.clone(), v.into()))
                .collect(),
            objectives: schema
                .objectives
                .iter()
                .map(|(k, d)| (k.clone(), d.as_str().to_owned()))
                .collect(),
            constraints: schema
                .constraints
                .iter()
                .map(|(k, c)| {
                    let mut args = vec![ConstraintArg::Tag(c.tag().to_owned())];
                    args.extend(c.args().into_iter().map(ConstraintArg::Number));
                    (k.clone(), args)
                })
                .collect(),
            constants: schema.constants,
            observables: ObservablesDef::Names(schema.observables.into_iter().collect()),
        }
    }
}
