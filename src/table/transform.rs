//! Column transforms
//!
//! Pure functions from a [`TransformInput`] to a column value. Field access is
//! done through typed accessor functions bound when the schema is built.

use crate::error::{Error, Result};
use crate::resource::CloudFunction;
use crate::scope::Scope;
use serde_json::Value;
use std::fmt;

/// Reads one field of a function as JSON
pub type FieldFn = fn(&CloudFunction) -> Value;

/// Reads one string field of a function, if present
pub type StrFieldFn = fn(&CloudFunction) -> Option<&str>;

/// Prefix of the globally unique identifier of a function
pub const AKA_PREFIX: &str = "gcp://cloudfunctions.googleapis.com/";

/// Segment count of `projects/{p}/locations/{l}/functions/{f}`
const FUNCTION_NAME_SEGMENTS: usize = 6;
const LOCATION_SEGMENT: usize = 3;

/// Everything a transform may look at for one column of one row
#[derive(Debug, Clone, Copy)]
pub struct TransformInput<'a> {
    pub item: &'a CloudFunction,
    /// Result of the column's hydrator, if it has one
    pub hydrate: Option<&'a Value>,
    /// Output of the previous stage of a chain
    pub value: Option<&'a Value>,
    pub scope: &'a Scope,
}

pub enum Transform {
    /// Copy a field of the function
    Field(FieldFn),
    /// Copy the hydrate result verbatim
    HydrateValue,
    /// The project of the current query
    Project,
    /// A literal value
    Constant(Value),
    /// `prefix + field`, with a missing field read as ""
    Prefixed {
        prefix: &'static str,
        field: StrFieldFn,
    },
    /// Wrap the previous value in a one-element list
    IntoList,
    /// Split the previous value on `separator` and take segment `index`;
    /// the split must produce exactly `segments` parts
    Segment {
        separator: char,
        segments: usize,
        index: usize,
    },
    /// Run the first transform, then feed its output to the second
    Chain(Box<Transform>, Box<Transform>),
}

impl Transform {
    pub fn then(self, next: Transform) -> Transform {
        Transform::Chain(Box::new(self), Box::new(next))
    }

    /// Location segment of a fully-qualified function name
    pub fn location() -> Transform {
        Transform::Segment {
            separator: '/',
            segments: FUNCTION_NAME_SEGMENTS,
            index: LOCATION_SEGMENT,
        }
    }

    pub fn apply(&self, input: &TransformInput<'_>) -> Result<Value> {
        match self {
            Transform::Field(field) => Ok(field(input.item)),
            Transform::HydrateValue => Ok(input.hydrate.cloned().unwrap_or(Value::Null)),
            Transform::Project => Ok(Value::String(input.scope.project().to_string())),
            Transform::Constant(value) => Ok(value.clone()),
            Transform::Prefixed { prefix, field } => {
                let value = field(input.item).unwrap_or_default();
                Ok(Value::String(format!("{}{}", prefix, value)))
            }
            Transform::IntoList => Ok(Value::Array(vec![
                input.value.cloned().unwrap_or(Value::Null),
            ])),
            Transform::Segment {
                separator,
                segments,
                index,
            } => {
                let raw = match input.value {
                    None | Some(Value::Null) => "",
                    Some(Value::String(s)) => s.as_str(),
                    Some(other) => {
                        return Err(Error::Format(format!("expected a string, got {}", other)))
                    }
                };
                segment(raw, *separator, *segments, *index).map(Value::String)
            }
            Transform::Chain(first, second) => {
                let value = first.apply(input)?;
                let next = TransformInput {
                    item: input.item,
                    hydrate: input.hydrate,
                    value: Some(&value),
                    scope: input.scope,
                };
                second.apply(&next)
            }
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Field(_) => f.write_str("Field"),
            Transform::HydrateValue => f.write_str("HydrateValue"),
            Transform::Project => f.write_str("Project"),
            Transform::Constant(v) => write!(f, "Constant({})", v),
            Transform::Prefixed { prefix, .. } => write!(f, "Prefixed({:?})", prefix),
            Transform::IntoList => f.write_str("IntoList"),
            Transform::Segment {
                separator,
                segments,
                index,
            } => write!(f, "Segment({:?}, {}, {})", separator, segments, index),
            Transform::Chain(first, second) => write!(f, "{:?} -> {:?}", first, second),
        }
    }
}

/// Split `raw` on `separator`, require exactly `segments` parts, return part `index`
pub fn segment(raw: &str, separator: char, segments: usize, index: usize) -> Result<String> {
    let parts: Vec<&str> = raw.split(separator).collect();
    if parts.len() != segments || index >= segments {
        return Err(Error::Format(format!(
            "unexpected name format, expected {} '{}'-separated segments: {}",
            segments, separator, raw
        )));
    }
    Ok(parts[index].to_string())
}

/// Location of a function, from `projects/{p}/locations/{l}/functions/{f}`
pub fn location_from_function_name(name: &str) -> Result<String> {
    segment(name, '/', FUNCTION_NAME_SEGMENTS, LOCATION_SEGMENT)
}

/// Globally unique identifier of a function
pub fn function_aka(name: &str) -> String {
    format!("{}{}", AKA_PREFIX, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn function(name: &str) -> CloudFunction {
        CloudFunction {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn name_of(f: &CloudFunction) -> Option<&str> {
        Some(&f.name)
    }

    fn description_of(f: &CloudFunction) -> Option<&str> {
        f.description.as_deref()
    }

    #[test]
    fn test_location_from_name() {
        let loc =
            location_from_function_name("projects/p1/locations/us-central1/functions/hello-world")
                .unwrap();
        assert_eq!(loc, "us-central1");
    }

    #[test]
    fn test_location_bad_name() {
        let err = location_from_function_name("bad-name").unwrap_err();
        assert!(matches!(err, Error::Format(_)));
        assert!(err.to_string().contains("bad-name"));
    }

    #[test]
    fn test_location_too_many_segments() {
        let name = "projects/p1/locations/us-central1/functions/hello/extra";
        let err = location_from_function_name(name).unwrap_err();
        assert!(err.to_string().contains(name));
    }

    #[test]
    fn test_aka() {
        assert_eq!(
            function_aka("projects/p1/locations/us-central1/functions/hello-world"),
            "gcp://cloudfunctions.googleapis.com/projects/p1/locations/us-central1/functions/hello-world"
        );
    }

    #[test]
    fn test_chain_field_then_location() {
        let scope = Scope::new("p1");
        let f = function("projects/p1/locations/europe-west1/functions/fn");
        let input = TransformInput {
            item: &f,
            hydrate: None,
            value: None,
            scope: &scope,
        };

        let t = Transform::Field(|f| json!(f.name)).then(Transform::location());
        assert_eq!(t.apply(&input).unwrap(), json!("europe-west1"));
    }

    #[test]
    fn test_prefixed_tolerates_missing_field() {
        let scope = Scope::new("p1");
        let f = function("");
        let input = TransformInput {
            item: &f,
            hydrate: None,
            value: None,
            scope: &scope,
        };

        let t = Transform::Prefixed {
            prefix: AKA_PREFIX,
            field: description_of,
        };
        assert_eq!(t.apply(&input).unwrap(), json!(AKA_PREFIX));

        let akas = Transform::Prefixed {
            prefix: "x:",
            field: name_of,
        }
        .then(Transform::IntoList);
        assert_eq!(akas.apply(&input).unwrap(), json!(["x:"]));
    }

    #[test]
    fn test_project_and_constant_ignore_row() {
        let scope = Scope::new("project-aaa");
        let f = function("anything");
        let input = TransformInput {
            item: &f,
            hydrate: None,
            value: None,
            scope: &scope,
        };

        assert_eq!(Transform::Project.apply(&input).unwrap(), json!("project-aaa"));
        assert_eq!(
            Transform::Constant(json!(5)).apply(&input).unwrap(),
            json!(5)
        );
    }

    #[test]
    fn test_hydrate_value_verbatim() {
        let scope = Scope::new("p1");
        let f = function("x");
        let policy = json!({"bindings": [{"role": "roles/viewer", "members": ["user:a@b.c"]}]});
        let input = TransformInput {
            item: &f,
            hydrate: Some(&policy),
            value: None,
            scope: &scope,
        };
        assert_eq!(Transform::HydrateValue.apply(&input).unwrap(), policy);
    }

    #[test]
    fn test_segment_rejects_non_string() {
        let scope = Scope::new("p1");
        let f = function("x");
        let input = TransformInput {
            item: &f,
            hydrate: None,
            value: None,
            scope: &scope,
        };
        let t = Transform::Constant(json!(12)).then(Transform::location());
        assert!(matches!(t.apply(&input), Err(Error::Format(_))));
    }
}
