//! Schema descriptor
//!
//! Column declarations: name, declared type, description, the transform that
//! produces the value and the hydrator (if any) whose result it consumes.

use super::hydrate::{Hydrator, RowContext};
use super::transform::{Transform, TransformInput};
use crate::error::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

pub const DESCRIPTION_TITLE: &str = "Title of the resource.";
pub const DESCRIPTION_TAGS: &str = "A map of tags for the resource.";
pub const DESCRIPTION_AKAS: &str =
    "Array of globally unique identifier strings (also known as) for the resource.";
pub const DESCRIPTION_PROJECT: &str = "The GCP Project in which the resource is located.";
pub const DESCRIPTION_LOCATION: &str =
    "The GCP multi-region, region, or zone in which the resource is located.";

/// Declared column type, as reported to the query engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Int,
    Double,
    Bool,
    Timestamp,
    Json,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "STRING",
            ColumnType::Int => "INT",
            ColumnType::Double => "DOUBLE",
            ColumnType::Bool => "BOOL",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Json => "JSON",
        }
    }

    /// Coerce a transformed value to this type's canonical JSON form.
    /// Null stays null; anything that cannot be represented is a format error.
    pub fn normalize(&self, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(value);
        }

        match self {
            ColumnType::Json => Ok(value),
            ColumnType::String => match value {
                Value::String(_) => Ok(value),
                Value::Number(n) => Ok(Value::String(n.to_string())),
                Value::Bool(b) => Ok(Value::String(b.to_string())),
                other => Err(mismatch(self, &other)),
            },
            ColumnType::Int => match &value {
                Value::Number(n) if n.is_i64() => Ok(value),
                Value::String(s) => s
                    .parse::<i64>()
                    .map(Value::from)
                    .map_err(|_| mismatch(self, &value)),
                _ => Err(mismatch(self, &value)),
            },
            ColumnType::Double => match &value {
                Value::Number(_) => Ok(value),
                Value::String(s) => s
                    .parse::<f64>()
                    .map(Value::from)
                    .map_err(|_| mismatch(self, &value)),
                _ => Err(mismatch(self, &value)),
            },
            ColumnType::Bool => match &value {
                Value::Bool(_) => Ok(value),
                _ => Err(mismatch(self, &value)),
            },
            ColumnType::Timestamp => match &value {
                Value::String(s) => DateTime::parse_from_rfc3339(s)
                    .map(|t| {
                        Value::String(
                            t.with_timezone(&Utc)
                                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
                        )
                    })
                    .map_err(|_| mismatch(self, &value)),
                _ => Err(mismatch(self, &value)),
            },
        }
    }
}

fn mismatch(column_type: &ColumnType, value: &Value) -> Error {
    Error::Format(format!("cannot read {} as {}", value, column_type.as_str()))
}

/// One column of a table
#[derive(Debug)]
pub struct Column {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub description: &'static str,
    pub nullable: bool,
    pub hydrate: Option<Hydrator>,
    pub transform: Transform,
    /// Substituted when the transform yields null
    pub default: Option<Value>,
}

impl Column {
    pub fn new(
        name: &'static str,
        column_type: ColumnType,
        description: &'static str,
        transform: Transform,
    ) -> Self {
        Self {
            name,
            column_type,
            description,
            nullable: true,
            hydrate: None,
            transform,
            default: None,
        }
    }

    /// Bind this column to a hydrator; its transform then sees the hydrate result
    pub fn hydrate(mut self, hydrator: Hydrator) -> Self {
        self.hydrate = Some(hydrator);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Static value used when the source field is absent
    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Resolve this column for one row
    pub async fn resolve(&self, ctx: &RowContext<'_>) -> Result<Value> {
        let hydrated = match self.hydrate {
            Some(hydrator) => Some(ctx.hydrate(hydrator).await?),
            None => None,
        };

        let input = TransformInput {
            item: ctx.item(),
            hydrate: hydrated,
            value: None,
            scope: ctx.scope(),
        };

        let value = self
            .transform
            .apply(&input)
            .map(|v| match &self.default {
                Some(default) if v.is_null() => default.clone(),
                _ => v,
            })
            .and_then(|v| self.column_type.normalize(v))
            .map_err(|e| match e {
                Error::Format(msg) => Error::Format(format!("column '{}': {}", self.name, msg)),
                other => other,
            })?;

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcp::auth::GcpCredentials;
    use crate::gcp::client::GcpClient;
    use crate::resource::CloudFunction;
    use crate::scope::Scope;
    use serde_json::json;

    fn runtime_column() -> Column {
        Column::new(
            "runtime",
            ColumnType::String,
            "",
            Transform::Field(|f| json!(f.runtime)),
        )
    }

    async fn resolve(column: &Column, item: CloudFunction) -> Result<Value> {
        let client = GcpClient::with_credentials(
            GcpCredentials::from_static_token("t"),
            Some("http://127.0.0.1:9/v1/"),
        )
        .unwrap();
        let scope = Scope::new("p1");
        let ctx = RowContext::new(item, &client, &scope);
        column.resolve(&ctx).await
    }

    #[tokio::test]
    async fn test_default_fills_missing_value() {
        let column = runtime_column().default(json!("unknown"));
        let value = resolve(&column, CloudFunction::default()).await.unwrap();
        assert_eq!(value, json!("unknown"));
    }

    #[tokio::test]
    async fn test_default_leaves_present_value() {
        let column = runtime_column().default(json!("unknown"));
        let item = CloudFunction {
            runtime: Some("go122".into()),
            ..Default::default()
        };
        assert_eq!(resolve(&column, item).await.unwrap(), json!("go122"));
        assert_eq!(
            resolve(&runtime_column(), CloudFunction::default()).await.unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_normalize_timestamp_to_utc() {
        let v = ColumnType::Timestamp
            .normalize(json!("2024-03-01T10:15:00.123+02:00"))
            .unwrap();
        assert_eq!(v, json!("2024-03-01T08:15:00.123Z"));
    }

    #[test]
    fn test_normalize_bad_timestamp_names_value() {
        let err = ColumnType::Timestamp.normalize(json!("yesterday")).unwrap_err();
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn test_normalize_int_from_string() {
        assert_eq!(ColumnType::Int.normalize(json!("42")).unwrap(), json!(42));
        assert!(ColumnType::Int.normalize(json!("4.2")).is_err());
    }

    #[test]
    fn test_normalize_null_passes_through() {
        for t in [ColumnType::String, ColumnType::Int, ColumnType::Timestamp] {
            assert_eq!(t.normalize(Value::Null).unwrap(), Value::Null);
        }
    }

    #[test]
    fn test_string_rejects_objects() {
        assert!(ColumnType::String.normalize(json!({"a": 1})).is_err());
        assert_eq!(ColumnType::String.normalize(json!(7)).unwrap(), json!("7"));
    }
}
