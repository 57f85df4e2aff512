//! Cloud Functions v1 payloads
//!
//! Typed views over the JSON returned by `projects.locations.functions`.
//! Unknown fields are ignored; every field is optional on the wire.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One deployed function, as returned by list and get
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CloudFunction {
    /// `projects/{project}/locations/{location}/functions/{function}`
    pub name: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub entry_point: Option<String>,
    pub runtime: Option<String>,
    pub timeout: Option<String>,
    pub available_memory_mb: Option<i64>,
    pub service_account_email: Option<String>,
    pub update_time: Option<String>,
    /// int64 fields are encoded as JSON strings by the API
    #[serde(deserialize_with = "int64_repr")]
    pub version_id: Option<i64>,
    pub labels: Option<BTreeMap<String, String>>,
    pub environment_variables: Option<BTreeMap<String, String>>,
    pub build_environment_variables: Option<BTreeMap<String, String>>,
    pub network: Option<String>,
    pub max_instances: Option<i64>,
    pub vpc_connector: Option<String>,
    pub vpc_connector_egress_settings: Option<String>,
    pub ingress_settings: Option<String>,
    pub build_id: Option<String>,
    pub source_archive_url: Option<String>,
    pub source_repository: Option<SourceRepository>,
    pub source_upload_url: Option<String>,
    pub https_trigger: Option<Value>,
    pub event_trigger: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceRepository {
    pub url: Option<String>,
    pub deployed_url: Option<String>,
}

/// One page of `functions.list`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListFunctionsResponse {
    pub functions: Vec<CloudFunction>,
    pub next_page_token: Option<String>,
    pub unreachable: Vec<String>,
}

/// IAM policy attached to a function
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Policy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<Binding>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub audit_configs: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Binding {
    pub role: String,
    pub members: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,
}

impl Policy {
    /// Decode a `getIamPolicy` body; an absent body means no policy is set
    pub fn from_response(value: Value) -> serde_json::Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value)
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty() && self.audit_configs.is_empty()
    }
}

/// Whether `name` has the shape `projects/{p}/locations/{l}/functions/{f}`.
///
/// Every segment must be non-empty, must not be `.` or `..`, and must not
/// carry characters that change how the request URL is parsed. Only the
/// project segment may contain `:` (domain-scoped projects).
pub fn is_function_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('/').collect();
    if parts.len() != 6 || parts[0] != "projects" || parts[2] != "locations" {
        return false;
    }
    if parts[4] != "functions" {
        return false;
    }

    parts.iter().enumerate().all(|(i, part)| {
        !part.is_empty()
            && *part != "."
            && *part != ".."
            && (i == 1 || !part.contains(':'))
            && !part.chars().any(|c| {
                matches!(c, '?' | '#' | '%' | '\\') || c.is_whitespace() || c.is_control()
            })
    })
}

fn int64_repr<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Int(i64),
        Str(String),
    }

    match Option::<Repr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Repr::Int(i)) => Ok(Some(i)),
        Some(Repr::Str(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
