//! `gcp_cloudfunctions_function` table

use super::hydrate::Hydrator;
use super::schema::{
    Column, ColumnType, DESCRIPTION_AKAS, DESCRIPTION_LOCATION, DESCRIPTION_PROJECT,
    DESCRIPTION_TAGS, DESCRIPTION_TITLE,
};
use super::transform::{Transform, AKA_PREFIX};
use super::Table;
use crate::resource::CloudFunction;
use serde_json::json;

pub const TABLE_NAME: &str = "gcp_cloudfunctions_function";

fn function_name(f: &CloudFunction) -> Option<&str> {
    Some(&f.name)
}

/// Build the Cloud Functions table
pub fn functions_table() -> Table {
    let columns = vec![
        // commonly used columns
        Column::new(
            "name",
            ColumnType::String,
            "The name of the function.",
            Transform::Field(|f| json!(f.name)),
        )
        .not_null(),
        Column::new(
            "status",
            ColumnType::String,
            "Status of the function deployment (ACTIVE, OFFLINE, CLOUD_FUNCTION_STATUS_UNSPECIFIED, DEPLOY_IN_PROGRESS, DELETE_IN_PROGRESS, UNKNOWN).",
            Transform::Field(|f| json!(f.status)),
        ),
        Column::new(
            "description",
            ColumnType::String,
            "User-provided description of a function.",
            Transform::Field(|f| json!(f.description)),
        ),
        Column::new(
            "runtime",
            ColumnType::String,
            "The runtime in which to run the function.",
            Transform::Field(|f| json!(f.runtime)),
        ),
        // other columns
        Column::new(
            "available_memory_mb",
            ColumnType::Int,
            "The amount of memory in MB available for the function.",
            Transform::Field(|f| json!(f.available_memory_mb)),
        ),
        Column::new(
            "build_environment_variables",
            ColumnType::Json,
            "Environment variables that shall be available during build time.",
            Transform::Field(|f| json!(f.build_environment_variables)),
        ),
        Column::new(
            "build_id",
            ColumnType::String,
            "The Cloud Build ID of the latest successful deployment of the function.",
            Transform::Field(|f| json!(f.build_id)),
        ),
        Column::new(
            "entry_point",
            ColumnType::String,
            "The name of the function (as defined in source code) that will be executed.",
            Transform::Field(|f| json!(f.entry_point)),
        ),
        Column::new(
            "environment_variables",
            ColumnType::Json,
            "Environment variables that shall be available during function execution.",
            Transform::Field(|f| json!(f.environment_variables)),
        ),
        Column::new(
            "event_trigger",
            ColumnType::Json,
            "A source that fires events in response to a condition in another service.",
            Transform::Field(|f| json!(f.event_trigger)),
        ),
        Column::new(
            "https_trigger",
            ColumnType::Json,
            "An HTTPS endpoint type of source that can be triggered via URL.",
            Transform::Field(|f| json!(f.https_trigger)),
        ),
        Column::new(
            "iam_policy",
            ColumnType::Json,
            "The IAM policy for the function.",
            Transform::HydrateValue,
        )
        .hydrate(Hydrator::IamPolicy),
        Column::new(
            "ingress_settings",
            ColumnType::String,
            "The ingress settings for the function, controlling what traffic can reach it (INGRESS_SETTINGS_UNSPECIFIED, ALLOW_ALL, ALLOW_INTERNAL_ONLY, ALLOW_INTERNAL_AND_GCLB).",
            Transform::Field(|f| json!(f.ingress_settings)),
        ),
        Column::new(
            "labels",
            ColumnType::Json,
            "Labels that apply to this function.",
            Transform::Field(|f| json!(f.labels)),
        ),
        Column::new(
            "max_instances",
            ColumnType::Int,
            "The limit on the maximum number of function instances that may coexist at a given time.",
            Transform::Field(|f| json!(f.max_instances)),
        ),
        Column::new(
            "network",
            ColumnType::String,
            "The VPC Network that this cloud function can connect to.",
            Transform::Field(|f| json!(f.network)),
        ),
        Column::new(
            "service_account_email",
            ColumnType::String,
            "The email of the function's service account.",
            Transform::Field(|f| json!(f.service_account_email)),
        ),
        Column::new(
            "source_archive_url",
            ColumnType::String,
            "The Google Cloud Storage URL, starting with gs://, pointing to the zip archive which contains the function.",
            Transform::Field(|f| json!(f.source_archive_url)),
        ),
        Column::new(
            "source_repository",
            ColumnType::String,
            "The URL of the source repository where a function is hosted.",
            Transform::Field(|f| {
                json!(f.source_repository.as_ref().and_then(|r| r.url.as_deref()))
            }),
        ),
        Column::new(
            "source_upload_url",
            ColumnType::String,
            "The Google Cloud Storage signed URL used for source uploading.",
            Transform::Field(|f| json!(f.source_upload_url)),
        ),
        Column::new(
            "timeout",
            ColumnType::String,
            "The function execution timeout. Execution is considered failed and can be terminated if the function is not completed at the end of the timeout period. Defaults to 60 seconds.",
            Transform::Field(|f| json!(f.timeout)),
        ),
        Column::new(
            "update_time",
            ColumnType::Timestamp,
            "The last update timestamp of the Cloud Function.",
            Transform::Field(|f| json!(f.update_time)),
        ),
        Column::new(
            "version_id",
            ColumnType::Int,
            "The version identifier of the Cloud Function. Each deployment attempt results in a new version of a function being created.",
            Transform::Field(|f| json!(f.version_id)),
        ),
        Column::new(
            "vpc_connector",
            ColumnType::String,
            "The VPC Network Connector that this cloud function can connect to.",
            Transform::Field(|f| json!(f.vpc_connector)),
        ),
        Column::new(
            "vpc_connector_egress_settings",
            ColumnType::String,
            "The egress settings for the connector, controlling what traffic is diverted through it (VPC_CONNECTOR_EGRESS_SETTINGS_UNSPECIFIED, PRIVATE_RANGES_ONLY, ALL_TRAFFIC).",
            Transform::Field(|f| json!(f.vpc_connector_egress_settings)),
        ),
        // standard columns
        Column::new(
            "title",
            ColumnType::String,
            DESCRIPTION_TITLE,
            Transform::Field(|f| json!(f.name)),
        ),
        Column::new(
            "tags",
            ColumnType::Json,
            DESCRIPTION_TAGS,
            Transform::Field(|f| json!(f.labels)),
        ),
        Column::new(
            "akas",
            ColumnType::Json,
            DESCRIPTION_AKAS,
            Transform::Prefixed {
                prefix: AKA_PREFIX,
                field: function_name,
            }
            .then(Transform::IntoList),
        )
        .not_null(),
        // standard gcp columns
        Column::new(
            "project",
            ColumnType::String,
            DESCRIPTION_PROJECT,
            Transform::Project,
        )
        .not_null(),
        Column::new(
            "location",
            ColumnType::String,
            DESCRIPTION_LOCATION,
            Transform::Field(|f| json!(f.name)).then(Transform::location()),
        ),
    ];

    Table::new(TABLE_NAME, "GCP Cloud Function", "name", columns)
}
