//! Resource access layer
//!
//! Typed Cloud Functions payloads and the calls that fetch them.
//!
//! # Architecture
//!
//! - [`function`] - serde models for functions, list pages and IAM policies
//! - [`fetcher`] - paginated listing, single get, and IAM policy lookup
//!
//! # Example
//!
//! ```ignore
//! use futures::TryStreamExt;
//! use gcf_table::resource::list_functions;
//!
//! async fn names(client: GcpClient, scope: Scope) -> gcf_table::Result<Vec<String>> {
//!     list_functions(client, scope).map_ok(|f| f.name).try_collect().await
//! }
//! ```

mod fetcher;
pub mod function;

pub use fetcher::{get_function, get_iam_policy, list_functions};
pub use function::{
    is_function_name, Binding, CloudFunction, ListFunctionsResponse, Policy, SourceRepository,
};
