//! Google Cloud Functions inventory as table rows.
//!
//! Functions are listed (or fetched by name) from the Cloud Functions v1 API
//! and turned into rows of the `gcp_cloudfunctions_function` table. Columns
//! that need extra API calls, such as `iam_policy`, are only fetched when a
//! query selects them, and at most once per row.
//!
//! ```ignore
//! use futures::TryStreamExt;
//! use gcf_table::{functions_table, GcpClient, Scope};
//!
//! async fn example() -> gcf_table::Result<()> {
//!     let client = GcpClient::new(None).await?;
//!     let scope = Scope::new("my-project");
//!     let table = functions_table();
//!     let projection = table.projection(&["name", "location", "iam_policy"])?;
//!     let rows: Vec<_> = table.list_rows(&client, &scope, projection).try_collect().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod gcp;
pub mod resource;
pub mod scope;
pub mod table;

pub use error::{Error, ErrorKind, Result};
pub use gcp::client::GcpClient;
pub use scope::Scope;
pub use table::{functions_table, Projection, Row, Table};
