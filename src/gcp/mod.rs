//! GCP API interaction module
//!
//! This module provides the core functionality for talking to the Cloud
//! Functions REST API: authentication, the HTTP client, and URL construction.
//!
//! # Module Structure
//!
//! - [`auth`] - GCP authentication using Application Default Credentials
//! - [`client`] - Main GCP client for making API requests
//! - [`http`] - HTTP utilities for REST API calls
//!
//! # Example
//!
//! ```ignore
//! use gcf_table::gcp::client::GcpClient;
//!
//! async fn example() -> gcf_table::Result<()> {
//!     let client = GcpClient::new(None).await?;
//!     let url = client.functions_list_url("my-project", None)?;
//!     let page = client.get(&url).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
