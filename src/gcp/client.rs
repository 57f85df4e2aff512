//! GCP Client
//!
//! Main client for the Cloud Functions API, combining authentication
//! and HTTP functionality.

use super::auth::GcpCredentials;
use super::http::GcpHttpClient;
use crate::error::{Error, Result};
use serde_json::Value;
use url::Url;

/// Public Cloud Functions v1 endpoint
pub const DEFAULT_ENDPOINT: &str = "https://cloudfunctions.googleapis.com/v1/";

/// Main GCP client. Cheap to clone and safe to share across concurrent rows.
#[derive(Clone)]
pub struct GcpClient {
    pub credentials: GcpCredentials,
    pub http: GcpHttpClient,
    endpoint: Url,
}

impl GcpClient {
    /// Create a client using Application Default Credentials
    pub async fn new(endpoint: Option<&str>) -> Result<Self> {
        let credentials = GcpCredentials::new().await?;
        Self::with_credentials(credentials, endpoint)
    }

    /// Create a client with explicit credentials, e.g. against an emulator
    pub fn with_credentials(credentials: GcpCredentials, endpoint: Option<&str>) -> Result<Self> {
        let endpoint = parse_endpoint(endpoint.unwrap_or(DEFAULT_ENDPOINT))?;
        let http = GcpHttpClient::new()?;

        Ok(Self {
            credentials,
            http,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Make a GET request to a GCP API
    pub async fn get(&self, url: &Url) -> Result<Value> {
        let token = self.credentials.get_token().await?;
        self.http.get(url, &token).await
    }

    // =========================================================================
    // Cloud Functions API helpers
    // =========================================================================

    /// Build a URL relative to the API endpoint
    pub fn api_url(&self, path: &str) -> Result<Url> {
        let url = format!("{}{}", self.endpoint, path.trim_start_matches('/'));
        Url::parse(&url).map_err(|e| Error::Format(format!("invalid request URL '{}': {}", url, e)))
    }

    /// List URL for all functions of a project, across every location
    pub fn functions_list_url(&self, project: &str, page_token: Option<&str>) -> Result<Url> {
        let mut url = self.api_url("projects")?;
        url.path_segments_mut()
            .map_err(|_| Error::Format(format!("invalid API endpoint '{}'", self.endpoint)))?
            // '-' for all locations
            .extend([project, "locations", "-", "functions"]);
        if let Some(token) = page_token {
            url.query_pairs_mut().append_pair("pageToken", token);
        }
        Ok(url)
    }

    /// URL of one function, by its fully-qualified name
    pub fn function_url(&self, name: &str) -> Result<Url> {
        self.api_url(name)
    }

    /// URL of the IAM policy of one function
    pub fn function_iam_policy_url(&self, name: &str) -> Result<Url> {
        self.api_url(&format!("{}:getIamPolicy", name))
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url> {
    // Paths are appended verbatim, so the endpoint must end with '/'
    let normalized = if endpoint.ends_with('/') {
        endpoint.to_string()
    } else {
        format!("{}/", endpoint)
    };
    Url::parse(&normalized)
        .map_err(|e| Error::Format(format!("invalid API endpoint '{}': {}", endpoint, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> GcpClient {
        GcpClient::with_credentials(GcpCredentials::from_static_token("t"), Some(endpoint))
            .unwrap()
    }

    #[test]
    fn test_list_url_all_locations() {
        let c = client(DEFAULT_ENDPOINT);
        let url = c.functions_list_url("p1", None).unwrap();
        assert_eq!(
            url.as_str(),
            "https://cloudfunctions.googleapis.com/v1/projects/p1/locations/-/functions"
        );
    }

    #[test]
    fn test_list_url_with_page_token() {
        let c = client("http://localhost:8080/v1");
        let url = c.functions_list_url("p1", Some("abc=")).unwrap();
        assert_eq!(url.path(), "/v1/projects/p1/locations/-/functions");
        assert_eq!(url.query(), Some("pageToken=abc%3D"));
    }

    #[test]
    fn test_list_url_escapes_project() {
        let c = client(DEFAULT_ENDPOINT);
        let url = c.functions_list_url("p1/locations/x/functions/y?", None).unwrap();
        assert_eq!(
            url.path(),
            "/v1/projects/p1%2Flocations%2Fx%2Ffunctions%2Fy%3F/locations/-/functions"
        );
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_iam_policy_url() {
        let c = client(DEFAULT_ENDPOINT);
        let url = c
            .function_iam_policy_url("projects/p1/locations/us-central1/functions/hello")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://cloudfunctions.googleapis.com/v1/projects/p1/locations/us-central1/functions/hello:getIamPolicy"
        );
    }
}
