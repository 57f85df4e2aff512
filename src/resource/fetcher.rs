//! Resource Fetcher
//!
//! Lists, gets and hydrates Cloud Functions through the REST API.

use super::function::{is_function_name, CloudFunction, ListFunctionsResponse, Policy};
use crate::error::{Error, Result};
use crate::gcp::client::GcpClient;
use crate::scope::Scope;
use futures::stream::BoxStream;

/// Stream every function visible in the scope's project, across all locations.
///
/// Pages are fetched lazily, one request per page, and items are yielded in
/// the order the API returns them. A failed page ends the stream with that
/// error; items already yielded are unaffected.
pub fn list_functions(
    client: GcpClient,
    scope: Scope,
) -> BoxStream<'static, Result<CloudFunction>> {
    let stream = async_stream::stream! {
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;
        let mut total = 0usize;

        loop {
            let page = match fetch_page(&client, &scope, page_token.as_deref()).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(
                        query_id = %scope.query_id(),
                        page = pages + 1,
                        "Listing aborted: {}", e
                    );
                    yield Err(e);
                    return;
                }
            };
            pages += 1;

            if !page.unreachable.is_empty() {
                tracing::warn!(
                    query_id = %scope.query_id(),
                    "Unreachable locations: {}", page.unreachable.join(", ")
                );
            }

            total += page.functions.len();
            for function in page.functions {
                yield Ok(function);
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!(query_id = %scope.query_id(), pages, total, "Listing complete");
    };

    Box::pin(stream)
}

/// Fetch one page of `functions.list`
async fn fetch_page(
    client: &GcpClient,
    scope: &Scope,
    page_token: Option<&str>,
) -> Result<ListFunctionsResponse> {
    let url = client.functions_list_url(scope.project(), page_token)?;
    let response = scope.run(client.get(&url)).await?;

    if response.is_null() {
        return Ok(ListFunctionsResponse::default());
    }
    Ok(serde_json::from_value(response)?)
}

/// Fetch exactly one function by its fully-qualified name.
///
/// A name that is not of the form `projects/{p}/locations/{l}/functions/{f}`
/// names no function: it is reported as not found without a request. A 404
/// from the API is likewise [`Error::NotFound`].
pub async fn get_function(client: &GcpClient, scope: &Scope, name: &str) -> Result<CloudFunction> {
    tracing::trace!(query_id = %scope.query_id(), name, "get_function");

    if !is_function_name(name) {
        tracing::debug!(query_id = %scope.query_id(), name, "Not a function name");
        return Err(Error::NotFound(name.to_string()));
    }

    let url = client.function_url(name)?;
    let response = scope.run(client.get(&url)).await.map_err(|e| match e {
        Error::Api { status: 404, .. } => Error::NotFound(name.to_string()),
        other => other,
    })?;

    Ok(serde_json::from_value(response)?)
}

/// Fetch the IAM policy of a function. A function without a policy yields
/// the empty policy rather than an error.
pub async fn get_iam_policy(
    client: &GcpClient,
    scope: &Scope,
    function: &CloudFunction,
) -> Result<Policy> {
    tracing::trace!(query_id = %scope.query_id(), name = %function.name, "get_iam_policy");

    let url = client.function_iam_policy_url(&function.name)?;
    let response = scope.run(client.get(&url)).await?;

    let policy = Policy::from_response(response)?;
    if policy.is_empty() {
        tracing::trace!(query_id = %scope.query_id(), name = %function.name, "No policy bindings");
    }
    Ok(policy)
}
