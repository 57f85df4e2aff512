//! Hydrators
//!
//! A hydrator fetches supplementary per-row data that the list/get payload
//! does not carry. Results are memoized per row in a [`RowContext`], so a
//! hydrator runs at most once per row no matter how many columns use it, and
//! never for a row unless a projected column asks for it.

use crate::error::Result;
use crate::gcp::client::GcpClient;
use crate::resource::{get_iam_policy, CloudFunction};
use crate::scope::Scope;
use serde_json::Value;
use tokio::sync::OnceCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hydrator {
    /// IAM policy of the function (`getIamPolicy`)
    IamPolicy,
}

impl Hydrator {
    pub const ALL: [Hydrator; 1] = [Hydrator::IamPolicy];

    pub fn name(&self) -> &'static str {
        match self {
            Hydrator::IamPolicy => "iam_policy",
        }
    }

    fn index(&self) -> usize {
        match self {
            Hydrator::IamPolicy => 0,
        }
    }

    /// Run the fetch for one function
    pub async fn fetch(
        self,
        client: &GcpClient,
        scope: &Scope,
        item: &CloudFunction,
    ) -> Result<Value> {
        match self {
            Hydrator::IamPolicy => {
                let policy = get_iam_policy(client, scope, item).await?;
                Ok(serde_json::to_value(policy)?)
            }
        }
    }
}

/// Evaluation state of one row: the fetched function plus its hydrate cells
pub struct RowContext<'a> {
    item: CloudFunction,
    client: &'a GcpClient,
    scope: &'a Scope,
    cells: [OnceCell<Value>; Hydrator::ALL.len()],
}

impl<'a> RowContext<'a> {
    pub fn new(item: CloudFunction, client: &'a GcpClient, scope: &'a Scope) -> Self {
        Self {
            item,
            client,
            scope,
            cells: Default::default(),
        }
    }

    pub fn item(&self) -> &CloudFunction {
        &self.item
    }

    pub fn scope(&self) -> &Scope {
        self.scope
    }

    /// Result of `hydrator` for this row, fetching it on first use.
    /// Concurrent callers wait on the same fetch; a failed fetch is not cached.
    pub async fn hydrate(&self, hydrator: Hydrator) -> Result<&Value> {
        self.cells[hydrator.index()]
            .get_or_try_init(|| async {
                tracing::trace!(
                    query_id = %self.scope.query_id(),
                    hydrator = hydrator.name(),
                    name = %self.item.name,
                    "hydrate"
                );
                hydrator.fetch(self.client, self.scope, &self.item).await
            })
            .await
    }

    /// Whether `hydrator` already produced a value for this row
    pub fn is_hydrated(&self, hydrator: Hydrator) -> bool {
        self.cells[hydrator.index()].initialized()
    }
}
