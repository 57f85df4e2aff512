//! Query scope
//!
//! A [`Scope`] is built once per query execution and handed to the lister,
//! getter and hydrators. It carries the project being queried, a query id for
//! log correlation, and the cancellation signal shared by every in-flight call.

use crate::error::{Error, Result};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Scope {
    project: String,
    query_id: Uuid,
    cancel: CancellationToken,
}

impl Scope {
    pub fn new(project: impl Into<String>) -> Self {
        Self::with_cancel(project, CancellationToken::new())
    }

    /// Scope whose calls abort once `cancel` fires
    pub fn with_cancel(project: impl Into<String>, cancel: CancellationToken) -> Self {
        Self {
            project: project.into(),
            query_id: Uuid::new_v4(),
            cancel,
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn query_id(&self) -> Uuid {
        self.query_id
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Drive `fut` to completion unless the query is cancelled first
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            res = fut => res,
        }
    }
}
