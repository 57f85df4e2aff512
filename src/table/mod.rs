//! Table layer
//!
//! Turns fetched functions into rows for the query engine.
//!
//! # Architecture
//!
//! - [`schema`] - column declarations and declared types
//! - [`transform`] - pure column transforms
//! - [`hydrate`] - lazily fetched per-row data, memoized per row
//! - [`functions`] - the `gcp_cloudfunctions_function` table definition
//!
//! A query picks a [`Projection`] of columns, then calls either
//! [`Table::list_rows`] or [`Table::get_row`].

pub mod functions;
pub mod hydrate;
mod row;
pub mod schema;
pub mod transform;

pub use functions::functions_table;
pub use hydrate::{Hydrator, RowContext};
pub use row::Row;
pub use schema::{Column, ColumnType};
pub use transform::{Transform, TransformInput};

use crate::error::{Error, Result};
use crate::gcp::client::GcpClient;
use crate::resource::{get_function, list_functions, CloudFunction};
use crate::scope::Scope;
use futures::stream::{BoxStream, StreamExt};
use std::sync::Arc;

/// Default number of rows evaluated concurrently during a listing
pub const DEFAULT_CONCURRENCY: usize = 10;

/// A table definition: static schema plus list/get entry points
#[derive(Debug)]
pub struct Table {
    pub name: &'static str,
    pub description: &'static str,
    /// Column whose value identifies exactly one row
    pub key_column: &'static str,
    columns: Vec<Column>,
    concurrency: usize,
}

/// Columns requested by one query, and the hydrators they need
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    indices: Vec<usize>,
    hydrators: Vec<Hydrator>,
}

impl Projection {
    /// Hydrators that will run for every row of this query
    pub fn hydrators(&self) -> &[Hydrator] {
        &self.hydrators
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl Table {
    pub fn new(
        name: &'static str,
        description: &'static str,
        key_column: &'static str,
        columns: Vec<Column>,
    ) -> Self {
        Self {
            name,
            description,
            key_column,
            columns,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Resolve requested column names. An empty request selects every column;
    /// repeated names are kept once.
    pub fn projection<S: AsRef<str>>(&self, names: &[S]) -> Result<Projection> {
        let mut indices = Vec::new();

        if names.is_empty() {
            indices.extend(0..self.columns.len());
        } else {
            for name in names {
                let name = name.as_ref().trim();
                let idx = self
                    .columns
                    .iter()
                    .position(|c| c.name == name)
                    .ok_or_else(|| Error::UnknownColumn(name.to_string()))?;
                if !indices.contains(&idx) {
                    indices.push(idx);
                }
            }
        }

        let mut hydrators = Vec::new();
        for &idx in &indices {
            if let Some(h) = self.columns[idx].hydrate {
                if !hydrators.contains(&h) {
                    hydrators.push(h);
                }
            }
        }

        Ok(Projection { indices, hydrators })
    }

    /// Stream every row in the scope.
    ///
    /// Functions are listed in API order; their rows are then evaluated
    /// concurrently, so rows may be emitted out of listing order. A listing
    /// failure is emitted as an error item and ends the stream.
    pub fn list_rows<'a>(
        &'a self,
        client: &'a GcpClient,
        scope: &'a Scope,
        projection: Projection,
    ) -> BoxStream<'a, Result<Row>> {
        tracing::info!(
            query_id = %scope.query_id(),
            table = self.name,
            project = scope.project(),
            columns = projection.len(),
            hydrators = ?projection.hydrators,
            "list"
        );

        let projection = Arc::new(projection);

        list_functions(client.clone(), scope.clone())
            .map(move |item| {
                let projection = Arc::clone(&projection);
                async move {
                    let item = item?;
                    self.evaluate_row(client, scope, &projection, item).await
                }
            })
            .buffer_unordered(self.concurrency)
            .boxed()
    }

    /// Fetch the single row whose key column equals `key`
    pub async fn get_row(
        &self,
        client: &GcpClient,
        scope: &Scope,
        key: &str,
        projection: &Projection,
    ) -> Result<Row> {
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::MissingKey(self.key_column.to_string()));
        }

        tracing::info!(
            query_id = %scope.query_id(),
            table = self.name,
            key,
            hydrators = ?projection.hydrators,
            "get"
        );

        let item = get_function(client, scope, key).await?;
        self.evaluate_row(client, scope, projection, item).await
    }

    /// Resolve every projected column of one function. Columns are resolved
    /// concurrently; any column failure fails the whole row.
    async fn evaluate_row(
        &self,
        client: &GcpClient,
        scope: &Scope,
        projection: &Projection,
        item: CloudFunction,
    ) -> Result<Row> {
        let ctx = RowContext::new(item, client, scope);
        let columns: Vec<&Column> = projection
            .indices
            .iter()
            .map(|&i| &self.columns[i])
            .collect();

        let values = scope
            .run(futures::future::try_join_all(
                columns.iter().map(|column| column.resolve(&ctx)),
            ))
            .await
            .map_err(|e| {
                tracing::debug!(
                    query_id = %scope.query_id(),
                    name = %ctx.item().name,
                    "Row dropped: {}", e
                );
                e
            })?;

        Ok(columns.iter().map(|c| c.name).zip(values).collect())
    }
}
