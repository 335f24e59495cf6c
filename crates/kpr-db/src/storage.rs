//! # Storage Adapter
//!
//! Three primitives over either backend: `execute`, `fetch_one`, `fetch_all`,
//! plus transactions exposing the same three.
//!
//! ## Insert Ids
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  storage.execute(Query::new("INSERT INTO produtos ...").bind(..))      │
//! │       │                                                                 │
//! │       │  append " RETURNING id" (unless already present)                │
//! │       ▼                                                                 │
//! │  id = first returned row's `id` column, on SQLite and Postgres alike    │
//! │                                                                         │
//! │  Both → ExecOutcome { rows_affected, inserted_id: Some(id) }            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `Any` driver never reports SQLite's `last_insert_rowid()`, so ids are
//! always read back through `RETURNING` (SQLite 3.35+).
//!
//! Rows are decoded with `sqlx::FromRow`, so repositories declare small row
//! structs instead of pulling columns out by hand.

use sqlx::any::{AnyArguments, AnyRow};
use sqlx::{Any, AnyPool, Executor, FromRow, Row};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::query::{Backend, Query, Value};

/// What a mutating statement reported back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecOutcome {
    pub rows_affected: u64,
    /// Set for `INSERT` statements.
    pub inserted_id: Option<i64>,
}

/// Handle to a connection pool plus the backend it talks to.
///
/// Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct Storage {
    pool: AnyPool,
    backend: Backend,
}

impl Storage {
    pub fn new(pool: AnyPool, backend: Backend) -> Self {
        Storage { pool, backend }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Runs a mutating statement.
    pub async fn execute(&self, query: Query) -> DbResult<ExecOutcome> {
        execute_on(&self.pool, self.backend, &query).await
    }

    /// Fetches at most one row.
    pub async fn fetch_one<T>(&self, query: Query) -> DbResult<Option<T>>
    where
        T: for<'r> FromRow<'r, AnyRow> + Send + Unpin,
    {
        fetch_one_on(&self.pool, self.backend, &query).await
    }

    /// Fetches every matching row. Empty when nothing matches.
    pub async fn fetch_all<T>(&self, query: Query) -> DbResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, AnyRow> + Send + Unpin,
    {
        fetch_all_on(&self.pool, self.backend, &query).await
    }

    /// Starts a transaction.
    ///
    /// Dropping the returned handle without [`Transaction::commit`] rolls back.
    pub async fn begin(&self) -> DbResult<Transaction> {
        let inner = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(Transaction {
            inner,
            backend: self.backend,
        })
    }
}

/// An open transaction with the same primitives as [`Storage`].
pub struct Transaction {
    inner: sqlx::Transaction<'static, Any>,
    backend: Backend,
}

impl Transaction {
    pub async fn execute(&mut self, query: Query) -> DbResult<ExecOutcome> {
        execute_on(&mut *self.inner, self.backend, &query).await
    }

    pub async fn fetch_one<T>(&mut self, query: Query) -> DbResult<Option<T>>
    where
        T: for<'r> FromRow<'r, AnyRow> + Send + Unpin,
    {
        fetch_one_on(&mut *self.inner, self.backend, &query).await
    }

    pub async fn fetch_all<T>(&mut self, query: Query) -> DbResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, AnyRow> + Send + Unpin,
    {
        fetch_all_on(&mut *self.inner, self.backend, &query).await
    }

    pub async fn commit(self) -> DbResult<()> {
        self.inner
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }

    pub async fn rollback(self) -> DbResult<()> {
        self.inner
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}

// =============================================================================
// Executor-generic helpers
// =============================================================================

fn bind_params<'q>(
    sql: &'q str,
    params: &[Value],
) -> sqlx::query::Query<'q, Any, AnyArguments<'q>> {
    params
        .iter()
        .fold(sqlx::query(sql), |q, value| match value {
            Value::Int(v) => q.bind(*v),
            Value::Text(v) => q.bind(v.clone()),
            Value::Null => q.bind(None::<i64>),
        })
}

async fn execute_on<'c, E>(executor: E, backend: Backend, query: &Query) -> DbResult<ExecOutcome>
where
    E: Executor<'c, Database = Any>,
{
    if query.is_insert() {
        let query = if query.has_returning() {
            query.clone()
        } else {
            query.with_returning_id()
        };
        let sql = backend.render(query.sql());
        debug!(sql = %sql, params = query.params().len(), "execute (returning)");

        let row = bind_params(&sql, query.params())
            .fetch_optional(executor)
            .await?;
        let inserted_id = row.map(|r| r.try_get::<i64, _>("id")).transpose()?;

        return Ok(ExecOutcome {
            rows_affected: u64::from(inserted_id.is_some()),
            inserted_id,
        });
    }

    let sql = backend.render(query.sql());
    debug!(sql = %sql, params = query.params().len(), "execute");

    let result = bind_params(&sql, query.params()).execute(executor).await?;

    Ok(ExecOutcome {
        rows_affected: result.rows_affected(),
        inserted_id: None,
    })
}

async fn fetch_one_on<'c, E, T>(executor: E, backend: Backend, query: &Query) -> DbResult<Option<T>>
where
    E: Executor<'c, Database = Any>,
    T: for<'r> FromRow<'r, AnyRow> + Send + Unpin,
{
    let sql = backend.render(query.sql());
    debug!(sql = %sql, params = query.params().len(), "fetch_one");

    let row = bind_params(&sql, query.params())
        .fetch_optional(executor)
        .await?;

    Ok(row.map(|r| T::from_row(&r)).transpose()?)
}

async fn fetch_all_on<'c, E, T>(executor: E, backend: Backend, query: &Query) -> DbResult<Vec<T>>
where
    E: Executor<'c, Database = Any>,
    T: for<'r> FromRow<'r, AnyRow> + Send + Unpin,
{
    let sql = backend.render(query.sql());
    debug!(sql = %sql, params = query.params().len(), "fetch_all");

    let rows = bind_params(&sql, query.params()).fetch_all(executor).await?;

    Ok(rows
        .iter()
        .map(T::from_row)
        .collect::<Result<Vec<_>, _>>()?)
}

// =============================================================================
// Unit Tests
// =============================================================================
