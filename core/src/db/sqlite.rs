// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Common utilities to interact with an SQLite database.

use crate::db::{BareTx, Db, DbError, DbResult, split_statements};
use async_trait::async_trait;
use derivative::Derivative;
use futures::lock::Mutex;
use log::info;
use sqlx::Transaction;
use sqlx::sqlite::{Sqlite, SqlitePool, SqlitePoolOptions};
use std::marker::PhantomData;
use time::{Duration, OffsetDateTime};

/// Takes a raw SQLx error `e` and converts it to our generic error type.
pub fn map_sqlx_error(e: sqlx::Error) -> DbError {
    match e {
        sqlx::Error::ColumnDecode { source, .. } => DbError::DataIntegrityError(source.to_string()),
        sqlx::Error::PoolTimedOut => DbError::Unavailable,
        sqlx::Error::RowNotFound => DbError::NotFound,
        e if e.to_string().contains("FOREIGN KEY constraint failed") => DbError::NotFound,
        e => DbError::BackendError(e.to_string()),
    }
}

/// A database instance backed by an SQLite database.
#[derive(Derivative)]
#[derivative(Clone(bound = ""))]
pub struct SqliteDb<T>
where
    T: BareTx + From<Mutex<Transaction<'static, Sqlite>>> + 'static,
{
    /// Shared SQLite connection pool.  This is a cloneable type that all concurrent
    /// transactions can use concurrently.
    pool: SqlitePool,

    /// Marker for the transaction type `T` handed out by `begin`.
    _phantom_tx: PhantomData<fn() -> T>,
}

impl<T> SqliteDb<T>
where
    T: BareTx + From<Mutex<Transaction<'static, Sqlite>>> + 'static,
{
    /// Opens the database at `uri` without touching its schema.
    ///
    /// The pool is limited to a single connection that never expires: in-memory databases are
    /// private to the connection that created them and vanish when it is closed.
    async fn open(uri: &str) -> DbResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(uri)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self { pool, _phantom_tx: PhantomData })
    }

    /// Opens the database at `uri` and runs the migration process of `T`.
    pub async fn connect(uri: &str) -> DbResult<Self> {
        info!("Opening SQLite database {}", uri);
        let db = Self::open(uri).await?;

        let mut tx: T = db.begin().await?;
        tx.migrate().await?;
        tx.commit().await?;

        Ok(db)
    }
}

#[async_trait]
impl<T> Db for SqliteDb<T>
where
    T: BareTx + From<Mutex<Transaction<'static, Sqlite>>> + 'static,
{
    type SqlxTx = Mutex<Transaction<'static, Sqlite>>;
    type Tx = T;

    async fn begin(&self) -> DbResult<Self::Tx> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Self::Tx::from(Mutex::from(tx)))
    }
}

/// Helper function to initialize the database with a schema.  Use in implementations of
/// `BareTx::migrate`.
pub async fn run_schema(
    tx: &mut Mutex<Transaction<'static, Sqlite>>,
    schema: &str,
) -> DbResult<()> {
    let mut tx = tx.lock().await;
    for stmt in split_statements(schema)? {
        sqlx::query(&stmt).execute(&mut **tx).await.map_err(map_sqlx_error)?;
    }
    Ok(())
}

/// Number of nanoseconds in one second.
const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Reassembles a timestamp stored as seconds and nanoseconds since the epoch.
///
/// SQLite has no native timestamp type so timestamps are split across two integer columns, as
/// produced by `unpack_timestamp`.  `nsecs` must be within a second.
pub fn build_timestamp(secs: i64, nsecs: i64) -> DbResult<OffsetDateTime> {
    if !(0..NANOS_PER_SEC).contains(&nsecs) {
        return Err(DbError::DataIntegrityError(format!(
            "Timestamp nanoseconds {} out of range",
            nsecs
        )));
    }

    OffsetDateTime::from_unix_timestamp(secs)
        .ok()
        .and_then(|ts| ts.checked_add(Duration::nanoseconds(nsecs)))
        .ok_or_else(|| {
            DbError::DataIntegrityError(format!("Invalid timestamp {}s + {}ns", secs, nsecs))
        })
}

/// Splits `ts` into the seconds and nanoseconds pair that `build_timestamp` expects.
///
/// The seconds are rounded towards negative infinity so that the nanoseconds are never negative.
pub fn unpack_timestamp(ts: OffsetDateTime) -> (i64, i64) {
    (ts.unix_timestamp(), i64::from(ts.nanosecond()))
}

/// Test utilities for the SQLite connection.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    use super::*;

    /// Initializes an in-memory test database with the schema of `T`.
    pub async fn setup<T>() -> SqliteDb<T>
    where
        T: BareTx + From<Mutex<Transaction<'static, Sqlite>>> + 'static,
    {
        let _can_fail = env_logger::builder().is_test(true).try_init();
        SqliteDb::connect(":memory:").await.unwrap()
    }
}
