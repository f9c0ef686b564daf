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

//! Generic abstraction to access different database systems.
//!
//! The PostgreSQL backend is meant for production use.  The SQLite backend backs the unit tests
//! and is also handy to run the service locally without any external dependencies.
//!
//! Services define their own transaction type by extending `BareTx` with domain operations, and
//! then instantiate either `PostgresDb` or `SqliteDb` with that transaction type.

use crate::model::ModelError;
use async_trait::async_trait;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

/// Failures reported by the persistence layer.
///
/// Conditions that callers may want to react to get their own variant.  Anything else ends up as
/// a `BackendError`.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DbError {
    /// The database failed in an unexpected way.
    #[error("Database error: {0}")]
    BackendError(String),

    /// A stored row violates the invariants of its model type.
    #[error("Data integrity error: {0}")]
    DataIntegrityError(String),

    /// The row being looked up does not exist.
    #[error("Entity not found")]
    NotFound,

    /// The database cannot take more work right now, such as when it runs out of connections.
    #[error("Unavailable")]
    Unavailable,
}

impl From<ModelError> for DbError {
    fn from(e: ModelError) -> Self {
        DbError::DataIntegrityError(e.to_string())
    }
}

/// Result type for this module.
pub type DbResult<T> = Result<T, DbError>;

/// Breaks `schema` into its `;`-separated statements, dropping `--` comments and blank pieces.
///
/// Comments are removed first so that semicolons within them do not split statements.
pub fn split_statements(schema: &str) -> DbResult<Vec<String>> {
    let comments = regex::RegexBuilder::new("--.*$")
        .multi_line(true)
        .build()
        .map_err(|e| DbError::BackendError(format!("Bad comment pattern: {}", e)))?;
    let schema = comments.replace_all(schema, "");
    Ok(schema
        .split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
        .map(str::to_owned)
        .collect())
}

/// Common operations for all transaction types.
///
/// A transaction that is dropped without calling `commit` is rolled back.
#[async_trait]
pub trait BareTx: Send {
    /// Commits the transaction.
    async fn commit(self) -> DbResult<()>;

    /// Creates the schema needed by the service if it does not exist yet.
    async fn migrate(&mut self) -> DbResult<()>;
}

/// Abstraction over the database connection.
#[async_trait]
pub trait Db {
    /// Type of the raw transaction that the backend hands out.
    type SqlxTx;

    /// Type of the service-specific transaction wrapping the raw one.
    type Tx: BareTx + From<Self::SqlxTx> + Send + 'static;

    /// Begins a transaction.
    async fn begin(&self) -> DbResult<Self::Tx>;
}

/// Helpers to run one suite of database tests against every backend.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    pub use paste::paste;

    /// Declares one `#[tokio::test]` wrapper per `name` that awaits `module::name(setup)`.
    ///
    /// Each test function in `module` takes the database returned by the `setup` expression,
    /// already migrated.  An optional leading attribute, such as `#[ignore]` for backends that
    /// need external services, is applied to every wrapper.
    #[macro_export]
    macro_rules! generate_tests [
        ( @wrapper [ $( #[$extra:meta] )? ] $setup:expr, $module:path, $name:ident ) => {
            #[tokio::test]
            $( #[$extra] )?
            async fn $name() {
                $crate::db::testutils::paste! {
                    $module :: [< $name >]($setup).await;
                }
            }
        };

        ( #[$extra:meta], $setup:expr, $module:path $(, $name:ident)+ ) => {
            $(
                $crate::generate_tests!(@wrapper [ #[$extra] ] $setup, $module, $name);
            )+
        };

        ( $setup:expr, $module:path $(, $name:ident)+ ) => {
            $(
                $crate::generate_tests!(@wrapper [] $setup, $module, $name);
            )+
        };
    ];

    pub use generate_tests;
}
