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

//! Generic business logic for any service.
//!
//! Services implement their own `Driver` type, parameterized on a database implementation:
//!
//! ```rust
//! use tweets_core::db::{BareTx, Db};
//! trait Tx: BareTx {}
//!
//! #[derive(Clone)]
//! pub(crate) struct Driver<D>
//! where
//!     D: Db + Clone + Send + Sync + 'static,
//!     D::Tx: Tx,
//! {
//!     /// The database that the driver uses for persistence.
//!     db: D,
//!
//!     // ... other fields here ...
//! }
//! ```
//!
//! Every operation implemented in the `Driver` should consume `self` because this is the layer
//! that coordinates multiple operations against the database inside a single transaction.

use crate::db::DbError;

/// Business logic errors.  These errors encompass backend and logical errors.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum DriverError {
    /// Catch-all error type for unexpected database errors.
    #[error("{0}")]
    BackendError(String),

    /// Indicates that the input data failed validation.  Carries every violation found, in the
    /// order in which the rules were evaluated.
    #[error("Invalid input: {}", .0.join("; "))]
    InvalidInput(Vec<String>),

    /// Indicates that a requested entry does not exist.
    #[error("{0}")]
    NotFound(String),
}

impl From<DbError> for DriverError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound => DriverError::NotFound(e.to_string()),
            DbError::BackendError(_)
            | DbError::DataIntegrityError(_)
            | DbError::Unavailable => DriverError::BackendError(e.to_string()),
        }
    }
}

/// Result type for this module.
pub type DriverResult<T> = Result<T, DriverError>;
