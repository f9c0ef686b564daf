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

//! Shared building blocks for the tweets service.
//!
//! The service is split in layers, and each layer has a counterpart module in here that provides
//! the generic types it builds upon:
//!
//! 1.  `model`: High-level data types with no logic other than validating their own contents.
//!     Construction failures are reported as `ModelError`.
//!
//! 1.  `db`: The persistence layer.  The service extends the `BareTx` trait with domain-specific
//!     operations and gets a `Db` implementation for PostgreSQL and another one for SQLite.
//!
//! 1.  `driver`: The business logic layer.  Every operation consumes the driver and runs inside
//!     a single transaction.
//!
//! 1.  `rest`: The HTTP layer.  Every API lives in its own file and returns `RestError` on
//!     failure, which knows how to render itself as a JSON payload with a status code.
//!
//! Errors flow upwards through the layers via `?`: `ModelError` becomes `DbError`, which becomes
//! `DriverError`, which becomes `RestError`.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

pub mod clocks;
pub mod db;
pub mod driver;
pub mod env;
pub mod model;
pub mod rest;
