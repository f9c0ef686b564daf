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

//! REST service to create, list, update and delete short text messages.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use log::info;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tweets_core::clocks::SystemClock;
use tweets_core::db::Db;
use tweets_core::db::postgres::PostgresDb;
use tweets_core::db::sqlite::SqliteDb;

pub mod config;
use config::{Config, DbConfig};
mod db;
use db::TweetsTx;
use db::postgres::PostgresTweetsTx;
use db::sqlite::SqliteTweetsTx;
mod driver;
use driver::Driver;
mod model;
mod rest;
use rest::app;
mod validator;
use validator::Validator;

/// Serves the application backed by `db` on `bind_addr` until the server fails.
async fn serve_with_db<D>(bind_addr: SocketAddr, db: D) -> Result<(), Box<dyn Error>>
where
    D: Db + Clone + Send + Sync + 'static,
    D::Tx: TweetsTx,
{
    let driver = Driver::new(db, Validator::default(), Arc::new(SystemClock::default()));
    let app = app(driver);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Instantiates all resources to serve the application as described by `config`.
///
/// While it'd be nice to push this responsibility to `main`, doing so would force us to expose many
/// crate-internal types to the public, which in turn would make dead code detection harder.
pub async fn serve(config: Config) -> Result<(), Box<dyn Error>> {
    match config.db {
        DbConfig::Postgres(opts) => {
            let db = PostgresDb::<PostgresTweetsTx>::connect(opts).await?;
            serve_with_db(config.bind_addr, db).await
        }
        DbConfig::Sqlite(uri) => {
            let db = SqliteDb::<SqliteTweetsTx>::connect(&uri).await?;
            serve_with_db(config.bind_addr, db).await
        }
    }
}
