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

//! Configuration of the service as read from the environment.

use std::net::{Ipv4Addr, SocketAddr};
use tweets_core::db::postgres::PostgresOptions;
use tweets_core::env::{get_optional_var, get_required_var};

/// Port to listen on when none is configured.
const DEFAULT_PORT: u16 = 3000;

/// Database backend to persist tweets into.
#[derive(Debug)]
#[cfg_attr(test, derive(PartialEq))]
pub enum DbConfig {
    /// A PostgreSQL database, which is the default.
    Postgres(PostgresOptions),

    /// An SQLite database at the given URI.
    Sqlite(String),
}

/// Settings required to start the service.
#[derive(Debug)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Config {
    /// Address and port to listen on.
    pub bind_addr: SocketAddr,

    /// Database to connect to.
    pub db: DbConfig,
}

impl Config {
    /// Initializes the configuration from environment variables.
    ///
    /// The service's own settings are read from `<prefix>_PORT`, `<prefix>_BIND` and
    /// `<prefix>_DB`.  The latter selects the backend: `postgres` (the default) reads the
    /// connection details from `<pgsql_prefix>_*` as described in `PostgresOptions::from_env`,
    /// and `sqlite` reads the database location from `<sqlite_prefix>_URI`.
    pub fn from_env(prefix: &str, pgsql_prefix: &str, sqlite_prefix: &str) -> Result<Self, String> {
        let port = get_optional_var::<u16>(prefix, "PORT")?.unwrap_or(DEFAULT_PORT);
        let bind = get_optional_var::<Ipv4Addr>(prefix, "BIND")?.unwrap_or(Ipv4Addr::LOCALHOST);

        let db = match get_optional_var::<String>(prefix, "DB")?.as_deref() {
            None | Some("postgres") => DbConfig::Postgres(PostgresOptions::from_env(pgsql_prefix)?),
            Some("sqlite") => DbConfig::Sqlite(get_required_var::<String>(sqlite_prefix, "URI")?),
            Some(other) => {
                return Err(format!(
                    "Invalid database backend {} in {}_DB; must be postgres or sqlite",
                    other, prefix
                ));
            }
        };

        Ok(Config { bind_addr: SocketAddr::from((bind, port)), db })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_sqlite_defaults() {
        temp_env::with_vars(
            [
                ("T1_PORT", None),
                ("T1_BIND", None),
                ("T1_DB", Some("sqlite")),
                ("T1LITE_URI", Some("sqlite://tweets.db?mode=rwc")),
            ],
            || {
                let config = Config::from_env("T1", "T1PG", "T1LITE").unwrap();
                assert_eq!(
                    Config {
                        bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 3000)),
                        db: DbConfig::Sqlite("sqlite://tweets.db?mode=rwc".to_owned()),
                    },
                    config
                );
            },
        );
    }

    #[test]
    fn test_from_env_postgres_explicit_address() {
        temp_env::with_vars(
            [
                ("T2_PORT", Some("8080")),
                ("T2_BIND", Some("0.0.0.0")),
                ("T2_DB", None),
                ("T2PG_HOST", Some("the-host")),
                ("T2PG_PORT", Some("5432")),
                ("T2PG_DATABASE", Some("the-database")),
                ("T2PG_USERNAME", Some("the-username")),
                ("T2PG_PASSWORD", Some("the-password")),
                ("T2PG_MIN_CONNECTIONS", None),
                ("T2PG_MAX_CONNECTIONS", None),
            ],
            || {
                let config = Config::from_env("T2", "T2PG", "T2LITE").unwrap();
                assert_eq!(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080)), config.bind_addr);
                match config.db {
                    DbConfig::Postgres(opts) => {
                        assert_eq!("the-host", opts.host);
                        assert_eq!(5432, opts.port);
                        assert_eq!("the-database", opts.database);
                    }
                    db => panic!("Unexpected database config {:?}", db),
                }
            },
        );
    }

    #[test]
    fn test_from_env_postgres_missing_settings() {
        temp_env::with_vars(
            [("T3_DB", Some("postgres")), ("T3PG_HOST", None), ("T3PG_PORT", Some("5432"))],
            || {
                let err = Config::from_env("T3", "T3PG", "T3LITE").unwrap_err();
                assert!(err.contains("T3PG_HOST not present"));
            },
        );
    }

    #[test]
    fn test_from_env_bad_values() {
        temp_env::with_vars([("T4_PORT", Some("http")), ("T4_DB", Some("sqlite"))], || {
            let err = Config::from_env("T4", "T4PG", "T4LITE").unwrap_err();
            assert!(err.contains("T4_PORT"));
        });

        temp_env::with_vars([("T5_BIND", Some("localhost")), ("T5_DB", Some("sqlite"))], || {
            let err = Config::from_env("T5", "T5PG", "T5LITE").unwrap_err();
            assert!(err.contains("T5_BIND"));
        });

        temp_env::with_vars([("T6_DB", Some("mysql"))], || {
            let err = Config::from_env("T6", "T6PG", "T6LITE").unwrap_err();
            assert!(err.contains("Invalid database backend mysql in T6_DB"));
        });
    }
}
