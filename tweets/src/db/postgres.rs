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

//! Implementation of the database abstraction using PostgreSQL.

use crate::db::TweetsTx;
use crate::model::*;
use futures::TryStreamExt;
use sqlx::postgres::{PgRow, Postgres};
use sqlx::{Row, Transaction};
use time::OffsetDateTime;
use tweets_core::db::postgres::{map_sqlx_error, run_schema};
use tweets_core::db::{BareTx, DbError, DbResult};

/// Schema to use to initialize the database.
const SCHEMA: &str = include_str!("postgres.sql");

impl TryFrom<PgRow> for Tweet {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i32 = row.try_get("id").map_err(map_sqlx_error)?;
        let message: String = row.try_get("message").map_err(map_sqlx_error)?;
        let created_at: OffsetDateTime = row.try_get("created_at").map_err(map_sqlx_error)?;
        let updated_at: OffsetDateTime = row.try_get("updated_at").map_err(map_sqlx_error)?;

        Ok(Tweet::new(TweetId::from_i32(id)?, TweetMessage::new(message)?, created_at, updated_at))
    }
}

/// A transaction backed by a PostgreSQL database.
pub(crate) struct PostgresTweetsTx {
    /// The PostgreSQL transaction itself.
    tx: Transaction<'static, Postgres>,
}

impl From<Transaction<'static, Postgres>> for PostgresTweetsTx {
    fn from(tx: Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }
}

#[async_trait::async_trait]
impl BareTx for PostgresTweetsTx {
    async fn commit(self) -> DbResult<()> {
        self.tx.commit().await.map_err(map_sqlx_error)
    }

    async fn migrate(&mut self) -> DbResult<()> {
        run_schema(&mut self.tx, SCHEMA).await
    }
}

#[async_trait::async_trait]
impl TweetsTx for PostgresTweetsTx {
    async fn get_tweets(&mut self) -> DbResult<Vec<Tweet>> {
        let query_str = "SELECT * FROM tweets ORDER BY id";
        let mut rows = sqlx::query(query_str).fetch(&mut *self.tx);

        let mut tweets = vec![];
        while let Some(row) = rows.try_next().await.map_err(map_sqlx_error)? {
            tweets.push(Tweet::try_from(row)?);
        }
        Ok(tweets)
    }

    async fn get_tweet(&mut self, id: TweetId) -> DbResult<Tweet> {
        let query_str = "SELECT * FROM tweets WHERE id = $1";
        let row = sqlx::query(query_str)
            .bind(id.as_i32())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        Tweet::try_from(row)
    }

    async fn create_tweet(
        &mut self,
        message: &TweetMessage,
        now: OffsetDateTime,
    ) -> DbResult<Tweet> {
        let query_str = "
            INSERT INTO tweets (message, created_at, updated_at)
            VALUES ($1, $2, $2)
            RETURNING *";
        let row = sqlx::query(query_str)
            .bind(message.as_str())
            .bind(now)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        Tweet::try_from(row)
    }

    async fn update_tweet(
        &mut self,
        id: TweetId,
        message: &TweetMessage,
        now: OffsetDateTime,
    ) -> DbResult<Tweet> {
        let query_str = "
            UPDATE tweets SET message = $1, updated_at = $2
            WHERE id = $3
            RETURNING *";
        let row = sqlx::query(query_str)
            .bind(message.as_str())
            .bind(now)
            .bind(id.as_i32())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        Tweet::try_from(row)
    }

    async fn delete_tweet(&mut self, id: TweetId) -> DbResult<()> {
        let query_str = "DELETE FROM tweets WHERE id = $1";
        let done = sqlx::query(query_str)
            .bind(id.as_i32())
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        match done.rows_affected() {
            0 => Err(DbError::NotFound),
            1 => Ok(()),
            _ => Err(DbError::BackendError("Deletion affected more than one row".to_owned())),
        }
    }
}
