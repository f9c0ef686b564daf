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

//! Implementation of the database abstraction using SQLite.

use crate::db::TweetsTx;
use crate::model::*;
use futures::TryStreamExt;
use futures::lock::Mutex;
use sqlx::sqlite::{Sqlite, SqliteRow};
use sqlx::{Row, Transaction};
use time::OffsetDateTime;
use tweets_core::db::sqlite::{build_timestamp, map_sqlx_error, run_schema, unpack_timestamp};
use tweets_core::db::{BareTx, DbError, DbResult};

/// Schema to use to initialize the database.
const SCHEMA: &str = include_str!("sqlite.sql");

impl TryFrom<SqliteRow> for Tweet {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(map_sqlx_error)?;
        let message: String = row.try_get("message").map_err(map_sqlx_error)?;
        let created_at_secs: i64 = row.try_get("created_at_secs").map_err(map_sqlx_error)?;
        let created_at_nsecs: i64 = row.try_get("created_at_nsecs").map_err(map_sqlx_error)?;
        let updated_at_secs: i64 = row.try_get("updated_at_secs").map_err(map_sqlx_error)?;
        let updated_at_nsecs: i64 = row.try_get("updated_at_nsecs").map_err(map_sqlx_error)?;

        Ok(Tweet::new(
            TweetId::from_i64(id)?,
            TweetMessage::new(message)?,
            build_timestamp(created_at_secs, created_at_nsecs)?,
            build_timestamp(updated_at_secs, updated_at_nsecs)?,
        ))
    }
}

/// A transaction backed by a SQLite database.
pub(crate) struct SqliteTweetsTx {
    /// Inner transaction type to obtain access to the raw sqlx transaction.
    tx: Mutex<Transaction<'static, Sqlite>>,
}

impl From<Mutex<Transaction<'static, Sqlite>>> for SqliteTweetsTx {
    fn from(tx: Mutex<Transaction<'static, Sqlite>>) -> Self {
        Self { tx }
    }
}

#[async_trait::async_trait]
impl BareTx for SqliteTweetsTx {
    async fn commit(self) -> DbResult<()> {
        let tx = self.tx.into_inner();
        tx.commit().await.map_err(map_sqlx_error)
    }

    async fn migrate(&mut self) -> DbResult<()> {
        run_schema(&mut self.tx, SCHEMA).await
    }
}

#[async_trait::async_trait]
impl TweetsTx for SqliteTweetsTx {
    async fn get_tweets(&mut self) -> DbResult<Vec<Tweet>> {
        let mut tx = self.tx.lock().await;

        let query_str = "SELECT * FROM tweets ORDER BY id";
        let mut rows = sqlx::query(query_str).fetch(&mut **tx);

        let mut tweets = vec![];
        while let Some(row) = rows.try_next().await.map_err(map_sqlx_error)? {
            tweets.push(Tweet::try_from(row)?);
        }
        Ok(tweets)
    }

    async fn get_tweet(&mut self, id: TweetId) -> DbResult<Tweet> {
        let mut tx = self.tx.lock().await;

        let query_str = "SELECT * FROM tweets WHERE id = ?";
        let row = sqlx::query(query_str)
            .bind(id.as_i32())
            .fetch_one(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;
        Tweet::try_from(row)
    }

    async fn create_tweet(
        &mut self,
        message: &TweetMessage,
        now: OffsetDateTime,
    ) -> DbResult<Tweet> {
        let mut tx = self.tx.lock().await;

        let (now_secs, now_nsecs) = unpack_timestamp(now);

        let query_str = "
            INSERT INTO tweets
                (message, created_at_secs, created_at_nsecs, updated_at_secs, updated_at_nsecs)
            VALUES (?, ?, ?, ?, ?)";
        let done = sqlx::query(query_str)
            .bind(message.as_str())
            .bind(now_secs)
            .bind(now_nsecs)
            .bind(now_secs)
            .bind(now_nsecs)
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;
        if done.rows_affected() != 1 {
            return Err(DbError::BackendError("Insertion affected more than one row".to_owned()));
        }

        let id = TweetId::from_i64(done.last_insert_rowid())?;
        Ok(Tweet::new(id, message.clone(), now, now))
    }

    async fn update_tweet(
        &mut self,
        id: TweetId,
        message: &TweetMessage,
        now: OffsetDateTime,
    ) -> DbResult<Tweet> {
        let mut tx = self.tx.lock().await;

        let (now_secs, now_nsecs) = unpack_timestamp(now);

        let query_str = "
            UPDATE tweets SET message = ?, updated_at_secs = ?, updated_at_nsecs = ?
            WHERE id = ?
            RETURNING *";
        let row = sqlx::query(query_str)
            .bind(message.as_str())
            .bind(now_secs)
            .bind(now_nsecs)
            .bind(id.as_i32())
            .fetch_one(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;
        Tweet::try_from(row)
    }

    async fn delete_tweet(&mut self, id: TweetId) -> DbResult<()> {
        let mut tx = self.tx.lock().await;

        let query_str = "DELETE FROM tweets WHERE id = ?";
        let done = sqlx::query(query_str)
            .bind(id.as_i32())
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;
        match done.rows_affected() {
            0 => Err(DbError::NotFound),
            1 => Ok(()),
            _ => Err(DbError::BackendError("Deletion affected more than one row".to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::generate_db_tests;

    generate_db_tests!(tweets_core::db::sqlite::testutils::setup::<SqliteTweetsTx>().await);
}
