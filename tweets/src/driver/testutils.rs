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

//! Test utilities for the business layer.

use crate::db::TweetsTx;
use crate::db::sqlite::SqliteTweetsTx;
use crate::driver::Driver;
use crate::model::*;
use crate::validator::Validator;
use std::sync::Arc;
use time::OffsetDateTime;
use time::macros::datetime;
use tweets_core::clocks::testutils::SettableClock;
use tweets_core::db::sqlite::{self, SqliteDb};
use tweets_core::db::{BareTx, Db, DbResult};

/// State of a running test.
pub(crate) struct TestContext {
    /// The database backing the driver.
    db: SqliteDb<SqliteTweetsTx>,

    /// The clock used by the driver.
    clock: Arc<SettableClock>,

    /// The driver under test.
    driver: Driver<SqliteDb<SqliteTweetsTx>>,
}

impl TestContext {
    /// Initializes the driver against an in-memory database and a fake clock.
    pub(crate) async fn setup() -> Self {
        let db = sqlite::testutils::setup::<SqliteTweetsTx>().await;
        let clock = Arc::from(SettableClock::new(datetime!(2023-06-11 20:15:00 UTC)));
        let driver = Driver::new(db.clone(), Validator::default(), clock.clone());
        Self { db, clock, driver }
    }

    /// Returns a copy of the driver under test.
    pub(crate) fn driver(&self) -> Driver<SqliteDb<SqliteTweetsTx>> {
        self.driver.clone()
    }

    /// Returns the fake clock used by the driver.
    pub(crate) fn clock(&self) -> &SettableClock {
        &self.clock
    }

    /// Stores a tweet directly in the database, bypassing the driver.
    pub(crate) async fn create_tweet(&self, message: &str, now: OffsetDateTime) -> Tweet {
        let mut tx = self.db.begin().await.unwrap();
        let tweet = tx.create_tweet(&TweetMessage::new(message).unwrap(), now).await.unwrap();
        tx.commit().await.unwrap();
        tweet
    }

    /// Fetches a tweet directly from the database, bypassing the driver.
    pub(crate) async fn get_tweet(&self, id: TweetId) -> DbResult<Tweet> {
        let mut tx = self.db.begin().await.unwrap();
        tx.get_tweet(id).await
    }

    /// Fetches all tweets directly from the database, bypassing the driver.
    pub(crate) async fn get_tweets(&self) -> Vec<Tweet> {
        let mut tx = self.db.begin().await.unwrap();
        tx.get_tweets().await.unwrap()
    }
}
