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

//! Database abstraction in terms of the operations needed by the server.

use crate::model::*;
use time::OffsetDateTime;
use tweets_core::db::{BareTx, DbResult};

pub(crate) mod postgres;
pub(crate) mod sqlite;
#[cfg(test)]
pub(crate) mod tests;

/// A transaction with high-level operations that deal with our types.
#[async_trait::async_trait]
pub(crate) trait TweetsTx: BareTx {
    /// Gets all existing tweets ordered by their identifier.
    async fn get_tweets(&mut self) -> DbResult<Vec<Tweet>>;

    /// Gets the tweet identified by `id`.
    async fn get_tweet(&mut self, id: TweetId) -> DbResult<Tweet>;

    /// Creates a new tweet with `message` and returns it with its newly-assigned identifier.
    /// Both of its timestamps are set to `now`.
    async fn create_tweet(
        &mut self,
        message: &TweetMessage,
        now: OffsetDateTime,
    ) -> DbResult<Tweet>;

    /// Replaces the message of the tweet identified by `id` and bumps its modification time to
    /// `now`.
    async fn update_tweet(
        &mut self,
        id: TweetId,
        message: &TweetMessage,
        now: OffsetDateTime,
    ) -> DbResult<Tweet>;

    /// Deletes the tweet identified by `id`.
    async fn delete_tweet(&mut self, id: TweetId) -> DbResult<()>;
}
