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

//! Operations on one tweet.

use crate::db::TweetsTx;
use crate::driver::{Driver, map_tweet_error};
use crate::model::*;
use log::debug;
use tweets_core::db::{BareTx, Db};
use tweets_core::driver::DriverResult;

impl<D> Driver<D>
where
    D: Db + Clone + Send + Sync + 'static,
    D::Tx: TweetsTx,
{
    /// Gets the tweet identified by `id`.
    pub(crate) async fn get_tweet(self, id: TweetId) -> DriverResult<Tweet> {
        let mut tx = self.db.begin().await?;
        let tweet = tx.get_tweet(id).await.map_err(map_tweet_error(id))?;
        tx.commit().await?;
        Ok(tweet)
    }

    /// Replaces the message of the tweet identified by `id` with the raw `message` supplied by
    /// the client.
    ///
    /// The message is validated before the database is accessed, so a request that is invalid
    /// and that targets a missing tweet reports the validation problems.
    pub(crate) async fn update_tweet(
        self,
        id: TweetId,
        message: Option<String>,
    ) -> DriverResult<Tweet> {
        let message = self.validate(message)?;
        let now = self.clock.now_utc();

        let mut tx = self.db.begin().await?;
        tx.get_tweet(id).await.map_err(map_tweet_error(id))?;
        let tweet = tx.update_tweet(id, &message, now).await.map_err(map_tweet_error(id))?;
        tx.commit().await?;
        debug!("Updated tweet {}", id);
        Ok(tweet)
    }

    /// Deletes the tweet identified by `id`.
    pub(crate) async fn delete_tweet(self, id: TweetId) -> DriverResult<()> {
        let mut tx = self.db.begin().await?;
        tx.get_tweet(id).await.map_err(map_tweet_error(id))?;
        tx.delete_tweet(id).await.map_err(map_tweet_error(id))?;
        tx.commit().await?;
        debug!("Deleted tweet {}", id);
        Ok(())
    }
}
