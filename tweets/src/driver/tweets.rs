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

//! Operations on the collection of tweets.

use crate::db::TweetsTx;
use crate::driver::Driver;
use crate::model::*;
use log::debug;
use tweets_core::db::{BareTx, Db};
use tweets_core::driver::DriverResult;

impl<D> Driver<D>
where
    D: Db + Clone + Send + Sync + 'static,
    D::Tx: TweetsTx,
{
    /// Gets all tweets ordered by their identifier.
    pub(crate) async fn get_tweets(self) -> DriverResult<Vec<Tweet>> {
        let mut tx = self.db.begin().await?;
        let tweets = tx.get_tweets().await?;
        tx.commit().await?;
        Ok(tweets)
    }

    /// Creates a new tweet with the raw `message` supplied by the client.
    pub(crate) async fn create_tweet(self, message: Option<String>) -> DriverResult<Tweet> {
        let message = self.validate(message)?;
        let now = self.clock.now_utc();

        let mut tx = self.db.begin().await?;
        let tweet = tx.create_tweet(&message, now).await?;
        tx.commit().await?;
        debug!("Created tweet {}", tweet.id());
        Ok(tweet)
    }
}
