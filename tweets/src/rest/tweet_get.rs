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

//! API to get one tweet.

use crate::db::TweetsTx;
use crate::driver::Driver;
use crate::rest::{TweetPath, TweetResponse, tweet_error};
use axum::Json;
use axum::extract::State;
use tweets_core::db::Db;
use tweets_core::rest::{EmptyBody, RestResult};

/// API handler.
pub(crate) async fn handler<D>(
    State(driver): State<Driver<D>>,
    TweetPath(id): TweetPath,
    _: EmptyBody,
) -> RestResult<Json<TweetResponse>>
where
    D: Db + Clone + Send + Sync + 'static,
    D::Tx: TweetsTx,
{
    let tweet = driver.get_tweet(id).await.map_err(tweet_error)?;
    Ok(Json(TweetResponse { tweet }))
}
