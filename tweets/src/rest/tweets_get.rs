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

//! API to list all tweets.

use crate::db::TweetsTx;
use crate::driver::Driver;
use crate::rest::{TweetsResponse, tweet_error};
use axum::Json;
use axum::extract::State;
use tweets_core::db::Db;
use tweets_core::rest::{EmptyBody, RestResult};

/// API handler.
pub(crate) async fn handler<D>(
    State(driver): State<Driver<D>>,
    _: EmptyBody,
) -> RestResult<Json<TweetsResponse>>
where
    D: Db + Clone + Send + Sync + 'static,
    D::Tx: TweetsTx,
{
    let tweets = driver.get_tweets().await.map_err(tweet_error)?;
    Ok(Json(TweetsResponse { tweets }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use axum::http;
    use tweets_core::rest::testutils::*;

    fn route() -> (http::Method, String) {
        (http::Method::GET, "/".to_owned())
    }

    #[tokio::test]
    async fn test_none() {
        let context = TestContext::setup().await;

        let response = TestRequest::new(context.into_app(), route())
            .send_empty()
            .await
            .expect_json::<TweetsResponse>()
            .await;
        assert_eq!(TweetsResponse { tweets: vec![] }, response);
    }

    #[tokio::test]
    async fn test_some() {
        let context = TestContext::setup().await;

        let tweet1 = context.create_tweet("first").await;
        let tweet2 = context.create_tweet("second").await;
        let tweet3 = context.create_tweet("third").await;

        let response = TestRequest::new(context.into_app(), route())
            .send_empty()
            .await
            .expect_json::<TweetsResponse>()
            .await;
        assert_eq!(TweetsResponse { tweets: vec![tweet1, tweet2, tweet3] }, response);
    }

    #[tokio::test]
    async fn test_raw_json() {
        let context = TestContext::setup().await;

        context.create_tweet("Hello").await;

        let response = TestRequest::new(context.into_app(), route())
            .send_empty()
            .await
            .expect_json::<serde_json::Value>()
            .await;
        assert_eq!(
            serde_json::json!({
                "tweets": [{
                    "id": 1,
                    "message": "Hello",
                    "createdAt": "2023-06-01T10:00:00Z",
                    "updatedAt": "2023-06-01T10:00:00Z",
                }],
            }),
            response
        );
    }

    test_payload_must_be_empty!(TestContext::setup().await.into_app(), route());
}
