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

//! API to delete one tweet.

use crate::db::TweetsTx;
use crate::driver::Driver;
use crate::rest::{TweetPath, tweet_error};
use axum::extract::State;
use axum::http;
use tweets_core::db::Db;
use tweets_core::rest::{EmptyBody, RestResult};

/// API handler.
pub(crate) async fn handler<D>(
    State(driver): State<Driver<D>>,
    TweetPath(id): TweetPath,
    _: EmptyBody,
) -> RestResult<http::StatusCode>
where
    D: Db + Clone + Send + Sync + 'static,
    D::Tx: TweetsTx,
{
    driver.delete_tweet(id).await.map_err(tweet_error)?;
    Ok(http::StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use tweets_core::rest::testutils::*;

    fn route<I: std::fmt::Display>(id: I) -> (http::Method, String) {
        (http::Method::DELETE, format!("/{}", id))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let tweet1 = context.create_tweet("first").await;
        let tweet2 = context.create_tweet("second").await;

        TestRequest::new(context.app(), route(tweet1.id()))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NO_CONTENT)
            .expect_empty()
            .await;

        assert_eq!(None, context.get_tweet(tweet1.id()).await);
        assert_eq!(vec![tweet2], context.get_tweets().await);
    }

    #[tokio::test]
    async fn test_then_get() {
        let context = TestContext::setup().await;

        let tweet = context.create_tweet("ephemeral").await;

        TestRequest::new(context.app(), route(tweet.id()))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NO_CONTENT)
            .expect_empty()
            .await;

        TestRequest::new(context.into_app(), (http::Method::GET, format!("/{}", tweet.id())))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error_message(&format!("Tweet with id {} ain't hurr.", tweet.id()))
            .await;
    }

    #[tokio::test]
    async fn test_not_found() {
        let context = TestContext::setup().await;

        let tweet = context.create_tweet("survivor").await;
        let id = tweet.id();

        let response = TestRequest::new(context.app(), route(999999))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error_response()
            .await;
        assert_eq!("Tweet not found.", response.title);
        assert_eq!("Tweet with id 999999 ain't hurr.", response.message);

        assert_eq!(Some(tweet), context.get_tweet(id).await);
    }

    test_payload_must_be_empty!(TestContext::setup().await.into_app(), route(1));
}
