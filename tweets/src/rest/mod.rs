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

//! Entry point to the REST server.

use crate::db::TweetsTx;
use crate::driver::{Driver, tweet_not_found};
use crate::model::{Tweet, TweetId};
use crate::validator::coerce_message;
use async_trait::async_trait;
use axum::Router;
use axum::extract::{FromRequestParts, OriginalUri, Path};
use axum::http::request::Parts;
use serde::{Deserialize, Deserializer, Serialize};
use tweets_core::db::Db;
use tweets_core::driver::DriverError;
use tweets_core::rest::{RestError, fallback};

#[cfg(test)]
mod testutils;
mod tweet_delete;
mod tweet_get;
mod tweet_put;
mod tweets_get;
mod tweets_post;

/// Title of the errors that report missing tweets.
const TWEET_NOT_FOUND_TITLE: &str = "Tweet not found.";

/// Converts a driver error into a REST error, reporting missing entities as missing tweets.
fn tweet_error(e: DriverError) -> RestError {
    match e {
        DriverError::NotFound(message) => {
            RestError::NotFound { title: TWEET_NOT_FOUND_TITLE.to_owned(), message }
        }
        e => RestError::from(e),
    }
}

/// Extractor for the tweet identifier in the `:id` path segment.
///
/// Segments that are not made of decimal digits do not name tweets at all, so they are reported
/// as if no route matched.  Digit strings that cannot be represented as a `TweetId` cannot match
/// any stored tweet, so they are reported as missing tweets.
pub(crate) struct TweetPath(pub(crate) TweetId);

#[async_trait]
impl<S> FromRequestParts<S> for TweetPath
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let no_route = |parts: &Parts| {
            let uri = match parts.extensions.get::<OriginalUri>() {
                Some(OriginalUri(uri)) => uri,
                None => &parts.uri,
            };
            RestError::no_route(&parts.method, uri)
        };

        // Segments that do not even decode to text cannot be made of digits.
        let raw = match Path::<String>::from_request_parts(parts, state).await {
            Ok(Path(raw)) => raw,
            Err(_) => return Err(no_route(parts)),
        };

        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(no_route(parts));
        }

        match TweetId::parse(&raw) {
            Ok(id) => Ok(TweetPath(id)),
            Err(_) => Err(tweet_error(tweet_not_found(raw))),
        }
    }
}

/// Deserializes the message of a tweet request by coercing whatever JSON value it has into text.
fn deserialize_message<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(coerce_message(&value))
}

/// Payload of the requests that create or update a tweet.
#[derive(Deserialize)]
pub(crate) struct TweetRequest {
    /// The message of the tweet, or `None` if the client did not provide a usable one.
    #[serde(default, deserialize_with = "deserialize_message")]
    message: Option<String>,
}

/// Payload of the responses that carry one tweet.
#[derive(Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize, PartialEq))]
pub(crate) struct TweetResponse {
    /// The tweet.
    tweet: Tweet,
}

/// Payload of the responses that carry multiple tweets.
#[derive(Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize, PartialEq))]
pub(crate) struct TweetsResponse {
    /// The tweets.
    tweets: Vec<Tweet>,
}

/// Creates the router for the application.
///
/// The tweets APIs are served both from the root and from the `/tweets` prefix.  Methods that a
/// path does not support are answered like unknown paths.
pub(crate) fn app<D>(driver: Driver<D>) -> Router
where
    D: Db + Clone + Send + Sync + 'static,
    D::Tx: TweetsTx,
{
    use axum::routing::get;
    let tweets = Router::new()
        .route(
            "/",
            get(tweets_get::handler::<D>).post(tweets_post::handler::<D>).fallback(fallback),
        )
        .route(
            "/:id",
            get(tweet_get::handler::<D>)
                .put(tweet_put::handler::<D>)
                .delete(tweet_delete::handler::<D>)
                .fallback(fallback),
        );
    Router::new()
        .nest("/tweets", tweets.clone())
        .merge(tweets)
        .fallback(fallback)
        .with_state(driver)
}
