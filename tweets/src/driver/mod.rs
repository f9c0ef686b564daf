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

//! Business logic for the service.

use crate::db::TweetsTx;
use crate::model::{TweetId, TweetMessage};
use crate::validator::Validator;
use std::fmt::Display;
use std::sync::Arc;
use tweets_core::clocks::Clock;
use tweets_core::db::{Db, DbError};
use tweets_core::driver::{DriverError, DriverResult};

#[cfg(test)]
pub(crate) mod testutils;
mod tweet;
mod tweets;

/// Builds the error returned when the tweet identified by `id` does not exist.
///
/// `id` is the textual representation of the identifier as requested by the client, which may
/// not even be representable as a `TweetId`.
pub(crate) fn tweet_not_found<I: Display>(id: I) -> DriverError {
    DriverError::NotFound(format!("Tweet with id {} ain't hurr.", id))
}

/// Converts a database error raised while accessing the tweet `id` into a driver error.
fn map_tweet_error(id: TweetId) -> impl FnOnce(DbError) -> DriverError {
    move |e| match e {
        DbError::NotFound => tweet_not_found(id),
        e => DriverError::from(e),
    }
}

/// Business logic.
///
/// The public operations exposed by the driver are all "one shot": they start and commit a
/// transaction, so it's incorrect for the caller to use two separate calls.  For this reason,
/// these operations consume the driver in an attempt to minimize the possibility of executing
/// two operations.
#[derive(Clone)]
pub(crate) struct Driver<D>
where
    D: Db + Clone + Send + Sync + 'static,
    D::Tx: TweetsTx,
{
    /// The database that the driver uses for persistence.
    db: D,

    /// Rules that messages must satisfy before they are stored.
    validator: Arc<Validator>,

    /// Clock used to timestamp tweets.
    clock: Arc<dyn Clock + Send + Sync>,
}

impl<D> Driver<D>
where
    D: Db + Clone + Send + Sync + 'static,
    D::Tx: TweetsTx,
{
    /// Creates a new driver backed by the given injected components.
    pub(crate) fn new(db: D, validator: Validator, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { db, validator: Arc::from(validator), clock }
    }

    /// Checks a message supplied by the client against the validation rules.
    fn validate(&self, message: Option<String>) -> DriverResult<TweetMessage> {
        self.validator.validate(message).map_err(DriverError::InvalidInput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tweet_not_found() {
        assert_eq!(
            DriverError::NotFound("Tweet with id 12345678901234567890 ain't hurr.".to_owned()),
            tweet_not_found("12345678901234567890")
        );
    }

    #[test]
    fn test_map_tweet_error() {
        let id = TweetId::from_i32(5).unwrap();
        assert_eq!(
            DriverError::NotFound("Tweet with id 5 ain't hurr.".to_owned()),
            map_tweet_error(id)(DbError::NotFound)
        );
        assert_eq!(
            DriverError::BackendError("Unavailable".to_owned()),
            map_tweet_error(id)(DbError::Unavailable)
        );
    }
}
