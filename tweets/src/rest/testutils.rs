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

//! Test utilities for the REST API.

use crate::driver::testutils::TestContext as DriverTestContext;
use crate::model::*;
use crate::rest::app;
use axum::Router;
use time::OffsetDateTime;
use time::macros::datetime;

/// Timestamp assigned to the tweets created by `TestContext::create_tweet`.
pub(crate) const CREATED_AT: OffsetDateTime = datetime!(2023-06-01 10:00:00 UTC);

/// State of a running test.
pub(crate) struct TestContext {
    /// The business layer state, which gives direct access to the database.
    driver_context: DriverTestContext,

    /// The router under test.
    app: Router,
}

impl TestContext {
    /// Initializes the router against an in-memory database and a fake clock.
    pub(crate) async fn setup() -> Self {
        let driver_context = DriverTestContext::setup().await;
        let app = app(driver_context.driver());
        Self { driver_context, app }
    }

    /// Returns a copy of the router under test.
    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    /// Consumes the context and returns the router under test.
    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Returns the time that the fake clock reports to the driver.
    pub(crate) fn now(&self) -> OffsetDateTime {
        use tweets_core::clocks::Clock;
        self.driver_context.clock().now_utc()
    }

    /// Stores a tweet with `message` directly in the database.
    pub(crate) async fn create_tweet(&self, message: &str) -> Tweet {
        self.driver_context.create_tweet(message, CREATED_AT).await
    }

    /// Fetches the tweet `id` directly from the database, if it exists.
    pub(crate) async fn get_tweet(&self, id: TweetId) -> Option<Tweet> {
        self.driver_context.get_tweet(id).await.ok()
    }

    /// Fetches all tweets directly from the database.
    pub(crate) async fn get_tweets(&self) -> Vec<Tweet> {
        self.driver_context.get_tweets().await
    }
}
