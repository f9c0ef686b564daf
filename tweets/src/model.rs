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

//! High-level data types.

use derive_getters::Getters;
use derive_more::{Constructor, Display};
use serde::Serialize;
use time::OffsetDateTime;
use tweets_core::model::{ModelError, ModelResult};

/// Maximum number of characters that a tweet message can hold.
pub(crate) const MAX_MESSAGE_LENGTH: usize = 280;

/// Identifier of a tweet as assigned by the database.
///
/// We store this as an `i32` because the PostgreSQL backend uses a `SERIAL` column, and we
/// guarantee that it is always positive.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub(crate) struct TweetId(i32);

impl TweetId {
    /// Creates a tweet identifier from an `i32` with range validation.
    pub(crate) fn from_i32(id: i32) -> ModelResult<Self> {
        if id < 1 {
            return Err(ModelError(format!("Tweet id must be positive but got {}", id)));
        }
        Ok(Self(id))
    }

    /// Creates a tweet identifier from an `i64` with range validation.
    pub(crate) fn from_i64(id: i64) -> ModelResult<Self> {
        match i32::try_from(id) {
            Ok(id) => Self::from_i32(id),
            Err(e) => Err(ModelError(format!("Tweet id {} cannot be represented: {}", id, e))),
        }
    }

    /// Parses a tweet identifier from its textual representation as found in a URL.
    pub(crate) fn parse(raw: &str) -> ModelResult<Self> {
        match raw.parse::<i32>() {
            Ok(id) => Self::from_i32(id),
            Err(e) => Err(ModelError(format!("Invalid tweet id {}: {}", raw, e))),
        }
    }

    /// Returns the identifier as an `i32`.
    pub(crate) fn as_i32(self) -> i32 {
        self.0
    }
}

/// The text of a tweet, guaranteed to be non-empty and not longer than `MAX_MESSAGE_LENGTH`
/// characters.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
#[cfg_attr(test, serde(try_from = "String"))]
#[serde(into = "String")]
pub(crate) struct TweetMessage(String);

impl TweetMessage {
    /// Creates a new message after validating its length.
    pub(crate) fn new<S: Into<String>>(message: S) -> ModelResult<Self> {
        let message = message.into();
        if message.is_empty() {
            return Err(ModelError("Tweet message cannot be empty".to_owned()));
        }
        let length = message.chars().count();
        if length > MAX_MESSAGE_LENGTH {
            return Err(ModelError(format!(
                "Tweet message is {} characters long but the maximum is {}",
                length, MAX_MESSAGE_LENGTH
            )));
        }
        Ok(Self(message))
    }

    /// Returns the message as a string.
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<TweetMessage> for String {
    fn from(message: TweetMessage) -> Self {
        message.0
    }
}

#[cfg(test)]
impl TryFrom<String> for TweetMessage {
    type Error = ModelError;

    fn try_from(message: String) -> ModelResult<Self> {
        Self::new(message)
    }
}

/// A tweet as stored in the database.
#[derive(Constructor, Getters, Serialize)]
#[cfg_attr(test, derive(Debug, serde::Deserialize, PartialEq))]
#[serde(rename_all = "camelCase")]
pub(crate) struct Tweet {
    /// Identifier of the tweet.
    #[getter(copy)]
    id: TweetId,

    /// Text of the tweet.
    message: TweetMessage,

    /// Time at which the tweet was created.
    #[serde(with = "time::serde::rfc3339")]
    #[getter(copy)]
    created_at: OffsetDateTime,

    /// Time at which the tweet was last modified.
    #[serde(with = "time::serde::rfc3339")]
    #[getter(copy)]
    updated_at: OffsetDateTime,
}
