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

//! Validation of the messages submitted by clients when creating or updating tweets.
//!
//! A `Validator` holds an ordered list of rules.  All rules run against the input, even if an
//! earlier one already failed, so that clients get the full list of problems at once.

use crate::model::{MAX_MESSAGE_LENGTH, TweetMessage};
use serde_json::Value;

/// Converts a JSON value supplied as a tweet message into text.
///
/// Strings are taken as is, numbers and `true` become their shortest textual representation, and
/// anything else (`null`, `false`, `0`, arrays and objects) is considered to be an empty message,
/// as is the empty string.
pub(crate) fn coerce_message(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null | Value::Bool(false) | Value::Array(_) | Value::Object(_) => return None,
        Value::Bool(true) => "true".to_owned(),
        Value::Number(n) if n.as_f64() == Some(0.0) => return None,
        // Integral floats lose their fractional part, so `1.0` reads as `1`.
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => f.to_string(),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
    };
    if text.is_empty() { None } else { Some(text) }
}

/// A single check on the message of a tweet.
pub(crate) trait Rule: Send + Sync {
    /// Checks the `message`, which is `None` when the client did not provide one, and returns a
    /// description of the violation if the rule does not hold.
    fn check(&self, message: Option<&str>) -> Option<String>;
}

/// Requires the message to be present and non-empty.
pub(crate) struct ExistsRule;

impl Rule for ExistsRule {
    fn check(&self, message: Option<&str>) -> Option<String> {
        match message {
            Some(message) if !message.is_empty() => None,
            _ => Some("Tweet must include a message".to_owned()),
        }
    }
}

/// Limits the length of the message, in characters.  Missing messages are not this rule's
/// business.
pub(crate) struct MaxLengthRule(pub(crate) usize);

impl Rule for MaxLengthRule {
    fn check(&self, message: Option<&str>) -> Option<String> {
        match message {
            Some(message) if message.chars().count() > self.0 => {
                Some(format!("Tweet message must be fewer than {} characters", self.0))
            }
            _ => None,
        }
    }
}

/// Ordered collection of rules to apply to tweet messages.
pub(crate) struct Validator {
    /// Rules to evaluate, in evaluation order.
    rules: Vec<Box<dyn Rule>>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(vec![Box::from(ExistsRule), Box::from(MaxLengthRule(MAX_MESSAGE_LENGTH))])
    }
}

impl Validator {
    /// Creates a validator that evaluates `rules` in order.
    pub(crate) fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// Runs all rules against `message` and returns the validated message, or every violation
    /// found in rule order.
    pub(crate) fn validate(&self, message: Option<String>) -> Result<TweetMessage, Vec<String>> {
        let errors = self
            .rules
            .iter()
            .filter_map(|rule| rule.check(message.as_deref()))
            .collect::<Vec<String>>();
        if !errors.is_empty() {
            return Err(errors);
        }

        TweetMessage::new(message.unwrap_or_default()).map_err(|e| vec![e.to_string()])
    }
}
