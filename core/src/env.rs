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

//! Utilities to read configuration from environment variables.
//!
//! Variables are always looked up as `<prefix>_<suffix>` so that a single service can hold more
//! than one set of settings of the same kind (say, a production and a test database).  Values
//! are converted to their target type with `FromStr`.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

/// Looks up the variable `name` and parses it into a `T`.
///
/// Returns `None` if the variable is not set, and an error if it is set but its value is not
/// valid UTF-8 or cannot be parsed.
fn lookup<T>(name: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = match env::var(name) {
        Ok(raw) => raw,
        Err(env::VarError::NotPresent) => return Ok(None),
        Err(env::VarError::NotUnicode(_)) => {
            return Err(format!("Environment variable {} is not valid UTF-8", name));
        }
    };
    raw.parse::<T>()
        .map(Some)
        .map_err(|e| format!("Cannot parse environment variable {}='{}': {}", name, raw, e))
}

/// Gets the environment variable `<prefix>_<suffix>` converted to `T`, failing if it is not set.
pub fn get_required_var<T>(prefix: &str, suffix: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    let name = format!("{}_{}", prefix, suffix);
    lookup(&name)?.ok_or_else(|| format!("Required environment variable {} not present", name))
}

/// Gets the environment variable `<prefix>_<suffix>` converted to `T`, if set.
pub fn get_optional_var<T>(prefix: &str, suffix: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: Display,
{
    lookup(&format!("{}_{}", prefix, suffix))
}
