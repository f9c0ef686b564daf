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

//! Generic code for REST handlers.
//!
//! Services implement an `app` function in their `rest` module that returns the `Router` for the
//! application.
//!
//! Every API should be put in its own `.rs` file, using a name like `<entity>_<method>.rs`.  This
//! may seem overkill, but putting every API in its own file makes it easy to ensure all the
//! integration tests for the given API truly belong to that API.
//!
//! More specifically, the `tests` module within an API should define a `route` method that
//! returns the HTTP method and the API path under test.  All integration tests within the module
//! then rely on `route` to obtain this information, ensuring that they all test the desired API.

use crate::driver::DriverError;
use async_trait::async_trait;
use axum::Json;
use axum::body::HttpBody;
use axum::extract::{FromRequest, OriginalUri, Request};
use axum::response::IntoResponse;
use log::warn;
use serde::{Deserialize, Serialize};

/// Title used for all errors caused by malformed requests.
const BAD_REQUEST_TITLE: &str = "Bad request.";

/// Title used for lookups of entities or routes that do not exist.
const NOT_FOUND_TITLE: &str = "Not found.";

/// Frontend errors.  These are the errors that are visible to the user on failed requests.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RestError {
    /// Catch-all error type for all unexpected errors.
    #[error("{0}")]
    InternalError(String),

    /// Indicates that a requested entity does not exist.
    #[error("{message}")]
    NotFound {
        /// Short description of the kind of entity that was not found.
        title: String,

        /// Descriptive message identifying the missing entity.
        message: String,
    },

    /// Indicates that a request that should have empty content did not.
    #[error("Content should be empty")]
    PayloadNotEmpty,

    /// Indicates that the request body did not pass validation.  Carries every violation.
    #[error("Bad request.")]
    ValidationFailed(Vec<String>),
}

impl RestError {
    /// Creates a generic not-found error for a request that did not match any route.
    pub fn no_route(method: &http::Method, uri: &http::Uri) -> Self {
        RestError::NotFound {
            title: NOT_FOUND_TITLE.to_owned(),
            message: format!("Cannot {} {}", method, uri.path()),
        }
    }

    /// Returns the HTTP status code that represents this error.
    pub fn status(&self) -> http::StatusCode {
        match self {
            RestError::InternalError(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
            RestError::NotFound { .. } => http::StatusCode::NOT_FOUND,
            RestError::PayloadNotEmpty => http::StatusCode::PAYLOAD_TOO_LARGE,
            RestError::ValidationFailed(_) => http::StatusCode::BAD_REQUEST,
        }
    }

    /// Returns the short title describing the category of this error.
    fn title(&self) -> &str {
        match self {
            RestError::InternalError(_) => "Internal server error.",
            RestError::NotFound { title, .. } => title,
            RestError::PayloadNotEmpty => "Payload too large.",
            RestError::ValidationFailed(_) => BAD_REQUEST_TITLE,
        }
    }
}

impl From<DriverError> for RestError {
    fn from(e: DriverError) -> Self {
        match e {
            DriverError::BackendError(_) => RestError::InternalError(e.to_string()),
            DriverError::InvalidInput(errors) => RestError::ValidationFailed(errors),
            DriverError::NotFound(message) => {
                RestError::NotFound { title: NOT_FOUND_TITLE.to_owned(), message }
            }
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            warn!("Request failed with status {}: {}", status, self);
        }

        let response = ErrorResponse {
            title: self.title().to_owned(),
            message: self.to_string(),
            errors: match self {
                RestError::ValidationFailed(errors) => Some(errors),
                _ => None,
            },
            status: status.as_u16(),
        };

        (status, Json(response)).into_response()
    }
}

/// Result type for this module.
pub type RestResult<T> = Result<T, RestError>;

/// Representation of the details of an error response.
#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub struct ErrorResponse {
    /// Short description of the category of the error.
    pub title: String,

    /// Textual representation of the error message.
    pub message: String,

    /// Individual problems found in the request, if the error stems from validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,

    /// Numeric HTTP status code, duplicated here for the benefit of clients.
    pub status: u16,
}

/// A request body extractor that forbids any content.
///
/// Any API that doesn't expect a body should use this to ensure we don't get garbage data that we
/// don't care about.  This future-proofs the service.
pub struct EmptyBody {}

#[async_trait]
impl<S> FromRequest<S> for EmptyBody
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        if req.into_body().is_end_stream() {
            Ok(EmptyBody {})
        } else {
            Err(RestError::PayloadNotEmpty)
        }
    }
}

/// Handler for requests that do not match any route.  Install with `Router::fallback`.
///
/// Reports the path as requested by the client, not the one seen by a nested router.
pub async fn fallback(method: http::Method, OriginalUri(uri): OriginalUri) -> RestError {
    RestError::no_route(&method, &uri)
}

/// Helpers to drive a `Router` in-process from tests.
#[cfg(feature = "testutils")]
pub mod testutils {
    use super::*;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{self, HeaderName, HeaderValue, StatusCode, header};
    use axum::response::Response;
    use serde::de::DeserializeOwned;
    use tower::util::ServiceExt;

    /// Largest response body that tests are willing to read.
    const BODY_LIMIT: usize = 1024 * 1024;

    /// A request under construction, bound to the app that will serve it.
    #[must_use]
    pub struct TestRequest {
        /// App that receives the request.
        app: Router,

        /// Partially-built request.
        request: http::request::Builder,
    }

    impl TestRequest {
        /// Starts a request for the `(method, uri)` pair, usually obtained from a test's `route`.
        pub fn new<U: AsRef<str>>(app: Router, (method, uri): (http::Method, U)) -> Self {
            Self { app, request: http::Request::builder().method(method).uri(uri.as_ref()) }
        }

        /// Adds the `name: value` header to the request.
        pub fn header(mut self, name: HeaderName, value: &str) -> Self {
            self.request = self.request.header(name, HeaderValue::from_str(value).unwrap());
            self
        }

        /// Runs the request with `body` through the app.
        async fn dispatch(self, body: Body) -> TestResponse {
            let request = self.request.body(body).unwrap();
            let response = self.app.oneshot(request).await.unwrap();
            TestResponse { response, want: StatusCode::OK }
        }

        /// Sends the request without a body.
        pub async fn send_empty(self) -> TestResponse {
            self.dispatch(Body::empty()).await
        }

        /// Sends `text` as a `text/plain` body unless a content type was already set.
        pub async fn send_text(mut self, text: &str) -> TestResponse {
            let has_type =
                self.request.headers_ref().is_some_and(|h| h.contains_key(header::CONTENT_TYPE));
            if !has_type {
                self = self.header(header::CONTENT_TYPE, mime::TEXT_PLAIN.as_ref());
            }
            self.dispatch(Body::from(text.to_owned())).await
        }

        /// Sends `value` serialized as a JSON body.
        pub async fn send_json<T: Serialize>(self, value: T) -> TestResponse {
            let body = serde_json::to_vec(&value).unwrap();
            self.header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .dispatch(Body::from(body))
                .await
        }
    }

    /// A response to check.  The status code must be `200 OK` unless `expect_status` says
    /// otherwise, and it is asserted when the body is consumed.
    #[must_use]
    pub struct TestResponse {
        /// The response produced by the app.
        response: Response,

        /// Status code the response must carry.
        want: StatusCode,
    }

    impl TestResponse {
        /// Requires the response to carry `status` instead of `200 OK`.
        pub fn expect_status(mut self, status: StatusCode) -> Self {
            self.want = status;
            self
        }

        /// Asserts the status code and returns the body as text.
        async fn body_text(self) -> String {
            assert_eq!(self.want, self.response.status());
            let bytes = axum::body::to_bytes(self.response.into_body(), BODY_LIMIT).await.unwrap();
            String::from_utf8(bytes.to_vec()).unwrap()
        }

        /// Requires an empty body.
        pub async fn expect_empty(self) {
            let body = self.body_text().await;
            assert_eq!("", body);
        }

        /// Requires a body that deserializes into `T` and returns it.
        pub async fn expect_json<T: DeserializeOwned>(self) -> T {
            let body = self.body_text().await;
            serde_json::from_str(&body)
                .unwrap_or_else(|e| panic!("Body is not the expected JSON ({}): {}", e, body))
        }

        /// Requires an `ErrorResponse` body consistent with the status code and returns it.
        pub async fn expect_error_response(self) -> ErrorResponse {
            let status = self.want.as_u16();
            let response: ErrorResponse = self.expect_json().await;
            assert_eq!(status, response.status);
            response
        }

        /// Requires an `ErrorResponse` body whose message matches the `pattern` regex.
        pub async fn expect_error_message(self, pattern: &str) {
            let response = self.expect_error_response().await;
            let re = regex::Regex::new(pattern).unwrap();
            assert!(re.is_match(&response.message), "{:?} does not match {}", response, pattern);
        }

        /// Requires a plain, non-JSON body that matches the `pattern` regex.
        pub async fn expect_text(self, pattern: &str) {
            let body = self.body_text().await;
            assert!(serde_json::from_str::<ErrorResponse>(&body).is_err(), "Got JSON: {}", body);
            let re = regex::Regex::new(pattern).unwrap();
            assert!(re.is_match(&body), "'{}' does not match {}", body, pattern);
        }
    }

    /// Declares a test checking that the API at `$route` rejects bodies that are not JSON.
    ///
    /// These rejections come from axum itself, so they are plain text.
    #[macro_export]
    macro_rules! test_payload_must_be_json {
        ( $app:expr, $route:expr ) => {
            #[tokio::test]
            async fn test_payload_must_be_json() {
                $crate::rest::testutils::TestRequest::new($app, $route)
                    .send_text("{ not json")
                    .await
                    .expect_status(axum::http::StatusCode::UNSUPPORTED_MEDIA_TYPE)
                    .expect_text("application/json")
                    .await;

                $crate::rest::testutils::TestRequest::new($app, $route)
                    .header(axum::http::header::CONTENT_TYPE, "application/json")
                    .send_text("{ not json")
                    .await
                    .expect_status(axum::http::StatusCode::BAD_REQUEST)
                    .expect_text("key must be a string")
                    .await;
            }
        };
    }

    pub use test_payload_must_be_json;

    /// Declares a test checking that the API at `$route` rejects any body.
    #[macro_export]
    macro_rules! test_payload_must_be_empty {
        ( $app:expr, $route:expr ) => {
            #[tokio::test]
            async fn test_payload_must_be_empty() {
                $crate::rest::testutils::TestRequest::new($app, $route)
                    .send_text("unexpected")
                    .await
                    .expect_status(axum::http::StatusCode::PAYLOAD_TOO_LARGE)
                    .expect_error_message("^Content should be empty$")
                    .await;
            }
        };
    }

    pub use test_payload_must_be_empty;
}
