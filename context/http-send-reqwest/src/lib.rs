// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Reqwest-based HTTP client implementation for s3grab.
//!
//! This crate provides `ReqwestHttpSend`, an HTTP client that implements
//! the `HttpSend` trait from `s3grab_core` using the popular reqwest library.
//!
//! Response bodies are never buffered: they are handed back as a
//! [`ByteStream`] that reads from the connection on demand.
//!
//! ## Example
//!
//! ```no_run
//! use s3grab_core::{Context, OsEnv};
//! use s3grab_http_send_reqwest::ReqwestHttpSend;
//! use reqwest::Client;
//! use std::time::Duration;
//!
//! # fn example() -> reqwest::Result<()> {
//! // Use the default client
//! let ctx = Context::new()
//!     .with_http_send(ReqwestHttpSend::default())
//!     .with_env(OsEnv);
//!
//! // Or bring your own client, for example with a connect timeout
//! let client = Client::builder()
//!     .connect_timeout(Duration::from_secs(10))
//!     .build()?;
//! let ctx = Context::new().with_http_send(ReqwestHttpSend::new(client));
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::TryStreamExt;
use log::debug;
use reqwest::{Client, Request};
use s3grab_core::{ByteStream, Error, HttpSend, Result};

/// Reqwest-based implementation of the `HttpSend` trait.
///
/// Non-success statuses are returned as regular responses, only transport
/// failures become errors.
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<ByteStream>> {
        let req = Request::try_from(req)
            .map_err(|e| Error::request_invalid("failed to convert http request").with_source(e))?;
        let url = req.url().to_string();

        let resp = self.client.execute(req).await.map_err(|e| {
            let err = classify_error(e);
            debug!("send request to {url} failed: {err}");
            err.with_context("url", &url)
        })?;

        let mut builder = http::Response::builder()
            .status(resp.status())
            .version(resp.version());
        if let Some(headers) = builder.headers_mut() {
            *headers = resp.headers().clone();
        }

        let body = resp.bytes_stream().map_err(move |e| {
            classify_error(e).with_context("url", &url)
        });
        Ok(builder.body(ByteStream::new(body))?)
    }
}

/// Map a reqwest error to our error kinds.
///
/// Anything that happened on the wire is a network error, only requests
/// reqwest refused to build are invalid.
fn classify_error(err: reqwest::Error) -> Error {
    if err.is_builder() {
        return Error::request_invalid("failed to build http request").with_source(err);
    }

    let message = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "failed to connect to server"
    } else if err.is_body() || err.is_decode() {
        "failed to read response body"
    } else {
        "failed to send http request"
    };
    Error::network(message).with_source(err)
}
