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

use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use http::StatusCode;
use s3grab_core::Error;

/// Map an SDK error to our error kinds.
///
/// - Responses with a non-success status become `RepositoryFetch` errors
///   carrying that status.
/// - Dispatch failures, timeouts and broken responses become `Network` errors.
/// - Anything else, like requests the SDK refused to build, is `Unexpected`.
pub fn map_sdk_error<E>(err: SdkError<E, HttpResponse>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let (mapped, code, message) = match &err {
        SdkError::ServiceError(ctx) => {
            let status = ctx.raw().status().as_u16();
            let mapped = match StatusCode::from_u16(status) {
                Ok(status) => {
                    Error::repository_fetch(status, format!("server returned {status}"))
                }
                Err(_) => Error::unexpected(format!("server returned invalid status {status}")),
            };
            (
                mapped,
                ctx.err().code().map(str::to_string),
                ctx.err().message().map(str::to_string),
            )
        }
        SdkError::TimeoutError(_) => (Error::network("request timed out"), None, None),
        SdkError::DispatchFailure(_) => {
            (Error::network("failed to send http request"), None, None)
        }
        SdkError::ResponseError(_) => {
            (Error::network("failed to read http response"), None, None)
        }
        _ => (Error::unexpected("failed to build sdk request"), None, None),
    };

    let mut mapped = mapped;
    if let Some(code) = code {
        mapped = mapped.with_context("code", code);
    }
    if let Some(message) = message {
        mapped = mapped.with_context("response", message);
    }
    mapped.with_source(err)
}
