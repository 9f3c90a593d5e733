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

use std::mem;

use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::Method;
use http::Uri;

use crate::{Error, Result};

/// Signing context for request.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path, kept percent-encoded exactly as it will be sent.
    pub path: String,
    /// Raw HTTP query, if any.
    pub query: Option<String>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from http::request::Parts.
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        let uri = mem::take(&mut parts.uri).into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme.unwrap_or(Scheme::HTTP),
            authority: uri.authority.ok_or_else(|| {
                Error::request_invalid("request without authority is invalid for signing")
            })?,
            path: paq.path().to_string(),
            query: paq.query().map(|v| v.to_string()),

            // Take the headers out of the request to avoid copy.
            // We will return it back when apply the context.
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Apply the signing context back to http::request::Parts.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        // Return headers back.
        mem::swap(&mut parts.headers, &mut self.headers);
        parts.method = self.method;
        parts.uri = {
            let mut uri_parts = mem::take(&mut parts.uri).into_parts();
            uri_parts.scheme = Some(self.scheme);
            uri_parts.authority = Some(self.authority);
            uri_parts.path_and_query = {
                let paq = match self.query {
                    Some(query) => format!("{}?{query}", self.path),
                    None => self.path,
                };
                Some(PathAndQuery::try_from(paq)?)
            };
            Uri::from_parts(uri_parts)?
        };

        Ok(())
    }

    /// Get the host of this request, without port.
    #[inline]
    pub fn host(&self) -> &str {
        self.authority.host()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::CONTENT_TYPE;

    #[test]
    fn test_build_and_apply() -> Result<()> {
        let req = http::Request::get("https://bucket.s3.amazonaws.com/some%20dir/a.rpm?versionId=1")
            .header(CONTENT_TYPE, "text/plain")
            .body(())?;
        let (mut parts, _) = req.into_parts();

        let ctx = SigningRequest::build(&mut parts)?;
        assert_eq!(ctx.host(), "bucket.s3.amazonaws.com");
        assert_eq!(ctx.path, "/some%20dir/a.rpm");
        assert_eq!(ctx.query.as_deref(), Some("versionId=1"));
        assert_eq!(ctx.headers[CONTENT_TYPE], "text/plain");

        ctx.apply(&mut parts)?;
        assert_eq!(
            parts.uri.to_string(),
            "https://bucket.s3.amazonaws.com/some%20dir/a.rpm?versionId=1"
        );
        assert_eq!(parts.headers.len(), 1);
        Ok(())
    }

    #[test]
    fn test_build_without_authority() -> Result<()> {
        let req = http::Request::get("/key.txt").body(())?;
        let (mut parts, _) = req.into_parts();

        let err = SigningRequest::build(&mut parts).expect_err("authority is required");
        assert_eq!(err.kind(), crate::ErrorKind::RequestInvalid);
        Ok(())
    }
}
