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

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use s3grab_aws_v2::Config as CredentialConfig;
use s3grab_core::{BaseUrl, Context, Error, Result};
use tokio_util::sync::CancellationToken;

const S3GRAB_BASE_URL: &str = "S3GRAB_BASE_URL";
const S3GRAB_FETCHER: &str = "S3GRAB_FETCHER";
const S3GRAB_REGION: &str = "S3GRAB_REGION";
const S3GRAB_TIMEOUT_SECS: &str = "S3GRAB_TIMEOUT_SECS";
const S3GRAB_CHUNK_SIZE: &str = "S3GRAB_CHUNK_SIZE";

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

/// FetcherKind selects the fetcher implementation.
///
/// The choice is always explicit, s3grab never tries one and falls back to the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetcherKind {
    /// Signed http requests sent through the context http client.
    #[default]
    DirectHttp,
    /// `GetObject` calls through `aws-sdk-s3`.
    NativeSdk,
}

impl FromStr for FetcherKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" | "direct-http" | "http" => Ok(FetcherKind::DirectHttp),
            "sdk" | "native-sdk" => Ok(FetcherKind::NativeSdk),
            _ => Err(Error::config_invalid("unknown fetcher kind, expect direct or sdk")
                .with_context("fetcher", s)),
        }
    }
}

impl Display for FetcherKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FetcherKind::DirectHttp => f.write_str("direct"),
            FetcherKind::NativeSdk => f.write_str("sdk"),
        }
    }
}

/// FetcherConfig is everything needed to build a fetcher.
#[derive(Debug, Clone, Default)]
pub struct FetcherConfig {
    /// Base url objects are resolved against. Only the first entry of a
    /// mirror list is used.
    pub base_url: BaseUrl,
    /// Fetcher implementation.
    pub kind: FetcherKind,
    /// Region used by the sdk fetcher, default to [`DEFAULT_REGION`].
    pub region: Option<String>,
    /// Request timeout, unlimited by default.
    pub timeout: Option<Duration>,
    /// Chunk size used to write files.
    pub chunk_size: Option<usize>,
    /// Token aborting in-flight fetches once cancelled.
    pub cancel: Option<CancellationToken>,
    /// Credential settings.
    pub credential: CredentialConfig,
}

impl FetcherConfig {
    /// Set the base url, either a single url or a mirror list.
    pub fn with_base_url(mut self, base_url: impl Into<BaseUrl>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the fetcher implementation.
    pub fn with_kind(mut self, kind: FetcherKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the region used by the sdk fetcher.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the chunk size used to write files.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    /// Set the cancellation token.
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Set the access key id and secret access key.
    pub fn with_credential(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.credential = self
            .credential
            .with_access_key_id(access_key_id)
            .with_secret_access_key(secret_access_key);
        self
    }

    /// The region used by the sdk fetcher.
    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// Fill the settings that are still unset from the environment.
    ///
    /// Fails with `ConfigInvalid` if a variable holds an invalid value.
    pub fn from_env(mut self, ctx: &Context) -> Result<Self> {
        if self.base_url.first().is_none() {
            if let Some(v) = ctx.env_var(S3GRAB_BASE_URL) {
                self.base_url = v.split_whitespace().collect::<Vec<_>>().into();
            }
        }
        if let Some(v) = ctx.env_var(S3GRAB_FETCHER) {
            self.kind = v.parse()?;
        }
        if self.region.is_none() {
            self.region = ctx.env_var(S3GRAB_REGION);
        }
        if self.timeout.is_none() {
            if let Some(v) = ctx.env_var(S3GRAB_TIMEOUT_SECS) {
                let secs: u64 = v.trim().parse().map_err(|e| {
                    Error::config_invalid("timeout must be a number of seconds")
                        .with_context(S3GRAB_TIMEOUT_SECS, &v)
                        .with_source(e)
                })?;
                self.timeout = Some(Duration::from_secs(secs));
            }
        }
        if self.chunk_size.is_none() {
            if let Some(v) = ctx.env_var(S3GRAB_CHUNK_SIZE) {
                let size: usize = v.trim().parse().map_err(|e| {
                    Error::config_invalid("chunk size must be a number of bytes")
                        .with_context(S3GRAB_CHUNK_SIZE, &v)
                        .with_source(e)
                })?;
                self.chunk_size = Some(size);
            }
        }
        self.credential = self.credential.from_env(ctx);

        Ok(self)
    }
}
