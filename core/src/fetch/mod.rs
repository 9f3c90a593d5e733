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

//! Authenticated fetch abstraction.

use std::fmt::Debug;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use futures_util::stream::{self, StreamExt};
use log::debug;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use crate::{ByteStream, Error, Result};

mod direct;
pub use direct::DirectHttpFetcher;

/// Default size of the chunks written to disk by `grab_to_file`.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Fetch is the url grabber contract: fetch objects by their path relative to a
/// configured base url.
///
/// Implementations never retry, retry and backoff belong to the caller.
#[async_trait::async_trait]
pub trait Fetch: Debug + Send + Sync + 'static {
    /// Copy the object to a local file and return the filename written.
    ///
    /// Without `filename`, the object is written to its request path relative
    /// to the current directory, see [`default_filename`](crate::default_filename).
    async fn grab_to_file(&self, path: &str, filename: Option<&Path>) -> Result<PathBuf>;

    /// Open the object and return its live body.
    async fn open_stream(&self, path: &str) -> Result<ByteStream>;

    /// Read the whole object into memory.
    ///
    /// Fails with `LimitExceeded` if `limit` is set and the object is larger.
    async fn read_all(&self, path: &str, limit: Option<u64>) -> Result<Bytes>;
}

/// FetchOptions carries the settings shared by all fetchers: chunk size,
/// request timeout and cancellation.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    chunk_size: usize,
    timeout: Option<Duration>,
    cancel: Option<CancellationToken>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            timeout: None,
            cancel: None,
        }
    }
}

impl FetchOptions {
    /// Set the size of the chunks written to disk.
    ///
    /// A zero size falls back to [`DEFAULT_CHUNK_SIZE`].
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };
        self
    }

    /// Set the request timeout.
    ///
    /// It bounds the whole operation for `grab_to_file` and `read_all`, and
    /// the wait for the response head for `open_stream`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Abort in-flight operations once the token is cancelled.
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The chunk size used to write files.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// The request timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run the future under the configured timeout and cancellation token.
    pub async fn run<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        let fut = async {
            match self.timeout {
                Some(timeout) => tokio::time::timeout(timeout, fut).await.map_err(|_| {
                    Error::network(format!("request timed out after {timeout:?}"))
                })?,
                None => fut.await,
            }
        };

        match &self.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(Error::cancelled("fetch cancelled by caller")),
                    res = fut => res,
                }
            }
            None => fut.await,
        }
    }

    /// Tie a body to the cancellation token.
    ///
    /// Once the token fires, the stream yields a single `Cancelled` error and
    /// ends. Without a token the body is returned as is.
    pub fn guard_stream(&self, body: ByteStream) -> ByteStream {
        let Some(token) = self.cancel.clone() else {
            return body;
        };

        ByteStream::new(stream::unfold(Some((body, token)), |state| async move {
            let (mut body, token) = state?;
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => None,
                item = body.next() => Some(item),
            };
            match next {
                None => Some((Err(Error::cancelled("fetch cancelled by caller")), None)),
                Some(item) => item.map(|item| (item, Some((body, token)))),
            }
        }))
    }

    /// Download the body returned by `resp` into `filename`.
    ///
    /// The destination is opened for create, truncate and write only after
    /// `resp` succeeded, so a failed request leaves any existing file
    /// untouched. If copying the body fails, times out or is cancelled, the
    /// partially written file is removed.
    ///
    /// Returns the number of bytes written.
    pub async fn download_to_file(
        &self,
        filename: &Path,
        resp: impl Future<Output = Result<ByteStream>>,
    ) -> Result<u64> {
        let mut opened = false;
        let res = self
            .run(copy_to_file(resp, filename, self.chunk_size, &mut opened))
            .await;

        if res.is_err() && opened {
            debug!("removing partial file {}", filename.display());
            if let Err(err) = tokio::fs::remove_file(filename).await {
                debug!("remove partial file {} failed: {err}", filename.display());
            }
        }
        res
    }
}

async fn copy_to_file(
    resp: impl Future<Output = Result<ByteStream>>,
    filename: &Path,
    chunk_size: usize,
    opened: &mut bool,
) -> Result<u64> {
    let body = resp.await?;

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(filename)
        .await
        .map_err(|e| Error::io("open destination for writing failed").with_source(e))?;
    *opened = true;

    let mut reader = body.into_async_read();
    let mut buf = vec![0; chunk_size];
    let mut size = 0;
    loop {
        let n = reader.read(&mut buf).await.map_err(Error::from_body_io)?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])
            .await
            .map_err(|e| Error::io("write destination failed").with_source(e))?;
        size += n as u64;
    }
    file.flush()
        .await
        .map_err(|e| Error::io("flush destination failed").with_source(e))?;

    Ok(size)
}
