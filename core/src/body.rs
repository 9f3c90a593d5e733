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

use std::fmt::{Debug, Formatter};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures_util::stream::{self, Stream, StreamExt};
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;

use crate::{Error, Result};

/// ByteStream is a live, lazily-read response body.
///
/// The stream is finite and not restartable: reading it again requires a new
/// request.
pub struct ByteStream(Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>);

impl ByteStream {
    /// Wrap a stream of bytes.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes>> + Send + 'static,
    {
        Self(Box::pin(stream))
    }

    /// Create a stream that yields given bytes as a single chunk.
    pub fn from_bytes(bs: impl Into<Bytes>) -> Self {
        let bs = bs.into();
        if bs.is_empty() {
            return Self::empty();
        }
        Self::new(stream::once(async move { Ok(bs) }))
    }

    /// Create an empty stream.
    pub fn empty() -> Self {
        Self::new(stream::empty())
    }

    /// Read the whole stream into memory.
    pub async fn collect(self) -> Result<Bytes> {
        self.collect_with_limit(None).await
    }

    /// Read the whole stream into memory, failing with
    /// [`ErrorKind::LimitExceeded`](crate::ErrorKind::LimitExceeded) as soon
    /// as more than `limit` bytes have been read.
    pub async fn collect_with_limit(mut self, limit: Option<u64>) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.0.next().await {
            let chunk = chunk?;
            if let Some(limit) = limit {
                if (buf.len() + chunk.len()) as u64 > limit {
                    return Err(Error::limit_exceeded(format!(
                        "response body is larger than {limit} bytes"
                    )));
                }
            }
            buf.extend_from_slice(&chunk);
        }
        Ok(buf.freeze())
    }

    /// Read at most `max` bytes from the head of the stream.
    ///
    /// Errors while reading end the read early, the bytes read so far are
    /// returned. This is meant for error diagnostics only.
    pub async fn read_head(mut self, max: usize) -> Bytes {
        let mut buf = BytesMut::new();
        while buf.len() < max {
            match self.0.next().await {
                Some(Ok(chunk)) => buf.extend_from_slice(&chunk),
                _ => break,
            }
        }
        buf.truncate(max);
        buf.freeze()
    }

    /// Convert into an `AsyncRead`.
    ///
    /// Errors raised by the stream are carried inside the returned
    /// `io::Error`, use [`Error::from_body_io`] to get them back.
    pub fn into_async_read(self) -> impl AsyncRead + Send + Unpin {
        StreamReader::new(self.map(|res| res.map_err(io::Error::other)))
    }
}

impl Error {
    /// Recover the error raised by a [`ByteStream`] read through
    /// [`ByteStream::into_async_read`].
    ///
    /// Any other io error is treated as a broken response body.
    pub fn from_body_io(err: io::Error) -> Self {
        if err.get_ref().is_some_and(|e| e.is::<Error>()) {
            if let Some(inner) = err.into_inner() {
                if let Ok(inner) = inner.downcast::<Error>() {
                    return *inner;
                }
            }
            return Error::network("read response body failed");
        }

        Error::network("read response body failed").with_source(err)
    }
}

impl Stream for ByteStream {
    type Item = Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.0.as_mut().poll_next(cx)
    }
}

impl Debug for ByteStream {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteStream").finish_non_exhaustive()
    }
}
