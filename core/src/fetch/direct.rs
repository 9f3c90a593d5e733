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
use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use http::header::CONTENT_LENGTH;
use log::{debug, error};
use tokio_util::sync::CancellationToken;

use super::{Fetch, FetchOptions};
use crate::{
    default_filename, ByteStream, Context, Endpoint, Error, Result, Signer, SigningCredential,
};

/// How much of an error response body is kept for diagnostics.
const ERROR_BODY_LIMIT: usize = 1024;

/// DirectHttpFetcher fetches objects with plain signed http GET requests.
///
/// Every request is signed through the [`Signer`] right before it's sent,
/// the http round trip goes through the [`Context`] of that signer.
///
/// ## Example
///
/// ```no_run
/// # use s3grab_core::{Context, DirectHttpFetcher, Endpoint, Fetch, Signer, Result};
/// # async fn example<K: s3grab_core::SigningCredential>(signer: Signer<K>) -> Result<()> {
/// let fetcher = DirectHttpFetcher::new(Endpoint::new("https://bucket.s3.amazonaws.com")?, signer);
/// let filename = fetcher.grab_to_file("/repodata/repomd.xml", None).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DirectHttpFetcher<K: SigningCredential> {
    endpoint: Endpoint,
    signer: Signer<K>,
    options: FetchOptions,
}

impl<K: SigningCredential> Debug for DirectHttpFetcher<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectHttpFetcher")
            .field("endpoint", &self.endpoint.as_str())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<K: SigningCredential> DirectHttpFetcher<K> {
    /// Create a new fetcher for given endpoint.
    pub fn new(endpoint: Endpoint, signer: Signer<K>) -> Self {
        Self {
            endpoint,
            signer,
            options: FetchOptions::default(),
        }
    }

    /// Replace all fetch options at once.
    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the size of the chunks written by `grab_to_file`.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.options = self.options.with_chunk_size(chunk_size);
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.with_timeout(timeout);
        self
    }

    /// Abort in-flight requests once the token is cancelled.
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.options = self.options.with_cancellation_token(token);
        self
    }

    /// The endpoint objects are fetched from.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn context(&self) -> &Context {
        self.signer.context()
    }

    fn build_request(&self, path: &str) -> Result<(String, http::request::Parts)> {
        let url = self.endpoint.join(path);
        debug!("requesting url: {url}");

        let (parts, _) = http::Request::get(&url)
            .body(())
            .map_err(|e| {
                Error::request_invalid("build request failed")
                    .with_source(e)
                    .with_context("url", &url)
            })?
            .into_parts();
        Ok((url, parts))
    }

    /// Sign and send the request, turning non-success statuses into errors.
    async fn send(
        &self,
        url: &str,
        mut parts: http::request::Parts,
    ) -> Result<http::Response<ByteStream>> {
        self.signer.sign(&mut parts).await?;

        let req = http::Request::from_parts(parts, Bytes::new());
        let resp = self.context().http_send(req).await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let head = resp.into_body().read_head(ERROR_BODY_LIMIT).await;
        let mut err = Error::repository_fetch(status, format!("server returned {status}"))
            .with_context("url", url);
        if !head.is_empty() {
            err = err.with_context("response", String::from_utf8_lossy(&head));
        }
        Err(err)
    }
}

#[async_trait::async_trait]
impl<K: SigningCredential> Fetch for DirectHttpFetcher<K> {
    async fn grab_to_file(&self, path: &str, filename: Option<&Path>) -> Result<PathBuf> {
        debug!("grab_to_file path={path} filename={filename:?}");

        let (url, parts) = self.build_request(path)?;
        let filename = match filename {
            Some(v) => v.to_path_buf(),
            None => default_filename(parts.uri.path())?,
        };

        let res = self
            .options
            .download_to_file(&filename, async {
                let resp = self.send(&url, parts).await?;
                Ok(resp.into_body())
            })
            .await;

        match res {
            Ok(size) => {
                debug!("grabbed {size} bytes from {url} into {}", filename.display());
                Ok(filename)
            }
            Err(err) => {
                error!(
                    "while grabbing url={url} filename={}, got error: {err}",
                    filename.display()
                );
                Err(with_url(err, &url).with_context("filename", filename.display()))
            }
        }
    }

    async fn open_stream(&self, path: &str) -> Result<ByteStream> {
        let (url, parts) = self.build_request(path)?;
        let resp = self
            .options
            .run(self.send(&url, parts))
            .await
            .map_err(|err| with_url(err, &url))?;

        Ok(self.options.guard_stream(resp.into_body()))
    }

    async fn read_all(&self, path: &str, limit: Option<u64>) -> Result<Bytes> {
        let (url, parts) = self.build_request(path)?;
        self.options
            .run(async {
                let resp = self.send(&url, parts).await?;
                if let Some(limit) = limit {
                    let length = resp
                        .headers()
                        .get(CONTENT_LENGTH)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok());
                    if length.is_some_and(|v| v > limit) {
                        return Err(Error::limit_exceeded(format!(
                            "response body is larger than {limit} bytes"
                        )));
                    }
                }
                resp.into_body().collect_with_limit(limit).await
            })
            .await
            .map_err(|err| with_url(err, &url))
    }
}

fn with_url(err: Error, url: &str) -> Error {
    if err.context("url").is_some() {
        err
    } else {
        err.with_context("url", url)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use futures_util::stream;
    use http::header::AUTHORIZATION;
    use http::StatusCode;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{ErrorKind, HttpSend, ProvideCredential, SignRequest};

    #[derive(Clone, Debug)]
    struct TestCredential(String);

    impl SigningCredential for TestCredential {
        fn is_valid(&self) -> bool {
            !self.0.is_empty()
        }
    }

    #[derive(Debug)]
    struct TestProvider(Option<String>);

    #[async_trait::async_trait]
    impl ProvideCredential for TestProvider {
        type Credential = TestCredential;

        async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
            Ok(self.0.clone().map(TestCredential))
        }
    }

    #[derive(Debug)]
    struct TestSignRequest;

    #[async_trait::async_trait]
    impl SignRequest for TestSignRequest {
        type Credential = TestCredential;

        async fn sign_request(
            &self,
            _: &Context,
            req: &mut http::request::Parts,
            credential: Option<&Self::Credential>,
        ) -> Result<()> {
            let cred =
                credential.ok_or_else(|| Error::credential_invalid("missing credential"))?;
            req.headers
                .insert(AUTHORIZATION, format!("TEST {}", cred.0).parse()?);
            Ok(())
        }
    }

    /// Answers every request with the same status and body, split in chunks.
    #[derive(Debug, Clone)]
    struct MockHttpSend {
        status: StatusCode,
        chunks: Vec<Bytes>,
        requests: Arc<Mutex<Vec<http::request::Parts>>>,
    }

    impl MockHttpSend {
        fn new(status: StatusCode, body: &[u8], chunk: usize) -> Self {
            Self {
                status,
                chunks: body.chunks(chunk).map(Bytes::copy_from_slice).collect(),
                requests: Arc::default(),
            }
        }
    }

    #[async_trait::async_trait]
    impl HttpSend for MockHttpSend {
        async fn http_send(
            &self,
            req: http::Request<Bytes>,
        ) -> Result<http::Response<ByteStream>> {
            let (parts, _) = req.into_parts();
            self.requests.lock().unwrap().push(parts);

            let chunks = self.chunks.clone();
            let body = ByteStream::new(stream::iter(chunks.into_iter().map(Ok)));
            Ok(http::Response::builder().status(self.status).body(body)?)
        }
    }

    fn fetcher(http: MockHttpSend, key: Option<&str>) -> DirectHttpFetcher<TestCredential> {
        let ctx = Context::new().with_http_send(http);
        let signer = Signer::new(ctx, TestProvider(key.map(String::from)), TestSignRequest);
        let endpoint = Endpoint::new("http://bucket.s3.amazonaws.com").unwrap();
        DirectHttpFetcher::new(endpoint, signer)
    }

    #[tokio::test]
    async fn test_read_all_signs_every_request() -> Result<()> {
        let http = MockHttpSend::new(StatusCode::OK, b"<repomd/>", 4);
        let f = fetcher(http.clone(), Some("akid"));

        let bs = f.read_all("/repodata/repomd.xml", None).await?;
        assert_eq!(bs.as_ref(), b"<repomd/>");
        f.read_all("/repodata/repomd.xml", None).await?;

        let requests = http.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        for req in requests.iter() {
            assert_eq!(req.method, http::Method::GET);
            assert_eq!(
                req.uri.to_string(),
                "http://bucket.s3.amazonaws.com/repodata/repomd.xml"
            );
            assert_eq!(req.headers.get_all(AUTHORIZATION).iter().count(), 1);
            assert_eq!(req.headers[AUTHORIZATION], "TEST akid");
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_grab_to_file_chunked_body() -> Result<()> {
        let body: Vec<u8> = (0..20000u32).map(|i| (i % 253) as u8).collect();
        let http = MockHttpSend::new(StatusCode::OK, &body, 3000);
        let f = fetcher(http, Some("akid")).with_chunk_size(1024);

        let dir = tempfile::tempdir()?;
        let dest = dir.path().join("big.rpm");
        let written = f.grab_to_file("/big.rpm", Some(&dest)).await?;

        assert_eq!(written, dest);
        assert_eq!(tokio::fs::read(&dest).await?, body);
        Ok(())
    }

    #[tokio::test]
    async fn test_grab_to_file_forbidden() -> Result<()> {
        let http = MockHttpSend::new(
            StatusCode::FORBIDDEN,
            b"<Error><Code>SignatureDoesNotMatch</Code></Error>",
            16,
        );
        let f = fetcher(http, Some("akid"));

        let dir = tempfile::tempdir()?;
        let dest = dir.path().join("a.rpm");
        let err = f
            .grab_to_file("/a.rpm", Some(&dest))
            .await
            .expect_err("403 must fail");

        assert_eq!(err.kind(), ErrorKind::RepositoryFetch);
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(err.context("url"), Some("http://bucket.s3.amazonaws.com/a.rpm"));
        assert_eq!(err.context("filename"), Some(dest.display().to_string().as_str()));
        assert_eq!(
            err.context("response"),
            Some("<Error><Code>SignatureDoesNotMatch</Code></Error>")
        );
        assert!(!dest.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_grab_to_file_rejects_escaping_filename() {
        let http = MockHttpSend::new(StatusCode::OK, b"root:x:0:0", 4);
        let f = fetcher(http.clone(), Some("akid"));

        for path in ["//etc/passwd", "/../passwd"] {
            let err = f
                .grab_to_file(path, None)
                .await
                .expect_err("filename must stay under the current directory");
            assert_eq!(err.kind(), ErrorKind::RequestInvalid);
        }
        assert!(http.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_stream() -> Result<()> {
        use futures_util::TryStreamExt;

        let http = MockHttpSend::new(StatusCode::OK, b"0123456789", 3);
        let f = fetcher(http, Some("akid"));

        let chunks: Vec<Bytes> = f.open_stream("/digits").await?.try_collect().await?;
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks.concat(), b"0123456789");
        Ok(())
    }

    #[tokio::test]
    async fn test_open_stream_cancelled_while_reading() -> Result<()> {
        use futures_util::{StreamExt, TryStreamExt};

        let token = CancellationToken::new();
        let http = MockHttpSend::new(StatusCode::OK, b"0123456789", 3);
        let f = fetcher(http, Some("akid")).with_cancellation_token(token.clone());

        let mut stream = f.open_stream("/digits").await?;
        let first = stream.next().await.expect("body has chunks")?;
        assert_eq!(first.as_ref(), b"012");

        token.cancel();
        let err = stream
            .try_collect::<Vec<Bytes>>()
            .await
            .expect_err("reading after cancel must fail");
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        Ok(())
    }

    #[tokio::test]
    async fn test_open_stream_not_found() {
        let http = MockHttpSend::new(StatusCode::NOT_FOUND, b"", 1);
        let f = fetcher(http, Some("akid"));

        let err = f.open_stream("/missing").await.expect_err("404 must fail");
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.context("response"), None);
    }

    #[tokio::test]
    async fn test_read_all_limit() {
        let http = MockHttpSend::new(StatusCode::OK, &[b'x'; 100], 10);
        let f = fetcher(http, Some("akid"));

        assert_eq!(f.read_all("/x", Some(100)).await.unwrap().len(), 100);
        let err = f.read_all("/x", Some(99)).await.expect_err("limit must apply");
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let http = MockHttpSend::new(StatusCode::OK, b"data", 4);
        let f = fetcher(http.clone(), None);

        let err = f.read_all("/x", None).await.expect_err("must not sign");
        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
        assert!(http.requests.lock().unwrap().is_empty());
    }
}
