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

use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::operation::get_object::GetObjectOutput;
use aws_sdk_s3::Client;
use bytes::Bytes;
use futures_util::stream;
use log::{debug, error};
use percent_encoding::percent_decode_str;
use s3grab_aws_v2::Credential;
use s3grab_core::{
    local_filename, ByteStream, Endpoint, Error, Fetch, FetchOptions, Result,
};
use tokio_util::sync::CancellationToken;

use crate::map_sdk_error;

const PROVIDER_NAME: &str = "s3grab";

/// NativeSdkFetcher fetches objects through `aws-sdk-s3` `GetObject` calls.
///
/// The endpoint host is split into the bucket (its first label) and the
/// service endpoint (the remaining labels). The endpoint path prefix joined
/// with the relative path forms the object key.
///
/// The SDK retry policy is disabled, failures are returned to the caller
/// right away.
#[derive(Clone)]
pub struct NativeSdkFetcher {
    client: Client,
    bucket: String,
    endpoint: Endpoint,
    options: FetchOptions,
}

impl Debug for NativeSdkFetcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeSdkFetcher")
            .field("bucket", &self.bucket)
            .field("endpoint", &self.endpoint.as_str())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl NativeSdkFetcher {
    /// Create a new fetcher for given endpoint, signing with `credential`.
    ///
    /// Fails with `ConfigInvalid` if the bucket can't be taken from the
    /// endpoint host.
    pub fn new(endpoint: Endpoint, credential: &Credential, region: &str) -> Result<Self> {
        let (bucket, service_url) = split_endpoint(&endpoint)?;
        debug!("using bucket {bucket} on {service_url} in region {region}");

        let credentials = Credentials::new(
            &credential.access_key_id,
            &credential.secret_access_key,
            None,
            None,
            PROVIDER_NAME,
        );
        let config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials)
            .endpoint_url(service_url)
            .retry_config(RetryConfig::disabled())
            .build();

        Ok(Self::with_client(Client::from_conf(config), bucket, endpoint))
    }

    /// Create a fetcher from a client built by the caller.
    ///
    /// `endpoint` is still used to build object keys and error context.
    pub fn with_client(client: Client, bucket: impl Into<String>, endpoint: Endpoint) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            endpoint,
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

    /// The bucket objects are read from.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn get_object(&self, url: &str, key: &str) -> Result<GetObjectOutput> {
        debug!("get object bucket={} key={key}", self.bucket);

        self.client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| map_sdk_error(err).with_context("url", url))
    }
}

#[async_trait::async_trait]
impl Fetch for NativeSdkFetcher {
    async fn grab_to_file(&self, path: &str, filename: Option<&Path>) -> Result<PathBuf> {
        debug!("grab_to_file path={path} filename={filename:?}");

        let (url, key) = object_key(&self.endpoint, path)?;
        let filename = match filename {
            Some(v) => v.to_path_buf(),
            None => local_filename(&key).map_err(|err| with_url(err, &url))?,
        };

        let res = self
            .options
            .download_to_file(&filename, async {
                let output = self.get_object(&url, &key).await?;
                Ok(into_byte_stream(output))
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
        let (url, key) = object_key(&self.endpoint, path)?;
        let output = self
            .options
            .run(self.get_object(&url, &key))
            .await
            .map_err(|err| with_url(err, &url))?;

        Ok(self.options.guard_stream(into_byte_stream(output)))
    }

    async fn read_all(&self, path: &str, limit: Option<u64>) -> Result<Bytes> {
        let (url, key) = object_key(&self.endpoint, path)?;
        self.options
            .run(async {
                let output = self.get_object(&url, &key).await?;
                if let (Some(limit), Some(size)) = (limit, output.content_length()) {
                    if size > 0 && size as u64 > limit {
                        return Err(Error::limit_exceeded(format!(
                            "object size {size} is larger than {limit} bytes"
                        )));
                    }
                }
                into_byte_stream(output).collect_with_limit(limit).await
            })
            .await
            .map_err(|err| with_url(err, &url))
    }
}

/// Split a virtual-hosted endpoint into its bucket and service url.
///
/// `https://bucket.s3.amazonaws.com:8443/repo` becomes `bucket` and
/// `https://s3.amazonaws.com:8443`.
pub fn split_endpoint(endpoint: &Endpoint) -> Result<(String, String)> {
    let (bucket, rest) = endpoint.host().split_once('.').unwrap_or((endpoint.host(), ""));
    if bucket.is_empty() || rest.is_empty() {
        return Err(Error::config_invalid("can't take bucket from endpoint host")
            .with_context("base_url", endpoint));
    }

    let service_url = match endpoint.port() {
        Some(port) => format!("{}://{rest}:{port}", endpoint.scheme()),
        None => format!("{}://{rest}", endpoint.scheme()),
    };
    Ok((bucket.to_string(), service_url))
}

/// Build the url and the object key for a relative path.
///
/// The key is the url path without its leading `/`, percent-decoded: the same
/// key a signed direct request for this url reads.
pub fn object_key(endpoint: &Endpoint, path: &str) -> Result<(String, String)> {
    let url = endpoint.join(path);
    let uri: http::Uri = url.parse().map_err(|e| {
        Error::request_invalid("invalid object url")
            .with_source(e)
            .with_context("url", &url)
    })?;

    let decoded = percent_decode_str(uri.path()).decode_utf8_lossy();
    let key = decoded.strip_prefix('/').unwrap_or(&decoded);
    if key.is_empty() {
        return Err(Error::request_invalid("object key is empty").with_context("url", &url));
    }

    let key = key.to_string();
    Ok((url, key))
}

fn into_byte_stream(output: GetObjectOutput) -> ByteStream {
    let body = stream::try_unfold(output.body, |mut body| async move {
        let chunk = body
            .try_next()
            .await
            .map_err(|e| Error::network("read response body failed").with_source(e))?;
        Ok(chunk.map(|bs| (bs, body)))
    });
    ByteStream::new(body)
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
    use super::*;
    use pretty_assertions::assert_eq;
    use s3grab_core::ErrorKind;

    #[test]
    fn test_split_endpoint() -> Result<()> {
        let (bucket, url) = split_endpoint(&Endpoint::new("https://bucket.s3.amazonaws.com")?)?;
        assert_eq!(bucket, "bucket");
        assert_eq!(url, "https://s3.amazonaws.com");

        let (bucket, url) = split_endpoint(&Endpoint::new(
            "http://my-bucket.s3.eu-west-1.amazonaws.com:9000/repo",
        )?)?;
        assert_eq!(bucket, "my-bucket");
        assert_eq!(url, "http://s3.eu-west-1.amazonaws.com:9000");
        Ok(())
    }

    #[test]
    fn test_split_endpoint_without_bucket() -> Result<()> {
        let err = split_endpoint(&Endpoint::new("http://localhost:9000")?).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        Ok(())
    }

    #[test]
    fn test_object_key() -> Result<()> {
        let endpoint = Endpoint::new("https://bucket.s3.amazonaws.com")?;
        let (url, key) = object_key(&endpoint, "/some dir/a+b.rpm")?;
        assert_eq!(url, "https://bucket.s3.amazonaws.com/some%20dir/a%2Bb.rpm");
        assert_eq!(key, "some dir/a+b.rpm");

        let endpoint = Endpoint::new("https://bucket.s3.amazonaws.com/repo/7")?;
        let (_, key) = object_key(&endpoint, "/repodata/repomd.xml")?;
        assert_eq!(key, "repo/7/repodata/repomd.xml");

        let (_, key) = object_key(&endpoint, "")?;
        assert_eq!(key, "repo/7");

        let bare = Endpoint::new("https://bucket.s3.amazonaws.com")?;
        let err = object_key(&bare, "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
        Ok(())
    }
}
