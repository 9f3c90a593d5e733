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
use std::path::{Component, PathBuf};

use http::Uri;
use percent_encoding::percent_decode_str;
use percent_encoding::utf8_percent_encode;
use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

use crate::{Error, Result};

/// AsciiSet used to encode relative object paths.
///
/// Encode every byte except ASCII alphanumerics and `/`, `-`, `.`, `_`.
pub static PATH_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_');

/// BaseUrl is the base url as handed over by the caller.
///
/// Callers may pass either a single url or a list of mirrors, only the first
/// entry of a list is used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseUrl(Vec<String>);

impl BaseUrl {
    /// The url that will be used, if any.
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(|v| v.as_str())
    }
}

impl From<&str> for BaseUrl {
    fn from(value: &str) -> Self {
        Self(vec![value.to_string()])
    }
}

impl From<String> for BaseUrl {
    fn from(value: String) -> Self {
        Self(vec![value])
    }
}

impl From<&String> for BaseUrl {
    fn from(value: &String) -> Self {
        Self(vec![value.clone()])
    }
}

impl From<Vec<String>> for BaseUrl {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl From<Vec<&str>> for BaseUrl {
    fn from(value: Vec<&str>) -> Self {
        Self(value.into_iter().map(|v| v.to_string()).collect())
    }
}

impl From<&[&str]> for BaseUrl {
    fn from(value: &[&str]) -> Self {
        Self(value.iter().map(|v| v.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for BaseUrl {
    fn from(value: [&str; N]) -> Self {
        Self(value.iter().map(|v| v.to_string()).collect())
    }
}

/// Endpoint is the url prefix every object path is resolved against.
///
/// The host identifies the bucket through virtual-hosted addressing, like
/// `https://bucket.s3.amazonaws.com`. The url is trusted as-is and never
/// re-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: String,
    scheme: String,
    host: String,
    port: Option<u16>,
    path: String,
}

impl Endpoint {
    /// Build an endpoint from the base url.
    ///
    /// Fails with `ConfigInvalid` if the url is blank, can't be parsed or has
    /// no host.
    pub fn new(base_url: impl Into<BaseUrl>) -> Result<Self> {
        let base_url = base_url.into();
        let url = base_url.first().map(str::trim).unwrap_or_default();
        if url.is_empty() {
            return Err(Error::config_invalid("base url is empty"));
        }

        let uri: Uri = url.parse().map_err(|e| {
            Error::config_invalid("base url is invalid")
                .with_source(e)
                .with_context("base_url", url)
        })?;
        let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) else {
            return Err(Error::config_invalid("base url must contain scheme and host")
                .with_context("base_url", url));
        };
        if authority.host().is_empty() {
            return Err(Error::config_invalid("base url must contain host")
                .with_context("base_url", url));
        }

        Ok(Self {
            url: url.to_string(),
            scheme: scheme.to_string(),
            host: authority.host().to_string(),
            port: authority.port_u16(),
            path: uri.path().trim_end_matches('/').to_string(),
        })
    }

    /// The base url as configured.
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// The scheme of the base url.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The host of the base url, without port.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The port of the base url, if given explicitly.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// The path prefix of the base url without trailing `/`, empty if none.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Build the absolute url for given relative path.
    ///
    /// Only the relative path is percent-encoded, it's appended to the base url
    /// verbatim.
    pub fn join(&self, relative_path: &str) -> String {
        format!("{}{}", self.url, encode_path(relative_path))
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

/// Percent-encode a relative object path.
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, &PATH_ENCODE_SET).to_string()
}

/// Derive the local filename for a request path.
///
/// The path is percent-decoded and a single leading `/` is stripped, so
/// `/some/key.bin` lands in `some/key.bin` relative to the current directory.
/// Paths that would leave the current directory, like `//etc/passwd` or
/// `/../x`, are rejected, see [`local_filename`].
pub fn default_filename(request_path: &str) -> Result<PathBuf> {
    let decoded = percent_decode_str(request_path).decode_utf8_lossy();
    let name = decoded.strip_prefix('/').unwrap_or(&decoded);
    local_filename(name).map_err(|err| err.with_context("path", request_path))
}

/// Check that `name` is a relative filename under the current directory.
///
/// Fails with `RequestInvalid` if `name` names no file, is absolute or
/// contains a `..` component.
pub fn local_filename(name: &str) -> Result<PathBuf> {
    let path = PathBuf::from(name);
    if path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(
            Error::request_invalid("filename must stay under the current directory")
                .with_context("filename", name),
        );
    }
    if !path.components().any(|c| matches!(c, Component::Normal(_))) {
        return Err(Error::request_invalid("can't derive filename from empty path"));
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_endpoint_from_sequence() -> Result<()> {
        let single = Endpoint::new("https://bucket.s3.amazonaws.com")?;
        let list = Endpoint::new(vec!["https://bucket.s3.amazonaws.com".to_string()])?;
        let mirrors = Endpoint::new([
            "https://bucket.s3.amazonaws.com",
            "https://mirror.s3.amazonaws.com",
        ])?;

        assert_eq!(single, list);
        assert_eq!(single, mirrors);
        assert_eq!(single.host(), "bucket.s3.amazonaws.com");
        assert_eq!(single.scheme(), "https");
        assert_eq!(single.path(), "");
        Ok(())
    }

    #[test]
    fn test_endpoint_invalid() {
        let cases: Vec<BaseUrl> = vec![
            "".into(),
            "   ".into(),
            Vec::<String>::new().into(),
            "bucket.s3.amazonaws.com/no-scheme".into(),
            "/only/a/path".into(),
        ];

        for input in cases {
            let err = Endpoint::new(input.clone()).expect_err("must be invalid");
            assert_eq!(err.kind(), ErrorKind::ConfigInvalid, "input: {input:?}");
        }
    }

    #[test]
    fn test_endpoint_with_path_and_port() -> Result<()> {
        let ep = Endpoint::new("http://127.0.0.1:9000/repo/el9/")?;
        assert_eq!(ep.host(), "127.0.0.1");
        assert_eq!(ep.port(), Some(9000));
        assert_eq!(ep.path(), "/repo/el9");
        Ok(())
    }

    #[test]
    fn test_join() -> Result<()> {
        let ep = Endpoint::new("https://bucket.s3.amazonaws.com")?;
        assert_eq!(
            ep.join("/repodata/repomd.xml"),
            "https://bucket.s3.amazonaws.com/repodata/repomd.xml"
        );
        assert_eq!(
            ep.join("/some dir/libstdc++-devel.rpm"),
            "https://bucket.s3.amazonaws.com/some%20dir/libstdc%2B%2B-devel.rpm"
        );
        assert_eq!(
            ep.join("/a~b_c.d"),
            "https://bucket.s3.amazonaws.com/a%7Eb_c.d"
        );
        Ok(())
    }

    #[test]
    fn test_join_keeps_base_verbatim() -> Result<()> {
        let ep = Endpoint::new("https://bucket.s3.amazonaws.com/pre%20fix")?;
        assert_eq!(
            ep.join("/a b"),
            "https://bucket.s3.amazonaws.com/pre%20fix/a%20b"
        );
        Ok(())
    }

    #[test]
    fn test_encode_path_round_trip() {
        let path = "/pool/a b+c/ü.rpm";
        let encoded = encode_path(path);
        assert_eq!(encoded, "/pool/a%20b%2Bc/%C3%BC.rpm");
        assert_eq!(percent_decode_str(&encoded).decode_utf8_lossy(), path);
    }

    #[test]
    fn test_default_filename() -> Result<()> {
        assert_eq!(default_filename("/some/key.bin")?, PathBuf::from("some/key.bin"));
        assert_eq!(default_filename("key.bin")?, PathBuf::from("key.bin"));
        assert_eq!(
            default_filename("/some%20dir/a%2Bb.rpm")?,
            PathBuf::from("some dir/a+b.rpm")
        );
        assert!(default_filename("/").is_err());
        Ok(())
    }

    #[test]
    fn test_default_filename_stays_under_current_dir() {
        for path in ["//etc/passwd", "/../x", "/a/../../x", "/%2E%2E/x", "/%2Fabs"] {
            let err = default_filename(path).expect_err("path must be rejected");
            assert_eq!(err.kind(), ErrorKind::RequestInvalid, "path: {path}");
            assert_eq!(err.context("path"), Some(path));
        }
    }

    #[test]
    fn test_local_filename() -> Result<()> {
        assert_eq!(local_filename("pool/a.rpm")?, PathBuf::from("pool/a.rpm"));
        assert_eq!(local_filename("./a.rpm")?, PathBuf::from("./a.rpm"));
        assert!(local_filename("").is_err());
        assert!(local_filename(".").is_err());
        assert!(local_filename("/a.rpm").is_err());
        assert!(local_filename("a/../../b").is_err());
        Ok(())
    }
}
