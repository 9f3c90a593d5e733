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

//! Core components for fetching objects with signed requests.
//!
//! This crate provides the foundational types and traits for the s3grab
//! ecosystem. Service crates plug their credentials and signature scheme
//! into it, context crates plug in the actual file system and http client.
//!
//! ## Overview
//!
//! The crate is built around several key concepts:
//!
//! - **Context**: A container that holds implementations for file reading, HTTP sending, and environment access
//! - **Traits**: Abstract interfaces for credential loading (`ProvideCredential`) and request signing (`SignRequest`)
//! - **Signer**: Coordinates credential loading and request signing
//! - **Fetch**: The grabber contract, implemented by [`DirectHttpFetcher`] on top of a [`Signer`]
//!
//! ## Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use s3grab_core::{
//!     Context, DirectHttpFetcher, Endpoint, Fetch, ProvideCredential, Result, SignRequest,
//!     Signer, SigningCredential,
//! };
//!
//! #[derive(Clone, Debug)]
//! struct MyCredential {
//!     token: String,
//! }
//!
//! impl SigningCredential for MyCredential {
//!     fn is_valid(&self) -> bool {
//!         !self.token.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MyLoader;
//!
//! #[async_trait]
//! impl ProvideCredential for MyLoader {
//!     type Credential = MyCredential;
//!
//!     async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
//!         Ok(Some(MyCredential {
//!             token: "my-token".to_string(),
//!         }))
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MyBuilder;
//!
//! #[async_trait]
//! impl SignRequest for MyBuilder {
//!     type Credential = MyCredential;
//!
//!     async fn sign_request(
//!         &self,
//!         _: &Context,
//!         req: &mut http::request::Parts,
//!         cred: Option<&Self::Credential>,
//!     ) -> Result<()> {
//!         if let Some(cred) = cred {
//!             req.headers
//!                 .insert("x-token", cred.token.parse()?);
//!         }
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! // Plug a real http client in here, for example `s3grab-http-send-reqwest`.
//! let ctx = Context::new();
//! let signer = Signer::new(ctx, MyLoader, MyBuilder);
//!
//! let fetcher = DirectHttpFetcher::new(Endpoint::new("https://example.com/repo")?, signer);
//! let content = fetcher.read_all("/repodata/repomd.xml", Some(1 << 20)).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Traits
//!
//! This crate defines several important traits:
//!
//! - [`FileRead`]: For asynchronous file reading
//! - [`HttpSend`]: For sending HTTP requests
//! - [`Env`]: For environment variable access
//! - [`ProvideCredential`]: For loading credentials from various sources
//! - [`SignRequest`]: For signing requests with service-specific schemes
//! - [`SigningCredential`]: For validating credentials
//! - [`Fetch`]: For grabbing objects relative to a base url
//!
//! ## Utilities
//!
//! The crate also provides utility modules:
//!
//! - [`hash`]: HMAC and base64 helpers
//! - [`time`]: HTTP date helpers
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};

mod context;
pub use context::{Context, Env, FileRead, HttpSend, NoopEnv, NoopFileRead, NoopHttpSend, OsEnv, StaticEnv};
mod body;
pub use body::ByteStream;

mod api;
pub use api::{ProvideCredential, SignRequest, SigningCredential};
mod request;
pub use request::SigningRequest;
mod signer;
pub use signer::Signer;

mod endpoint;
pub use endpoint::{
    default_filename, encode_path, local_filename, BaseUrl, Endpoint, PATH_ENCODE_SET,
};
mod fetch;
pub use fetch::{DirectHttpFetcher, Fetch, FetchOptions, DEFAULT_CHUNK_SIZE};
