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

//! AWS legacy (signature version 2) request signing for S3 objects.
//!
//! This crate signs `GET` requests with the `AWS <access_key_id>:<signature>`
//! header scheme, where the signature is the base64 HMAC-SHA1 of a string to
//! sign built from the method, the `Date` header and the bucket prefixed path.
//!
//! ## Quick Start
//!
//! ```no_run
//! use s3grab_aws_v2::{DefaultCredentialProvider, RequestSigner};
//! use s3grab_core::{Context, OsEnv, Signer};
//!
//! # async fn example() -> s3grab_core::Result<()> {
//! let ctx = Context::new().with_env(OsEnv);
//! let signer = Signer::new(ctx, DefaultCredentialProvider::new(), RequestSigner::new());
//!
//! let (mut parts, _) = http::Request::get("https://bucket.s3.amazonaws.com/key.txt")
//!     .body(())?
//!     .into_parts();
//! signer.sign(&mut parts).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Credential Sources
//!
//! [`DefaultCredentialProvider`] tries, in order:
//!
//! 1. Explicit configuration, see [`Config`]
//! 2. Environment variables (`AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`)
//! 3. Shared credentials file (`~/.aws/credentials`) and config file (`~/.aws/config`)
//!
//! ## Limitations
//!
//! The bucket is always taken from the first DNS label of the host, so only
//! virtual-hosted style endpoints are supported.

mod constants;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod sign_request;
pub use sign_request::{bucket_from_host, canonical_resource, sign, string_to_sign, RequestSigner};

mod provide_credential;
pub use provide_credential::*;
