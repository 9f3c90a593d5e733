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

//! `aws-sdk-s3` backed fetcher for s3grab.
//!
//! [`NativeSdkFetcher`] implements the same [`Fetch`](s3grab_core::Fetch)
//! contract as [`DirectHttpFetcher`](s3grab_core::DirectHttpFetcher), but
//! lets the AWS SDK build, sign and send the `GetObject` requests.
//!
//! ## Example
//!
//! ```no_run
//! use s3grab_aws_sdk::NativeSdkFetcher;
//! use s3grab_aws_v2::Credential;
//! use s3grab_core::{Endpoint, Fetch};
//!
//! # async fn example() -> s3grab_core::Result<()> {
//! let endpoint = Endpoint::new("https://bucket.s3.amazonaws.com/repo")?;
//! let credential = Credential::new("access_key_id", "secret_access_key");
//! let fetcher = NativeSdkFetcher::new(endpoint, &credential, "us-east-1")?;
//!
//! // Reads the `repo/repodata/repomd.xml` key of `bucket`.
//! let content = fetcher.read_all("/repodata/repomd.xml", None).await?;
//! # Ok(())
//! # }
//! ```

mod error;
pub use error::map_sdk_error;

mod fetcher;
pub use fetcher::{object_key, split_endpoint, NativeSdkFetcher};
