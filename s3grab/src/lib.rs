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

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use s3grab_core::*;

/// AWS legacy signing: credentials, providers and the request signer.
pub mod aws {
    pub use s3grab_aws_v2::*;
}

/// Fetcher backed by `aws-sdk-s3`.
#[cfg(feature = "native-sdk")]
pub mod sdk {
    pub use s3grab_aws_sdk::*;
}

#[cfg(feature = "default-context")]
mod context;
#[cfg(feature = "default-context")]
pub use context::default_context;

mod config;
pub use config::{FetcherConfig, FetcherKind};

mod build;
pub use build::build_fetcher;
