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

use std::sync::Arc;

use log::debug;
use s3grab_aws_v2::{DefaultCredentialProvider, RequestSigner, StaticCredentialProvider};
use s3grab_core::{
    Context, DirectHttpFetcher, Endpoint, Error, Fetch, FetchOptions, ProvideCredential, Result,
    Signer, SigningCredential,
};

use crate::{FetcherConfig, FetcherKind};

/// Build the fetcher described by `config`.
///
/// Credentials are resolved once, here: explicit keys first, then the
/// environment, then the shared credentials file. Building fails with
/// `ConfigInvalid` if the base url is blank or no credential can be found.
pub async fn build_fetcher(ctx: Context, config: FetcherConfig) -> Result<Arc<dyn Fetch>> {
    let endpoint = Endpoint::new(config.base_url.clone())?;

    let provider = DefaultCredentialProvider::with_config(Arc::new(config.credential.clone()));
    let cred = match provider.provide_credential(&ctx).await? {
        Some(cred) if cred.is_valid() => cred,
        _ => {
            return Err(Error::config_invalid(
                "no credential found in config, environment or shared credentials file",
            )
            .with_context("base_url", endpoint.as_str()))
        }
    };

    let mut options = FetchOptions::default();
    if let Some(v) = config.chunk_size {
        options = options.with_chunk_size(v);
    }
    if let Some(v) = config.timeout {
        options = options.with_timeout(v);
    }
    if let Some(v) = &config.cancel {
        options = options.with_cancellation_token(v.clone());
    }

    debug!("building {} fetcher for {endpoint}", config.kind);
    match config.kind {
        FetcherKind::DirectHttp => {
            let signer = Signer::new(
                ctx,
                StaticCredentialProvider::new(&cred.access_key_id, &cred.secret_access_key),
                RequestSigner::new(),
            );
            Ok(Arc::new(
                DirectHttpFetcher::new(endpoint, signer).with_options(options),
            ))
        }
        #[cfg(feature = "native-sdk")]
        FetcherKind::NativeSdk => {
            let fetcher = s3grab_aws_sdk::NativeSdkFetcher::new(endpoint, &cred, config.region())?
                .with_options(options);
            Ok(Arc::new(fetcher))
        }
        #[cfg(not(feature = "native-sdk"))]
        FetcherKind::NativeSdk => Err(Error::config_invalid(
            "sdk fetcher requires the native-sdk feature",
        )),
    }
}
