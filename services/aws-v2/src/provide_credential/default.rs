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

use async_trait::async_trait;
use s3grab_core::{Context, ProvideCredential, Result};

use crate::provide_credential::{
    ConfigCredentialProvider, EnvCredentialProvider, ProfileCredentialProvider,
    ProvideCredentialChain,
};
use crate::{Config, Credential};

/// DefaultCredentialProvider will try to load credential from different sources.
///
/// Resolution order:
///
/// 1. Explicit [`Config`] keys, when built with [`DefaultCredentialProvider::with_config`]
/// 2. Environment variables
/// 3. Shared config (`~/.aws/config`, `~/.aws/credentials`)
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultCredentialProvider {
    /// Create a new `DefaultCredentialProvider` instance.
    pub fn new() -> Self {
        let chain = ProvideCredentialChain::new()
            .push(EnvCredentialProvider::new())
            .push(ProfileCredentialProvider::new());

        Self { chain }
    }

    /// Create a provider that prefers the keys set in `config`.
    ///
    /// The profile and shared credentials file of `config` are honored by
    /// the profile lookup.
    pub fn with_config(config: Arc<Config>) -> Self {
        let mut profile = ProfileCredentialProvider::new();
        if let Some(v) = &config.profile {
            profile = profile.with_profile(v);
        }
        if let Some(v) = &config.shared_credentials_file {
            profile = profile.with_credentials_file(v);
        }

        let chain = ProvideCredentialChain::new()
            .push(ConfigCredentialProvider::new(config))
            .push(EnvCredentialProvider::new())
            .push(profile);

        Self { chain }
    }

    /// Create with a custom credential chain.
    pub fn with_chain(chain: ProvideCredentialChain) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}
