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

use async_trait::async_trait;
use ini::Ini;
use log::debug;
use s3grab_core::{Context, Error, ProvideCredential, Result};

use crate::constants::*;
use crate::Credential;

/// ProfileCredentialProvider loads AWS credentials from configuration files.
///
/// This provider loads credentials from:
/// - `~/.aws/credentials` (or the path specified by `AWS_SHARED_CREDENTIALS_FILE`)
/// - `~/.aws/config` (or the path specified by `AWS_CONFIG_FILE`)
///
/// The profile to use is determined by:
/// 1. The profile specified via `with_profile()`
/// 2. The `AWS_PROFILE` environment variable
/// 3. Default to "default"
#[derive(Debug, Default, Clone)]
pub struct ProfileCredentialProvider {
    profile: Option<String>,
    config_file: Option<String>,
    credentials_file: Option<String>,
}

impl ProfileCredentialProvider {
    /// Create a new ProfileCredentialProvider with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the profile name to use.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Set the path to the config file.
    pub fn with_config_file(mut self, path: impl Into<String>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Set the path to the credentials file.
    pub fn with_credentials_file(mut self, path: impl Into<String>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }

    async fn load_ini(&self, ctx: &Context, path: &str) -> Result<Option<Ini>> {
        let Some(expanded_path) = ctx.expand_home_dir(path) else {
            debug!("failed to expand homedir for path: {path}");
            return Ok(None);
        };

        let content = match ctx.file_read(&expanded_path).await {
            Ok(content) => content,
            Err(err) => {
                debug!("failed to read {expanded_path}: {err}");
                return Ok(None);
            }
        };

        let conf = Ini::load_from_str(&String::from_utf8_lossy(&content)).map_err(|e| {
            Error::config_invalid("failed to parse aws profile file")
                .with_context("path", &expanded_path)
                .with_source(e)
        })?;
        Ok(Some(conf))
    }

    async fn load_from_credentials_file(
        &self,
        ctx: &Context,
        profile: &str,
    ) -> Result<Option<Credential>> {
        let path = self
            .credentials_file
            .clone()
            .or_else(|| ctx.env_var(AWS_SHARED_CREDENTIALS_FILE))
            .unwrap_or_else(|| DEFAULT_SHARED_CREDENTIALS_FILE.to_string());

        let Some(conf) = self.load_ini(ctx, &path).await? else {
            return Ok(None);
        };
        Ok(credential_from_section(&conf, profile))
    }

    async fn load_from_config_file(
        &self,
        ctx: &Context,
        profile: &str,
    ) -> Result<Option<Credential>> {
        let path = self
            .config_file
            .clone()
            .or_else(|| ctx.env_var(AWS_CONFIG_FILE))
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        let Some(conf) = self.load_ini(ctx, &path).await? else {
            return Ok(None);
        };

        // The config file prefixes every non default section with `profile `.
        let section = match profile {
            DEFAULT_PROFILE => DEFAULT_PROFILE.to_string(),
            x => format!("profile {x}"),
        };
        Ok(credential_from_section(&conf, &section))
    }
}

fn credential_from_section(conf: &Ini, section: &str) -> Option<Credential> {
    let Some(props) = conf.section(Some(section)) else {
        debug!("section {section} not found");
        return None;
    };

    match (
        props.get(INI_ACCESS_KEY_ID),
        props.get(INI_SECRET_ACCESS_KEY),
    ) {
        (Some(ak), Some(sk)) if !ak.is_empty() && !sk.is_empty() => Some(Credential::new(ak, sk)),
        _ => None,
    }
}

#[async_trait]
impl ProvideCredential for ProfileCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let profile = self
            .profile
            .clone()
            .or_else(|| ctx.env_var(AWS_PROFILE))
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

        if let Some(cred) = self.load_from_credentials_file(ctx, &profile).await? {
            return Ok(Some(cred));
        }

        self.load_from_config_file(ctx, &profile).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use s3grab_core::{ErrorKind, StaticEnv};
    use s3grab_file_read_tokio::TokioFileRead;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    fn context(envs: HashMap<String, String>) -> Context {
        Context::new()
            .with_file_read(TokioFileRead)
            .with_env(StaticEnv {
                home_dir: None,
                envs,
            })
    }

    #[tokio::test]
    async fn test_profile_from_credentials_file() -> anyhow::Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let tmp_dir = tempdir()?;
        let file_path = tmp_dir.path().join("credentials");
        fs::write(
            &file_path,
            "[default]\n\
             aws_access_key_id = DEFAULTACCESSKEYID\n\
             aws_secret_access_key = DEFAULTSECRETACCESSKEY\n\
             \n\
             [repo]\n\
             aws_access_key_id = REPOACCESSKEYID\n\
             aws_secret_access_key = REPOSECRETACCESSKEY\n",
        )?;
        let file_path = file_path.to_string_lossy().to_string();
        let ctx = context(HashMap::new());

        let cred = ProfileCredentialProvider::new()
            .with_credentials_file(&file_path)
            .provide_credential(&ctx)
            .await?
            .expect("default profile must be loaded");
        assert_eq!(cred.access_key_id, "DEFAULTACCESSKEYID");
        assert_eq!(cred.secret_access_key, "DEFAULTSECRETACCESSKEY");

        let cred = ProfileCredentialProvider::new()
            .with_profile("repo")
            .with_credentials_file(&file_path)
            .provide_credential(&ctx)
            .await?
            .expect("repo profile must be loaded");
        assert_eq!(cred.access_key_id, "REPOACCESSKEYID");

        // AWS_PROFILE is used when no profile is set explicitly.
        let ctx = context(HashMap::from([(AWS_PROFILE.to_string(), "repo".to_string())]));
        let cred = ProfileCredentialProvider::new()
            .with_credentials_file(&file_path)
            .provide_credential(&ctx)
            .await?
            .expect("repo profile must be loaded");
        assert_eq!(cred.access_key_id, "REPOACCESSKEYID");

        Ok(())
    }

    #[tokio::test]
    async fn test_profile_from_config_file() -> anyhow::Result<()> {
        let tmp_dir = tempdir()?;
        let config_path = tmp_dir.path().join("config");
        fs::write(
            &config_path,
            "[default]\n\
             aws_access_key_id = DEFAULTACCESSKEYID\n\
             aws_secret_access_key = DEFAULTSECRETACCESSKEY\n\
             \n\
             [profile repo]\n\
             aws_access_key_id = REPOACCESSKEYID\n\
             aws_secret_access_key = REPOSECRETACCESSKEY\n",
        )?;

        let ctx = context(HashMap::from([
            (
                AWS_CONFIG_FILE.to_string(),
                config_path.to_string_lossy().to_string(),
            ),
            (
                AWS_SHARED_CREDENTIALS_FILE.to_string(),
                tmp_dir.path().join("not_exist").to_string_lossy().to_string(),
            ),
        ]));

        let cred = ProfileCredentialProvider::new()
            .with_profile("repo")
            .provide_credential(&ctx)
            .await?
            .expect("repo profile must be loaded");
        assert_eq!(cred.access_key_id, "REPOACCESSKEYID");
        assert_eq!(cred.secret_access_key, "REPOSECRETACCESSKEY");

        Ok(())
    }

    #[tokio::test]
    async fn test_profile_missing_files() -> anyhow::Result<()> {
        let tmp_dir = tempdir()?;
        let ctx = context(HashMap::from([
            (
                AWS_CONFIG_FILE.to_string(),
                tmp_dir.path().join("config").to_string_lossy().to_string(),
            ),
            (
                AWS_SHARED_CREDENTIALS_FILE.to_string(),
                tmp_dir.path().join("credentials").to_string_lossy().to_string(),
            ),
        ]));

        let cred = ProfileCredentialProvider::new()
            .provide_credential(&ctx)
            .await?;
        assert!(cred.is_none());

        // Without a home dir, `~/.aws/credentials` can't be expanded.
        let cred = ProfileCredentialProvider::new()
            .provide_credential(&context(HashMap::new()))
            .await?;
        assert!(cred.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_profile_invalid_file() -> anyhow::Result<()> {
        let tmp_dir = tempdir()?;
        let file_path = tmp_dir.path().join("credentials");
        fs::write(&file_path, "[default\naws_access_key_id = broken\n")?;

        let err = ProfileCredentialProvider::new()
            .with_credentials_file(file_path.to_string_lossy())
            .provide_credential(&context(HashMap::new()))
            .await
            .expect_err("broken file must fail");
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        Ok(())
    }
}
