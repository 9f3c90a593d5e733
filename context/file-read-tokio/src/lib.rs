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

//! Tokio-based file reading implementation for s3grab.
//!
//! This crate provides `TokioFileRead`, an async file reader that implements
//! the `FileRead` trait from `s3grab_core` using Tokio's file system operations.
//! Credential providers use it to load the AWS shared credentials file.
//!
//! ## Example
//!
//! ```no_run
//! use s3grab_core::{Context, OsEnv};
//! use s3grab_file_read_tokio::TokioFileRead;
//!
//! # async fn example() -> s3grab_core::Result<()> {
//! let ctx = Context::new()
//!     .with_file_read(TokioFileRead)
//!     .with_env(OsEnv);
//!
//! let content = ctx.file_read("/home/user/.aws/credentials").await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use s3grab_core::{Error, FileRead, Result};

/// Tokio-based implementation of the `FileRead` trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileRead;

#[async_trait]
impl FileRead for TokioFileRead {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .map_err(|e| Error::io("failed to read file").with_context("path", path).with_source(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use s3grab_core::{Context, ErrorKind};

    #[tokio::test]
    async fn test_file_read() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("credentials");
        std::fs::write(&path, "[default]\n")?;

        let ctx = Context::new().with_file_read(TokioFileRead);
        let content = ctx.file_read(&path.to_string_lossy()).await?;
        assert_eq!(content, b"[default]\n");
        Ok(())
    }

    #[tokio::test]
    async fn test_file_read_missing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("missing");

        let err = TokioFileRead
            .file_read(&path.to_string_lossy())
            .await
            .expect_err("missing file must fail");
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.context("path"), Some(path.to_string_lossy().as_ref()));
        Ok(())
    }
}
