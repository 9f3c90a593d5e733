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

//! Grab one object from a private bucket.
//!
//! ```shell
//! S3GRAB_BASE_URL=https://my-bucket.s3.amazonaws.com/repo \
//! AWS_ACCESS_KEY_ID=... AWS_SECRET_ACCESS_KEY=... \
//! cargo run --example grab -- /repodata/repomd.xml
//! ```

use std::path::PathBuf;

use anyhow::Result;
use s3grab::{build_fetcher, default_context, FetcherConfig};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("usage: grab <path> [filename]"))?;
    let filename = args.next().map(PathBuf::from);

    let ctx = default_context();
    let config = FetcherConfig::default().from_env(&ctx)?;
    let fetcher = build_fetcher(ctx, config).await?;

    let written = fetcher.grab_to_file(&path, filename.as_deref()).await?;
    println!("{path} saved to {}", written.display());
    Ok(())
}
