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

// Env values used in aws services.
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_PROFILE: &str = "AWS_PROFILE";
pub const AWS_CONFIG_FILE: &str = "AWS_CONFIG_FILE";
pub const AWS_SHARED_CREDENTIALS_FILE: &str = "AWS_SHARED_CREDENTIALS_FILE";

// Keys used in shared credentials and config files.
pub const INI_ACCESS_KEY_ID: &str = "aws_access_key_id";
pub const INI_SECRET_ACCESS_KEY: &str = "aws_secret_access_key";

pub const DEFAULT_PROFILE: &str = "default";
pub const DEFAULT_SHARED_CREDENTIALS_FILE: &str = "~/.aws/credentials";
pub const DEFAULT_CONFIG_FILE: &str = "~/.aws/config";

/// Prefix of the authorization header value.
pub const AWS_AUTH_PREFIX: &str = "AWS";
