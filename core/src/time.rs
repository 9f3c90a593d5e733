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

//! Time related utils.

use chrono::Utc;

use crate::{Error, Result};

/// DateTime is the alias for `chrono::DateTime<Utc>`.
pub type DateTime = chrono::DateTime<Utc>;

/// Date format used by the `Date` header: "Mon, 15 Aug 2022 16:50:12 +0000"
///
/// The offset is always written as `+0000` since every signed request is
/// dated in UTC.
pub const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S +0000";

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into http date: `Mon, 15 Aug 2022 16:50:12 +0000`
///
/// The same string must be used in the `Date` header and in the string to
/// sign.
pub fn format_http_date(t: DateTime) -> String {
    t.format(HTTP_DATE).to_string()
}

/// Parse http date like `Mon, 15 Aug 2022 16:50:12 +0000` or
/// `Mon, 15 Aug 2022 16:50:12 GMT`.
pub fn parse_http_date(s: &str) -> Result<DateTime> {
    chrono::DateTime::parse_from_rfc2822(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::unexpected(format!("parse http date {s} failed")).with_source(e))
}
