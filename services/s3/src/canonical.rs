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

use crate::constants::*;
use crate::signing_key::SigningScope;
use crate::{Credential, Endpoint};
use percent_encoding::{percent_decode_str, utf8_percent_encode};
use presign_core::hash::hex_sha256;
use presign_core::time::{format_iso8601, DateTime};
use presign_core::{Error, Result};
use std::fmt::Write;
use std::time::Duration;

/// Check that `expires_in` is a SigV4 presign validity and return it in seconds.
///
/// Valid values are whole seconds in `1..=604800`.
pub fn check_expires_in(expires_in: Duration) -> Result<u64> {
    if expires_in.subsec_nanos() != 0 {
        return Err(Error::config_invalid(format!(
            "expires_in must be whole seconds, got {expires_in:?}"
        )));
    }

    let secs = expires_in.as_secs();
    if !(1..=MAX_EXPIRES_IN_SECS).contains(&secs) {
        return Err(Error::config_invalid(format!(
            "expires_in must be between 1 and {MAX_EXPIRES_IN_SECS} seconds, got {secs}"
        )));
    }

    Ok(secs)
}

/// CanonicalRequest is the per object key output of [`CanonicalRequestBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest<'a> {
    /// Percent-encoded path, including the bucket prefix of path-style endpoints.
    pub canonical_uri: String,
    /// Sorted, percent-encoded query without `X-Amz-Signature`.
    pub canonical_query: &'a str,
    /// The full canonical request that was hashed.
    pub canonical_request: String,
    /// String to sign with the scope's signing key.
    pub string_to_sign: String,
}

/// CanonicalRequestBuilder builds canonical requests for presigned GET object URLs.
///
/// Everything that does not depend on the object key (query string, headers,
/// scope) is computed once in [`CanonicalRequestBuilder::new`], so building a
/// request per key only costs the path encoding and one SHA-256.
///
/// - [Create a canonical request](https://docs.aws.amazon.com/IAM/latest/UserGuide/reference_sigv-create-signed-request.html#create-canonical-request)
/// - [Authenticating Requests: Using Query Parameters](https://docs.aws.amazon.com/AmazonS3/latest/API/sigv4-query-string-auth.html)
#[derive(Debug)]
pub struct CanonicalRequestBuilder<'a> {
    endpoint: &'a Endpoint,
    amz_date: String,
    credential_scope: String,
    canonical_query: String,
    canonical_headers: String,
}

impl<'a> CanonicalRequestBuilder<'a> {
    /// Prepare a builder for every request signed at `now` within `scope`.
    pub fn new(
        cred: &Credential,
        endpoint: &'a Endpoint,
        now: DateTime,
        scope: &SigningScope,
        expires_in: Duration,
    ) -> Result<Self> {
        let expires_in = check_expires_in(expires_in)?;
        let amz_date = format_iso8601(now);
        let credential_scope = scope.credential_scope();

        let canonical_query =
            canonicalize_query(cred, &amz_date, &credential_scope, expires_in);
        let canonical_headers = format!("host:{}\n", endpoint.host());

        Ok(Self {
            endpoint,
            amz_date,
            credential_scope,
            canonical_query,
            canonical_headers,
        })
    }

    /// `X-Amz-Date` of every request built by this builder.
    pub fn amz_date(&self) -> &str {
        &self.amz_date
    }

    /// Credential scope of every request built by this builder.
    pub fn credential_scope(&self) -> &str {
        &self.credential_scope
    }

    /// Canonical query string shared by every request, without signature.
    pub fn canonical_query(&self) -> &str {
        &self.canonical_query
    }

    /// Build the canonical request and string to sign for one object key.
    pub fn build(&self, object_key: &str) -> Result<CanonicalRequest<'_>> {
        let canonical_uri = self.canonical_uri(object_key)?;

        // 256 is specially chosen to avoid reallocation for most requests.
        let mut creq = String::with_capacity(256 + canonical_uri.len());
        writeln!(creq, "GET")?;
        writeln!(creq, "{canonical_uri}")?;
        writeln!(creq, "{}", self.canonical_query)?;
        writeln!(creq, "{}", self.canonical_headers)?;
        writeln!(creq, "{SIGNED_HEADERS}")?;
        write!(creq, "{UNSIGNED_PAYLOAD}")?;

        // StringToSign:
        //
        // AWS4-HMAC-SHA256
        // 20220313T072004Z
        // 20220313/<region>/<service>/aws4_request
        // <hashed_canonical_request>
        let mut string_to_sign = String::with_capacity(160);
        writeln!(string_to_sign, "{ALGORITHM}")?;
        writeln!(string_to_sign, "{}", self.amz_date)?;
        writeln!(string_to_sign, "{}", self.credential_scope)?;
        write!(string_to_sign, "{}", hex_sha256(creq.as_bytes()))?;

        Ok(CanonicalRequest {
            canonical_uri,
            canonical_query: &self.canonical_query,
            canonical_request: creq,
            string_to_sign,
        })
    }

    /// Encode the object key into the canonical URI.
    ///
    /// The key is decoded first so that keys which are already encoded are
    /// not encoded twice. A leading `/` in the key is kept, the same way
    /// AWS SDKs treat it.
    fn canonical_uri(&self, object_key: &str) -> Result<String> {
        if object_key.is_empty() {
            return Err(empty_object_key(None));
        }

        let key = percent_decode_str(object_key).decode_utf8().map_err(|e| {
            Error::request_invalid(format!(
                "object key '{object_key}' does not decode into valid utf-8"
            ))
            .with_source(e)
        })?;

        let prefix = self.endpoint.path_prefix();
        let mut uri = String::with_capacity(prefix.len() + 1 + object_key.len() * 3);
        uri.push_str(prefix);
        uri.push('/');
        uri.extend(utf8_percent_encode(&key, &AWS_URI_ENCODE_SET));
        Ok(uri)
    }
}

/// Error for an empty object key, naming its position in the batch when known.
pub(crate) fn empty_object_key(index: Option<usize>) -> Error {
    match index {
        Some(idx) => Error::request_invalid(format!("object key at index {idx} must not be empty")),
        None => Error::request_invalid("object key must not be empty"),
    }
}

fn canonicalize_query(
    cred: &Credential,
    amz_date: &str,
    credential_scope: &str,
    expires_in: u64,
) -> String {
    let mut query = vec![
        (X_AMZ_ALGORITHM, ALGORITHM.to_string()),
        (
            X_AMZ_CREDENTIAL,
            format!("{}/{credential_scope}", cred.access_key_id),
        ),
        (X_AMZ_DATE, amz_date.to_string()),
        (X_AMZ_EXPIRES, expires_in.to_string()),
        (X_AMZ_SIGNED_HEADERS, SIGNED_HEADERS.to_string()),
    ];
    if let Some(token) = &cred.session_token {
        query.push((X_AMZ_SECURITY_TOKEN, token.clone()));
    }

    // Sort by param name
    query.sort();

    query
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                utf8_percent_encode(k, &AWS_QUERY_ENCODE_SET),
                utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}
