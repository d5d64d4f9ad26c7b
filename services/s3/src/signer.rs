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

use crate::canonical::{check_expires_in, empty_object_key, CanonicalRequestBuilder};
use crate::constants::X_AMZ_SIGNATURE;
use crate::signing_key::{SigningKeyCache, SigningScope};
use crate::{Credential, Endpoint, ExtractConfig, ExtractConfigAsync};
use log::{debug, trace};
use presign_core::hash::hex_hmac_sha256;
use presign_core::{Clock, Error, Result, SystemClock};
use std::sync::Arc;
use std::time::Duration;

/// Validity used when callers have no opinion: one hour.
pub const DEFAULT_EXPIRES_IN: Duration = Duration::from_secs(3600);

/// UrlSigner generates SigV4 presigned GET object URLs in bulk.
///
/// The signing key only depends on the secret, the UTC day, the region and
/// the service, so it is derived once per day and reused for every URL.
/// Per URL the signer only pays for one SHA-256 and one HMAC-SHA256.
///
/// - [Authenticating Requests: Using Query Parameters](https://docs.aws.amazon.com/AmazonS3/latest/API/sigv4-query-string-auth.html)
///
/// ```
/// use presign_s3::{Credential, Endpoint, UrlSigner, DEFAULT_EXPIRES_IN};
///
/// # fn main() -> presign_core::Result<()> {
/// let signer = UrlSigner::new(
///     Credential::new("access_key_id", "secret_access_key"),
///     Endpoint::new("https://examplebucket.s3.amazonaws.com", "us-east-1")?,
/// )?;
///
/// let urls = signer.generate(&["cat.jpg", "dog.jpg"], DEFAULT_EXPIRES_IN)?;
/// assert_eq!(urls.len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct UrlSigner {
    credential: Credential,
    endpoint: Endpoint,
    clock: Arc<dyn Clock>,
    cache: SigningKeyCache,
}

impl UrlSigner {
    /// Create a signer from a credential and a bucket endpoint.
    pub fn new(credential: Credential, endpoint: Endpoint) -> Result<Self> {
        credential.check()?;
        debug!("created url signer for {endpoint:?} with {credential:?}");

        Ok(Self {
            credential,
            endpoint,
            clock: Arc::new(SystemClock),
            cache: SigningKeyCache::new(),
        })
    }

    /// Create a signer from a source that is ready right away.
    pub fn from_config(source: &impl ExtractConfig) -> Result<Self> {
        Self::new(source.extract_credential()?, source.extract_endpoint()?)
    }

    /// Create a signer from a source that has to be awaited, such as an
    /// AWS SDK credentials provider.
    pub async fn from_config_async(source: &impl ExtractConfigAsync) -> Result<Self> {
        let credential = source.extract_credential().await?;
        let endpoint = source.extract_endpoint().await?;
        Self::new(credential, endpoint)
    }

    /// Replace the clock the signing instant is read from.
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Credential used for signing.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Endpoint the URLs point to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Signing keys derived by this signer so far.
    pub fn signing_key_cache(&self) -> &SigningKeyCache {
        &self.cache
    }

    /// Generate one presigned GET URL per object key, in input order.
    ///
    /// All URLs of a call share the same signing instant. The whole batch
    /// fails if `expires_in` is outside `1..=604800` seconds or any key is
    /// empty; nothing is signed in that case.
    pub fn generate<S: AsRef<str>>(
        &self,
        object_keys: &[S],
        expires_in: Duration,
    ) -> Result<Vec<String>> {
        check_expires_in(expires_in)?;
        if let Some(idx) = object_keys.iter().position(|k| k.as_ref().is_empty()) {
            return Err(empty_object_key(Some(idx)));
        }
        if object_keys.is_empty() {
            return Ok(Vec::new());
        }

        let now = self.clock.now();
        let scope = SigningScope::new(now, self.endpoint.region(), self.endpoint.service());
        let builder =
            CanonicalRequestBuilder::new(&self.credential, &self.endpoint, now, &scope, expires_in)?;
        debug!(
            "presigning {} object keys at {} within scope {}",
            object_keys.len(),
            builder.amz_date(),
            builder.credential_scope()
        );

        let signing_key = self.cache.key_for(&self.credential.secret_access_key, &scope);

        let mut urls = Vec::with_capacity(object_keys.len());
        for key in object_keys {
            let req = builder.build(key.as_ref())?;
            trace!("calculated string to sign: {}", req.string_to_sign);

            let signature = hex_hmac_sha256(signing_key.as_bytes(), req.string_to_sign.as_bytes());

            let mut url = String::with_capacity(
                self.endpoint.base_url().len()
                    + req.canonical_uri.len()
                    + req.canonical_query.len()
                    + X_AMZ_SIGNATURE.len()
                    + signature.len()
                    + 3,
            );
            url.push_str(self.endpoint.base_url());
            url.push_str(&req.canonical_uri);
            url.push('?');
            url.push_str(req.canonical_query);
            url.push('&');
            url.push_str(X_AMZ_SIGNATURE);
            url.push('=');
            url.push_str(&signature);
            urls.push(url);
        }

        Ok(urls)
    }

    /// Generate a presigned GET URL for a single object key.
    pub fn generate_one(&self, object_key: &str, expires_in: Duration) -> Result<String> {
        let mut urls = self.generate(&[object_key], expires_in)?;
        urls.pop()
            .ok_or_else(|| Error::unexpected("presigning one key produced no url"))
    }
}
