use crate::constants::SCOPE_TERMINATOR;
use log::debug;
use presign_core::hash::hmac_sha256;
use presign_core::time::{format_date, DateTime};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::{Mutex, PoisonError};

/// SigningScope is the granularity a signing key is valid for.
///
/// Requests with equal scopes reuse the same signing key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SigningScope {
    date_stamp: String,
    region: String,
    service: String,
}

impl SigningScope {
    /// Build the scope of the UTC day that contains `time`.
    pub fn new(time: DateTime, region: &str, service: &str) -> Self {
        Self {
            date_stamp: format_date(time),
            region: region.to_string(),
            service: service.to_string(),
        }
    }

    /// Date stamp in `YYYYMMDD` form.
    pub fn date_stamp(&self) -> &str {
        &self.date_stamp
    }

    /// Region of this scope.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Service of this scope.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Credential scope string: `20130524/us-east-1/s3/aws4_request`
    pub fn credential_scope(&self) -> String {
        format!(
            "{}/{}/{}/{SCOPE_TERMINATOR}",
            self.date_stamp, self.region, self.service
        )
    }
}

/// SigningKey is the final key of the SigV4 HMAC chain.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SigningKey([u8; 32]);

impl SigningKey {
    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for SigningKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey(***)")
    }
}

/// Derive the signing key for `scope` from a secret access key.
///
/// - [Derive a signing key](https://docs.aws.amazon.com/IAM/latest/UserGuide/reference_sigv-create-signed-request.html#derive-signing-key)
pub fn derive_signing_key(secret: &str, scope: &SigningScope) -> SigningKey {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), scope.date_stamp.as_bytes());
    // Sign region
    let sign_region = hmac_sha256(&sign_date, scope.region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(&sign_region, scope.service.as_bytes());
    // Sign request
    SigningKey(hmac_sha256(&sign_service, SCOPE_TERMINATOR.as_bytes()))
}

/// SigningKeyCache derives every signing key at most once per scope.
///
/// Entries are never evicted: a signer only ever sees one scope per calendar
/// day it is used on. The lock is held while deriving, so concurrent callers
/// asking for the same new scope wait for the first derivation instead of
/// repeating it.
#[derive(Debug, Default)]
pub struct SigningKeyCache {
    keys: Mutex<HashMap<SigningScope, SigningKey>>,
}

impl SigningKeyCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the signing key of `scope`, deriving it on first use.
    pub fn key_for(&self, secret: &str, scope: &SigningScope) -> SigningKey {
        // Entries are inserted fully derived, so a poisoned map is still consistent.
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(key) = keys.get(scope) {
            return *key;
        }

        debug!("signing key cache miss, deriving key for scope: {scope:?}");
        let key = derive_signing_key(secret, scope);
        keys.insert(scope.clone(), key);
        key
    }

    /// Number of scopes derived so far.
    pub fn len(&self) -> usize {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no key has been derived yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
