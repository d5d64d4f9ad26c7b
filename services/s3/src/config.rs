use crate::constants::*;
use crate::{Credential, Endpoint};
use presign_core::utils::Redact;
use presign_core::{Env, Error, Result};
use std::fmt::{Debug, Formatter};

/// Config carries the settings a [`crate::UrlSigner`] is built from.
///
/// Fields left as `None` can be filled from the environment with
/// [`Config::from_env`].
#[derive(Clone, Default)]
pub struct Config {
    /// URL of the bucket itself, virtual-hosted or path-style.
    ///
    /// Takes precedence over `endpoint_url` and `bucket`.
    pub bucket_endpoint_url: Option<String>,
    /// URL of the service, e.g. `http://localhost:9000` for MinIO.
    ///
    /// Combined with `bucket` into a path-style bucket URL.
    pub endpoint_url: Option<String>,
    /// Bucket name.
    pub bucket: Option<String>,
    /// Region of the bucket, `us-east-1` if unset.
    pub region: Option<String>,
    /// Access key id.
    pub access_key_id: Option<String>,
    /// Secret access key.
    pub secret_access_key: Option<String>,
    /// Session token of temporary credentials.
    pub session_token: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bucket_endpoint_url", &self.bucket_endpoint_url)
            .field("endpoint_url", &self.endpoint_url)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("session_token", &Redact::from(&self.session_token))
            .finish()
    }
}

impl Config {
    /// Load config from env.
    ///
    /// Values already set on the config win over the environment.
    pub fn from_env(mut self, env: &impl Env) -> Self {
        if self.access_key_id.is_none() {
            self.access_key_id = env.var(AWS_ACCESS_KEY_ID);
        }
        if self.secret_access_key.is_none() {
            self.secret_access_key = env.var(AWS_SECRET_ACCESS_KEY);
        }
        if self.session_token.is_none() {
            self.session_token = env.var(AWS_SESSION_TOKEN);
        }
        if self.region.is_none() {
            self.region = env
                .var(AWS_REGION)
                .or_else(|| env.var(AWS_DEFAULT_REGION));
        }
        if self.endpoint_url.is_none() {
            self.endpoint_url = env
                .var(AWS_ENDPOINT_URL_S3)
                .or_else(|| env.var(AWS_ENDPOINT_URL));
        }

        self
    }

    /// Build the credential described by this config.
    pub fn credential(&self) -> Result<Credential> {
        let (Some(ak), Some(sk)) = (&self.access_key_id, &self.secret_access_key) else {
            return Err(Error::credential_invalid(
                "access key id and secret access key must both be set",
            ));
        };

        let cred = Credential {
            access_key_id: ak.clone(),
            secret_access_key: sk.clone(),
            session_token: self.session_token.clone(),
        };
        cred.check()?;
        Ok(cred)
    }

    /// Resolve the bucket endpoint described by this config.
    pub fn endpoint(&self) -> Result<Endpoint> {
        let region = self.region.as_deref().unwrap_or(DEFAULT_REGION);

        match (&self.bucket_endpoint_url, &self.endpoint_url, &self.bucket) {
            (Some(url), _, _) => Endpoint::new(url, region),
            (None, Some(url), Some(bucket)) => Endpoint::path_style(url, bucket, region),
            (None, None, Some(bucket)) => Endpoint::virtual_hosted(bucket, region),
            (None, _, None) => Err(Error::config_invalid(
                "either bucket_endpoint_url or bucket must be set",
            )),
        }
    }
}
