use crate::{Config, Credential, Endpoint};
use async_trait::async_trait;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use log::debug;
use presign_core::{Error, Result};
use std::fmt::Debug;

/// ExtractConfig hands out what a signer needs from an already configured
/// source without awaiting anything.
pub trait ExtractConfig: Debug {
    /// Credential to sign with.
    fn extract_credential(&self) -> Result<Credential>;

    /// Bucket endpoint and region to sign for.
    fn extract_endpoint(&self) -> Result<Endpoint>;
}

/// ExtractConfigAsync is the async twin of [`ExtractConfig`], for sources
/// that must be awaited before they can hand out credentials.
///
/// Signers await it once, at construction; signing itself never suspends.
#[async_trait]
pub trait ExtractConfigAsync: Debug + Send + Sync {
    /// Credential to sign with.
    async fn extract_credential(&self) -> Result<Credential>;

    /// Bucket endpoint and region to sign for.
    async fn extract_endpoint(&self) -> Result<Endpoint>;
}

impl ExtractConfig for Config {
    fn extract_credential(&self) -> Result<Credential> {
        self.credential()
    }

    fn extract_endpoint(&self) -> Result<Endpoint> {
        self.endpoint()
    }
}

#[async_trait]
impl ExtractConfigAsync for Config {
    async fn extract_credential(&self) -> Result<Credential> {
        self.credential()
    }

    async fn extract_endpoint(&self) -> Result<Endpoint> {
        self.endpoint()
    }
}

/// SdkConfigProvider takes credentials from an AWS SDK credentials provider.
///
/// The provider is resolved once; if it hands out temporary credentials the
/// signer will not see later refreshes, so keep such signers short-lived.
/// Endpoint and region come from the wrapped [`Config`], whose credential
/// fields are ignored.
#[derive(Debug, Clone)]
pub struct SdkConfigProvider {
    provider: SharedCredentialsProvider,
    config: Config,
}

impl SdkConfigProvider {
    /// Create a new provider from an SDK credentials provider and the bucket config.
    pub fn new(provider: impl ProvideCredentials + 'static, config: Config) -> Self {
        Self {
            provider: SharedCredentialsProvider::new(provider),
            config,
        }
    }
}

#[async_trait]
impl ExtractConfigAsync for SdkConfigProvider {
    async fn extract_credential(&self) -> Result<Credential> {
        let creds = self.provider.provide_credentials().await.map_err(|e| {
            Error::unexpected("failed to resolve credentials from sdk provider").with_source(e)
        })?;
        debug!("resolved credentials from sdk provider, expiry: {:?}", creds.expiry());

        let cred = Credential {
            access_key_id: creds.access_key_id().to_string(),
            secret_access_key: creds.secret_access_key().to_string(),
            session_token: creds.session_token().map(|v| v.to_string()),
        };
        cred.check()?;
        Ok(cred)
    }

    async fn extract_endpoint(&self) -> Result<Endpoint> {
        self.config.endpoint()
    }
}
