//! Bulk SigV4 presigned GET object URLs for S3 and S3 compatible stores.
//!
//! The entry point is [`UrlSigner`]. It derives the day scoped signing key
//! once through [`SigningKeyCache`] and then signs every object key with a
//! single SHA-256 and HMAC-SHA256, using [`CanonicalRequestBuilder`] to lay
//! out the canonical request.
//!
//! Signers can be built from raw parts ([`UrlSigner::new`]), from any
//! [`ExtractConfig`] such as [`Config`], or from an [`ExtractConfigAsync`]
//! such as [`SdkConfigProvider`], which wraps an AWS SDK credentials provider.

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

mod constants;
pub use constants::MAX_EXPIRES_IN_SECS;

mod credential;
pub use credential::Credential;

mod endpoint;
pub use endpoint::Endpoint;

mod config;
pub use config::Config;

mod provide;
pub use provide::ExtractConfig;
pub use provide::ExtractConfigAsync;
pub use provide::SdkConfigProvider;

mod signing_key;
pub use signing_key::derive_signing_key;
pub use signing_key::SigningKey;
pub use signing_key::SigningKeyCache;
pub use signing_key::SigningScope;

mod canonical;
pub use canonical::check_expires_in;
pub use canonical::CanonicalRequest;
pub use canonical::CanonicalRequestBuilder;

mod signer;
pub use signer::UrlSigner;
pub use signer::DEFAULT_EXPIRES_IN;
