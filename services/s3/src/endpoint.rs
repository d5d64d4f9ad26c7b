use crate::constants::{DEFAULT_REGION, S3_SERVICE};
use http::Uri;
use presign_core::{Error, Result};

/// Endpoint describes where a bucket lives and which scope signs for it.
///
/// Both URL styles are accepted:
///
/// - virtual-hosted: `https://my-bucket.s3.amazonaws.com/`
/// - path-style: `https://s3.amazonaws.com/my-bucket/`
///
/// For path-style URLs the bucket path becomes part of every canonical URI and
/// is not repeated in the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base_url: String,
    host: String,
    path_prefix: String,
    region: String,
    service: String,
}

impl Endpoint {
    /// Create an endpoint from the URL of a bucket.
    pub fn new(bucket_endpoint_url: &str, region: &str) -> Result<Self> {
        if region.is_empty() {
            return Err(Error::config_invalid("region must not be empty"));
        }

        let uri: Uri = bucket_endpoint_url.parse().map_err(|e| {
            Error::config_invalid(format!(
                "bucket endpoint url '{bucket_endpoint_url}' is invalid"
            ))
            .with_source(e)
        })?;
        let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) else {
            return Err(Error::config_invalid(format!(
                "bucket endpoint url '{bucket_endpoint_url}' must be absolute"
            )));
        };
        if authority.as_str().contains('@') {
            return Err(Error::config_invalid(
                "bucket endpoint url must not carry user info",
            ));
        }
        if uri.query().is_some() {
            return Err(Error::config_invalid(
                "bucket endpoint url must not carry a query",
            ));
        }

        // Clients omit the scheme's default port from the Host header.
        let host = match authority.port_u16() {
            Some(port) if !is_default_port(scheme, port) => {
                format!("{}:{port}", authority.host().to_ascii_lowercase())
            }
            _ => authority.host().to_ascii_lowercase(),
        };
        Ok(Self {
            base_url: format!("{scheme}://{host}"),
            path_prefix: uri.path().trim_end_matches('/').to_string(),
            host,
            region: region.to_string(),
            service: S3_SERVICE.to_string(),
        })
    }

    /// Create an endpoint for a bucket on AWS S3, addressed virtual-hosted style.
    pub fn virtual_hosted(bucket: &str, region: &str) -> Result<Self> {
        check_bucket(bucket)?;

        let url = if region == DEFAULT_REGION {
            format!("https://{bucket}.s3.amazonaws.com")
        } else {
            format!("https://{bucket}.s3.{region}.amazonaws.com")
        };
        Self::new(&url, region)
    }

    /// Create an endpoint for a bucket behind a service endpoint, addressed
    /// path style. This is the usual shape for S3 compatible stores like MinIO.
    pub fn path_style(endpoint_url: &str, bucket: &str, region: &str) -> Result<Self> {
        check_bucket(bucket)?;

        let url = format!("{}/{bucket}", endpoint_url.trim_end_matches('/'));
        Self::new(&url, region)
    }

    /// `scheme://authority` without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lower-cased host with any non-default port, used as the signed `host` header.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Bucket path for path-style endpoints, empty otherwise.
    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    /// Region of the credential scope.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Service of the credential scope, always `s3`.
    pub fn service(&self) -> &str {
        &self.service
    }
}

fn is_default_port(scheme: &str, port: u16) -> bool {
    matches!(
        (scheme.to_ascii_lowercase().as_str(), port),
        ("http", 80) | ("https", 443)
    )
}

fn check_bucket(bucket: &str) -> Result<()> {
    if bucket.is_empty() || bucket.contains('/') {
        return Err(Error::config_invalid(format!(
            "bucket name '{bucket}' is invalid"
        )));
    }
    Ok(())
}
