mod properties;

use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use anyhow::Result;
use aws_credential_types::Credentials;
use aws_sigv4::http_request::PercentEncodingMode;
use aws_sigv4::http_request::SignableBody;
use aws_sigv4::http_request::SignableRequest;
use aws_sigv4::http_request::SignatureLocation;
use aws_sigv4::http_request::SigningSettings;
use aws_sigv4::sign::v4;
use presign_core::time::DateTime;
use presign_core::Clock;
use presign_s3::Credential;

/// Clock whose instant can be moved by tests.
#[derive(Debug, Clone)]
pub struct ManualClock(Arc<Mutex<DateTime>>);

impl ManualClock {
    pub fn new(time: DateTime) -> Self {
        Self(Arc::new(Mutex::new(time)))
    }

    pub fn set(&self, time: DateTime) {
        *self.0.lock().expect("lock poisoned") = time;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime {
        *self.0.lock().expect("lock poisoned")
    }
}

/// Split a URL into the part before the query and its decoded, sorted query pairs.
pub fn split_url(url: &str) -> (String, Vec<(String, String)>) {
    let (base, query) = url.split_once('?').unwrap_or((url, ""));
    let mut pairs = form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect::<Vec<_>>();
    pairs.sort();
    (base.to_string(), pairs)
}

/// Presign `url` with the AWS reference signer and return the resulting URL.
///
/// `url` must already carry the percent-encoded object path.
pub fn presign_with_aws_sigv4(
    url: &str,
    cred: &Credential,
    region: &str,
    now: DateTime,
    expires_in: Duration,
) -> Result<String> {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut ss = SigningSettings::default();
    ss.percent_encoding_mode = PercentEncodingMode::Single;
    ss.signature_location = SignatureLocation::QueryParams;
    ss.expires_in = Some(expires_in);
    let id = Credentials::new(
        cred.access_key_id.clone(),
        cred.secret_access_key.clone(),
        cred.session_token.clone(),
        None,
        "hardcoded-credentials",
    )
    .into();
    let sp = v4::SigningParams::builder()
        .identity(&id)
        .region(region)
        .name("s3")
        .time(SystemTime::from(now))
        .settings(ss)
        .build()
        .expect("signing params must be valid");

    let mut req = http::Request::new("");
    *req.method_mut() = http::Method::GET;
    *req.uri_mut() = url.parse()?;

    let output = aws_sigv4::http_request::sign(
        SignableRequest::new(
            "GET",
            url,
            std::iter::empty::<(&str, &str)>(),
            SignableBody::UnsignedPayload,
        )?,
        &sp.into(),
    )?;
    let (aws_sig, _) = output.into_parts();
    aws_sig.apply_to_request_http1x(&mut req);

    Ok(req.uri().to_string())
}
