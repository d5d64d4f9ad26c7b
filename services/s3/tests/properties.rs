use super::{presign_with_aws_sigv4, split_url, ManualClock};
use anyhow::Result;
use percent_encoding::percent_decode_str;
use presign_core::time::parse_rfc3339;
use presign_core::{ErrorKind, FixedClock};
use presign_s3::{
    derive_signing_key, Credential, Endpoint, SigningScope, UrlSigner, MAX_EXPIRES_IN_SECS,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const SECRET: &str = "minioadmin";

fn signer_at(time: &str) -> Result<UrlSigner> {
    Ok(UrlSigner::new(
        Credential::new("minioadmin", SECRET),
        Endpoint::new("http://localhost:9000/test", "us-east-1")?,
    )?
    .with_clock(FixedClock::new(parse_rfc3339(time)?)))
}

#[test]
fn test_generate_is_deterministic() -> Result<()> {
    let keys = ["cat.jpg", "dir/dog.jpg", "hello world.txt"];

    let first = signer_at("2024-02-29T13:37:42Z")?.generate(&keys, Duration::from_secs(3600))?;
    let signer = signer_at("2024-02-29T13:37:42Z")?;
    let second = signer.generate(&keys, Duration::from_secs(3600))?;
    let third = signer.generate(&keys, Duration::from_secs(3600))?;

    assert_eq!(first, second);
    assert_eq!(second, third);
    Ok(())
}

#[test]
fn test_generate_preserves_length_and_order() -> Result<()> {
    let signer = signer_at("2024-02-29T13:37:42Z")?;
    let keys = (0..257).map(|i| format!("objects/{i:04}.bin")).collect::<Vec<_>>();

    let urls = signer.generate(&keys, Duration::from_secs(3600))?;

    assert_eq!(urls.len(), keys.len());
    for (key, url) in keys.iter().zip(&urls) {
        assert!(
            url.starts_with(&format!("http://localhost:9000/test/{key}?")),
            "{url} does not belong to {key}"
        );
    }
    Ok(())
}

#[test]
fn test_batch_shares_one_signing_instant() -> Result<()> {
    let signer = signer_at("2024-02-29T13:37:42Z")?;
    let urls = signer.generate(&["a", "b", "c"], Duration::from_secs(60))?;

    for url in &urls {
        assert!(url.contains("&X-Amz-Date=20240229T133742Z&"));
        assert!(url.contains("X-Amz-Credential=minioadmin%2F20240229%2Fus-east-1%2Fs3%2Faws4_request&"));
    }
    assert_eq!(signer.signing_key_cache().len(), 1);
    Ok(())
}

#[test]
fn test_signing_key_reused_within_a_day() -> Result<()> {
    let clock = ManualClock::new(parse_rfc3339("2024-02-29T00:00:01Z")?);
    let cred = Credential::new("minioadmin", SECRET);
    let signer = UrlSigner::new(
        cred.clone(),
        Endpoint::new("http://localhost:9000/test", "us-east-1")?,
    )?
    .with_clock(clock.clone());

    signer.generate(&["a.txt"], Duration::from_secs(3600))?;
    clock.set(parse_rfc3339("2024-02-29T23:59:59Z")?);
    let late = signer.generate_one("a.txt", Duration::from_secs(3600))?;

    assert_eq!(signer.signing_key_cache().len(), 1);

    let scope = SigningScope::new(parse_rfc3339("2024-02-29T12:00:00Z")?, "us-east-1", "s3");
    assert_eq!(
        signer.signing_key_cache().key_for(SECRET, &scope),
        derive_signing_key(SECRET, &scope)
    );

    let (base, _) = split_url(&late);
    let expected = presign_with_aws_sigv4(
        &base,
        &cred,
        "us-east-1",
        parse_rfc3339("2024-02-29T23:59:59Z")?,
        Duration::from_secs(3600),
    )?;
    assert_eq!(split_url(&late), split_url(&expected));
    Ok(())
}

#[test]
fn test_signing_key_rederived_across_days() -> Result<()> {
    let clock = ManualClock::new(parse_rfc3339("2024-02-29T23:59:59Z")?);
    let cred = Credential::new("minioadmin", SECRET);
    let signer = UrlSigner::new(
        cred.clone(),
        Endpoint::new("http://localhost:9000/test", "us-east-1")?,
    )?
    .with_clock(clock.clone());

    let before = signer.generate_one("a.txt", Duration::from_secs(3600))?;
    clock.set(parse_rfc3339("2024-03-01T00:00:00Z")?);
    let after = signer.generate_one("a.txt", Duration::from_secs(3600))?;

    assert_eq!(signer.signing_key_cache().len(), 2);
    let leap_day = SigningScope::new(parse_rfc3339("2024-02-29T00:00:00Z")?, "us-east-1", "s3");
    let next_day = SigningScope::new(parse_rfc3339("2024-03-01T00:00:00Z")?, "us-east-1", "s3");
    assert_ne!(
        derive_signing_key(SECRET, &leap_day),
        derive_signing_key(SECRET, &next_day)
    );

    for (url, time) in [
        (&before, "2024-02-29T23:59:59Z"),
        (&after, "2024-03-01T00:00:00Z"),
    ] {
        let (base, _) = split_url(url);
        let expected = presign_with_aws_sigv4(
            &base,
            &cred,
            "us-east-1",
            parse_rfc3339(time)?,
            Duration::from_secs(3600),
        )?;
        assert_eq!(split_url(url), split_url(&expected));
    }
    Ok(())
}

#[test]
fn test_expires_in_boundaries() -> Result<()> {
    let signer = signer_at("2024-02-29T13:37:42Z")?;

    for secs in [1, MAX_EXPIRES_IN_SECS] {
        let url = signer.generate_one("a.txt", Duration::from_secs(secs))?;
        assert!(url.contains(&format!("&X-Amz-Expires={secs}&")));
    }
    for secs in [0, MAX_EXPIRES_IN_SECS + 1] {
        let err = signer
            .generate(&["a.txt"], Duration::from_secs(secs))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }
    Ok(())
}

#[test]
fn test_session_token_position() -> Result<()> {
    let with_token = UrlSigner::new(
        Credential::new("minioadmin", SECRET).with_session_token("token"),
        Endpoint::new("http://localhost:9000/test", "us-east-1")?,
    )?;
    for url in with_token.generate(&["a.txt", "b.txt"], Duration::from_secs(3600))? {
        let names = url
            .split_once('?')
            .expect("url must have a query")
            .1
            .split('&')
            .map(|kv| kv.split_once('=').expect("must be a pair").0.to_string())
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                "X-Amz-Algorithm",
                "X-Amz-Credential",
                "X-Amz-Date",
                "X-Amz-Expires",
                "X-Amz-Security-Token",
                "X-Amz-SignedHeaders",
                "X-Amz-Signature",
            ]
        );
    }

    let without_token = signer_at("2024-02-29T13:37:42Z")?;
    for url in without_token.generate(&["a.txt", "b.txt"], Duration::from_secs(3600))? {
        assert!(!url.contains("X-Amz-Security-Token"));
    }
    Ok(())
}

#[test]
fn test_encoded_keys_decode_to_logical_path() -> Result<()> {
    let signer = signer_at("2024-02-29T13:37:42Z")?;

    let url = signer.generate_one("summer trip+2024%2Fbeach.jpg", Duration::from_secs(60))?;
    let (base, _) = split_url(&url);
    let path = base
        .strip_prefix("http://localhost:9000")
        .expect("url must start with the endpoint");

    assert_eq!(path, "/test/summer%20trip%2B2024/beach.jpg");
    assert_eq!(
        percent_decode_str(path).decode_utf8()?,
        "/test/summer trip+2024/beach.jpg"
    );

    let again = signer.generate_one(&path["/test/".len()..], Duration::from_secs(60))?;
    assert_eq!(url, again);
    Ok(())
}

#[test]
fn test_signer_is_shareable_across_threads() -> Result<()> {
    let signer = Arc::new(signer_at("2024-02-29T13:37:42Z")?);
    let keys = (0..32).map(|i| format!("{i}.txt")).collect::<Vec<_>>();
    let expected = signer_at("2024-02-29T13:37:42Z")?.generate(&keys, Duration::from_secs(3600))?;

    let handles = (0..4)
        .map(|_| {
            let signer = signer.clone();
            let keys = keys.clone();
            thread::spawn(move || signer.generate(&keys, Duration::from_secs(3600)))
        })
        .collect::<Vec<_>>();

    for handle in handles {
        let urls = handle.join().expect("thread must not panic")?;
        assert_eq!(urls, expected);
    }
    assert_eq!(signer.signing_key_cache().len(), 1);
    Ok(())
}
