//! Presign every object key given on the command line.
//!
//! ```shell
//! AWS_ACCESS_KEY_ID=minioadmin AWS_SECRET_ACCESS_KEY=minioadmin \
//! AWS_ENDPOINT_URL_S3=http://127.0.0.1:9000 \
//!     cargo run --example presign_batch -- test cat.jpg dog.jpg
//! ```

use anyhow::{bail, Result};
use presign_core::OsEnv;
use presign_s3::{Config, UrlSigner, DEFAULT_EXPIRES_IN};
use std::time::Instant;

fn main() -> Result<()> {
    let _ = env_logger::builder().try_init();

    let mut args = std::env::args().skip(1);
    let Some(bucket) = args.next() else {
        bail!("usage: presign_batch <bucket> [object_key]...");
    };
    let mut keys = args.collect::<Vec<_>>();
    if keys.is_empty() {
        keys = (0..1024).map(|i| format!("demo/{i:04}.txt")).collect();
    }

    let cfg = Config {
        bucket: Some(bucket),
        ..Default::default()
    }
    .from_env(&OsEnv);
    let signer = UrlSigner::from_config(&cfg)?;

    let start = Instant::now();
    let urls = signer.generate(&keys, DEFAULT_EXPIRES_IN)?;
    let elapsed = start.elapsed();

    for url in urls.iter().take(8) {
        println!("{url}");
    }
    if urls.len() > 8 {
        println!("... and {} more", urls.len() - 8);
    }
    eprintln!("presigned {} urls in {elapsed:?}", urls.len());
    Ok(())
}
