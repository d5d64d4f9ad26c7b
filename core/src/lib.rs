//! Core components for presigning object store URLs.
//!
//! This crate provides the service independent building blocks shared by the
//! presign services:
//!
//! - [`Error`] and [`ErrorKind`]: the error type returned by every fallible API.
//! - [`Clock`]: an injectable source of the signing instant, with
//!   [`SystemClock`] for production and [`FixedClock`] for reproducible tests.
//! - [`Env`]: environment variable access, with [`OsEnv`] and [`StaticEnv`].
//!
//! ## Utilities
//!
//! - [`hash`]: SHA-256 and HMAC-SHA256 helpers.
//! - [`time`]: date formatting used by signature schemes.
//! - [`utils`]: general utilities including data redaction.

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub use time::Clock;
pub use time::FixedClock;
pub use time::SystemClock;
pub mod utils;

mod env;
pub use env::Env;
pub use env::OsEnv;
pub use env::StaticEnv;

mod error;
pub use error::Error;
pub use error::ErrorKind;
pub use error::Result;
