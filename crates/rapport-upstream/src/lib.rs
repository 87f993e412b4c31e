//! HTTP clients for the identity and profile services.
//!
//! [`HttpIdentityLookup`] and [`HttpProfileLookup`] implement the
//! `rapport-core` lookup traits over JSON REST. Neither retries; the resolver
//! decides what a failure means.

mod client;
pub mod error;

pub use client::{HttpIdentityLookup, HttpProfileLookup, UpstreamConfig};
pub use error::{Error, Result};
