//! Core types, traits and engine logic for Rapport.
//!
//! This crate holds the matching engine: affinity scoring, the match state
//! machine, and the user-details resolver with its fallback cache. It is
//! deliberately free of HTTP and database dependencies; storage backends and
//! upstream clients plug in through the traits in [`store`] and [`upstream`].

// Trait declarations spell out `Send` futures; implementations use `async fn`.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod event;
pub mod lifecycle;
pub mod matching;
pub mod memory;
pub mod recommend;
pub mod resolver;
pub mod store;
pub mod upstream;
pub mod user;

#[cfg(test)]
mod testing;

pub use error::{Error, ErrorKind, Result};
