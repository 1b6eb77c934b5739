//! Core types and trait definitions for the CPI price-observation store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod catalog;
pub mod chart;
pub mod error;
pub mod filter;
pub mod observation;
pub mod outcome;
pub mod store;
pub mod synth;

pub use error::{Error, Result};
