#![cfg_attr(docsrs, feature(doc_cfg))]
//! Shared data types for `fire-bench`.
//!
//! Everything in here is plain data: the immutable [`RunRequest`] handed to the engine, and the
//! per-level [`ConcurrencyResult`] rows it hands back inside a [`BenchmarkReport`].
mod config;
mod constants;
mod error;
mod stats;

pub use config::*;
pub use constants::*;
pub use error::*;
pub use stats::*;
