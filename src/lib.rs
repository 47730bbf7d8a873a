//! noidpool - durable pool registry and minter for opaque identifiers
//!
//! This crate implements the identifier algebra (template parsing, digit
//! codec, swizzle permutation, minting) plus the concurrent, durable pool
//! registry that issues identifiers from named pools, and the thin HTTP
//! boundary that exposes it.

pub mod config;
pub mod digits;
pub mod error;
pub mod http;
pub mod logging;
pub mod minter;
pub mod pool;
pub mod registry;
pub mod storage;
pub mod swizzle;
pub mod template;
pub mod validator;

pub use error::{NoidError, Result};
pub use registry::Registry;
