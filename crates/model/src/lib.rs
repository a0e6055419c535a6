//! An abstraction layer for the external services the relay talks to.
//!
//! This crate establishes an unified protocol for the relay to interact
//! with language models and web search engines, so that the relay can
//! switch between vendors (or fakes in tests) without modifying the core
//! codebase.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod provider;
mod request;
mod search;

pub use error::*;
pub use provider::*;
pub use request::*;
pub use search::*;
