//! Core types and trait definitions for the SubTrack subscription tracker.
//!
//! This crate is deliberately free of HTTP, SMTP, and database dependencies.
//! All other crates depend on it; it depends on nothing heavier than chrono.

// The collaborator traits return `impl Future + Send` and implementors use
// native `async fn`; silence the advisory lint about auto-trait bounds.
#![allow(async_fn_in_trait)]

pub mod billing;
pub mod clock;
pub mod decision;
pub mod error;
pub mod notifier;
pub mod spending;
pub mod store;
pub mod subscription;
pub mod trigger;
pub mod user;

pub use error::{Error, Result};
