//! Core types, workflows and trait definitions for the job board.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage is reached through [`store::JobBoardStore`]; outbound messages go
//! through [`notify::Notifier`]. Both are passed in by the caller.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod access;
pub mod account;
pub mod application;
pub mod detail;
pub mod eligibility;
pub mod error;
pub mod gate;
pub mod lifecycle;
pub mod notify;
pub mod opportunity;
pub mod paging;
pub mod portfolio;
pub mod posting;
pub mod report;
pub mod saved;
pub mod store;
pub mod studio;
pub mod workflow;

pub use error::{Error, Rejection, Result};
