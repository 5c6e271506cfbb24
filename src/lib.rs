//! metasync - reconcile per-stage project variables with an S3 bucket
//!
//! This crate provides the core functionality for the `metasync` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Project discovery, bucket settings, sync target identity
//! - [`store`] - Local file and remote bucket storage
//! - [`sync`] - Diff, reconciliation policy, conflict resolution, session
//! - [`prompt`] - Human interaction for conflict resolution
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod prompt;
pub mod store;
pub mod sync;

pub use error::{Error, Result};
