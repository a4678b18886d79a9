//! # ClassConnect CLI
//!
//! Credential and token utilities for operators.
//!
//! This library crate holds the command implementations used by the CLI
//! binary. Every command reads its configuration once and prints its result.
//!
//! ## Usage
//!
//! ```ignore
//! use classconnect_cli::tools;
//! use classconnect_config::HasherConfig;
//!
//! let record = tools::hash_password(&HasherConfig::from_env(), "s3cret")?;
//! ```

pub mod tools;
