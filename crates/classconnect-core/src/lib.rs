//! # ClassConnect Core
//!
//! Foundational types shared by every ClassConnect crate.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//!
//! # Example
//!
//! ```ignore
//! use classconnect_core::AppError;
//!
//! let error = AppError::unauthorized("Authorization token missing");
//! ```

pub mod errors;

pub use axum::http::StatusCode;
pub use errors::AppError;
