//! Core domain types and utilities for the tourdesk staff dashboard.
//!
//! This crate provides the foundational types and error handling shared by
//! the platform-access library and the web server.

pub mod email;
pub mod error;

pub use email::{EmailAddress, EmailError};
pub use error::Result;
