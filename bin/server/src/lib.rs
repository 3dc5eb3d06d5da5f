//! tourdesk staff dashboard web server.
//!
//! This crate wires the sign-in flow from `tourdesk-platform-access` into an
//! Axum application: OIDC login, signed session cookies, the route gate, and
//! the HTTP client for the external user API.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod pages;
pub mod profile;
