//! WheelHub Functions - Stateless server-side function gateway
//!
//! Provides an async client for the HTTP functions deployed next to the
//! cloud backend:
//! - Shared wheel creation, lookup, listing and deletion
//! - Account conversion and deletion
//! - Admin-only review queue size and translation
//! - Public listings (carousels, spin statistics, social media search)
//!
//! ## Modules
//!
//! - [`client`] - HTTP client, endpoint table and response normalization
//! - [`shared`] - Shared wheel endpoints
//! - [`account`] - Account lifecycle endpoints
//! - [`admin`] - Admin-gated endpoints
//! - [`public`] - Unauthenticated listings and search

pub mod account;
pub mod admin;
pub mod client;
pub mod public;
pub mod shared;

use thiserror::Error;

/// Message returned when an admin-gated endpoint answers `403`
pub const ADMIN_REQUIRED_MESSAGE: &str = "Please log in as an admin user";

/// Errors that can occur when calling a server-side function
#[derive(Debug, Error)]
pub enum FunctionsError {
    /// A network-level error occurred
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// An admin-gated endpoint refused the caller
    #[error("Please log in as an admin user")]
    AdminRequired,

    /// The response body carried an `error` field; surfaced verbatim
    #[error("Server error: {0}")]
    Server(serde_json::Value),

    /// The response could not be parsed or lacked an expected field
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The endpoint URL could not be built
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
