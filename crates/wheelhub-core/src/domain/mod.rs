//! Domain types
//!
//! This module contains the core domain types for WheelHub:
//! - Backend mode (cloud vs basic)
//! - Session identity: principals, resolved callers and sign-in providers
//! - Wheel records: saved, shared and admin entries
//! - Best-effort operation status
//! - Domain-specific error types

pub mod errors;
pub mod identity;
pub mod mode;
pub mod status;
pub mod wheel;

// Re-export commonly used types
pub use errors::AuthError;
pub use identity::{
    AuthProvider, Principal, ResolvedCaller, SignInRequest, SignInUiOptions, SHEETS_READONLY_SCOPE,
};
pub use mode::BackendMode;
pub use status::BestEffort;
pub use wheel::{Admin, Carousel, SavedWheel, SharedWheel, WheelConfig};
