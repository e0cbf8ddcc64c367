//! WheelHub Facade - Backend access layer
//!
//! The single entry point the application talks to. Every operation is
//! routed through one gating decorator:
//! - in basic mode reads return neutral defaults and everything else fails
//!   with [`FacadeError::ModeDisabled`] without touching the backend
//! - in cloud mode the backend is initialized once, on first use, and the
//!   operation runs against it
//!
//! ## Modules
//!
//! - [`facade`] - [`Facade`], the public operation surface
//! - [`loader`] - [`ClientLoader`] and the [`BackendHandle`] it builds
//! - [`identity`] - [`IdentityService`] over the identity provider port
//! - [`gate`] - [`Gate`], the per-operation basic mode policy
//! - [`error`] - [`FacadeError`]
//! - [`logging`] - tracing bootstrap

pub mod error;
pub mod facade;
pub mod gate;
pub mod identity;
pub mod loader;
pub mod logging;

pub use error::FacadeError;
pub use facade::Facade;
pub use gate::Gate;
pub use identity::IdentityService;
pub use loader::{BackendHandle, ClientLoader};
