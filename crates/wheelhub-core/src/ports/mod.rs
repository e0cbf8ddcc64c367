//! Port definitions (hexagonal architecture interfaces)
//!
//! These traits are the seams between the facade and the outside world.
//! Implementations live in adapter crates or in the embedding application.
//!
//! ## Ports Overview
//!
//! - [`IDocumentStore`] - Persistent-connection document database client
//! - [`IIdentityProvider`] - Current principal, tokens and interactive sign-in
//! - [`IBackendFactory`] - Loads the SDK modules the loader initializes once
//! - [`IExceptionTracker`] - Reports swallowed failures to an external tracker

pub mod backend_factory;
pub mod document_store;
pub mod exception_tracker;
pub mod identity_provider;

pub use backend_factory::IBackendFactory;
pub use document_store::{
    BatchWrite, DocPath, Document, FieldValue, Fields, IDocumentStore, WriteBatch,
};
pub use exception_tracker::{IExceptionTracker, NoopTracker};
pub use identity_provider::IIdentityProvider;
