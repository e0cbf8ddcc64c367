//! WheelHub Store - Record store adapter and emulator backend
//!
//! Provides the application's persistent records on top of the
//! [`IDocumentStore`](wheelhub_core::ports::IDocumentStore) port:
//! - [`RecordStore`] maps saved wheels, moderation settings, admins,
//!   carousels and the shared wheel review queue onto documents
//! - [`MemoryDocumentStore`] and [`MemoryIdentityProvider`] emulate the
//!   cloud SDK in-process
//! - [`EmulatorFactory`] hands the emulator to the client loader
//! - [`RestDocumentStore`] talks to the hosted database over REST, and
//!   [`CloudFactory`] pairs it with the application's identity provider

pub mod cloud;
pub mod emulator;
pub mod identity;
pub mod memory;
pub mod records;
pub mod rest;

pub use cloud::CloudFactory;
pub use emulator::EmulatorFactory;
pub use identity::MemoryIdentityProvider;
pub use memory::MemoryDocumentStore;
pub use records::RecordStore;
pub use rest::RestDocumentStore;
