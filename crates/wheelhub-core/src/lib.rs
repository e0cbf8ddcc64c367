//! WheelHub Core - Domain types, configuration and ports
//!
//! This crate holds everything the backend access layer shares:
//! - **Domain types** - `BackendMode`, `Principal`, `ResolvedCaller`, `WheelConfig`,
//!   `SavedWheel`, `SharedWheel`, `BestEffort`
//! - **Configuration** - YAML-backed `Config` with environment overrides
//! - **Port definitions** - Traits for adapters: `IDocumentStore`, `IIdentityProvider`,
//!   `IBackendFactory`, `IExceptionTracker`
//!
//! # Architecture
//!
//! Ports define the seams between the facade and the cloud SDK. The store,
//! functions and telemetry crates implement them; the facade crate wires them.

pub mod config;
pub mod domain;
pub mod ports;
