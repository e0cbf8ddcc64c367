//! Integration tests for wheelhub-functions
//!
//! Uses wiremock to simulate the deployed functions and verifies request
//! shape, response normalization and the degrade-and-track paths.

mod common;

mod test_account;
mod test_admin;
mod test_public;
mod test_shared;
