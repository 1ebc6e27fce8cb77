//! Acceptance Test Suite for Deployed Test Applications
//!
//! This crate provides the fixtures and step bindings used to verify that
//! environment variables are injected into applications deployed in a cluster
//! namespace. Tests validate behaviour against an actual deployment, reached
//! through the application's externally resolved route.
//!
//! # Features
//!
//! - `cluster`: Tests that need `kubectl` on PATH and a live namespace with
//!   the test application image pullable. Without this feature only the
//!   mock-server probe tests run.
//!
//! # Prerequisites
//!
//! 1. A reachable cluster with a namespace prepared for the suite
//! 2. `TEST_NAMESPACE` set to that namespace
//! 3. kubectl in PATH, configured for the target cluster
//!
//! # Usage
//!
//! ```bash
//! # Probe behaviour tests only (no cluster required)
//! cargo test -p acceptance-tests
//!
//! # Full suite against a live namespace, including the BDD scenarios
//! TEST_NAMESPACE=acceptance cargo test -p acceptance-tests --features cluster
//! ```

pub mod apps;
pub mod cluster;
pub mod poll;
pub mod probe;
