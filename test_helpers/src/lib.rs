//! Test helpers shared across crates in the workspace.
//!
//! [`container`] simulates an external service whose address is only known
//! once it has started. [`figment`] wraps `figment::Jail` for tests that need
//! isolated environment variables or configuration files.

pub mod container;
pub mod figment;
