//! A stand-in for a containerised service started by a test.
//!
//! The container's mapped port is assigned by [`FakeContainer::start`], so a
//! dynamic property that reads it before startup observes an error and one
//! that reads it afterwards observes the port. This mirrors the lifecycle the
//! lazy property layer exists to support.
//!
//! # Examples
//!
//! ```
//! use dynamic_props_test_helpers::container::FakeContainer;
//!
//! let redis = FakeContainer::new("redis:5.0.3-alpine", 6379);
//! assert!(redis.first_mapped_port().is_err());
//! redis.start();
//! assert!(redis.first_mapped_port().is_ok_and(|port| port != 6379));
//! ```

use std::sync::atomic::{AtomicU16, Ordering};

use parking_lot::Mutex;
use thiserror::Error;

const FIRST_EPHEMERAL_PORT: u16 = 49_152;

static NEXT_PORT: AtomicU16 = AtomicU16::new(FIRST_EPHEMERAL_PORT);

/// Hands out the next port from `counter`, cycling back to the start of the
/// ephemeral range after `u16::MAX`.
fn allocate_port(counter: &AtomicU16) -> u16 {
    counter
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |port| {
            Some(port.checked_add(1).unwrap_or(FIRST_EPHEMERAL_PORT))
        })
        .unwrap_or_else(std::convert::identity)
}

/// Errors reported when querying a container that is not running.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ContainerError {
    /// The container has not been started, or has been stopped.
    #[error("container '{image}' is not running")]
    NotRunning {
        /// Image of the container that was queried.
        image: String,
    },
}

#[derive(Debug, Clone, Copy)]
struct Mapping {
    host_port: u16,
}

/// Simulated service container exposing a single port.
#[derive(Debug)]
pub struct FakeContainer {
    image: String,
    exposed_port: u16,
    mapping: Mutex<Option<Mapping>>,
}

impl FakeContainer {
    /// Describe a container for `image` exposing `exposed_port`.
    #[must_use]
    pub fn new(image: impl Into<String>, exposed_port: u16) -> Self {
        Self {
            image: image.into(),
            exposed_port,
            mapping: Mutex::new(None),
        }
    }

    /// Start the container, assigning a fresh host port. Starting a running
    /// container keeps its existing port.
    pub fn start(&self) {
        let mut mapping = self.mapping.lock();
        if mapping.is_none() {
            let host_port = allocate_port(&NEXT_PORT);
            *mapping = Some(Mapping { host_port });
        }
    }

    /// Stop the container, releasing its port mapping.
    pub fn stop(&self) {
        *self.mapping.lock() = None;
    }

    /// Returns `true` while the container is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.mapping.lock().is_some()
    }

    /// Image the container was created from.
    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Port exposed inside the container.
    #[must_use]
    pub const fn exposed_port(&self) -> u16 {
        self.exposed_port
    }

    /// Address at which the container is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::NotRunning`] before [`Self::start`].
    pub fn ip_address(&self) -> Result<String, ContainerError> {
        self.mapping()
            .map(|_| String::from("127.0.0.1"))
    }

    /// Host port mapped to the exposed port.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::NotRunning`] before [`Self::start`].
    pub fn first_mapped_port(&self) -> Result<u16, ContainerError> {
        self.mapping().map(|mapping| mapping.host_port)
    }

    fn mapping(&self) -> Result<Mapping, ContainerError> {
        (*self.mapping.lock()).ok_or_else(|| ContainerError::NotRunning {
            image: self.image.clone(),
        })
    }
}
