//! wagman-transport: newline-delimited text links to the wagman controller
//!
//! This crate provides the traits and types for a blocking line link, with feature-gated
//! backends. The default build enables a `mock` backend so that binaries and tests can run
//! on any host without the controller attached.

mod types;
pub use types::{LinkConfig, PortInfo, DEFAULT_BAUD, DEFAULT_DEVICE};

mod error;
pub use error::{Result, TransportError};

mod traits;
pub use traits::{Connector, LineTransport};

#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "mock")]
pub use mock::{MockDevice, MockLink, MockReply};

#[cfg(feature = "serial")]
mod serial;

#[cfg(feature = "serial")]
pub use serial::{SerialConnector, SerialLink};
