//! wagman-client: command/response framing for the wagman controller
//!
//! A request is one ASCII line (`<command>[ <arg> ...]`). The reply is a frame: a header
//! line starting with [`HEADER_PREFIX`], zero or more body lines, and a footer line starting
//! with [`FOOTER_PREFIX`]. [`CommandClient`] opens a fresh link per request and hands back a
//! lazy [`Frame`] over the body lines.

mod error;
pub use error::{ClientError, ProtocolError, Result};

mod command;
pub use command::Command;

mod frame;
pub use frame::{compact, Frame, FOOTER_PREFIX, HEADER_PREFIX};

mod client;
pub use client::CommandClient;

pub mod help;
pub use help::{help_rows, UsageRow, UsageTable};

pub mod sim;

pub use wagman_transport as transport;
