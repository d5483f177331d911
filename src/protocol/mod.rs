//! Protocol engine primitives
//!
//! The envelope codec, the error taxonomy, and the shared wire types. Both
//! hosting roles (stateless gateway, persistent connection host) and the
//! client correlator are built on this module.
//!
//! # Canonical Import Path
//!
//! ```no_run
//! use chatrelay::protocol::envelope::Envelope;
//! use chatrelay::protocol::errors::ProtocolError;
//! ```

pub mod envelope;
pub mod errors;
pub mod types;

pub use envelope::{Envelope, MessageKind, RequestId};
pub use errors::{ErrorObject, ProtocolError};
