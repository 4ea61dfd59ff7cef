//! Explicit transport-family socket factory.
//!
//! Some kernels expose alternate stream transports (notably Sockets
//! Direct Protocol on InfiniBand hosts) through nothing more than an
//! address-family tag passed to `socket(2)`. This crate makes that
//! capability a first-class API: ask for a [`TransportFamily`], get back
//! a handle that converts into the ordinary std or mio socket types, and
//! let the standard networking stack do everything past descriptor
//! allocation.
//!
//! Unsupported families are reported as [`OpenError::UnsupportedFamily`]
//! after a one-time, cached capability probe; nothing in this crate
//! panics when a family is absent.

pub mod error;
pub mod factory;
pub mod family;
pub mod net;
pub mod trace;

pub use error::OpenError;
pub use factory::{open_channel, open_server_channel, open_server_socket, open_socket};
pub use family::TransportFamily;
pub use net::{ServerChannel, ServerSocket, StreamChannel, StreamSocket};
pub use trace::init_tracing;
