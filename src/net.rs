//! Socket and channel handle types produced by the factory.
//!
//! Each handle owns its descriptor until converted into the std or mio
//! type that carries the stream semantics. Conversions and `close`
//! consume the handle, so a descriptor is released exactly once no
//! matter which path the caller takes.

pub mod channel;
pub mod socket;

pub use channel::{ServerChannel, StreamChannel};
pub use socket::{ServerSocket, StreamSocket};
