//! The transport socket factory.
//!
//! Each operation is a capability gate followed by a single `socket(2)`
//! call. The factory keeps no state between calls and holds no locks;
//! the only shared resource is the process descriptor table, and
//! descriptors cannot leak on error paths because the kernel handle
//! lives in an [`OwnedFd`] from the moment it exists.

use std::os::fd::OwnedFd;

use rustix::net::{SocketFlags, SocketType};

use crate::error::OpenError;
use crate::family::TransportFamily;
use crate::net::{ServerChannel, ServerSocket, StreamChannel, StreamSocket};
use crate::trace::trace;

/// Opens an unconnected blocking stream socket for `family`.
///
/// The returned handle carries no connection state; call
/// [`StreamSocket::connect`] to hand it to the standard library.
///
/// # Errors
///
/// [`OpenError::UnsupportedFamily`] if the platform lacks `family`
/// (no syscall is attempted), otherwise the classified `socket(2)`
/// failure.
pub fn open_socket(family: TransportFamily) -> Result<StreamSocket, OpenError> {
    alloc(family, SocketFlags::CLOEXEC).map(StreamSocket::new)
}

/// Opens a blocking socket intended for bind + listen + accept.
///
/// # Errors
///
/// Same conditions as [`open_socket`].
pub fn open_server_socket(family: TransportFamily) -> Result<ServerSocket, OpenError> {
    alloc(family, SocketFlags::CLOEXEC).map(ServerSocket::new)
}

/// Opens a non-blocking stream socket registrable with a mio event loop.
///
/// # Errors
///
/// Same conditions as [`open_socket`].
pub fn open_channel(family: TransportFamily) -> Result<StreamChannel, OpenError> {
    alloc(family, SocketFlags::CLOEXEC | SocketFlags::NONBLOCK).map(StreamChannel::new)
}

/// Opens a non-blocking listening-side socket for event-driven accept.
///
/// # Errors
///
/// Same conditions as [`open_socket`].
pub fn open_server_channel(family: TransportFamily) -> Result<ServerChannel, OpenError> {
    alloc(family, SocketFlags::CLOEXEC | SocketFlags::NONBLOCK).map(ServerChannel::new)
}

/// Capability gate plus the one allocation syscall.
fn alloc(family: TransportFamily, flags: SocketFlags) -> Result<OwnedFd, OpenError> {
    if !family.is_supported() {
        return Err(OpenError::UnsupportedFamily(family));
    }
    let fd = rustix::net::socket_with(family.address_family(), SocketType::STREAM, flags, None)
        .map_err(|errno| OpenError::from_errno(errno, family))?;
    trace!(%family, fd = ?fd, "allocated stream descriptor");
    Ok(fd)
}
