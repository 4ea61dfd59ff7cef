//! Non-blocking channel handles for event-driven I/O.
//!
//! The factory allocates these with `SOCK_NONBLOCK` already set. Both
//! types implement [`Source`] so they can sit in a mio [`Poll`] before
//! the connect or listen step, and convert into mio's socket types once
//! stream semantics begin.
//!
//! [`Poll`]: mio::Poll

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd};

use mio::event::Source;
use mio::unix::SourceFd;
use mio::{Interest, Registry, Token};
use rustix::io::Errno;

/// An unconnected non-blocking stream socket.
#[derive(Debug)]
pub struct StreamChannel {
    fd: OwnedFd,
}

impl StreamChannel {
    pub(crate) fn new(fd: OwnedFd) -> Self {
        Self { fd }
    }

    /// Initiates a non-blocking connect and converts into a mio stream.
    ///
    /// An in-progress connect is not an error; completion surfaces as
    /// writable readiness on the returned stream, exactly as with
    /// [`mio::net::TcpStream::connect`].
    ///
    /// # Errors
    ///
    /// Returns an error only for immediate kernel rejection (bad
    /// address, no route). The descriptor is released on failure.
    pub fn connect(self, addr: SocketAddr) -> io::Result<mio::net::TcpStream> {
        match rustix::net::connect(&self.fd, &addr) {
            Ok(()) | Err(Errno::INPROGRESS) => {}
            Err(errno) => return Err(errno.into()),
        }
        Ok(mio::net::TcpStream::from_std(TcpStream::from(self.fd)))
    }

    /// Releases the descriptor now instead of at drop.
    pub fn close(self) {}
}

impl AsFd for StreamChannel {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl From<StreamChannel> for OwnedFd {
    fn from(channel: StreamChannel) -> Self {
        channel.fd
    }
}

impl Source for StreamChannel {
    fn register(
        &mut self,
        registry: &Registry,
        token: Token,
        interests: Interest,
    ) -> io::Result<()> {
        SourceFd(&self.fd.as_raw_fd()).register(registry, token, interests)
    }

    fn reregister(
        &mut self,
        registry: &Registry,
        token: Token,
        interests: Interest,
    ) -> io::Result<()> {
        SourceFd(&self.fd.as_raw_fd()).reregister(registry, token, interests)
    }

    fn deregister(&mut self, registry: &Registry) -> io::Result<()> {
        SourceFd(&self.fd.as_raw_fd()).deregister(registry)
    }
}

/// A non-blocking socket destined to accept connections through a mio
/// event loop.
#[derive(Debug)]
pub struct ServerChannel {
    fd: OwnedFd,
}

impl ServerChannel {
    pub(crate) fn new(fd: OwnedFd) -> Self {
        Self { fd }
    }

    /// Binds the socket to `addr`, with `SO_REUSEADDR` set as mio and
    /// the standard library both do for listeners.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is in use or not local.
    pub fn bind(&self, addr: SocketAddr) -> io::Result<()> {
        rustix::net::sockopt::set_socket_reuseaddr(&self.fd, true)?;
        rustix::net::bind(&self.fd, &addr)?;
        Ok(())
    }

    /// Returns the locally bound address.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket is unbound.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        let addr = rustix::net::getsockname(&self.fd)?;
        SocketAddr::try_from(addr).map_err(io::Error::from)
    }

    /// Starts listening and converts into a mio listener.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket is unbound or listen is refused.
    pub fn listen(self, backlog: i32) -> io::Result<mio::net::TcpListener> {
        rustix::net::listen(&self.fd, backlog)?;
        Ok(mio::net::TcpListener::from_std(TcpListener::from(self.fd)))
    }

    /// Releases the descriptor now instead of at drop.
    pub fn close(self) {}
}

impl AsFd for ServerChannel {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl From<ServerChannel> for OwnedFd {
    fn from(channel: ServerChannel) -> Self {
        channel.fd
    }
}

impl Source for ServerChannel {
    fn register(
        &mut self,
        registry: &Registry,
        token: Token,
        interests: Interest,
    ) -> io::Result<()> {
        SourceFd(&self.fd.as_raw_fd()).register(registry, token, interests)
    }

    fn reregister(
        &mut self,
        registry: &Registry,
        token: Token,
        interests: Interest,
    ) -> io::Result<()> {
        SourceFd(&self.fd.as_raw_fd()).reregister(registry, token, interests)
    }

    fn deregister(&mut self, registry: &Registry) -> io::Result<()> {
        SourceFd(&self.fd.as_raw_fd()).deregister(registry)
    }
}
