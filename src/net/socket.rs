//! Blocking socket handles.
//!
//! Thin wrappers over an [`OwnedFd`] allocated by the factory. Connect
//! and listen convert into [`std::net::TcpStream`] / [`TcpListener`],
//! so downstream code never learns which transport family produced the
//! descriptor.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::os::fd::{AsFd, BorrowedFd, OwnedFd};

/// An unconnected blocking stream socket.
///
/// Dropping the handle closes the descriptor; [`connect`] transfers it
/// to the standard library instead.
///
/// [`connect`]: StreamSocket::connect
#[derive(Debug)]
pub struct StreamSocket {
    fd: OwnedFd,
}

impl StreamSocket {
    pub(crate) fn new(fd: OwnedFd) -> Self {
        Self { fd }
    }

    /// Connects to `addr` and converts into a standard stream.
    ///
    /// Blocks until the connection is established or refused. All
    /// subsequent I/O goes through [`TcpStream`].
    ///
    /// # Errors
    ///
    /// Returns the kernel's connect failure; the descriptor is released
    /// either way.
    pub fn connect(self, addr: SocketAddr) -> io::Result<TcpStream> {
        rustix::net::connect(&self.fd, &addr)?;
        Ok(TcpStream::from(self.fd))
    }

    /// Releases the descriptor now instead of at drop. Consuming `self`
    /// makes a second close unrepresentable.
    pub fn close(self) {}
}

impl AsFd for StreamSocket {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl From<StreamSocket> for OwnedFd {
    fn from(socket: StreamSocket) -> Self {
        socket.fd
    }
}

/// A blocking socket destined to listen for connections.
///
/// Bind it, then call [`listen`] to convert into a [`TcpListener`] that
/// behaves exactly like one obtained from [`TcpListener::bind`].
///
/// [`listen`]: ServerSocket::listen
#[derive(Debug)]
pub struct ServerSocket {
    fd: OwnedFd,
}

impl ServerSocket {
    pub(crate) fn new(fd: OwnedFd) -> Self {
        Self { fd }
    }

    /// Binds the socket to `addr`.
    ///
    /// Sets `SO_REUSEADDR` first, matching what the standard library
    /// does inside [`TcpListener::bind`].
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
    /// Useful after binding port 0 to learn the ephemeral port.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket is unbound or the address family
    /// cannot be represented as a [`SocketAddr`].
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        let addr = rustix::net::getsockname(&self.fd)?;
        SocketAddr::try_from(addr).map_err(io::Error::from)
    }

    /// Starts listening and converts into a standard listener.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket is unbound or listen is refused.
    pub fn listen(self, backlog: i32) -> io::Result<TcpListener> {
        rustix::net::listen(&self.fd, backlog)?;
        Ok(TcpListener::from(self.fd))
    }

    /// Releases the descriptor now instead of at drop.
    pub fn close(self) {}
}

impl AsFd for ServerSocket {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl From<ServerSocket> for OwnedFd {
    fn from(socket: ServerSocket) -> Self {
        socket.fd
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::Ipv4Addr;
    use std::thread;

    use super::*;
    use crate::factory::{open_server_socket, open_socket};
    use crate::family::TransportFamily;

    fn loopback() -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, 0))
    }

    #[test]
    fn server_socket_reports_bound_address() {
        let server = open_server_socket(TransportFamily::Tcp).unwrap();
        server.bind(loopback()).unwrap();
        let addr = server.local_addr().unwrap();
        assert_eq!(addr.ip(), Ipv4Addr::LOCALHOST);
        assert_ne!(addr.port(), 0);
    }

    #[test]
    fn stream_socket_connects_to_std_listener() {
        let listener = TcpListener::bind(loopback()).unwrap();
        let addr = listener.local_addr().unwrap();

        let client = open_socket(TransportFamily::Tcp).unwrap();
        let handle = thread::spawn(move || {
            let mut stream = client.connect(addr).unwrap();
            stream.write_all(b"ping").unwrap();
        });

        let (mut accepted, _) = listener.accept().unwrap();
        let mut buf = [0u8; 4];
        accepted.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ping");
        handle.join().unwrap();
    }

    #[test]
    fn server_socket_accepts_like_std() {
        let server = open_server_socket(TransportFamily::Tcp).unwrap();
        server.bind(loopback()).unwrap();
        let addr = server.local_addr().unwrap();
        let listener = server.listen(128).unwrap();

        let handle = thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream.write_all(b"hello").unwrap();
            let mut buf = [0u8; 5];
            stream.read_exact(&mut buf).unwrap();
            buf
        });

        let (mut accepted, peer) = listener.accept().unwrap();
        assert_eq!(peer.ip(), Ipv4Addr::LOCALHOST);
        let mut buf = [0u8; 5];
        accepted.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");
        accepted.write_all(&buf).unwrap();

        assert_eq!(&handle.join().unwrap(), b"hello");
    }

    #[test]
    fn connect_to_closed_port_reports_refused() {
        // Bind then drop to obtain a port nothing is listening on.
        let listener = TcpListener::bind(loopback()).unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = open_socket(TransportFamily::Tcp).unwrap();
        let err = client.connect(addr).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionRefused);
    }
}
