//! Kernel transport families and platform capability detection.
//!
//! The set of families a kernel supports cannot change while the process
//! runs, so detection happens once, lazily, and the result is cached for
//! the process lifetime.

use std::fmt;
use std::sync::OnceLock;

use rustix::io::Errno;
use rustix::net::{AddressFamily, SocketFlags, SocketType};
use serde::{Deserialize, Serialize};

use crate::trace::debug;

/// Raw address family registered by the OFED Sockets Direct Protocol
/// module. Not part of the portable sysroot headers.
#[cfg(target_os = "linux")]
const AF_INET_SDP: u16 = 27;

/// A kernel-level stream transport, selected at socket creation time by
/// its address-family tag.
///
/// Everything past descriptor allocation (connect, accept, read, write)
/// is identical across families; the kernel routes the stream over the
/// transport the tag named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportFamily {
    /// Ordinary IPv4 internet stream sockets. Always available; the
    /// fallback family when an alternate transport is absent.
    Tcp,
    /// IPv6 internet stream sockets. Absent on kernels built without
    /// IPv6 support.
    Tcp6,
    /// Sockets Direct Protocol over InfiniBand. Present only when the
    /// host kernel loaded the SDP module; never available off Linux.
    Sdp,
}

impl TransportFamily {
    /// Every family this crate knows how to request.
    pub const ALL: [Self; 3] = [Self::Tcp, Self::Tcp6, Self::Sdp];

    /// Whether the running platform advertises this family.
    ///
    /// The first call per process probes the kernel (one throwaway
    /// `socket(2)` per non-default family, closed immediately); later
    /// calls hit the cached result. Never panics on absent families.
    #[must_use]
    pub fn is_supported(self) -> bool {
        let caps = capabilities();
        match self {
            Self::Tcp => true,
            Self::Tcp6 => caps.tcp6,
            Self::Sdp => caps.sdp,
        }
    }

    /// The families the running platform supports, in [`ALL`](Self::ALL)
    /// order. Always yields at least [`Tcp`](Self::Tcp).
    pub fn supported() -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(|family| family.is_supported())
    }

    /// The address-family tag handed to `socket(2)`.
    ///
    /// Callers must gate on [`is_supported`](Self::is_supported) first;
    /// for families the platform cannot express this returns `UNSPEC`,
    /// which the factory never lets reach the kernel.
    pub(crate) fn address_family(self) -> AddressFamily {
        match self {
            Self::Tcp => AddressFamily::INET,
            Self::Tcp6 => AddressFamily::INET6,
            #[cfg(target_os = "linux")]
            Self::Sdp => AddressFamily::from_raw(AF_INET_SDP),
            #[cfg(not(target_os = "linux"))]
            Self::Sdp => AddressFamily::UNSPEC,
        }
    }
}

impl fmt::Display for TransportFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tcp => "tcp",
            Self::Tcp6 => "tcp6",
            Self::Sdp => "sdp",
        };
        write!(f, "{name}")
    }
}

/// Cached per-process capability probe results.
struct Capabilities {
    tcp6: bool,
    sdp: bool,
}

fn capabilities() -> &'static Capabilities {
    static CAPS: OnceLock<Capabilities> = OnceLock::new();
    CAPS.get_or_init(|| {
        let caps = Capabilities {
            tcp6: probe(AddressFamily::INET6),
            sdp: probe_sdp(),
        };
        debug!(tcp6 = caps.tcp6, sdp = caps.sdp, "probed transport families");
        caps
    })
}

/// Asks the kernel for a throwaway stream socket in `family` and closes
/// it immediately. Family-not-implemented errnos mean the family is
/// absent; any other failure means it exists and the per-call open path
/// will report the real error.
fn probe(family: AddressFamily) -> bool {
    match rustix::net::socket_with(family, SocketType::STREAM, SocketFlags::CLOEXEC, None) {
        Ok(fd) => {
            drop(fd);
            true
        }
        Err(Errno::AFNOSUPPORT | Errno::PROTONOSUPPORT | Errno::INVAL) => false,
        Err(_) => true,
    }
}

#[cfg(target_os = "linux")]
fn probe_sdp() -> bool {
    probe(AddressFamily::from_raw(AF_INET_SDP))
}

/// SDP only ever existed as a Linux kernel module; skip the syscall
/// entirely elsewhere.
#[cfg(not(target_os = "linux"))]
fn probe_sdp() -> bool {
    false
}
