//! Error taxonomy for factory operations.

use std::io;

use rustix::io::Errno;
use thiserror::Error;

use crate::family::TransportFamily;

/// Why the factory could not produce a handle.
///
/// Every variant is terminal for the single call that produced it;
/// nothing is retried internally and nothing is downgraded. Falling back
/// to another family is the caller's decision.
#[derive(Debug, Error)]
pub enum OpenError {
    /// The platform does not implement the requested transport family.
    /// Reported from the cached capability probe, before any allocation
    /// syscall is attempted.
    #[error("transport family `{0}` is not supported on this platform")]
    UnsupportedFamily(TransportFamily),
    /// The operating system refused descriptor allocation (process or
    /// system descriptor limits, kernel buffer exhaustion).
    #[error("descriptor allocation refused: {0}")]
    ResourceExhausted(#[source] io::Error),
    /// The process lacks the privilege the requested family demands.
    #[error("insufficient privilege for requested transport family: {0}")]
    PermissionDenied(#[source] io::Error),
    /// Any other failure from the kernel.
    #[error("socket creation failed: {0}")]
    Io(#[from] io::Error),
}

impl OpenError {
    /// Classifies a `socket(2)` errno for `family`.
    pub(crate) fn from_errno(errno: Errno, family: TransportFamily) -> Self {
        match errno {
            Errno::AFNOSUPPORT | Errno::PROTONOSUPPORT | Errno::INVAL => {
                Self::UnsupportedFamily(family)
            }
            Errno::MFILE | Errno::NFILE | Errno::NOBUFS | Errno::NOMEM => {
                Self::ResourceExhausted(errno.into())
            }
            Errno::ACCESS | Errno::PERM => Self::PermissionDenied(errno.into()),
            _ => Self::Io(errno.into()),
        }
    }
}

impl From<OpenError> for io::Error {
    fn from(err: OpenError) -> Self {
        match err {
            OpenError::Io(inner)
            | OpenError::ResourceExhausted(inner)
            | OpenError::PermissionDenied(inner) => inner,
            unsupported @ OpenError::UnsupportedFamily(_) => {
                Self::new(io::ErrorKind::Unsupported, unsupported)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_errnos_map_to_unsupported() {
        for errno in [Errno::AFNOSUPPORT, Errno::PROTONOSUPPORT, Errno::INVAL] {
            let err = OpenError::from_errno(errno, TransportFamily::Sdp);
            assert!(matches!(
                err,
                OpenError::UnsupportedFamily(TransportFamily::Sdp)
            ));
        }
    }

    #[test]
    fn limit_errnos_map_to_resource_exhausted() {
        for errno in [Errno::MFILE, Errno::NFILE, Errno::NOBUFS, Errno::NOMEM] {
            let err = OpenError::from_errno(errno, TransportFamily::Tcp);
            assert!(matches!(err, OpenError::ResourceExhausted(_)));
        }
    }

    #[test]
    fn privilege_errnos_map_to_permission_denied() {
        for errno in [Errno::ACCESS, Errno::PERM] {
            let err = OpenError::from_errno(errno, TransportFamily::Sdp);
            assert!(matches!(err, OpenError::PermissionDenied(_)));
        }
    }

    #[test]
    fn unsupported_converts_to_io_unsupported_kind() {
        let err: io::Error = OpenError::UnsupportedFamily(TransportFamily::Sdp).into();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }

    #[test]
    fn io_conversion_preserves_inner_error() {
        let inner = io::Error::from(Errno::MFILE);
        let raw = inner.raw_os_error();
        let err: io::Error = OpenError::ResourceExhausted(inner).into();
        assert_eq!(err.raw_os_error(), raw);
    }
}
