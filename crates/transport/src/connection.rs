//! Seams to the encrypted transport and its negotiation extension.

use std::io::{self, Read};

use protocol::{Capability, ProtocolSelector};

/// An encrypted, non-blocking connection with readiness control.
///
/// `read` must never block: when no application data is available it returns
/// [`io::ErrorKind::WouldBlock`], and `Ok(0)` means the peer closed the
/// stream.
pub trait SecureConnection: Read {
    /// Starts the encryption handshake.
    fn start_handshake(&mut self) -> io::Result<()>;

    /// Stops delivering read-readiness events.
    fn suspend_reads(&mut self);

    /// Resumes delivering read-readiness events.
    fn resume_reads(&mut self);
}

impl<C: SecureConnection + ?Sized> SecureConnection for &mut C {
    fn start_handshake(&mut self) -> io::Result<()> {
        (**self).start_handshake()
    }

    fn suspend_reads(&mut self) {
        (**self).suspend_reads();
    }

    fn resume_reads(&mut self) {
        (**self).resume_reads();
    }
}

impl<C: SecureConnection + ?Sized> SecureConnection for Box<C> {
    fn start_handshake(&mut self) -> io::Result<()> {
        (**self).start_handshake()
    }

    fn suspend_reads(&mut self) {
        (**self).suspend_reads();
    }

    fn resume_reads(&mut self) {
        (**self).resume_reads();
    }
}

/// Binding between a connection's handshake and the protocol negotiation
/// extension.
pub trait NegotiationExtension<C> {
    /// Reports whether the extension is usable in this process.
    fn capability(&self) -> Capability;

    /// Installs `selector` into `connection`'s handshake.
    ///
    /// The extension keeps the selector and invokes its callbacks while the
    /// handshake runs, possibly on another thread.
    fn attach(&self, connection: &mut C, selector: ProtocolSelector) -> io::Result<()>;
}

impl<C, E: NegotiationExtension<C> + ?Sized> NegotiationExtension<C> for &E {
    fn capability(&self) -> Capability {
        (**self).capability()
    }

    fn attach(&self, connection: &mut C, selector: ProtocolSelector) -> io::Result<()> {
        (**self).attach(connection, selector)
    }
}
