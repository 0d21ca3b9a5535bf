//! Transport collaborator interface.
//!
//! The engine never touches a socket. A [`Transport`] delivers fully-framed
//! payloads and accepts fully-framed payloads; length-prefixing, stream
//! reassembly and any obfuscation live behind this seam.

/// What the transport reports to the engine.
#[derive(Clone, Debug, PartialEq)]
pub enum TransportEvent {
    /// The channel is ready for traffic.
    Open,
    /// One fully-framed payload arrived.
    Message(Vec<u8>),
    /// A transport or protocol-level fault.
    Error {
        /// Where the fault was detected.
        kind: TransportErrorKind,
        /// Protocol error code, e.g. 404 (bad auth key) or 429 (flood).
        code: i32,
    },
}

/// Origin of a [`TransportEvent::Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Socket-level failure (reset, refused, timeout).
    Network,
    /// The server signalled an error through the transport framing.
    Protocol,
}

/// Outbound half of the transport: best-effort frame writes.
pub trait Transport: Send {
    /// Queue one frame for sending. Delivery is best-effort; loss is
    /// recovered at the session layer through reissue on reconnect.
    fn send(&mut self, frame: &[u8]);
}

impl<F: FnMut(&[u8]) + Send> Transport for F {
    fn send(&mut self, frame: &[u8]) {
        self(frame)
    }
}
