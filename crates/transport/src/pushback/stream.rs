use std::fmt;
use std::io::{self, BufRead, IoSlice, IoSliceMut, Read, Write};

use logging::trace_pushback;
use thiserror::Error;

use super::storage::ReplayBuffer;
use crate::connection::SecureConnection;

/// Error returned by [`PushbackStream::push_back`].
#[derive(Debug, Error)]
pub enum PushbackError {
    /// The adapter already carries pushed-back bytes. The rejected bytes are
    /// handed back unchanged.
    #[error("push-back already installed; {} bytes rejected", .0.len())]
    AlreadyInstalled(Vec<u8>),
}

impl PushbackError {
    /// Returns the rejected bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::AlreadyInstalled(bytes) => bytes,
        }
    }
}

/// Stream adapter that replays pushed-back bytes before reading from the
/// inner stream.
///
/// Push-back is one-shot: the first non-empty [`push_back`](Self::push_back)
/// installs the bytes, and every later attempt is rejected. Writes always go
/// straight to the inner stream.
///
/// Readiness events only reflect the inner stream. A consumer that takes over
/// the adapter must drain [`replay_pending`](Self::replay_pending) bytes
/// without waiting for readiness, since the transport will not signal data it
/// has already delivered.
pub struct PushbackStream<S> {
    inner: S,
    replay: ReplayBuffer,
    installed: bool,
}

impl<S> PushbackStream<S> {
    /// Wraps `inner` without any pushed-back bytes.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            replay: ReplayBuffer::default(),
            installed: false,
        }
    }

    /// Wraps `inner` with `bytes` already pushed back.
    #[must_use]
    pub fn with_pushback(inner: S, bytes: Vec<u8>) -> Self {
        let installed = !bytes.is_empty();
        Self {
            inner,
            replay: ReplayBuffer::new(bytes),
            installed,
        }
    }

    /// Places `bytes` ahead of everything the inner stream produces next.
    ///
    /// The buffer is moved into the adapter, not copied. Pushing back an empty
    /// buffer does nothing and does not use up the one-shot.
    pub fn push_back(&mut self, bytes: Vec<u8>) -> Result<(), PushbackError> {
        if bytes.is_empty() {
            return Ok(());
        }
        if self.installed {
            return Err(PushbackError::AlreadyInstalled(bytes));
        }

        trace_pushback!("pushing back {} speculative bytes", bytes.len());
        self.replay = ReplayBuffer::new(bytes);
        self.installed = true;
        Ok(())
    }

    /// Reports whether a push-back has been installed.
    #[must_use]
    pub const fn is_installed(&self) -> bool {
        self.installed
    }

    /// Reports whether pushed-back bytes are still waiting to be read.
    #[must_use]
    pub const fn replay_pending(&self) -> bool {
        self.replay.has_remaining()
    }

    /// Number of pushed-back bytes not yet read.
    #[must_use]
    pub const fn replay_remaining(&self) -> usize {
        self.replay.remaining()
    }

    /// Borrows the unread pushed-back bytes.
    #[must_use]
    pub fn replay_slice(&self) -> &[u8] {
        self.replay.remaining_slice()
    }

    /// Returns a shared reference to the inner stream.
    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns a mutable reference to the inner stream.
    ///
    /// Reading through this reference bypasses the replay bytes.
    #[must_use]
    pub const fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Releases the adapter, discarding any unread pushed-back bytes.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Releases the adapter and returns the inner stream with the unread
    /// pushed-back bytes.
    #[must_use]
    pub fn into_parts(mut self) -> (S, Vec<u8>) {
        let pending = self.replay.take_remaining();
        (self.inner, pending)
    }

    #[cfg(feature = "async")]
    pub(crate) fn split_mut(&mut self) -> (&mut ReplayBuffer, &mut S) {
        (&mut self.replay, &mut self.inner)
    }
}

impl<S> fmt::Debug for PushbackStream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushbackStream")
            .field("installed", &self.installed)
            .field("replay_remaining", &self.replay.remaining())
            .finish_non_exhaustive()
    }
}

impl<S: Read> Read for PushbackStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let copied = self.replay.copy_into(buf);
        if copied > 0 {
            return Ok(copied);
        }

        self.inner.read(buf)
    }

    fn read_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> io::Result<usize> {
        if bufs.is_empty() {
            return Ok(0);
        }

        let copied = self.replay.copy_into_vectored(bufs);
        if copied > 0 {
            return Ok(copied);
        }

        self.inner.read_vectored(bufs)
    }
}

impl<S: BufRead> BufRead for PushbackStream<S> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.replay.has_remaining() {
            return Ok(self.replay.remaining_slice());
        }

        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        let remainder = self.replay.consume(amt);
        if remainder > 0 {
            self.inner.consume(remainder);
        }
    }
}

impl<S: Write> Write for PushbackStream<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
        self.inner.write_vectored(bufs)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<S: SecureConnection> SecureConnection for PushbackStream<S> {
    fn start_handshake(&mut self) -> io::Result<()> {
        self.inner.start_handshake()
    }

    fn suspend_reads(&mut self) {
        self.inner.suspend_reads();
    }

    fn resume_reads(&mut self) {
        self.inner.resume_reads();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn replays_pushed_back_bytes_before_inner() {
        let mut stream = PushbackStream::new(Cursor::new(b" world".to_vec()));
        stream.push_back(b"hello".to_vec()).unwrap();

        let mut out = String::new();
        stream.read_to_string(&mut out).unwrap();
        assert_eq!(out, "hello world");
    }

    #[test]
    fn second_push_back_is_rejected_and_returns_bytes() {
        let mut stream = PushbackStream::new(Cursor::new(Vec::<u8>::new()));
        stream.push_back(vec![1, 2]).unwrap();

        let err = stream.push_back(vec![3, 4]).unwrap_err();
        assert_eq!(err.into_bytes(), vec![3, 4]);
        assert_eq!(stream.replay_slice(), &[1, 2]);
    }

    #[test]
    fn push_back_is_rejected_even_after_replay_drains() {
        let mut stream = PushbackStream::with_pushback(Cursor::new(Vec::new()), vec![9]);
        let mut byte = [0u8; 1];
        stream.read_exact(&mut byte).unwrap();

        assert!(!stream.replay_pending());
        assert!(stream.push_back(vec![1]).is_err());
    }

    #[test]
    fn empty_push_back_keeps_the_one_shot() {
        let mut stream = PushbackStream::new(Cursor::new(Vec::<u8>::new()));
        stream.push_back(Vec::new()).unwrap();
        assert!(!stream.is_installed());
        stream.push_back(vec![5]).unwrap();
        assert!(stream.is_installed());
    }

    #[test]
    fn short_reads_are_served_from_replay_first() {
        let mut stream = PushbackStream::with_pushback(Cursor::new(vec![4, 5]), vec![1, 2, 3]);
        let mut two = [0u8; 2];

        assert_eq!(stream.read(&mut two).unwrap(), 2);
        assert_eq!(two, [1, 2]);
        assert_eq!(stream.read(&mut two).unwrap(), 1);
        assert_eq!(two[0], 3);
        assert_eq!(stream.read(&mut two).unwrap(), 2);
        assert_eq!(two, [4, 5]);
    }

    #[test]
    fn buf_read_spans_replay_and_inner() {
        let mut stream =
            PushbackStream::with_pushback(Cursor::new(b"two\nthree\n".to_vec()), b"one\n".to_vec());
        let lines: Vec<String> = stream.lines().map(Result::unwrap).collect();
        assert_eq!(lines, ["one", "two", "three"]);
    }

    #[test]
    fn consume_past_replay_advances_inner() {
        let mut stream = PushbackStream::with_pushback(Cursor::new(vec![3, 4, 5]), vec![1, 2]);
        stream.consume(3);
        assert_eq!(stream.fill_buf().unwrap(), &[4, 5]);
    }

    #[test]
    fn writes_bypass_the_replay_buffer() {
        let mut stream = PushbackStream::with_pushback(Cursor::new(Vec::new()), vec![1]);
        stream.write_all(b"out").unwrap();
        assert_eq!(stream.inner().get_ref(), b"out");
        assert_eq!(stream.replay_remaining(), 1);
    }

    #[test]
    fn into_parts_returns_unread_bytes() {
        let mut stream = PushbackStream::with_pushback(Cursor::new(vec![9]), vec![1, 2, 3]);
        let mut one = [0u8; 1];
        stream.read_exact(&mut one).unwrap();

        let (inner, pending) = stream.into_parts();
        assert_eq!(pending, vec![2, 3]);
        assert_eq!(inner.into_inner(), vec![9]);
    }
}
