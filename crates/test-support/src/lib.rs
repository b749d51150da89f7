//! Shared fixtures for negotiation tests.
//!
//! [`ScriptedConnection`] replays a script of wire events and records how the
//! engine drove it, [`RecordingExtension`] stands in for the TLS stack's
//! negotiation hook, and [`CompletionSlot`] captures every result delivered to
//! a completion callback.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use protocol::{Capability, NextProtocolProvider, ProtocolName, ProtocolSelector};
use transport::{ConnectTarget, NegotiationExtension, SecureConnection, SecureTransport};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ==== Scripted connection ====

/// One scripted response to a read call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Deliver these bytes, split across reads if the caller's buffer is short.
    Data(Vec<u8>),
    /// Report `WouldBlock` once.
    Pending,
    /// Report end of stream on this and every later read.
    Eof,
    /// Fail the read with this error kind.
    Fail(io::ErrorKind),
}

/// Something the engine did to the connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WireEvent {
    /// `start_handshake` was called.
    HandshakeStarted,
    /// Readiness notifications were enabled.
    ReadsResumed,
    /// Readiness notifications were disabled.
    ReadsSuspended,
    /// A read returned this many bytes.
    Read(usize),
}

#[derive(Debug, Default)]
struct Script {
    steps: VecDeque<Step>,
    events: Vec<WireEvent>,
    written: Vec<u8>,
    handshake_error: Option<io::ErrorKind>,
    reads_enabled: bool,
}

type ReadHook = Box<dyn FnOnce() + Send>;

/// In-memory secure connection driven by a script.
///
/// Clones share state, so a test can keep one handle while the engine owns
/// another. Reads past the end of the script report `WouldBlock`.
#[derive(Clone, Default)]
pub struct ScriptedConnection {
    script: Arc<Mutex<Script>>,
    after_read: Arc<Mutex<Option<ReadHook>>>,
}

impl fmt::Debug for ScriptedConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedConnection")
            .field("script", &*lock(&self.script))
            .field("after_read", &lock(&self.after_read).is_some())
            .finish()
    }
}

impl ScriptedConnection {
    /// Creates a connection with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a connection that replays `steps` in order.
    #[must_use]
    pub fn with_steps(steps: impl IntoIterator<Item = Step>) -> Self {
        let connection = Self::new();
        lock(&connection.script).steps.extend(steps);
        connection
    }

    /// Appends a step to the script.
    pub fn push(&self, step: Step) {
        lock(&self.script).steps.push_back(step);
    }

    /// Appends a data step.
    pub fn push_data(&self, bytes: impl Into<Vec<u8>>) {
        self.push(Step::Data(bytes.into()));
    }

    /// Runs `hook` once, right after the next read that returns data.
    ///
    /// Models a handshake callback landing between a probe read and the
    /// engine's re-check of the outcome.
    pub fn after_next_read(&self, hook: impl FnOnce() + Send + 'static) {
        *lock(&self.after_read) = Some(Box::new(hook));
    }

    /// Makes `start_handshake` fail with `kind`.
    pub fn fail_handshake(&self, kind: io::ErrorKind) {
        lock(&self.script).handshake_error = Some(kind);
    }

    /// Everything the engine did so far, in order.
    #[must_use]
    pub fn events(&self) -> Vec<WireEvent> {
        lock(&self.script).events.clone()
    }

    /// Total bytes handed out by reads.
    #[must_use]
    pub fn bytes_read(&self) -> usize {
        lock(&self.script)
            .events
            .iter()
            .map(|event| match event {
                WireEvent::Read(n) => *n,
                _ => 0,
            })
            .sum()
    }

    /// Bytes written to the connection.
    #[must_use]
    pub fn written(&self) -> Vec<u8> {
        lock(&self.script).written.clone()
    }

    /// Whether readiness notifications are currently enabled.
    #[must_use]
    pub fn reads_enabled(&self) -> bool {
        lock(&self.script).reads_enabled
    }

    /// Number of script steps not yet consumed.
    #[must_use]
    pub fn remaining_steps(&self) -> usize {
        lock(&self.script).steps.len()
    }
}

impl Read for ScriptedConnection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.read_step(buf)?;
        if read > 0 {
            let hook = lock(&self.after_read).take();
            if let Some(hook) = hook {
                hook();
            }
        }
        Ok(read)
    }
}

impl ScriptedConnection {
    fn read_step(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut script = lock(&self.script);
        match script.steps.pop_front() {
            None | Some(Step::Pending) => Err(io::ErrorKind::WouldBlock.into()),
            Some(Step::Eof) => {
                script.steps.push_front(Step::Eof);
                script.events.push(WireEvent::Read(0));
                Ok(0)
            }
            Some(Step::Fail(kind)) => Err(kind.into()),
            Some(Step::Data(mut bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    script.steps.push_front(Step::Data(bytes.split_off(n)));
                }
                script.events.push(WireEvent::Read(n));
                Ok(n)
            }
        }
    }
}

impl Write for ScriptedConnection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.script).written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SecureConnection for ScriptedConnection {
    fn start_handshake(&mut self) -> io::Result<()> {
        let mut script = lock(&self.script);
        script.events.push(WireEvent::HandshakeStarted);
        match script.handshake_error {
            Some(kind) => Err(io::Error::new(kind, "scripted handshake failure")),
            None => Ok(()),
        }
    }

    fn suspend_reads(&mut self) {
        let mut script = lock(&self.script);
        script.reads_enabled = false;
        script.events.push(WireEvent::ReadsSuspended);
    }

    fn resume_reads(&mut self) {
        let mut script = lock(&self.script);
        script.reads_enabled = true;
        script.events.push(WireEvent::ReadsResumed);
    }
}

// ==== Negotiation extension ====

/// Negotiation hook that keeps the attached selector for the test to drive.
#[derive(Debug)]
pub struct RecordingExtension {
    capability: Capability,
    attach_error: Option<io::ErrorKind>,
    selector: Mutex<Option<ProtocolSelector>>,
    attach_calls: AtomicUsize,
}

impl RecordingExtension {
    /// An available extension whose attach succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            capability: Capability::Available,
            attach_error: None,
            selector: Mutex::new(None),
            attach_calls: AtomicUsize::new(0),
        }
    }

    /// An extension reporting [`Capability::Unavailable`].
    #[must_use]
    pub fn unavailable() -> Self {
        let mut extension = Self::new();
        extension.capability = Capability::Unavailable;
        extension
    }

    /// An extension whose attach fails with `kind`.
    #[must_use]
    pub fn failing_attach(kind: io::ErrorKind) -> Self {
        let mut extension = Self::new();
        extension.attach_error = Some(kind);
        extension
    }

    /// The attached selector, if attach succeeded.
    #[must_use]
    pub fn selector(&self) -> Option<ProtocolSelector> {
        lock(&self.selector).clone()
    }

    /// Fires the select callback as the TLS stack would with `offered`.
    ///
    /// Returns the announced protocol, or `None` when nothing is attached.
    pub fn select(&self, offered: &[&str]) -> Option<ProtocolName> {
        self.selector()
            .map(|selector| selector.select_protocol(offered))
    }

    /// Fires the unsupported callback. Returns `false` when nothing is attached.
    pub fn unsupported(&self) -> bool {
        self.selector()
            .map(|selector| selector.unsupported())
            .is_some()
    }

    /// Number of attach calls.
    #[must_use]
    pub fn attach_calls(&self) -> usize {
        self.attach_calls.load(Ordering::SeqCst)
    }
}

impl Default for RecordingExtension {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> NegotiationExtension<C> for RecordingExtension {
    fn capability(&self) -> Capability {
        self.capability
    }

    fn attach(&self, _connection: &mut C, selector: ProtocolSelector) -> io::Result<()> {
        self.attach_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(kind) = self.attach_error {
            return Err(io::Error::new(kind, "scripted attach failure"));
        }
        *lock(&self.selector) = Some(selector);
        Ok(())
    }
}

// ==== Secure transport ====

/// Transport that hands out one prepared connection.
#[derive(Debug)]
pub struct ScriptedTransport {
    connection: Mutex<Option<io::Result<ScriptedConnection>>>,
    opened: Mutex<Vec<ConnectTarget>>,
}

impl ScriptedTransport {
    /// A transport whose first open returns `connection`.
    #[must_use]
    pub fn new(connection: ScriptedConnection) -> Self {
        Self {
            connection: Mutex::new(Some(Ok(connection))),
            opened: Mutex::new(Vec::new()),
        }
    }

    /// A transport whose open fails with `kind`.
    #[must_use]
    pub fn failing(kind: io::ErrorKind) -> Self {
        Self {
            connection: Mutex::new(Some(Err(io::Error::new(kind, "scripted open failure")))),
            opened: Mutex::new(Vec::new()),
        }
    }

    /// Targets passed to `open`, in order.
    #[must_use]
    pub fn opened(&self) -> Vec<ConnectTarget> {
        lock(&self.opened).clone()
    }
}

impl SecureTransport for ScriptedTransport {
    type Connection = ScriptedConnection;

    fn open(&self, target: &ConnectTarget) -> io::Result<Self::Connection> {
        lock(&self.opened).push(target.clone());
        lock(&self.connection)
            .take()
            .unwrap_or_else(|| Err(io::Error::other("scripted transport already opened")))
    }
}

// ==== Completion capture ====

/// Collects the values passed to completion callbacks.
#[derive(Debug)]
pub struct CompletionSlot<T> {
    results: Arc<Mutex<Vec<T>>>,
}

impl<T> CompletionSlot<T> {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            results: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A completion callback that records into this slot.
    pub fn callback(&self) -> impl FnOnce(T) + use<T> {
        let results = Arc::clone(&self.results);
        move |value| lock(&results).push(value)
    }

    /// Number of values delivered so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        lock(&self.results).len()
    }

    /// Removes and returns the only delivered value.
    ///
    /// # Panics
    ///
    /// Panics unless exactly one value was delivered.
    #[must_use]
    pub fn take_single(&self) -> T {
        let mut results = lock(&self.results);
        assert_eq!(results.len(), 1, "expected exactly one completion");
        results.remove(0)
    }
}

impl<T> Default for CompletionSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for CompletionSlot<T> {
    fn clone(&self) -> Self {
        Self {
            results: Arc::clone(&self.results),
        }
    }
}
