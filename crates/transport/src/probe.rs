use std::io::{self, Read};
use std::sync::Arc;

use logging::trace_probe;

use crate::outcome::ProbeOutcome;
use crate::pool::BufferPool;

/// Result of one speculative read together with the captured bytes.
#[derive(Debug)]
pub(crate) struct Probe {
    pub(crate) outcome: ProbeOutcome,
    pub(crate) bytes: Vec<u8>,
}

impl Probe {
    const fn empty(outcome: ProbeOutcome) -> Self {
        Self {
            outcome,
            bytes: Vec::new(),
        }
    }
}

/// Performs one bounded, non-blocking read of at most `capacity` bytes.
///
/// `Interrupted` is retried; every other error is returned to the caller.
/// Captured bytes are detached from the pool, empty probes return their
/// buffer to it.
pub(crate) fn probe_once<R: Read + ?Sized>(
    reader: &mut R,
    pool: &Arc<BufferPool>,
    capacity: usize,
) -> io::Result<Probe> {
    let mut buffer = BufferPool::acquire(pool);
    let limit = capacity.min(buffer.len());

    loop {
        match reader.read(&mut buffer[..limit]) {
            Ok(0) => {
                trace_probe!("probe observed end of stream");
                return Ok(Probe::empty(ProbeOutcome::Eof));
            }
            Ok(read) => {
                trace_probe!("probe captured {} bytes", read);
                return Ok(Probe {
                    outcome: ProbeOutcome::Captured(read),
                    bytes: buffer.detach(read),
                });
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                trace_probe!("probe found no data");
                return Ok(Probe::empty(ProbeOutcome::WouldBlock));
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                trace_probe!("probe failed: {}", err);
                return Err(err);
            }
        }
    }
}
