//! A bounded pipe turning a push-style body producer into a pull-style reader.
//!
//! [`PipeReader::spawn`] starts the producer on a dedicated worker thread. The producer writes
//! into a [`PipeWriter`] backed by a fixed 8 KiB ring buffer; writes block while the buffer is
//! full and reads block while it is empty, so at most [`BUFFER_SIZE`] bytes of the payload are
//! held in memory at any time.
//!
//! Closing the reader never interrupts the producer. [`PipeReader::close`] drains whatever the
//! producer still writes, joins the worker and then reports the producer's error, if any. A
//! producer that never returns therefore blocks `close` forever.

use crate::ensure;
use std::io::{self, Read, Write};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use tracing::{error, trace};

/// Capacity of the pipe's ring buffer.
pub const BUFFER_SIZE: usize = 8192;

const DRAIN_CHUNK: usize = 512;

struct State {
    buffer: Box<[u8]>,
    // monotonically increasing cursors, `write - read` is always in `0..=BUFFER_SIZE`
    read: u64,
    write: u64,
    open: bool,
}

impl State {
    #[inline]
    fn available(&self) -> usize {
        (self.write - self.read) as usize
    }

    #[inline]
    fn free(&self) -> usize {
        BUFFER_SIZE - self.available()
    }

    #[inline]
    fn index(cursor: u64) -> usize {
        (cursor % BUFFER_SIZE as u64) as usize
    }
}

/// The buffer shared between exactly two threads: the producer and the consumer.
struct Collector {
    state: Mutex<State>,
    signal: Condvar,
}

impl Collector {
    fn new() -> Self {
        let state = State { buffer: vec![0; BUFFER_SIZE].into_boxed_slice(), read: 0, write: 0, open: true };
        Self { state: Mutex::new(state), signal: Condvar::new() }
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, State>> {
        self.state.lock().map_err(|_poisoned| io::Error::other("pipe lock poisoned"))
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, State>) -> io::Result<MutexGuard<'a, State>> {
        self.signal.wait(guard).map_err(|_poisoned| io::Error::other("pipe lock poisoned"))
    }

    /// Returns `Ok(0)` once the pipe is closed and fully drained.
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let mut state = self.lock()?;
        while state.available() == 0 {
            if !state.open {
                return Ok(0);
            }
            state = self.wait(state)?;
        }

        let count = state.available().min(buf.len());
        let start = State::index(state.read);
        let first = count.min(BUFFER_SIZE - start);
        buf[..first].copy_from_slice(&state.buffer[start..start + first]);
        buf[first..count].copy_from_slice(&state.buffer[..count - first]);
        state.read += count as u64;

        self.signal.notify_all();
        Ok(count)
    }

    fn write_some(&self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let mut state = self.lock()?;
        ensure!(state.open, io::Error::new(io::ErrorKind::BrokenPipe, "stream closed"));

        while state.free() == 0 {
            state = self.wait(state)?;
            ensure!(state.open, io::Error::new(io::ErrorKind::BrokenPipe, "stream closed"));
        }

        let count = state.free().min(buf.len());
        let start = State::index(state.write);
        let first = count.min(BUFFER_SIZE - start);
        state.buffer[start..start + first].copy_from_slice(&buf[..first]);
        state.buffer[..count - first].copy_from_slice(&buf[first..count]);
        state.write += count as u64;

        self.signal.notify_all();
        Ok(count)
    }

    fn close(&self) {
        // the state is plain data, a poisoned lock still holds consistent cursors
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.open = false;
        self.signal.notify_all();
    }
}

/// The sink handed to a body producer.
pub struct PipeWriter {
    collector: Arc<Collector>,
}

impl Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.collector.write_some(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for PipeWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeWriter").finish_non_exhaustive()
    }
}

/// Closes the collector when the producer returns or unwinds.
struct CloseGuard(Arc<Collector>);

impl Drop for CloseGuard {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// The consumer side of the pipe.
pub struct PipeReader {
    collector: Arc<Collector>,
    worker: Option<JoinHandle<io::Result<()>>>,
}

impl PipeReader {
    /// Starts `producer` on a worker thread and returns the reader for its output.
    pub fn spawn<F>(producer: F) -> io::Result<Self>
    where
        F: FnOnce(&mut PipeWriter) -> io::Result<()> + Send + 'static,
    {
        let collector = Arc::new(Collector::new());
        let mut writer = PipeWriter { collector: Arc::clone(&collector) };
        let guard = CloseGuard(Arc::clone(&collector));

        let worker = thread::Builder::new().name("body-pipe".into()).spawn(move || {
            let _guard = guard;
            let result = producer(&mut writer);
            if let Err(e) = &result {
                trace!(cause = %e, "body producer failed");
            }
            result
        })?;

        Ok(Self { collector, worker: Some(worker) })
    }

    /// Drains the pipe, joins the worker and returns the producer's error, if it raised one.
    pub fn close(mut self) -> io::Result<()> {
        self.finish()
    }

    fn finish(&mut self) -> io::Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        let mut drain = [0u8; DRAIN_CHUNK];
        let drained = loop {
            match self.collector.read(&mut drain) {
                Ok(0) => break Ok(()),
                Ok(_) => {}
                Err(e) => break Err(e),
            }
        };

        let produced = match worker.join() {
            Ok(result) => result,
            Err(_panic) => Err(io::Error::other("body producer panicked")),
        };

        produced.and(drained)
    }
}

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.collector.read(buf)
    }
}

impl Drop for PipeReader {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            error!(cause = %e, "body pipe dropped without close, producer error discarded");
        }
    }
}

impl std::fmt::Debug for PipeReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeReader").field("joined", &self.worker.is_none()).finish_non_exhaustive()
    }
}
