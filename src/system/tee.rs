// src/system/tee.rs

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

/// A writer that forwards every write to each of its sinks, in order.
///
/// Each sink receives the whole buffer (`write_all`), so a short write on one sink
/// never desynchronizes the others. The first failing sink aborts the write.
pub struct Tee {
    sinks: Vec<Box<dyn Write + Send>>,
}

impl Tee {
    /// A tee without sinks.
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Adds a sink, builder style.
    pub fn with<W: Write + Send + 'static>(mut self, sink: W) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Number of sinks written to.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// `true` when there is no sink.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl Default for Tee {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Tee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tee").field("sinks", &self.sinks.len()).finish()
    }
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for sink in &mut self.sinks {
            sink.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        for sink in &mut self.sinks {
            sink.flush()?;
        }
        Ok(())
    }
}

/// An in-memory byte buffer with cheap shared handles.
///
/// Clones write into the same storage, which lets one buffer sit behind several tees
/// (the "combined" buffer of split capture) and still be read once the writers are done.
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    /// An empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        // A poisoned buffer still holds every byte written before the panic.
        self.bytes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The captured bytes decoded as UTF-8, invalid sequences replaced.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    /// Number of captured bytes.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// `true` when nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
