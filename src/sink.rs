use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared destination for fully rendered records.
///
/// Every handler derived from the same root writes through one `Sink`. The
/// lock is held only for the final write of an already assembled record,
/// so renderers never wait on each other while formatting.
pub struct Sink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl Sink {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Sink {
            out: Mutex::new(Box::new(writer)),
        }
    }

    /// Write one record's bytes without interleaving with other records.
    ///
    /// **Returns**
    /// - `Ok(())` once the bytes were written and flushed.
    /// - `Err(..)` with the writer's error, unchanged. Nothing is retried.
    pub fn write_record(&self, bytes: &[u8]) -> io::Result<()> {
        let mut out = self.lock();
        out.write_all(bytes)?;
        out.flush()
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        // A writer that panicked mid-record leaves a torn line at worst.
        self.out.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink").finish_non_exhaustive()
    }
}

/// In-memory writer whose clones share one byte vector.
///
/// Useful for tests and for embedding rendered output elsewhere.
#[derive(Clone, Default, Debug)]
pub struct MemoryWriter {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    /// Drain everything written so far.
    pub fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writes_reach_the_shared_buffer() {
        let memory = MemoryWriter::new();
        let sink = Sink::new(memory.clone());
        sink.write_record(b"one\n").unwrap();
        sink.write_record(b"two\n").unwrap();
        assert_eq!(memory.contents(), "one\ntwo\n");
        assert_eq!(memory.take(), b"one\ntwo\n".to_vec());
        assert!(memory.is_empty());
    }

    #[test]
    fn write_errors_propagate_unchanged() {
        let sink = Sink::new(FailingWriter);
        let err = sink.write_record(b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(err.to_string(), "closed");
    }
}
