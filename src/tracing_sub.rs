use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::Level;

/// Writer handed to the fmt layer. The terminal belongs to the UI, so output
/// goes to a log file when one is configured and is discarded otherwise.
pub struct DelegatingWriter {
    inner: DelegatingInner,
}

enum DelegatingInner {
    File(Arc<Mutex<File>>),
    Sink(io::Sink),
}

impl Write for DelegatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.inner {
            DelegatingInner::File(file) => file
                .lock()
                .map_err(|_| io::Error::other("log file lock poisoned"))?
                .write(buf),
            DelegatingInner::Sink(sink) => sink.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            DelegatingInner::File(file) => file
                .lock()
                .map_err(|_| io::Error::other("log file lock poisoned"))?
                .flush(),
            DelegatingInner::Sink(sink) => sink.flush(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SubscriberMakeWriter {
    file: Option<Arc<Mutex<File>>>,
}

impl SubscriberMakeWriter {
    pub fn to_file(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Some(Arc::new(Mutex::new(file))),
        })
    }

    pub fn discard() -> Self {
        Self::default()
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SubscriberMakeWriter {
    type Writer = DelegatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        let inner = match &self.file {
            Some(file) => DelegatingInner::File(Arc::clone(file)),
            None => DelegatingInner::Sink(io::sink()),
        };
        DelegatingWriter { inner }
    }
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are no-ops.
pub fn init(log_file: Option<&Path>, level: Level) -> io::Result<()> {
    let writer = match log_file {
        Some(path) => SubscriberMakeWriter::to_file(path)?,
        None => SubscriberMakeWriter::discard(),
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_thread_names(false)
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::fmt::MakeWriter;

    #[test]
    fn file_writer_appends_to_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wm.log");
        let make = SubscriberMakeWriter::to_file(&path).unwrap();
        make.make_writer().write_all(b"first\n").unwrap();
        make.make_writer().write_all(b"second\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn discard_writer_accepts_everything() {
        let make = SubscriberMakeWriter::discard();
        assert_eq!(make.make_writer().write(b"ignored").unwrap(), 7);
    }
}
