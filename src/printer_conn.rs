use std::fs::OpenOptions;
use std::io;
use std::os::unix::io::{IntoRawFd, RawFd};
use std::path::PathBuf;

/// The printer-connection facility (spec §2, §6): "supplies a writable
/// descriptor for a named printer." Declared external/out of scope; this
/// module provides the concrete default the pipeline engine calls, plus
/// the trait boundary a test can substitute a fake behind.
pub trait PrinterConnector: Send {
    /// Returns a writable, non-negative descriptor connected to `name`.
    /// Ownership of the descriptor transfers to the caller.
    fn connect(&self, name: &str, type_name: &str) -> io::Result<RawFd>;
}

/// Default connector: each printer is a plain file under a spool
/// directory, opened for append. Adequate as the writable byte sink the
/// spec's contract requires, and trivial to inspect in tests.
pub struct SpoolFileConnector {
    spool_dir: PathBuf,
}

impl SpoolFileConnector {
    pub fn new(spool_dir: PathBuf) -> io::Result<Self> {
        std::fs::create_dir_all(&spool_dir)?;
        Ok(Self { spool_dir })
    }
}

impl PrinterConnector for SpoolFileConnector {
    fn connect(&self, name: &str, _type_name: &str) -> io::Result<RawFd> {
        let path = self.spool_dir.join(name);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(file.into_raw_fd())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_opens_file_under_spool_dir() {
        let dir = tempfile::tempdir().unwrap();
        let connector = SpoolFileConnector::new(dir.path().to_path_buf()).unwrap();
        let fd = connector.connect("alice", "pdf").unwrap();
        assert!(fd >= 0);
        unsafe { libc::close(fd) };
        assert!(dir.path().join("alice").exists());
    }
}
