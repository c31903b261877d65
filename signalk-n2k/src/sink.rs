//! Output sinks for produced wire lines

use std::io::Write;

/// Destination of every produced wire line ("nmea2000out")
pub trait OutputSink {
    fn emit(&mut self, line: String);
}

impl OutputSink for Vec<String> {
    fn emit(&mut self, line: String) {
        self.push(line);
    }
}

/// Writes one line per message to any writer
///
/// Write errors are logged and counted; they never stop the session.
pub struct LineWriter<W: Write> {
    writer: W,
    written: u64,
    failed: u64,
}

impl<W: Write> LineWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            written: 0,
            failed: 0,
        }
    }

    /// Lines written successfully
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Lines lost to write errors
    pub fn failed(&self) -> u64 {
        self.failed
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for LineWriter<W> {
    fn emit(&mut self, line: String) {
        let result = writeln!(self.writer, "{}", line).and_then(|_| self.writer.flush());
        match result {
            Ok(()) => self.written += 1,
            Err(e) => {
                self.failed += 1;
                log::warn!("Failed to write output line: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_writer_appends_newline() {
        let mut sink = LineWriter::new(Vec::new());
        sink.emit("a,b".to_string());
        sink.emit("c".to_string());
        assert_eq!(sink.written(), 2);
        assert_eq!(sink.into_inner(), b"a,b\nc\n".to_vec());
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_errors_are_counted() {
        let mut sink = LineWriter::new(Broken);
        sink.emit("a".to_string());
        sink.emit("b".to_string());
        assert_eq!(sink.written(), 0);
        assert_eq!(sink.failed(), 2);
    }
}
