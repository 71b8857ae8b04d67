use std::io::{self, BufRead};

/// Front end delivering one console line per call; `None` is end of input.
pub trait LineSource {
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// Reads lines from any buffered reader, typically locked stdin.
pub struct StdinLines<R: BufRead> {
    reader: R,
}

impl<R: BufRead> StdinLines<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for StdinLines<R> {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut raw = Vec::new();
        if self.reader.read_until(b'\n', &mut raw)? == 0 {
            return Ok(None);
        }
        // Bytes that are not UTF-8 become U+FFFD; the compiler reports them.
        let line = String::from_utf8_lossy(&raw);
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }
}
