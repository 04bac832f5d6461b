//! Frames recorded as hex text, one per line.
//!
//! ```text
//! # zero reading, decimal point after two digits
//! 30 30 30 30 30 20 02
//! -
//! 2b3f
//! ```
//!
//! `#` starts a comment and a lone `-` stands for a read that timed out
//! with no data.

use crate::source::{FrameSource, SourceError};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

pub struct ReplaySource<R> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R: BufRead> ReplaySource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl ReplaySource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        log::info!("replaying frames from {}", path.display());
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> FrameSource for ReplaySource<R> {
    fn read_frame(&mut self, max: usize) -> Result<Option<Vec<u8>>, SourceError> {
        for line in self.lines.by_ref() {
            let line = line?;
            self.line_no += 1;

            let text = line.split('#').next().unwrap_or_default().trim();
            if text.is_empty() {
                continue;
            }
            if text == "-" {
                return Ok(Some(Vec::new()));
            }

            let compact: String = text.split_whitespace().collect();
            let mut bytes = hex::decode(compact).map_err(|e| SourceError::Replay {
                line: self.line_no,
                reason: e.to_string(),
            })?;
            bytes.truncate(max);
            return Ok(Some(bytes));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn source(text: &str) -> ReplaySource<Cursor<Vec<u8>>> {
        ReplaySource::new(Cursor::new(text.as_bytes().to_vec()))
    }

    #[test]
    fn reads_frames_in_order() {
        let mut src = source("# header\n3030303030 2002\n\n-\n2B3F # fault\n");
        assert_eq!(src.read_frame(32).unwrap(), Some(b"00000 \x02".to_vec()));
        assert_eq!(src.read_frame(32).unwrap(), Some(Vec::new()));
        assert_eq!(src.read_frame(32).unwrap(), Some(b"+?".to_vec()));
        assert_eq!(src.read_frame(32).unwrap(), None);
        assert_eq!(src.read_frame(32).unwrap(), None);
    }

    #[test]
    fn truncates_to_requested_size() {
        let mut src = source("00112233\n");
        assert_eq!(src.read_frame(2).unwrap(), Some(vec![0x00, 0x11]));
    }

    #[test]
    fn bad_hex_reports_line() {
        let mut src = source("# ok\n30\nzz\n");
        assert!(src.read_frame(32).unwrap().is_some());
        match src.read_frame(32) {
            Err(SourceError::Replay { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ReplaySource::open(Path::new("/no/such/replay.hex")).err();
        assert!(matches!(err, Some(SourceError::Io(_))));
    }
}
