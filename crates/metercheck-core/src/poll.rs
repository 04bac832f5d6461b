use crate::source::FrameSource;
use metercheck_decode::{classify, Classification, FRAME_SIZE};
use std::io::{self, Write};

/// Totals for one run of the poll loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub frames: u64,
    pub pass: u64,
    pub fail: u64,
    pub error: u64,
    /// Set when the source failed and polling stopped.
    pub fatal: Option<String>,
}

impl PollSummary {
    fn record(&mut self, result: Classification) {
        self.frames += 1;
        match result {
            Classification::Pass => self.pass += 1,
            Classification::Fail => self.fail += 1,
            Classification::Error => self.error += 1,
        }
    }
}

/// Reads frames one at a time and writes one classification line each.
pub struct PollLoop<S> {
    source: S,
    frame_size: usize,
    limit: Option<u64>,
}

impl<S: FrameSource> PollLoop<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            frame_size: FRAME_SIZE,
            limit: None,
        }
    }

    pub fn frame_size(mut self, frame_size: usize) -> Self {
        self.frame_size = frame_size;
        self
    }

    /// Stop after this many frames.
    pub fn limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    /// Polls until the source ends, fails, or the limit is reached.
    ///
    /// A source failure writes a final `Error` line and is reported in
    /// [`PollSummary::fatal`]; only failures writing to `out` return `Err`.
    pub fn run<W: Write>(&mut self, out: &mut W) -> io::Result<PollSummary> {
        let mut summary = PollSummary::default();

        while self.limit.map_or(true, |limit| summary.frames < limit) {
            let frame = match self.source.read_frame(self.frame_size) {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    log::info!("source ended after {} frames", summary.frames);
                    break;
                }
                Err(e) => {
                    log::error!("stopping: {e}");
                    emit(out, Classification::Error)?;
                    summary.fatal = Some(e.to_string());
                    break;
                }
            };

            let result = classify(&frame);
            log::debug!("frame {}: {} bytes -> {result}", summary.frames, frame.len());
            emit(out, result)?;
            summary.record(result);
        }

        Ok(summary)
    }

    pub fn into_source(self) -> S {
        self.source
    }
}

fn emit<W: Write>(out: &mut W, result: Classification) -> io::Result<()> {
    writeln!(out, "{result}")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceError;
    use std::collections::VecDeque;

    struct Scripted {
        reads: VecDeque<Result<Option<Vec<u8>>, SourceError>>,
        requested: Vec<usize>,
    }

    impl Scripted {
        fn new(reads: Vec<Result<Option<Vec<u8>>, SourceError>>) -> Self {
            Self {
                reads: reads.into(),
                requested: Vec::new(),
            }
        }
    }

    impl FrameSource for Scripted {
        fn read_frame(&mut self, max: usize) -> Result<Option<Vec<u8>>, SourceError> {
            self.requested.push(max);
            self.reads.pop_front().unwrap_or(Ok(None))
        }
    }

    fn ok(bytes: &[u8]) -> Result<Option<Vec<u8>>, SourceError> {
        Ok(Some(bytes.to_vec()))
    }

    fn run(source: Scripted, limit: Option<u64>) -> (String, PollSummary, Scripted) {
        let mut poll = PollLoop::new(source).limit(limit);
        let mut out = Vec::new();
        let summary = poll.run(&mut out).unwrap();
        (String::from_utf8(out).unwrap(), summary, poll.into_source())
    }

    #[test]
    fn one_line_per_frame() {
        let (out, summary, source) = run(
            Scripted::new(vec![
                ok(b"00000 \x02"),
                ok(b"00123 \x02"),
                ok(b""),
                ok(b"+?000 \x02"),
            ]),
            None,
        );
        assert_eq!(out, "Pass\nFail\nError\nError\n");
        assert_eq!(summary.frames, 4);
        assert_eq!((summary.pass, summary.fail, summary.error), (1, 1, 2));
        assert!(summary.fatal.is_none());
        assert!(source.requested.iter().all(|&n| n == FRAME_SIZE));
    }

    #[test]
    fn source_failure_is_terminal() {
        let broken = io::Error::new(io::ErrorKind::BrokenPipe, "unplugged");
        let (out, summary, source) = run(
            Scripted::new(vec![ok(b"00000 \x02"), Err(broken.into()), ok(b"00000 \x02")]),
            None,
        );
        assert_eq!(out, "Pass\nError\n");
        assert_eq!(summary.frames, 1);
        assert!(summary.fatal.unwrap().contains("unplugged"));
        assert_eq!(source.reads.len(), 1);
    }

    #[test]
    fn stops_at_limit() {
        let (out, summary, source) = run(
            Scripted::new(vec![ok(b"00001 \x02"), ok(b"00001 \x02"), ok(b"00001 \x02")]),
            Some(2),
        );
        assert_eq!(out, "Fail\nFail\n");
        assert_eq!(summary.fail, 2);
        assert_eq!(source.requested.len(), 2);
    }

    #[test]
    fn zero_limit_reads_nothing() {
        let (out, summary, source) = run(Scripted::new(vec![ok(b"00000 \x02")]), Some(0));
        assert!(out.is_empty());
        assert_eq!(summary, PollSummary::default());
        assert!(source.requested.is_empty());
    }

    #[test]
    fn custom_frame_size_is_requested() {
        let mut poll = PollLoop::new(Scripted::new(vec![ok(b"00000 \x02")])).frame_size(7);
        poll.run(&mut io::sink()).unwrap();
        assert_eq!(poll.into_source().requested, vec![7, 7]);
    }
}
