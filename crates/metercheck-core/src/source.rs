use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("read failed: {0}")]
    Io(#[from] io::Error),

    #[error("replay line {line}: {reason}")]
    Replay { line: usize, reason: String },
}

/// Anything that hands out raw meter frames.
pub trait FrameSource {
    /// Reads up to `max` bytes.
    ///
    /// `Ok(Some(bytes))` may be shorter than `max`, or empty when nothing
    /// arrived in time. `Ok(None)` means the source has ended. An `Err`
    /// is unrecoverable.
    fn read_frame(&mut self, max: usize) -> Result<Option<Vec<u8>>, SourceError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn read_frame(&mut self, max: usize) -> Result<Option<Vec<u8>>, SourceError> {
        (**self).read_frame(max)
    }
}
