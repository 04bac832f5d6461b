//! Serial plumbing: frame sources and the poll loop.

pub mod poll;
pub mod replay;
pub mod serial_service;
pub mod source;

pub use poll::{PollLoop, PollSummary};
pub use replay::ReplaySource;
pub use serial_service::{PortInfo, PortKind, SerialConfig, SerialSource, UsbDetails};
pub use source::{FrameSource, SourceError};
