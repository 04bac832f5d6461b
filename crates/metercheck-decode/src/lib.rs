//! Decoding for the MT-1820 multimeter's serial frames.

pub mod frame;
pub mod units;

pub use frame::{classify, decode, Classification, DecodeError, DecodedReading, FRAME_SIZE};
pub use units::{lookup_excitation, lookup_unit, Excitation, Quantity, UnitInfo};
