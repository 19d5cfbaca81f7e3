//! LCD display module.
//!
//! Provides control over the 320x480 RGB565 Turing Smart Screen over a
//! serial byte stream.

mod any;
mod device;
mod timing;
mod variant1;
mod variant2;

pub mod pixel;
pub mod protocol;

pub use any::AnyDisplay;
pub use device::{DisplayState, DisplayVariant, TuringDisplay, FLUSH_PIXELS};
pub use pixel::{pack, unpack, ByteOrder, Rgb};
pub use timing::{TimingGate, INTER_BITMAP_DELAY};
pub use variant1::Variant1Display;
pub use variant2::{handshake, Variant2Display};
