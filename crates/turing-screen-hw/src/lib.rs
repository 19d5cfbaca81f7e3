//! Turing Smart Screen Hardware Library
//!
//! Protocol and codec core for the 3.5" serial-attached Turing Smart Screen.
//! Two incompatible command sets exist in the wild; both are driven through
//! the [`TuringDisplay`] capability trait.

pub mod error;
pub mod lcd;
pub mod orientation;
pub mod transport;

pub use error::{Error, Result};
pub use lcd::{
    AnyDisplay, ByteOrder, DisplayState, DisplayVariant, Rgb, TimingGate, TuringDisplay,
    Variant1Display, Variant2Display,
};
pub use orientation::{Inversion, Orientation, Region};
pub use transport::{open_serial, SerialSettings, SerialTransport, Transport};

/// Native panel dimensions (portrait).
pub const LCD_WIDTH: u16 = 320;
pub const LCD_HEIGHT: u16 = 480;
