//! Display capability interface shared by both hardware variants.

use crate::orientation::{apply_inversion, Inversion, Orientation, Region};
use crate::transport::Transport;
use crate::{Error, Result, LCD_HEIGHT, LCD_WIDTH};
use std::borrow::Cow;
use std::str::FromStr;
use std::time::Instant;
use tracing::debug;

use super::pixel::{encode_into, ByteOrder, Rgb};
use super::timing::TimingGate;

/// Pixels streamed per write: one panel row width times eight rows.
pub const FLUSH_PIXELS: usize = LCD_WIDTH as usize * 8;

/// Hardware command-set family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayVariant {
    /// The original display (6-byte frames, inverted brightness register).
    One,
    /// The "flagship" display with backlight and orientation support.
    Two,
}

impl DisplayVariant {
    pub fn name(&self) -> &'static str {
        match self {
            DisplayVariant::One => "variant 1",
            DisplayVariant::Two => "variant 2",
        }
    }
}

impl FromStr for DisplayVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "1" | "one" | "variant1" => Ok(DisplayVariant::One),
            "2" | "two" | "variant2" | "flagship" => Ok(DisplayVariant::Two),
            _ => Err(Error::InvalidVariant(s.to_string())),
        }
    }
}

impl std::fmt::Display for DisplayVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-instance device state. Only the owning driver mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayState {
    pub orientation: Orientation,
    pub inversion: Inversion,
    /// Requested brightness, remembered while the display is disabled.
    pub brightness: u8,
    pub enabled: bool,
    /// Completion time of the most recent bitmap transfer.
    pub last_bitmap: Option<Instant>,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            orientation: Orientation::Portrait,
            inversion: Inversion::None,
            brightness: 0,
            enabled: true,
            last_bitmap: None,
        }
    }
}

/// Operations every display variant offers.
///
/// Drivers are not reentrant: each call runs to completion on the owned
/// transport, and sharing a driver between threads needs external locking.
/// Nothing is retried; transport errors propagate immediately. A failure part
/// way through a region update can leave a partial image on the panel.
pub trait TuringDisplay {
    /// Hardware family of this driver.
    fn variant(&self) -> DisplayVariant;

    /// Read-only view of the device state.
    fn state(&self) -> &DisplayState;

    /// Width in the current orientation.
    fn width(&self) -> u16 {
        self.state().orientation.dimensions().0
    }

    /// Height in the current orientation.
    fn height(&self) -> u16 {
        self.state().orientation.dimensions().1
    }

    /// Clears the display to black by writing a full screen of zero pixels.
    fn clear(&mut self) -> Result<()> {
        let blank = vec![[0u8; 3]; LCD_WIDTH as usize * LCD_HEIGHT as usize];
        let (width, height) = (self.width(), self.height());
        self.update_region(0, 0, width, height, &blank)
    }

    /// Sets the orientation of content sent to the display.
    fn orientation(&mut self, _orientation: Orientation) -> Result<()> {
        Err(unsupported("orientation", self.variant()))
    }

    /// Sets the software inversion applied to region updates.
    fn invert(&mut self, mode: Inversion);

    /// Sets the coloured backlight. Channels must be 0-255.
    fn backlight(&mut self, _red: i32, _green: i32, _blue: i32) -> Result<()> {
        Err(unsupported("backlight", self.variant()))
    }

    /// Shows or hides the display content.
    fn enable(&mut self, enabled: bool) -> Result<()>;

    /// Sets the brightness (0 = off, 255 = brightest).
    fn brightness(&mut self, scale: i32) -> Result<()>;

    /// Writes `width * height` row-major pixels at `(x, y)`.
    ///
    /// `pixels` may be longer than needed; the excess is ignored.
    fn update_region(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        pixels: &[Rgb],
    ) -> Result<()>;
}

pub(crate) fn unsupported(feature: &'static str, variant: DisplayVariant) -> Error {
    Error::UnsupportedFeature {
        feature,
        variant: variant.name(),
    }
}

/// Validates a 0-255 channel value.
pub(crate) fn check_u8(name: &str, value: i32) -> Result<u8> {
    u8::try_from(value).map_err(|_| {
        Error::invalid(format!(
            "{} must be between 0 and 255 inclusive (got {})",
            name, value
        ))
    })
}

/// Validates a region update and applies the configured inversion for the
/// current logical dimensions.
///
/// Nothing is sent if this fails.
pub(crate) fn prepare_region<'a>(
    state: &DisplayState,
    region: Region,
    pixels: &'a [Rgb],
) -> Result<(Region, Cow<'a, [Rgb]>)> {
    apply_inversion(
        state.inversion,
        state.orientation.dimensions(),
        region,
        pixels,
    )
}

/// Sends one command frame once the inter-bitmap gap has passed.
pub(crate) fn send_frame<T: Transport>(
    transport: &mut T,
    gate: &TimingGate,
    state: &DisplayState,
    frame: &[u8],
) -> Result<()> {
    gate.wait(state.last_bitmap);
    debug!("Sending frame: {:02X?}", frame);
    transport.write_all(frame)?;
    Ok(())
}

/// Streams pixel data in panel-row chunks and records the completion time.
///
/// Chunks are handed to the transport without waiting for each to drain; the
/// transport is flushed once after the last chunk.
pub(crate) fn stream_pixels<T: Transport>(
    transport: &mut T,
    state: &mut DisplayState,
    pixels: &[Rgb],
    order: ByteOrder,
) -> Result<()> {
    let mut chunk_bytes = Vec::with_capacity(FLUSH_PIXELS * 2);
    let mut chunks = 0;
    for chunk in pixels.chunks(FLUSH_PIXELS) {
        chunk_bytes.clear();
        encode_into(chunk, order, &mut chunk_bytes);
        transport.write_all(&chunk_bytes)?;
        chunks += 1;
    }
    transport.flush()?;
    state.last_bitmap = Some(Instant::now());
    debug!("Streamed {} pixels in {} chunks", pixels.len(), chunks);
    Ok(())
}
