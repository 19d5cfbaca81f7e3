//! Display orientation and content inversion.
//!
//! The panel is natively 320x480 portrait. Only the variant 2 hardware can
//! switch to landscape. Inversion is never a hardware feature: it is done in
//! software by mirroring each region update before it goes on the wire.

use crate::lcd::Rgb;
use crate::{Error, Result, LCD_HEIGHT, LCD_WIDTH};
use std::borrow::Cow;
use std::str::FromStr;

/// Display orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Portrait mode (320x480), hardware native.
    #[default]
    Portrait,
    /// Landscape mode (480x320).
    Landscape,
}

impl Orientation {
    /// Returns the hardware orientation byte.
    pub fn hardware_byte(&self) -> u8 {
        match self {
            Orientation::Portrait => 0x00,
            Orientation::Landscape => 0x01,
        }
    }

    /// Returns the logical display dimensions for this orientation.
    pub fn dimensions(&self) -> (u16, u16) {
        match self {
            Orientation::Portrait => (LCD_WIDTH, LCD_HEIGHT),
            Orientation::Landscape => (LCD_HEIGHT, LCD_WIDTH),
        }
    }
}

impl FromStr for Orientation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "portrait" => Ok(Orientation::Portrait),
            "landscape" => Ok(Orientation::Landscape),
            _ => Err(Error::InvalidOrientation(s.to_string())),
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Orientation::Portrait => write!(f, "portrait"),
            Orientation::Landscape => write!(f, "landscape"),
        }
    }
}

/// Mirroring applied to content, for panels mounted upside down or flipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Inversion {
    #[default]
    None,
    /// Mirror horizontally.
    InvertX,
    /// Mirror vertically.
    InvertY,
    /// Mirror along both axes.
    InvertXY,
}

impl Inversion {
    /// Returns true if columns are reversed.
    pub fn flips_x(&self) -> bool {
        matches!(self, Inversion::InvertX | Inversion::InvertXY)
    }

    /// Returns true if rows are reversed.
    pub fn flips_y(&self) -> bool {
        matches!(self, Inversion::InvertY | Inversion::InvertXY)
    }
}

impl FromStr for Inversion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" | "off" => Ok(Inversion::None),
            "x" => Ok(Inversion::InvertX),
            "y" => Ok(Inversion::InvertY),
            "xy" | "both" => Ok(Inversion::InvertXY),
            _ => Err(Error::InvalidInversion(s.to_string())),
        }
    }
}

impl std::fmt::Display for Inversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Inversion::None => write!(f, "none"),
            Inversion::InvertX => write!(f, "x"),
            Inversion::InvertY => write!(f, "y"),
            Inversion::InvertXY => write!(f, "xy"),
        }
    }
}

/// A rectangular write target in logical display coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Region {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Number of pixels covered by the region.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Inclusive bottom-right corner. The region must be non-empty.
    pub(crate) fn last(&self) -> (u16, u16) {
        (self.x + self.width - 1, self.y + self.height - 1)
    }

    /// Returns true if the region is non-empty and lies within a display of
    /// the given size.
    pub fn fits(&self, display: (u16, u16)) -> bool {
        let (dw, dh) = display;
        self.width > 0
            && self.height > 0
            && self.x as u32 + self.width as u32 <= dw as u32
            && self.y as u32 + self.height as u32 <= dh as u32
    }
}

/// Mirrors a region update so the panel shows it at the caller's logical
/// position despite the configured inversion.
///
/// Rows and columns are reversed independently: `InvertXY` is both axis
/// reversals applied together. The caller's buffer is never modified; only the
/// first `width * height` pixels are used. Empty regions and regions that do
/// not fit inside `display` are rejected.
pub fn apply_inversion<'a>(
    mode: Inversion,
    display: (u16, u16),
    region: Region,
    pixels: &'a [Rgb],
) -> Result<(Region, Cow<'a, [Rgb]>)> {
    let count = region.pixel_count();
    if pixels.len() < count {
        return Err(Error::invalid(format!(
            "not enough data for a {}x{} region (only {} pixels present)",
            region.width,
            region.height,
            pixels.len()
        )));
    }
    if !region.fits(display) {
        return Err(Error::invalid(format!(
            "region {}x{} at ({}, {}) does not fit the {}x{} display",
            region.width, region.height, region.x, region.y, display.0, display.1
        )));
    }

    if mode == Inversion::None {
        return Ok((region, Cow::Borrowed(&pixels[..count])));
    }

    let width = region.width as usize;
    let height = region.height as usize;
    let source = &pixels[..count];
    let mut data = Vec::with_capacity(count);

    for row in 0..height {
        let src_row = if mode.flips_y() { height - 1 - row } else { row };
        let line = &source[src_row * width..(src_row + 1) * width];
        if mode.flips_x() {
            data.extend(line.iter().rev());
        } else {
            data.extend_from_slice(line);
        }
    }

    let (dw, dh) = display;
    let mut moved = region;
    if mode.flips_y() {
        moved.y = dh - (region.y + region.height);
    }
    if mode.flips_x() {
        moved.x = dw - (region.x + region.width);
    }

    Ok((moved, Cow::Owned(data)))
}
