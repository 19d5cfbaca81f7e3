//! Runtime selection between the two hardware variants.

use crate::orientation::{Inversion, Orientation};
use crate::transport::Transport;
use crate::{Error, Result};
use tracing::{info, warn};

use super::device::{DisplayState, DisplayVariant, TuringDisplay};
use super::pixel::Rgb;
use super::timing::TimingGate;
use super::variant1::Variant1Display;
use super::variant2::{handshake, Variant2Display};

/// A display of either variant.
pub enum AnyDisplay<T> {
    One(Variant1Display<T>),
    Two(Variant2Display<T>),
}

impl<T: Transport> AnyDisplay<T> {
    /// Opens a specific variant. No fallback happens.
    pub fn open(transport: T, variant: DisplayVariant, gate: TimingGate) -> Result<Self> {
        let display = match variant {
            DisplayVariant::One => AnyDisplay::One(Variant1Display::with_gate(transport, gate)),
            DisplayVariant::Two => AnyDisplay::Two(Variant2Display::with_gate(transport, gate)?),
        };
        Ok(display)
    }

    /// Probes for a variant 2 display and falls back to variant 1 when the
    /// hello handshake is not answered correctly.
    ///
    /// Transport failures are not treated as a mismatch and propagate.
    pub fn detect(mut transport: T, gate: TimingGate) -> Result<Self> {
        match handshake(&mut transport) {
            Ok(()) => {
                info!("Detected variant 2 display");
                Ok(AnyDisplay::Two(Variant2Display::from_verified(transport, gate)))
            }
            Err(Error::ProtocolMismatch(reason)) => {
                warn!("No variant 2 hello answer ({}), assuming variant 1", reason);
                Ok(AnyDisplay::One(Variant1Display::with_gate(transport, gate)))
            }
            Err(e) => Err(e),
        }
    }

    /// Forces the screen on. Variant 2 shows it at `level` brightness;
    /// variant 1 keeps its own brightness register.
    pub fn screen_on(&mut self, level: u8) -> Result<()> {
        match self {
            AnyDisplay::One(d) => d.screen_on(),
            AnyDisplay::Two(d) => d.screen_on(level),
        }
    }

    /// Forces the screen off.
    pub fn screen_off(&mut self) -> Result<()> {
        match self {
            AnyDisplay::One(d) => d.screen_off(),
            AnyDisplay::Two(d) => d.screen_off(),
        }
    }

    /// Releases the transport.
    pub fn into_inner(self) -> T {
        match self {
            AnyDisplay::One(d) => d.into_inner(),
            AnyDisplay::Two(d) => d.into_inner(),
        }
    }

    fn inner(&self) -> &dyn TuringDisplay {
        match self {
            AnyDisplay::One(d) => d,
            AnyDisplay::Two(d) => d,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn TuringDisplay {
        match self {
            AnyDisplay::One(d) => d,
            AnyDisplay::Two(d) => d,
        }
    }
}

impl<T: Transport> TuringDisplay for AnyDisplay<T> {
    fn variant(&self) -> DisplayVariant {
        self.inner().variant()
    }

    fn state(&self) -> &DisplayState {
        self.inner().state()
    }

    fn clear(&mut self) -> Result<()> {
        self.inner_mut().clear()
    }

    fn orientation(&mut self, orientation: Orientation) -> Result<()> {
        self.inner_mut().orientation(orientation)
    }

    fn invert(&mut self, mode: Inversion) {
        self.inner_mut().invert(mode)
    }

    fn backlight(&mut self, red: i32, green: i32, blue: i32) -> Result<()> {
        self.inner_mut().backlight(red, green, blue)
    }

    fn enable(&mut self, enabled: bool) -> Result<()> {
        self.inner_mut().enable(enabled)
    }

    fn brightness(&mut self, scale: i32) -> Result<()> {
        self.inner_mut().brightness(scale)
    }

    fn update_region(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        pixels: &[Rgb],
    ) -> Result<()> {
        self.inner_mut().update_region(x, y, width, height, pixels)
    }
}
