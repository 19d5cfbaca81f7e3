//! Driver for the original (variant 1) display.
//!
//! This hardware has no orientation or backlight commands, a dedicated
//! clear command, and a brightness register where 0 is brightest.

use crate::orientation::{Inversion, Region};
use crate::transport::Transport;
use crate::Result;
use tracing::{debug, info};

use super::device::{
    check_u8, prepare_region, send_frame, stream_pixels, DisplayState, DisplayVariant,
    TuringDisplay,
};
use super::pixel::{ByteOrder, Rgb};
use super::protocol::{build_v1_frame, v1_bitmap_payload, V1Command};
use super::timing::TimingGate;

/// Variant 1 display controller.
pub struct Variant1Display<T> {
    transport: T,
    gate: TimingGate,
    state: DisplayState,
}

impl<T: Transport> Variant1Display<T> {
    /// Wraps an open transport. No handshake exists for this variant.
    pub fn new(transport: T) -> Self {
        Self::with_gate(transport, TimingGate::default())
    }

    /// Wraps an open transport with a custom inter-bitmap delay.
    pub fn with_gate(transport: T, gate: TimingGate) -> Self {
        info!("Variant 1 display attached");
        Self {
            transport,
            gate,
            state: DisplayState::default(),
        }
    }

    /// Sends the hardware reset command.
    pub fn reset(&mut self) -> Result<()> {
        self.send_command(V1Command::Reset, &[])
    }

    /// Sends the screen-on command regardless of the remembered state.
    ///
    /// A fresh driver assumes the screen is on, which may not hold if an
    /// earlier process turned it off.
    pub fn screen_on(&mut self) -> Result<()> {
        self.send_command(V1Command::ScreenOn, &[])?;
        self.state.enabled = true;
        Ok(())
    }

    /// Sends the screen-off command regardless of the remembered state.
    pub fn screen_off(&mut self) -> Result<()> {
        self.send_command(V1Command::ScreenOff, &[])?;
        self.state.enabled = false;
        Ok(())
    }

    /// Releases the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    fn send_command(&mut self, cmd: V1Command, payload: &[u8]) -> Result<()> {
        let frame = build_v1_frame(cmd, payload)?;
        send_frame(&mut self.transport, &self.gate, &self.state, &frame)
    }
}

impl<T: Transport> TuringDisplay for Variant1Display<T> {
    fn variant(&self) -> DisplayVariant {
        DisplayVariant::One
    }

    fn state(&self) -> &DisplayState {
        &self.state
    }

    fn clear(&mut self) -> Result<()> {
        self.send_command(V1Command::Clear, &[])
    }

    fn invert(&mut self, mode: Inversion) {
        self.state.inversion = mode;
    }

    fn enable(&mut self, enabled: bool) -> Result<()> {
        match (self.state.enabled, enabled) {
            (false, true) => self.screen_on(),
            (true, false) => self.screen_off(),
            _ => Ok(()),
        }
    }

    fn brightness(&mut self, scale: i32) -> Result<()> {
        let scale = check_u8("brightness", scale)?;
        self.state.brightness = scale;
        // The hardware register is inverted: 0 is brightest.
        self.send_command(V1Command::SetBrightness, &[255 - scale])
    }

    fn update_region(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        pixels: &[Rgb],
    ) -> Result<()> {
        let (region, data) = prepare_region(&self.state, Region::new(x, y, width, height), pixels)?;
        let (x1, y1) = region.last();
        debug!(
            "Bitmap update ({}, {})-({}, {}), inversion {}",
            region.x, region.y, x1, y1, self.state.inversion
        );

        let payload = v1_bitmap_payload(region.x, region.y, x1, y1);
        self.send_command(V1Command::UpdateBitmap, &payload)?;
        stream_pixels(&mut self.transport, &mut self.state, &data, ByteOrder::Little)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::Orientation;
    use crate::transport::mock::MockTransport;
    use crate::Error;
    use std::time::Duration;

    fn display() -> Variant1Display<MockTransport> {
        Variant1Display::with_gate(MockTransport::new(), TimingGate::new(Duration::ZERO))
    }

    #[test]
    fn test_brightness_is_inverted() {
        let mut d = display();
        d.brightness(128).unwrap();
        assert_eq!(d.transport.writes, vec![vec![127, 0, 0, 0, 0, 110]]);
        assert_eq!(d.state().brightness, 128);
    }

    #[test]
    fn test_brightness_out_of_range() {
        let mut d = display();
        assert!(matches!(d.brightness(256), Err(Error::InvalidArgument(_))));
        assert!(matches!(d.brightness(-1), Err(Error::InvalidArgument(_))));
        assert!(d.transport.writes.is_empty());
        assert_eq!(d.state().brightness, 0);
    }

    #[test]
    fn test_enable_sends_only_on_change() {
        let mut d = display();
        d.enable(true).unwrap();
        assert!(d.transport.writes.is_empty());

        d.enable(false).unwrap();
        d.enable(false).unwrap();
        assert_eq!(d.transport.writes, vec![vec![0, 0, 0, 0, 0, 108]]);

        d.enable(true).unwrap();
        assert_eq!(d.transport.writes[1], vec![0, 0, 0, 0, 0, 109]);
    }

    #[test]
    fn test_screen_on_ignores_remembered_state() {
        let mut d = display();
        assert!(d.state().enabled);
        d.screen_on().unwrap();
        d.screen_on().unwrap();
        assert_eq!(
            d.transport.writes,
            vec![vec![0, 0, 0, 0, 0, 109], vec![0, 0, 0, 0, 0, 109]]
        );

        d.screen_off().unwrap();
        assert!(!d.state().enabled);
        assert_eq!(d.transport.writes[2], vec![0, 0, 0, 0, 0, 108]);
    }

    #[test]
    fn test_unsupported_features() {
        let mut d = display();
        assert!(matches!(
            d.orientation(Orientation::Landscape),
            Err(Error::UnsupportedFeature { .. })
        ));
        assert_eq!(d.state().orientation, Orientation::Portrait);
        assert_eq!((d.width(), d.height()), (320, 480));
        assert!(matches!(
            d.backlight(255, 0, 0),
            Err(Error::UnsupportedFeature { .. })
        ));
        // Reported as unsupported even when the channels are out of range.
        assert!(matches!(
            d.backlight(300, -1, 0),
            Err(Error::UnsupportedFeature { .. })
        ));
        assert!(d.transport.writes.is_empty());
    }

    #[test]
    fn test_clear_uses_hardware_command() {
        let mut d = display();
        d.clear().unwrap();
        assert_eq!(d.transport.writes, vec![vec![0, 0, 0, 0, 0, 102]]);
    }

    #[test]
    fn test_reset() {
        let mut d = display();
        d.reset().unwrap();
        assert_eq!(d.transport.writes, vec![vec![0, 0, 0, 0, 0, 101]]);
    }

    #[test]
    fn test_update_region() {
        let mut d = display();
        let pixels = vec![[255, 0, 0], [0, 0, 255]];
        d.update_region(5, 18, 2, 1, &pixels).unwrap();

        let writes = &d.transport.writes;
        assert_eq!(writes.len(), 2);
        let mut header = v1_bitmap_payload(5, 18, 6, 18).to_vec();
        header.push(197);
        assert_eq!(writes[0], header);
        // Little-endian RGB565
        assert_eq!(writes[1], vec![0x00, 0xF8, 0x1F, 0x00]);
        assert!(d.state().last_bitmap.is_some());
    }

    #[test]
    fn test_update_region_short_buffer() {
        let mut d = display();
        let pixels = vec![[0u8; 3]; 10];
        assert!(matches!(
            d.update_region(0, 0, 4, 4, &pixels),
            Err(Error::InvalidArgument(_))
        ));
        assert!(d.transport.writes.is_empty());
        assert!(d.state().last_bitmap.is_none());
    }

    #[test]
    fn test_update_region_is_chunked() {
        let mut d = display();
        let pixels = vec![[0u8, 255, 0]; 320 * 20];
        d.update_region(0, 0, 320, 20, &pixels).unwrap();
        // Header plus chunks of 8, 8 and 4 rows.
        let writes = &d.transport.writes;
        assert_eq!(writes.len(), 4);
        assert_eq!(writes[1].len(), 320 * 8 * 2);
        assert_eq!(writes[3].len(), 320 * 4 * 2);
    }

    #[test]
    fn test_update_region_inverted() {
        let mut d = display();
        d.invert(Inversion::InvertXY);
        let pixels = vec![[255, 0, 0], [0, 0, 0]];
        d.update_region(0, 0, 2, 1, &pixels).unwrap();

        let mut header = v1_bitmap_payload(318, 479, 319, 479).to_vec();
        header.push(197);
        assert_eq!(d.transport.writes[0], header);
        assert_eq!(d.transport.writes[1], vec![0x00, 0x00, 0x00, 0xF8]);
    }

    #[test]
    fn test_transport_failure_propagates() {
        let mut transport = MockTransport::new();
        transport.fail_writes = true;
        let mut d = Variant1Display::new(transport);
        assert!(matches!(d.brightness(10), Err(Error::Transport(_))));
    }

    #[test]
    fn test_command_waits_after_bitmap() {
        let gap = Duration::from_millis(30);
        let mut d = Variant1Display::with_gate(MockTransport::new(), TimingGate::new(gap));
        d.update_region(0, 0, 1, 1, &[[1, 2, 3]]).unwrap();
        let done = d.state().last_bitmap.unwrap();
        d.brightness(10).unwrap();
        assert!(done.elapsed() >= gap);
    }
}
