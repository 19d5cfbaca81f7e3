//! Driver for the "flagship" (variant 2) display.
//!
//! This hardware answers a hello handshake, supports landscape orientation
//! and an RGB backlight, and has no screen on/off command: disabling is done
//! by dropping the brightness to zero.

use crate::orientation::{Inversion, Orientation, Region};
use crate::transport::Transport;
use crate::Result;
use tracing::{debug, info};

use super::device::{
    check_u8, prepare_region, send_frame, stream_pixels, DisplayState, DisplayVariant,
    TuringDisplay,
};
use super::pixel::{ByteOrder, Rgb};
use super::protocol::{
    build_v2_frame, check_hello_response, v2_bitmap_payload, V2Command, HELLO_TOKEN,
    V2_FRAME_SIZE,
};
use super::timing::TimingGate;

/// Variant 2 display controller.
pub struct Variant2Display<T> {
    transport: T,
    gate: TimingGate,
    state: DisplayState,
}

/// Sends the hello frame and verifies the device echoes it.
pub fn handshake<T: Transport>(transport: &mut T) -> Result<()> {
    let frame = build_v2_frame(V2Command::Hello, HELLO_TOKEN)?;
    debug!("Sending hello: {:02X?}", frame);
    transport.write_all(&frame)?;
    transport.flush()?;

    let response = transport.read_up_to(V2_FRAME_SIZE)?;
    debug!("Hello response: {:02X?}", response);
    check_hello_response(&response)
}

impl<T: Transport> Variant2Display<T> {
    /// Performs the hello handshake and returns a ready driver.
    ///
    /// Fails with `ProtocolMismatch` if the device is not a variant 2 display.
    pub fn new(transport: T) -> Result<Self> {
        Self::with_gate(transport, TimingGate::default())
    }

    /// Like [`Variant2Display::new`] with a custom inter-bitmap delay.
    pub fn with_gate(mut transport: T, gate: TimingGate) -> Result<Self> {
        handshake(&mut transport)?;
        Ok(Self::from_verified(transport, gate))
    }

    /// Builds a driver on a transport whose handshake already succeeded.
    pub(crate) fn from_verified(transport: T, gate: TimingGate) -> Self {
        info!("Variant 2 display attached");
        Self {
            transport,
            gate,
            state: DisplayState::default(),
        }
    }

    /// Sends `level` as the brightness and marks the display enabled,
    /// regardless of the remembered state.
    pub fn screen_on(&mut self, level: u8) -> Result<()> {
        self.send_command(V2Command::SetBrightness, &[level])?;
        self.state.brightness = level;
        self.state.enabled = true;
        Ok(())
    }

    /// Drops the brightness to zero regardless of the remembered state. The
    /// requested brightness is kept for the next enable.
    pub fn screen_off(&mut self) -> Result<()> {
        self.send_command(V2Command::SetBrightness, &[0])?;
        self.state.enabled = false;
        Ok(())
    }

    /// Releases the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    fn send_command(&mut self, cmd: V2Command, payload: &[u8]) -> Result<()> {
        let frame = build_v2_frame(cmd, payload)?;
        send_frame(&mut self.transport, &self.gate, &self.state, &frame)
    }
}

impl<T: Transport> TuringDisplay for Variant2Display<T> {
    fn variant(&self) -> DisplayVariant {
        DisplayVariant::Two
    }

    fn state(&self) -> &DisplayState {
        &self.state
    }

    fn orientation(&mut self, orientation: Orientation) -> Result<()> {
        self.send_command(V2Command::SetOrientation, &[orientation.hardware_byte()])?;
        self.state.orientation = orientation;
        debug!("Set orientation to {}", orientation);
        Ok(())
    }

    fn invert(&mut self, mode: Inversion) {
        self.state.inversion = mode;
    }

    fn backlight(&mut self, red: i32, green: i32, blue: i32) -> Result<()> {
        let red = check_u8("backlight red", red)?;
        let green = check_u8("backlight green", green)?;
        let blue = check_u8("backlight blue", blue)?;
        self.send_command(V2Command::SetBacklight, &[red, green, blue])
    }

    fn enable(&mut self, enabled: bool) -> Result<()> {
        match (self.state.enabled, enabled) {
            (false, true) => self.screen_on(self.state.brightness),
            (true, false) => self.screen_off(),
            _ => Ok(()),
        }
    }

    fn brightness(&mut self, scale: i32) -> Result<()> {
        let scale = check_u8("brightness", scale)?;
        self.state.brightness = scale;
        // While disabled the level is only remembered for the next enable.
        if self.state.enabled {
            self.send_command(V2Command::SetBrightness, &[scale])?;
        }
        Ok(())
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

        let payload = v2_bitmap_payload(region.x, region.y, x1, y1);
        self.send_command(V2Command::UpdateBitmap, &payload)?;
        stream_pixels(&mut self.transport, &mut self.state, &data, ByteOrder::Big)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;
    use crate::Error;
    use std::time::Duration;

    fn hello_echo() -> Vec<u8> {
        build_v2_frame(V2Command::Hello, HELLO_TOKEN).unwrap().to_vec()
    }

    fn display() -> Variant2Display<MockTransport> {
        let mut d = Variant2Display::with_gate(
            MockTransport::with_input(&hello_echo()),
            TimingGate::new(Duration::ZERO),
        )
        .unwrap();
        d.transport.writes.clear();
        d
    }

    fn last_write(d: &Variant2Display<MockTransport>) -> &[u8] {
        d.transport.writes.last().map(Vec::as_slice).unwrap_or(&[])
    }

    #[test]
    fn test_handshake() {
        let d = Variant2Display::new(MockTransport::with_input(&hello_echo())).unwrap();
        assert_eq!(d.transport.writes, vec![hello_echo()]);
    }

    #[test]
    fn test_handshake_short_response() {
        let response = hello_echo();
        let result = Variant2Display::new(MockTransport::with_input(&response[..7]));
        assert!(matches!(result, Err(Error::ProtocolMismatch(_))));

        let result = Variant2Display::new(MockTransport::new());
        assert!(matches!(result, Err(Error::ProtocolMismatch(_))));
    }

    #[test]
    fn test_handshake_bad_echo() {
        let mut response = hello_echo();
        response[0] = 0x00;
        let result = Variant2Display::new(MockTransport::with_input(&response));
        assert!(matches!(result, Err(Error::ProtocolMismatch(_))));

        let mut response = hello_echo();
        response[5] = b'!';
        let result = Variant2Display::new(MockTransport::with_input(&response));
        assert!(matches!(result, Err(Error::ProtocolMismatch(_))));
    }

    #[test]
    fn test_orientation_swaps_dimensions() {
        let mut d = display();
        assert_eq!((d.width(), d.height()), (320, 480));

        d.orientation(Orientation::Landscape).unwrap();
        assert_eq!((d.width(), d.height()), (480, 320));
        assert_eq!(last_write(&d), &[0xCB, 1, 0, 0, 0, 0, 0, 0, 0, 0xCB]);

        d.orientation(Orientation::Portrait).unwrap();
        assert_eq!((d.width(), d.height()), (320, 480));
    }

    #[test]
    fn test_backlight() {
        let mut d = display();
        d.backlight(10, 20, 30).unwrap();
        assert_eq!(last_write(&d), &[0xCD, 10, 20, 30, 0, 0, 0, 0, 0, 0xCD]);

        assert!(matches!(
            d.backlight(256, 0, 0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            d.backlight(0, 0, -5),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(d.transport.writes.len(), 1);
    }

    #[test]
    fn test_brightness_restored_on_enable() {
        let mut d = display();
        d.brightness(200).unwrap();
        d.enable(false).unwrap();
        d.enable(false).unwrap();
        d.enable(true).unwrap();

        let writes = &d.transport.writes;
        assert_eq!(writes.len(), 3);
        assert_eq!(writes[0][1], 200);
        assert_eq!(writes[1][1], 0);
        assert_eq!(writes[2], vec![0xCE, 200, 0, 0, 0, 0, 0, 0, 0, 0xCE]);
    }

    #[test]
    fn test_brightness_while_disabled_is_deferred() {
        let mut d = display();
        d.enable(false).unwrap();
        d.brightness(90).unwrap();
        assert_eq!(d.transport.writes.len(), 1);
        assert_eq!(d.state().brightness, 90);

        d.enable(true).unwrap();
        assert_eq!(last_write(&d)[1], 90);
    }

    #[test]
    fn test_screen_on_sends_level() {
        let mut d = display();
        d.screen_on(180).unwrap();
        assert_eq!(last_write(&d), &[0xCE, 180, 0, 0, 0, 0, 0, 0, 0, 0xCE]);
        assert_eq!(d.state().brightness, 180);

        d.screen_off().unwrap();
        d.screen_off().unwrap();
        assert_eq!(d.transport.writes.len(), 3);
        assert_eq!(last_write(&d)[1], 0);
        assert_eq!(d.state().brightness, 180);

        d.enable(true).unwrap();
        assert_eq!(last_write(&d)[1], 180);
    }

    #[test]
    fn test_update_region_inverted_landscape() {
        let mut d = display();
        d.orientation(Orientation::Landscape).unwrap();
        d.invert(Inversion::InvertY);
        d.transport.writes.clear();

        let pixels = vec![[255, 0, 0], [0, 255, 0], [0, 0, 255], [255, 255, 255]];
        d.update_region(400, 10, 2, 2, &pixels).unwrap();

        // y = 320 - (10 + 2) = 308, rows swapped, x untouched
        let writes = &d.transport.writes;
        assert_eq!(
            writes[0],
            vec![0xCC, 0x01, 0x90, 0x01, 0x34, 0x01, 0x91, 0x01, 0x35, 0xCC]
        );
        assert_eq!(
            writes[1],
            vec![0x00, 0x1F, 0xFF, 0xFF, 0xF8, 0x00, 0x07, 0xE0]
        );
    }

    #[test]
    fn test_brightness_out_of_range() {
        let mut d = display();
        assert!(matches!(d.brightness(256), Err(Error::InvalidArgument(_))));
        assert!(matches!(d.brightness(-1), Err(Error::InvalidArgument(_))));
        assert!(d.transport.writes.is_empty());
    }

    #[test]
    fn test_update_region() {
        let mut d = display();
        let pixels = vec![[255, 0, 0], [0, 0, 255], [9, 9, 9]];
        d.update_region(0x100, 2, 2, 1, &pixels).unwrap();

        let writes = &d.transport.writes;
        assert_eq!(writes.len(), 2);
        assert_eq!(
            writes[0],
            vec![0xCC, 0x01, 0x00, 0x00, 0x02, 0x01, 0x01, 0x00, 0x02, 0xCC]
        );
        // Big-endian RGB565, excess pixel not sent
        assert_eq!(writes[1], vec![0xF8, 0x00, 0x00, 0x1F]);
    }

    #[test]
    fn test_software_clear() {
        let mut d = display();
        d.orientation(Orientation::Landscape).unwrap();
        d.transport.writes.clear();
        d.clear().unwrap();

        let writes = &d.transport.writes;
        assert_eq!(
            writes[0],
            vec![0xCC, 0, 0, 0, 0, 0x01, 0xDF, 0x01, 0x3F, 0xCC]
        );
        let streamed: usize = writes[1..].iter().map(Vec::len).sum();
        assert_eq!(streamed, 480 * 320 * 2);
        assert!(writes[1..].iter().all(|w| w.iter().all(|&b| b == 0)));
    }

    #[test]
    fn test_update_region_out_of_bounds() {
        let mut d = display();
        let pixels = vec![[0u8; 3]; 4];
        assert!(matches!(
            d.update_region(400, 0, 2, 2, &pixels),
            Err(Error::InvalidArgument(_))
        ));
        d.orientation(Orientation::Landscape).unwrap();
        assert!(d.update_region(400, 0, 2, 2, &pixels).is_ok());
    }
}
