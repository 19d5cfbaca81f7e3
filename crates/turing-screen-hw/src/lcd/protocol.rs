//! LCD protocol definitions and encoding.
//!
//! Both hardware variants use fixed-length command frames:
//! - Variant 1: `[payload (5 bytes)][opcode]`, 6 bytes total.
//! - Variant 2: `[opcode][payload (8 bytes)][opcode]`, 10 bytes total.
//!
//! Short payloads are zero-padded. A bitmap command is followed by the raw
//! RGB565 pixel stream with no further framing.

use crate::{Error, Result};

/// Variant 1 payload size.
pub const V1_PAYLOAD_SIZE: usize = 5;

/// Variant 1 frame size.
pub const V1_FRAME_SIZE: usize = V1_PAYLOAD_SIZE + 1;

/// Variant 2 payload size.
pub const V2_PAYLOAD_SIZE: usize = 8;

/// Variant 2 frame size.
pub const V2_FRAME_SIZE: usize = V2_PAYLOAD_SIZE + 2;

/// Token sent in the variant 2 hello and echoed back by the device.
pub const HELLO_TOKEN: &[u8; 5] = b"HELLO";

/// Variant 1 command opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum V1Command {
    Reset = 101,
    Clear = 102,
    ScreenOff = 108,
    ScreenOn = 109,
    SetBrightness = 110,
    UpdateBitmap = 197,
}

/// Variant 2 command opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum V2Command {
    Hello = 0xCA,
    SetOrientation = 0xCB,
    UpdateBitmap = 0xCC,
    SetBacklight = 0xCD,
    SetBrightness = 0xCE,
}

fn pad_payload<const N: usize>(payload: &[u8]) -> Result<[u8; N]> {
    if payload.len() > N {
        return Err(Error::FrameOverflow {
            capacity: N,
            actual: payload.len(),
        });
    }
    let mut padded = [0u8; N];
    padded[..payload.len()].copy_from_slice(payload);
    Ok(padded)
}

/// Builds a variant 1 command frame.
pub fn build_v1_frame(cmd: V1Command, payload: &[u8]) -> Result<[u8; V1_FRAME_SIZE]> {
    let padded: [u8; V1_PAYLOAD_SIZE] = pad_payload(payload)?;
    let mut frame = [0u8; V1_FRAME_SIZE];
    frame[..V1_PAYLOAD_SIZE].copy_from_slice(&padded);
    frame[V1_PAYLOAD_SIZE] = cmd as u8;
    Ok(frame)
}

/// Builds a variant 2 command frame.
pub fn build_v2_frame(cmd: V2Command, payload: &[u8]) -> Result<[u8; V2_FRAME_SIZE]> {
    let padded: [u8; V2_PAYLOAD_SIZE] = pad_payload(payload)?;
    let mut frame = [0u8; V2_FRAME_SIZE];
    frame[0] = cmd as u8;
    frame[1..=V2_PAYLOAD_SIZE].copy_from_slice(&padded);
    frame[V2_FRAME_SIZE - 1] = cmd as u8;
    Ok(frame)
}

/// Packs an inclusive bitmap rectangle into the variant 1 payload.
///
/// X coordinates take 10 bits and y coordinates 10 bits, packed back to back
/// as `x, y, x1, y1`, with the final coordinate's low byte in byte 4.
pub fn v1_bitmap_payload(x: u16, y: u16, x1: u16, y1: u16) -> [u8; V1_PAYLOAD_SIZE] {
    [
        (x >> 2) as u8,
        (((x & 3) << 6) | (y >> 4)) as u8,
        (((y & 15) << 4) | (x1 >> 6)) as u8,
        (((x1 & 63) << 2) | (y1 >> 8)) as u8,
        (y1 & 255) as u8,
    ]
}

/// Encodes an inclusive bitmap rectangle as big-endian 16-bit coordinates.
pub fn v2_bitmap_payload(x: u16, y: u16, x1: u16, y1: u16) -> [u8; V2_PAYLOAD_SIZE] {
    let mut payload = [0u8; V2_PAYLOAD_SIZE];
    for (i, coord) in [x, y, x1, y1].into_iter().enumerate() {
        payload[i * 2..i * 2 + 2].copy_from_slice(&coord.to_be_bytes());
    }
    payload
}

/// Checks a variant 2 hello response against the token that was sent.
pub fn check_hello_response(response: &[u8]) -> Result<()> {
    if response.len() < V2_FRAME_SIZE {
        return Err(Error::ProtocolMismatch(format!(
            "short response to hello ({} of {} bytes)",
            response.len(),
            V2_FRAME_SIZE
        )));
    }
    let hello = V2Command::Hello as u8;
    if response[0] != hello || response[V2_FRAME_SIZE - 1] != hello {
        return Err(Error::ProtocolMismatch(format!(
            "bad hello framing: {:02X?}",
            &response[..V2_FRAME_SIZE]
        )));
    }
    if &response[1..=HELLO_TOKEN.len()] != HELLO_TOKEN {
        return Err(Error::ProtocolMismatch(format!(
            "hello not echoed, got {:02X?}",
            &response[1..=HELLO_TOKEN.len()]
        )));
    }
    Ok(())
}
