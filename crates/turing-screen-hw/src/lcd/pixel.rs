//! RGB565 pixel packing.

/// An 8-bit-per-channel RGB pixel.
pub type Rgb = [u8; 3];

/// Byte order of packed pixels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Low byte first (variant 1).
    Little,
    /// High byte first (variant 2).
    Big,
}

impl ByteOrder {
    /// Serializes a packed pixel in this byte order.
    #[inline]
    pub fn bytes(&self, value: u16) -> [u8; 2] {
        match self {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        }
    }
}

/// Converts RGB888 to RGB565.
#[inline]
pub fn pack(r: u8, g: u8, b: u8) -> u16 {
    let r5 = (r >> 3) as u16;
    let g6 = (g >> 2) as u16;
    let b5 = (b >> 3) as u16;
    (r5 << 11) | (g6 << 5) | b5
}

/// Converts RGB565 to RGB888.
#[inline]
pub fn unpack(pixel: u16) -> Rgb {
    let r = ((pixel >> 11) & 0x1F) as u8;
    let g = ((pixel >> 5) & 0x3F) as u8;
    let b = (pixel & 0x1F) as u8;
    // Expand to 8-bit
    [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
}

/// Appends the wire encoding of `pixels` to `out`.
pub fn encode_into(pixels: &[Rgb], order: ByteOrder, out: &mut Vec<u8>) {
    out.reserve(pixels.len() * 2);
    for &[r, g, b] in pixels {
        out.extend_from_slice(&order.bytes(pack(r, g, b)));
    }
}
