//! Pixel buffer backing the physical strip
//!
//! Pixels are stored as a flat byte sequence, [`BYTES_PER_PIXEL`] bytes
//! per pixel in `r, g, b` order. Channel reordering for the wire protocol
//! is the driver's business.

use alloc::vec;
use alloc::vec::Vec;

use crate::color::Rgb;

/// Number of bytes used by one pixel
pub const BYTES_PER_PIXEL: usize = 3;

/// Fixed-length pixel buffer
///
/// The length is chosen at construction. Growing or shrinking the strip
/// means building a new buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    bytes: Vec<u8>,
}

impl PixelBuffer {
    /// Create a black buffer of `len` pixels
    pub fn new(len: usize) -> Self {
        Self {
            bytes: vec![0; len * BYTES_PER_PIXEL],
        }
    }

    /// Number of pixels
    pub fn len(&self) -> usize {
        self.bytes.len() / BYTES_PER_PIXEL
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Raw bytes, `len() * BYTES_PER_PIXEL` long
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Color of the pixel at `index`
    pub fn get(&self, index: usize) -> Option<Rgb> {
        let start = index.checked_mul(BYTES_PER_PIXEL)?;
        let px = self.bytes.get(start..start + BYTES_PER_PIXEL)?;
        Some(Rgb {
            r: px[0],
            g: px[1],
            b: px[2],
        })
    }

    /// Set the pixel at `index`. Out of range indexes are ignored.
    pub fn set(&mut self, index: usize, color: Rgb) {
        let Some(start) = index.checked_mul(BYTES_PER_PIXEL) else {
            return;
        };
        if let Some(px) = self.bytes.get_mut(start..start + BYTES_PER_PIXEL) {
            px.copy_from_slice(&[color.r, color.g, color.b]);
        }
    }

    /// Iterate over the pixels in strip order
    pub fn pixels(&self) -> impl Iterator<Item = Rgb> + '_ {
        self.bytes
            .chunks_exact(BYTES_PER_PIXEL)
            .map(|px| Rgb {
                r: px[0],
                g: px[1],
                b: px[2],
            })
    }
}
