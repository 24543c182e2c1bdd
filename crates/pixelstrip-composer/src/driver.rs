//! LED driver abstraction layer
//!
//! Keeps the effects and the animation loop hardware-agnostic.

use crate::buffer::PixelBuffer;

/// Abstract LED driver trait
///
/// Implement this trait to support different hardware platforms.
pub trait LedDriver {
    /// Bind the driver to a data pin and strip length.
    ///
    /// Called whenever the pixel buffer is (re)allocated.
    fn attach(&mut self, pin: u8, led_count: usize);

    /// Push the buffer to the strip
    fn write(&mut self, pixels: &PixelBuffer);
}
