#![cfg_attr(not(test), no_std)]

//! Pixel layer of the strip firmware
//!
//! Architecture layers:
//! - `buffer` - [`PixelBuffer`], the flat byte buffer backing the strip
//! - `effect` - In-place effects applied to the buffer every tick
//! - `color` - [`Rgb`] alias, named colors, palettes and hex conversion
//! - `driver` - Hardware abstraction ([`LedDriver`] trait)
//! - `random` - Random source abstraction and a small xorshift generator
//!
//! Nothing in this crate touches hardware or time, so every effect is
//! deterministic given the buffer, its inputs and the random source.

extern crate alloc;

pub mod buffer;
pub mod color;
pub mod driver;
pub mod effect;
pub mod random;

pub use buffer::{BYTES_PER_PIXEL, PixelBuffer};
pub use color::{BLACK, Rgb, parse_hex, to_hex};
pub use driver::LedDriver;
pub use random::{RandomSource, XorShift32};
