//! In-place effects
//!
//! The animation loop applies `crawl`, `fade` and `random_fill` in that
//! order on every tick. `fill`, `fill_pattern` and `clear` set the whole
//! strip at once and are used when the buffer is (re)allocated.

use crate::{
    buffer::{BYTES_PER_PIXEL, PixelBuffer},
    color::{BLACK, Rgb},
    random::RandomSource,
};

impl PixelBuffer {
    /// Circular shift by `direction` pixels.
    ///
    /// Positive directions move pixels towards the end of the strip, negative
    /// towards the start, zero is a no-op. `crawl(d)` followed by
    /// `crawl(-d)` restores the buffer exactly.
    pub fn crawl(&mut self, direction: i8) {
        let len = self.len();
        if direction == 0 || len == 0 {
            return;
        }
        let shift = (usize::from(direction.unsigned_abs()) % len) * BYTES_PER_PIXEL;
        if direction > 0 {
            self.as_bytes_mut().rotate_right(shift);
        } else {
            self.as_bytes_mut().rotate_left(shift);
        }
    }

    /// Halve every channel when `enabled`
    pub fn fade(&mut self, enabled: bool) {
        if !enabled {
            return;
        }
        for byte in self.as_bytes_mut() {
            *byte >>= 1;
        }
    }

    /// Overwrite `len * percent / 100` random pixels with random palette
    /// entries.
    ///
    /// Indexes may repeat, so fewer distinct pixels can change. `percent`
    /// above 100 counts as 100.
    pub fn random_fill(&mut self, percent: u8, palette: &[Rgb], rng: &mut impl RandomSource) {
        let len = self.len();
        if percent == 0 || palette.is_empty() || len == 0 {
            return;
        }
        let count = len * usize::from(percent.min(100)) / 100;
        for _ in 0..count {
            let index = rng.below(len);
            let color = palette[rng.below(palette.len())];
            self.set(index, color);
        }
    }

    /// Repeat `colors` along the strip: pixel `i` gets `colors[i % len]`.
    ///
    /// A single color paints the whole strip. An empty slice is a no-op.
    pub fn fill(&mut self, colors: &[Rgb]) {
        if colors.is_empty() {
            return;
        }
        for index in 0..self.len() {
            self.set(index, colors[index % colors.len()]);
        }
    }

    /// Lay out every color `spread` times followed by `space_between` black
    /// pixels, repeating along the strip.
    ///
    /// With `spread = 1` and `space_between = 0` this is [`Self::fill`].
    /// A zero `spread` counts as 1.
    pub fn fill_pattern(&mut self, colors: &[Rgb], spread: u8, space_between: u8) {
        if colors.is_empty() {
            return;
        }
        let spread = usize::from(spread.max(1));
        let block = spread + usize::from(space_between);
        let period = block * colors.len();
        for index in 0..self.len() {
            let offset = index % period;
            let color = if offset % block < spread {
                colors[offset / block]
            } else {
                BLACK
            };
            self.set(index, color);
        }
    }

    /// Turn every pixel off
    pub fn clear(&mut self) {
        self.as_bytes_mut().fill(0);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::color::{BLUE, GREEN, RED, WHITE, rgb};
    use crate::random::XorShift32;

    fn numbered(len: usize) -> PixelBuffer {
        let mut buffer = PixelBuffer::new(len);
        for (i, byte) in buffer.as_bytes_mut().iter_mut().enumerate() {
            *byte = u8::try_from(i % 256).unwrap();
        }
        buffer
    }

    #[test]
    fn crawl_forward_moves_last_pixel_to_front() {
        let mut buffer = PixelBuffer::new(3);
        buffer.fill(&[RED, GREEN, BLUE]);
        buffer.crawl(1);

        let pixels: Vec<Rgb> = buffer.pixels().collect();
        assert_eq!(pixels, [BLUE, RED, GREEN]);
    }

    #[test]
    fn crawl_backward_moves_first_pixel_to_end() {
        let mut buffer = PixelBuffer::new(3);
        buffer.fill(&[RED, GREEN, BLUE]);
        buffer.crawl(-1);

        let pixels: Vec<Rgb> = buffer.pixels().collect();
        assert_eq!(pixels, [GREEN, BLUE, RED]);
    }

    #[test]
    fn crawl_is_reversible() {
        for len in [1, 2, 7, 60] {
            for direction in [-1i8, 1] {
                let original = numbered(len);
                let mut buffer = original.clone();
                buffer.crawl(direction);
                buffer.crawl(-direction);
                assert_eq!(buffer, original, "len {len}, direction {direction}");
            }
        }
    }

    #[test]
    fn crawl_zero_is_noop() {
        let original = numbered(5);
        let mut buffer = original.clone();
        buffer.crawl(0);
        assert_eq!(buffer, original);
    }

    #[test]
    fn crawl_on_empty_buffer_is_noop() {
        let mut buffer = PixelBuffer::new(0);
        buffer.crawl(1);
        assert!(buffer.is_empty());
    }

    #[test]
    fn fade_halves_with_floor() {
        let mut buffer = PixelBuffer::new(1);
        buffer.set(0, rgb(255, 3, 1));
        buffer.fade(true);
        assert_eq!(buffer.get(0), Some(rgb(127, 1, 0)));
    }

    #[test]
    fn repeated_fade_matches_power_of_two_division() {
        let values: [u8; 6] = [0, 1, 2, 99, 128, 255];
        for k in 0..10u32 {
            let mut buffer = PixelBuffer::new(2);
            buffer.as_bytes_mut().copy_from_slice(&values);
            for _ in 0..k {
                buffer.fade(true);
            }
            for (byte, original) in buffer.as_bytes().iter().zip(values) {
                let expected = u32::from(original) >> k.min(31);
                assert_eq!(u32::from(*byte), expected, "k = {k}");
            }
        }
    }

    #[test]
    fn fade_disabled_is_noop() {
        let original = numbered(4);
        let mut buffer = original.clone();
        buffer.fade(false);
        assert_eq!(buffer, original);
    }

    #[test]
    fn random_fill_zero_percent_is_noop() {
        let original = numbered(16);
        let mut buffer = original.clone();
        let mut rng = XorShift32::new(1);
        buffer.random_fill(0, &[RED, GREEN], &mut rng);
        assert_eq!(buffer, original);
    }

    #[test]
    fn random_fill_empty_palette_is_noop() {
        let original = numbered(16);
        let mut buffer = original.clone();
        let mut rng = XorShift32::new(1);
        buffer.random_fill(100, &[], &mut rng);
        assert_eq!(buffer, original);
    }

    #[test]
    fn random_fill_only_uses_palette_colors() {
        let mut buffer = PixelBuffer::new(50);
        let mut rng = XorShift32::new(3);
        buffer.random_fill(100, &[RED, WHITE], &mut rng);

        for pixel in buffer.pixels() {
            assert!(pixel == RED || pixel == WHITE || pixel == BLACK);
        }
        assert!(buffer.pixels().any(|p| p != BLACK));
    }

    #[test]
    fn random_fill_touches_at_most_count_pixels() {
        let mut buffer = PixelBuffer::new(100);
        let mut rng = XorShift32::new(11);
        buffer.random_fill(5, &[WHITE], &mut rng);

        let changed = buffer.pixels().filter(|&p| p == WHITE).count();
        assert!((1..=5).contains(&changed));
    }

    #[test]
    fn random_fill_full_eventually_covers_every_pixel() {
        let mut buffer = PixelBuffer::new(40);
        let mut rng = XorShift32::new(5);
        for _ in 0..50 {
            buffer.random_fill(100, &[WHITE], &mut rng);
        }
        assert!(buffer.pixels().all(|p| p == WHITE));
    }

    #[test]
    fn fill_single_color() {
        let mut buffer = PixelBuffer::new(4);
        buffer.fill(&[GREEN]);
        assert!(buffer.pixels().all(|p| p == GREEN));
    }

    #[test]
    fn fill_repeats_palette() {
        let mut buffer = PixelBuffer::new(5);
        buffer.fill(&[RED, GREEN]);
        let pixels: Vec<Rgb> = buffer.pixels().collect();
        assert_eq!(pixels, [RED, GREEN, RED, GREEN, RED]);
    }

    #[test]
    fn fill_pattern_with_unit_spread_matches_fill() {
        let mut plain = PixelBuffer::new(7);
        let mut pattern = PixelBuffer::new(7);
        plain.fill(&[RED, GREEN, BLUE]);
        pattern.fill_pattern(&[RED, GREEN, BLUE], 1, 0);
        assert_eq!(plain, pattern);
    }

    #[test]
    fn fill_pattern_spreads_and_spaces() {
        let mut buffer = PixelBuffer::new(8);
        buffer.fill_pattern(&[RED, GREEN], 2, 1);
        let pixels: Vec<Rgb> = buffer.pixels().collect();
        assert_eq!(pixels, [RED, RED, BLACK, GREEN, GREEN, BLACK, RED, RED]);
    }

    #[test]
    fn clear_turns_everything_off() {
        let mut buffer = numbered(6);
        buffer.clear();
        assert!(buffer.pixels().all(|p| p == BLACK));
    }
}
