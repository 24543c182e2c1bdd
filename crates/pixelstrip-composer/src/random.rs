/// Source of uniformly distributed random numbers
pub trait RandomSource {
    fn next_u32(&mut self) -> u32;

    /// Random index in `0..bound`. Returns 0 when `bound` is 0.
    #[allow(clippy::cast_possible_truncation)]
    fn below(&mut self, bound: usize) -> usize {
        // Multiply-shift keeps the result in range without a modulo
        ((u64::from(self.next_u32()) * bound as u64) >> 32) as usize
    }
}

/// Marsaglia xorshift32 generator
///
/// Not cryptographic. Seeded once from the hardware RNG on the device.
#[derive(Debug, Clone)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    /// Zero is a fixed point of xorshift, so it is replaced with a constant.
    pub const fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }
}

impl RandomSource for XorShift32 {
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}
