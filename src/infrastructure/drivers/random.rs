use esp_hal::rng::Rng;
use pixelstrip_composer::XorShift32;

/// Seed for the network stack
pub fn get_seed() -> u64 {
    let rng = Rng::new();
    u64::from(rng.random()) << 32 | u64::from(rng.random())
}

/// Effect random source seeded from the hardware RNG
pub fn hardware_rng() -> XorShift32 {
    XorShift32::new(Rng::new().random())
}
