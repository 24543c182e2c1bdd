//! ESP32 drivers

mod led_ws2812;
mod random;
mod wifi_sta;

pub use led_ws2812::EspLedDriver;
pub use random::{get_seed, hardware_rng};
pub use wifi_sta::{WifiError, start_wifi_sta};
