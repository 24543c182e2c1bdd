use heapless::Vec;
use pixelstrip_composer::{BLACK, Rgb};

use crate::config::{MAX_COLORS, MAX_LED_COUNT, STRIP};

/// Ordered, non-empty list of colors
pub type Palette = Vec<Rgb, MAX_COLORS>;

/// Inclusive bounds of an integer config field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRange {
    pub min: i64,
    pub max: i64,
}

impl FieldRange {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub const fn clamp(self, value: i64) -> i64 {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }
}

pub const SPREAD: FieldRange = FieldRange::new(1, 50);
pub const SPACE_BETWEEN: FieldRange = FieldRange::new(0, 50);
pub const CRAWL: FieldRange = FieldRange::new(-1, 1);
pub const FADE: FieldRange = FieldRange::new(0, 1);
pub const PERIOD_MS: FieldRange = FieldRange::new(10, 5000);
pub const RANDOM: FieldRange = FieldRange::new(0, 100);
pub const PIN: FieldRange = FieldRange::new(0, STRIP.max_pin as i64);
pub const NLEDS: FieldRange = FieldRange::new(1, MAX_LED_COUNT as i64);

/// Animation configuration.
///
/// Every field is always within its range; updates go through
/// [`Config::apply`] with an already validated [`ConfigPatch`].
///
/// [`ConfigPatch`]: crate::domain::dto::ConfigPatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub colors: Palette,
    pub spread: u8,
    pub space_between: u8,
    /// Crawl direction: -1, 0 or 1
    pub crawl: i8,
    /// Fade flag: 0 or 1
    pub fade: u8,
    pub period_ms: u16,
    /// Percent of the strip repainted per tick
    pub random: u8,
    pub pin: u8,
    pub nleds: u16,
}

impl Default for Config {
    fn default() -> Self {
        let mut colors = Palette::new();
        // Capacity is never zero
        let _ = colors.push(BLACK);
        Self {
            colors,
            spread: 1,
            space_between: 1,
            crawl: 1,
            fade: 1,
            period_ms: 250,
            random: 5,
            pin: STRIP.default_pin,
            nleds: STRIP.default_led_count,
        }
    }
}

impl Config {
    pub fn fade_enabled(&self) -> bool {
        self.fade != 0
    }

    /// Strip geometry the pixel buffer is allocated for
    pub fn layout(&self) -> (u8, u16) {
        (self.pin, self.nleds)
    }
}
