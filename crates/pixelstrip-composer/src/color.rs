use core::fmt::Write as _;

use heapless::String;
use smart_leds::RGB8;

pub type Rgb = RGB8;

/// Length of a `#rrggbb` string
pub const HEX_COLOR_LEN: usize = 7;

pub type HexColor = String<HEX_COLOR_LEN>;

pub const BLACK: Rgb = rgb(0, 0, 0);
pub const WHITE: Rgb = rgb(255, 255, 255);
pub const RED: Rgb = rgb(255, 0, 0);
pub const ORANGE: Rgb = rgb(255, 127, 0);
pub const YELLOW: Rgb = rgb(255, 255, 0);
pub const CHARTREUSE: Rgb = rgb(127, 255, 0);
pub const GREEN: Rgb = rgb(0, 255, 0);
pub const SPRING_GREEN: Rgb = rgb(0, 255, 127);
pub const CYAN: Rgb = rgb(0, 255, 255);
pub const AZURE: Rgb = rgb(0, 127, 255);
pub const BLUE: Rgb = rgb(0, 0, 255);
pub const VIOLET: Rgb = rgb(127, 0, 255);
pub const MAGENTA: Rgb = rgb(255, 0, 255);
pub const ROSE: Rgb = rgb(255, 0, 127);

pub const RAINBOW: [Rgb; 12] = [
    RED,
    ORANGE,
    YELLOW,
    CHARTREUSE,
    GREEN,
    SPRING_GREEN,
    CYAN,
    AZURE,
    BLUE,
    VIOLET,
    MAGENTA,
    ROSE,
];
pub const XMAS: [Rgb; 3] = [RED, WHITE, GREEN];
pub const XMAS_ALT: [Rgb; 5] = [RED, BLUE, ORANGE, GREEN, YELLOW];

/// Build a color in const context
pub const fn rgb(r: u8, g: u8, b: u8) -> Rgb {
    Rgb { r, g, b }
}

/// Parse a `#rrggbb` string. Hex digits may be upper or lower case.
pub fn parse_hex(value: &str) -> Option<Rgb> {
    let digits = value.strip_prefix('#')?;
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |at: usize| u8::from_str_radix(&digits[at..at + 2], 16).ok();

    Some(rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// Format a color as lower case `#rrggbb`
pub fn to_hex(color: Rgb) -> HexColor {
    let mut out = HexColor::new();
    // 7 bytes always fit
    let _ = write!(out, "#{:02x}{:02x}{:02x}", color.r, color.g, color.b);
    out
}
