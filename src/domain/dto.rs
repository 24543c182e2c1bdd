use alloc::string::String;
use alloc::vec::Vec;

use pixelstrip_composer::{BLACK, parse_hex, to_hex};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::MAX_COLORS;
use crate::domain::entity::{
    CRAWL,
    Config,
    FADE,
    FieldRange,
    NLEDS,
    PERIOD_MS,
    PIN,
    Palette,
    RANDOM,
    SPACE_BETWEEN,
    SPREAD,
};

/// Wire and storage form of [`Config`], colors as `#rrggbb` strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigDto {
    pub colors: Vec<String>,
    pub spread: u8,
    pub space_between: u8,
    pub crawl: i8,
    pub fade: u8,
    pub period_ms: u16,
    pub random: u8,
    pub pin: u8,
    pub nleds: u16,
}

impl From<&Config> for ConfigDto {
    fn from(config: &Config) -> Self {
        Self {
            colors: config
                .colors
                .iter()
                .map(|&color| String::from(to_hex(color).as_str()))
                .collect(),
            spread: config.spread,
            space_between: config.space_between,
            crawl: config.crawl,
            fade: config.fade,
            period_ms: config.period_ms,
            random: config.random,
            pin: config.pin,
            nleds: config.nleds,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VersionDto {
    pub app: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MetricsDto {
    pub avgtick_ms: f32,
}

/// Validated candidate update.
///
/// `None` means "keep the stored value": the field was missing, had the
/// wrong type or failed conversion. Present numeric fields are already
/// clamped into range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPatch {
    pub colors: Option<Palette>,
    pub spread: Option<u8>,
    pub space_between: Option<u8>,
    pub crawl: Option<i8>,
    pub fade: Option<u8>,
    pub period_ms: Option<u16>,
    pub random: Option<u8>,
    pub pin: Option<u8>,
    pub nleds: Option<u16>,
}

impl ConfigPatch {
    /// Validate a JSON document. Returns `None` unless it is an object.
    pub fn from_json(document: &[u8]) -> Option<Self> {
        let value: Value = serde_json::from_slice(document).ok()?;
        Self::from_value(&value)
    }

    /// Validate a parsed JSON value. Unknown keys are ignored.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(Self {
            colors: object.get("colors").and_then(palette),
            spread: ranged(object, "spread", SPREAD),
            space_between: ranged(object, "space_between", SPACE_BETWEEN),
            crawl: ranged(object, "crawl", CRAWL),
            fade: ranged(object, "fade", FADE),
            period_ms: ranged(object, "period_ms", PERIOD_MS),
            random: ranged(object, "random", RANDOM),
            pin: ranged(object, "pin", PIN),
            nleds: ranged(object, "nleds", NLEDS),
        })
    }
}

impl Config {
    /// Merge a validated patch over this config
    #[must_use]
    pub fn apply(&self, patch: &ConfigPatch) -> Config {
        Config {
            colors: patch.colors.clone().unwrap_or_else(|| self.colors.clone()),
            spread: patch.spread.unwrap_or(self.spread),
            space_between: patch.space_between.unwrap_or(self.space_between),
            crawl: patch.crawl.unwrap_or(self.crawl),
            fade: patch.fade.unwrap_or(self.fade),
            period_ms: patch.period_ms.unwrap_or(self.period_ms),
            random: patch.random.unwrap_or(self.random),
            pin: patch.pin.unwrap_or(self.pin),
            nleds: patch.nleds.unwrap_or(self.nleds),
        }
    }
}

/// Integer field clamped into `range`.
///
/// Only JSON integers count; floats, strings, booleans and null are
/// rejected. Integers beyond `i64` saturate before clamping.
fn ranged<T: TryFrom<i64>>(object: &Map<String, Value>, key: &str, range: FieldRange) -> Option<T> {
    let Value::Number(number) = object.get(key)? else {
        return None;
    };
    let value = match number.as_i64() {
        Some(value) => value,
        None if number.is_u64() => i64::MAX,
        None => return None,
    };
    T::try_from(range.clamp(value)).ok()
}

/// Array of 1..=`MAX_COLORS` hex strings. Malformed entries become black.
fn palette(value: &Value) -> Option<Palette> {
    let entries = value.as_array()?;
    if entries.is_empty() || entries.len() > MAX_COLORS {
        return None;
    }
    let mut colors = Palette::new();
    for entry in entries {
        let color = entry.as_str().and_then(parse_hex).unwrap_or(BLACK);
        colors.push(color).ok()?;
    }
    Some(colors)
}
