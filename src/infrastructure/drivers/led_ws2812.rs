use esp_hal::rmt::{Error as RmtError, Rmt};
use esp_hal::xtensa_lx::interrupt;
use esp_hal::{gpio::interconnect::PeripheralOutput, peripherals::RMT, time::Rate};
use esp_hal_smartled::{SmartLedsAdapter, buffer_size, smart_led_buffer};
use log::warn;
use smart_leds::SmartLedsWrite;
use static_cell::make_static;

use pixelstrip_composer::{LedDriver, PixelBuffer};

use crate::config::MAX_LED_COUNT;

/// WS2812 driver using the RMT peripheral
///
/// The RMT channel is bound to one GPIO at construction, so `attach` can
/// change the strip length but not the pin.
pub struct EspLedDriver<'a> {
    adapter: SmartLedsAdapter<'a, { buffer_size(MAX_LED_COUNT) }>,
    wired_pin: u8,
    led_count: usize,
}

impl<'a> EspLedDriver<'a> {
    /// Create a new ESP LED driver
    ///
    /// # Arguments
    /// * `rmt` - RMT peripheral
    /// * `pin` - GPIO connected to the LED data line
    /// * `wired_pin` - number of that GPIO
    pub fn new<O>(rmt: RMT<'a>, pin: O, wired_pin: u8) -> Result<Self, RmtError>
    where
        O: PeripheralOutput<'a>,
    {
        let rmt = Rmt::new(rmt, Rate::from_mhz(80))?;

        // Called once at startup, the buffer lives for the entire program
        let rmt_buffer = make_static!(smart_led_buffer!(MAX_LED_COUNT));
        let adapter = SmartLedsAdapter::new(rmt.channel0, pin, rmt_buffer);

        Ok(Self {
            adapter,
            wired_pin,
            led_count: 0,
        })
    }
}

impl LedDriver for EspLedDriver<'static> {
    fn attach(&mut self, pin: u8, led_count: usize) {
        if pin != self.wired_pin {
            warn!(
                "led: strip is wired to GPIO{}, ignoring requested GPIO{}",
                self.wired_pin, pin
            );
        }
        if led_count > MAX_LED_COUNT {
            warn!("led: {} leds requested, driving {}", led_count, MAX_LED_COUNT);
        }
        self.led_count = led_count.min(MAX_LED_COUNT);
    }

    fn write(&mut self, pixels: &PixelBuffer) {
        let colors = pixels.pixels().take(self.led_count);
        interrupt::free(|| {
            if let Err(err) = self.adapter.write(colors) {
                warn!("led: write failed: {:?}", err);
            }
        });
    }
}
