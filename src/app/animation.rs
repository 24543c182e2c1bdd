//! Periodic animation loop
//!
//! Every tick takes one config snapshot and applies `crawl`, `fade` and
//! `random_fill` to the pixel buffer before handing it to the driver. The
//! buffer is reallocated only when the strip layout (`pin`, `nleds`)
//! changes.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embassy_time::{Duration, Instant, Timer};
use log::{debug, info};
use pixelstrip_composer::{LedDriver, PixelBuffer, RandomSource};

use crate::app::ConfigStore;

/// Number of tick samples averaged before the window restarts
pub const TICK_WINDOW: u32 = 10;

/// Cooperative stop flag, polled once per tick
#[derive(Debug, Default)]
pub struct StopHandle {
    stopped: AtomicBool,
}

impl StopHandle {
    pub const fn new() -> Self {
        Self {
            stopped: AtomicBool::new(false),
        }
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    /// Clear the flag so the loop can be started again
    pub fn resume(&self) {
        self.stopped.store(false, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

/// Read-only view of the engine timing, shared with the HTTP side
#[derive(Debug, Default)]
pub struct EngineMetrics {
    avg_tick_us: AtomicU32,
}

impl EngineMetrics {
    pub const fn new() -> Self {
        Self {
            avg_tick_us: AtomicU32::new(0),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn avg_tick_ms(&self) -> f32 {
        self.avg_tick_us.load(Ordering::Relaxed) as f32 / 1000.0
    }

    fn publish(&self, avg_tick_us: u32) {
        self.avg_tick_us.store(avg_tick_us, Ordering::Relaxed);
    }
}

/// Average over at most [`TICK_WINDOW`] samples
#[derive(Debug, Default, Clone)]
pub struct TickStats {
    sum_us: u64,
    samples: u32,
}

impl TickStats {
    /// Add a sample and return the current average in microseconds.
    ///
    /// Zero samples carry no information and are skipped. A full window is
    /// discarded before the next sample is added.
    pub fn record(&mut self, elapsed_us: u64) -> u32 {
        if elapsed_us > 0 {
            if self.samples >= TICK_WINDOW {
                self.sum_us = 0;
                self.samples = 0;
            }
            self.sum_us = self.sum_us.saturating_add(elapsed_us);
            self.samples += 1;
        }
        self.average_us()
    }

    pub fn average_us(&self) -> u32 {
        if self.samples == 0 {
            return 0;
        }
        u32::try_from(self.sum_us / u64::from(self.samples)).unwrap_or(u32::MAX)
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }
}

/// Time to sleep after a tick that took `elapsed`.
///
/// An overrun tick still sleeps a whole period so the other tasks get to
/// run.
pub fn next_sleep(period: Duration, elapsed: Duration) -> Duration {
    if elapsed >= period {
        period
    } else {
        period - elapsed
    }
}

pub struct AnimationEngine<'a, D: LedDriver, R: RandomSource> {
    store: &'a ConfigStore,
    metrics: &'a EngineMetrics,
    stop: &'a StopHandle,
    driver: D,
    rng: R,
    buffer: PixelBuffer,
    layout: Option<(u8, u16)>,
    stats: TickStats,
}

impl<'a, D: LedDriver, R: RandomSource> AnimationEngine<'a, D, R> {
    pub fn new(
        store: &'a ConfigStore,
        metrics: &'a EngineMetrics,
        stop: &'a StopHandle,
        driver: D,
        rng: R,
    ) -> Self {
        Self {
            store,
            metrics,
            stop,
            driver,
            rng,
            buffer: PixelBuffer::new(0),
            layout: None,
            stats: TickStats::default(),
        }
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Run one pass of the pipeline and return the period to wait, in ms
    pub fn tick_once(&mut self) -> u16 {
        let config = self.store.snapshot();

        if self.layout != Some(config.layout()) {
            let led_count = usize::from(config.nleds);
            self.buffer = PixelBuffer::new(led_count);
            self.buffer
                .fill_pattern(&config.colors, config.spread, config.space_between);
            self.driver.attach(config.pin, led_count);
            self.layout = Some(config.layout());
            info!("animation: allocated {} leds on pin {}", led_count, config.pin);
        }

        self.buffer.crawl(config.crawl);
        self.buffer.fade(config.fade_enabled());
        self.buffer
            .random_fill(config.random, &config.colors, &mut self.rng);
        self.driver.write(&self.buffer);

        config.period_ms
    }

    /// Tick until the stop handle is set.
    ///
    /// The flag is checked at the top of every iteration, so stopping takes
    /// effect within one period.
    pub async fn run(&mut self) {
        info!("animation: started");
        while !self.stop.is_stopped() {
            let started = Instant::now();
            let period_ms = self.tick_once();
            let elapsed = started.elapsed();

            let average = self.stats.record(elapsed.as_micros());
            self.metrics.publish(average);

            let period = Duration::from_millis(u64::from(period_ms));
            Timer::after(next_sleep(period, elapsed)).await;
        }
        debug!("animation: stopped");
    }
}
