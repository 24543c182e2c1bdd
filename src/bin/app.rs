#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_net::Stack;
use embassy_time::{Duration, Timer};
use log::{error, info};

use esp_alloc as _;
use esp_backtrace as _;
use esp_hal::{clock::CpuClock, timer::timg::TimerGroup};
use esp_storage::FlashStorage;

use pixelstrip::app::{AnimationEngine, ConfigStore, EngineMetrics, StopHandle};
use pixelstrip::config::{HTTP, STORAGE, STRIP};
use pixelstrip::controllers::{ApiContext, api_router};
use pixelstrip::core::net::http::{HttpServer, Router, StaticFiles};
use pixelstrip::infrastructure::adapters::run_http_server;
use pixelstrip::infrastructure::assets::EmbeddedAssets;
use pixelstrip::infrastructure::drivers::{EspLedDriver, hardware_rng, start_wifi_sta};
use pixelstrip::infrastructure::repositories::FlashConfigStorage;
use pixelstrip::mk_static;
use pixelstrip_composer::XorShift32;

esp_bootloader_esp_idf::esp_app_desc!();

type Storage = FlashConfigStorage<FlashStorage<'static>>;
type Context = ApiContext<'static, Storage, EmbeddedAssets>;
type Engine = AnimationEngine<'static, EspLedDriver<'static>, XorShift32>;

#[embassy_executor::task]
async fn animation_task(mut engine: Engine) {
    engine.run().await;
}

#[embassy_executor::task]
async fn http_task(stack: Stack<'static>, server: &'static HttpServer<'static, Context>) {
    run_http_server(stack, server).await;
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    esp_println::logger::init_logger_from_env();

    // Initialize hardware
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Allocate heap memory (64 + 32 KB)
    esp_alloc::heap_allocator!(
        #[unsafe(link_section = ".dram2_uninit")] size: 64 * 1024
    );
    esp_alloc::heap_allocator!(size: 32 * 1024);

    // Start rtos
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Load the persisted config, falling back to defaults
    let mut storage = FlashConfigStorage::new(
        FlashStorage::new(peripherals.FLASH),
        STORAGE.partition_offset,
        STORAGE.partition_size,
    );
    let store: &'static ConfigStore = mk_static!(ConfigStore, ConfigStore::load(&mut storage));
    let metrics: &'static EngineMetrics = mk_static!(EngineMetrics, EngineMetrics::new());
    let stop: &'static StopHandle = mk_static!(StopHandle, StopHandle::new());

    // Spawn the animation loop
    match EspLedDriver::new(peripherals.RMT, peripherals.GPIO25, STRIP.default_pin) {
        Ok(driver) => {
            let engine = AnimationEngine::new(store, metrics, stop, driver, hardware_rng());
            spawner.spawn(animation_task(engine)).ok();
        }
        Err(err) => error!("led: failed to init RMT: {:?}", err),
    }

    // Bring the network up before serving the API
    let stack = match start_wifi_sta(spawner, peripherals.WIFI).await {
        Ok(stack) => stack,
        Err(err) => {
            error!("network: failed to start: {:?}", err);
            park().await
        }
    };

    let assets: &'static EmbeddedAssets = mk_static!(EmbeddedAssets, EmbeddedAssets::web_ui());
    let static_files = StaticFiles::new(assets, HTTP.static_base_dir, HTTP.index_file);
    let context: &'static Context = mk_static!(
        Context,
        ApiContext::new(store, storage, metrics, static_files)
    );
    let router: &'static Router<Context> = mk_static!(Router<Context>, api_router());
    let server = mk_static!(HttpServer<'static, Context>, HttpServer::new(router, context));
    spawner.spawn(http_task(stack, server)).ok();
    info!("app: listening on port {}", HTTP.port);

    park().await
}

async fn park() -> ! {
    loop {
        Timer::after(Duration::from_secs(5)).await;
    }
}
