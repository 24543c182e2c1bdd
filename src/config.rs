//! Compile-time configuration

pub const APP_NAME: &str = "pixelstrip";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum number of palette entries
pub const MAX_COLORS: usize = 16;

/// Upper bound for the strip length, sized for the RMT buffer
pub const MAX_LED_COUNT: usize = 300;

/// Size of the buffer a whole request (head and body) must fit into
pub const REQUEST_BUFFER_SIZE: usize = 4096;

/// Maximum number of captured route parameters
pub const MAX_ROUTE_PARAMS: usize = 4;

pub struct HttpConfig {
    pub port: u16,
    pub socket_timeout_secs: u64,
    pub static_base_dir: &'static str,
    pub index_file: &'static str,
}

pub struct StripConfig {
    pub default_pin: u8,
    pub default_led_count: u16,
    pub max_pin: u8,
}

pub struct StorageConfig {
    /// Logical name of the persisted config document
    pub file_name: &'static str,
    /// Base address of the config partition
    pub partition_offset: u32,
    /// Size of the config partition (one flash sector)
    pub partition_size: u32,
}

pub const HTTP: HttpConfig = HttpConfig {
    port: 80,
    socket_timeout_secs: 30,
    static_base_dir: "/public",
    index_file: "index.html",
};

pub const STRIP: StripConfig = StripConfig {
    default_pin: 25,
    default_led_count: 60,
    max_pin: 39,
};

pub const STORAGE: StorageConfig = StorageConfig {
    file_name: "config.json",
    partition_offset: 0x31_0000,
    partition_size: 4096,
};

pub struct DeviceConfig {
    pub hostname: &'static str,
}

pub const DEVICE: DeviceConfig = DeviceConfig {
    hostname: "pixelstrip",
};

#[cfg(feature = "esp32")]
pub struct WifiConfig {
    pub ssid: &'static str,
    pub password: &'static str,
}

#[cfg(feature = "esp32")]
pub const WIFI: WifiConfig = WifiConfig {
    ssid: env!("WIFI_SSID"),
    password: env!("WIFI_PASSWORD"),
};
