mod flash_config;

pub use flash_config::FlashConfigStorage;
