//! Infrastructure layer
//!
//! Concrete implementations of the domain ports and the device drivers.

pub mod adapters;
pub mod assets;
#[cfg(feature = "esp32")]
pub mod drivers;
pub mod repositories;
