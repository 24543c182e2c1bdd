pub mod filesystem;
pub mod storage;

pub use filesystem::*;
pub use storage::*;
