pub mod error;
pub mod media;
pub mod types;
pub mod utils;
