pub mod job;
pub mod voice;
