// Golden Dog - Meme-token risk scoring with feedback-learned weights
// Deterministic risk classification plus an adaptive memory that learns from outcomes

pub mod classifier;
pub mod coerce;
pub mod config;
pub mod memory;
pub mod scanner;
pub mod server_api;
pub mod telegram;
pub mod types;

pub use memory::AdaptiveMemory;
