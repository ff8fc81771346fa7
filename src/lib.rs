pub mod apis;
pub mod category;
pub mod config;
pub mod constants;
pub mod db;
pub mod duration;
pub mod error;
pub mod loader;
pub mod logging;
pub mod orchestrator;
pub mod pipeline;
pub mod record;
pub mod storage;
pub mod transform;
pub mod types;
