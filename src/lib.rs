pub mod db;
pub mod error;
pub mod item;
pub mod monitor;
mod schema;
pub mod scoring;
pub mod settings;
pub mod templates;
pub mod utils;
pub mod watcher;
