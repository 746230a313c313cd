pub mod commands;
pub mod watcher;

pub use watcher::{ProfileSink, ProfileWatcher};
