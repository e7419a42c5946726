pub mod in_memory;
pub mod notifier;
pub mod price_feed;
pub mod state_file;
