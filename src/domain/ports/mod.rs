pub mod config_store;
pub mod signal_source;
