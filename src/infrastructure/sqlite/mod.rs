pub mod config_repo;
pub mod migrations;
