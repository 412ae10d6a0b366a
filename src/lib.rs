pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod handler;
pub mod leveling;
pub mod services;
pub mod status;
pub mod store;

use std::sync::Arc;

/// Custom data passed to all commands
pub struct Data {
    pub config: config::Config,
    pub db: db::Database,
    pub engine: Arc<leveling::LevelEngine>,
    /// Present only when message logging is enabled
    pub message_log: Option<services::message_log::MessageLogger>,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
