//! Experience and leveling engine.
//!
//! A message passes the per-guild [`cooldown::CooldownGate`], feeds
//! [`progression::Progression`], and on level-up triggers a detached
//! [`fanout::Fanout`] to every subscribed channel.

pub mod cooldown;
pub mod fanout;
pub mod intake;
pub mod keyed;
pub mod model;
pub mod progression;
pub mod registry;
pub mod source;

pub use intake::{EngineOptions, IntakeOutcome, LevelEngine, MessageEvent};
