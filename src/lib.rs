//! Timed image-naming trivia for Teamfight Tactics traits, tacticians and
//! augments.
//!
//! [`engine::lifecycle::RoundLifecycle`] is the state machine every mode runs;
//! [`engine::server::GameServer`] drives it on a tokio task with a real clock.

pub mod assets;
pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod metrics;
