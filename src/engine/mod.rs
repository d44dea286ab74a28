pub mod candidate;
pub mod clock;
pub mod config;
pub mod evaluator;
pub mod ledger;
pub mod lifecycle;
pub mod selector;
pub mod server;
