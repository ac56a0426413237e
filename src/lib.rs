pub mod api;
pub mod cards;
pub mod chart;
pub mod cli;
pub mod client;
pub mod config;
pub mod display;
pub mod error;
pub mod play;
pub mod reconcile;
pub mod rules;
pub mod session;
