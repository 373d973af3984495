pub mod action_log;
pub mod agent;
pub mod constants;
pub mod engine;
pub mod fast_forward;
pub mod match_result;
pub mod position;
pub mod probability;
pub mod rng;
pub mod setup;
pub mod state;
pub mod systems;
pub mod tactic;

#[cfg(feature = "realtime")]
pub mod realtime;
