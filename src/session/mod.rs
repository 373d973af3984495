//! Attempt/retry sessions
//!
//! A session carries the plan, the attempt budget and the failure highlight
//! across engine runs against one opponent.

pub mod match_session;

pub use match_session::{AttemptRecord, MatchSession, SessionError, SessionState};
