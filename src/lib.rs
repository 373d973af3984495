//! Handball Match Engine Library
//!
//! A deterministic, frame-stepped handball match simulation with a
//! bounded-retry attempt protocol.
//!
//! # Features
//!
//! - `realtime` - tokio driver ticking the engine on wall-clock time (enabled by default)
//! - `batch` - random plan generation and parallel fast-forward runs (enabled by default)
//! - `minimal` - Build without optional features for testing/debugging

pub mod config;
pub mod util;
pub mod game;
pub mod session;
pub mod metrics;

// Feature-gated modules (enabled by default)
#[cfg(feature = "batch")]
pub mod batch;
