//! Batch-run metrics
//!
//! Counters for fast-forward runs, shared across rayon workers. Rendered as
//! Prometheus-style text or JSON once a batch finishes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::game::match_result::{RunReason, SyncRunResult};

const REASONS: [RunReason; 6] = [
    RunReason::Goal,
    RunReason::Intercepted,
    RunReason::AttemptFailed,
    RunReason::TacticsCompletedNoGoal,
    RunReason::Timeout,
    RunReason::Error,
];

#[derive(Debug)]
pub struct BatchMetrics {
    pub runs: AtomicU64,
    pub boundary_violations: AtomicU64,
    pub total_frames: AtomicU64,
    /// Wall time spent inside `run_sync` (microseconds)
    pub run_time_us: AtomicU64,
    reasons: [AtomicU64; 6],
    start_time: Instant,
    frame_history: RwLock<Vec<u32>>,
}

/// Frame-count distribution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FramePercentiles {
    pub p50: u32,
    pub p95: u32,
    pub p99: u32,
    pub max: u32,
}

impl BatchMetrics {
    pub fn new() -> Self {
        Self {
            runs: AtomicU64::new(0),
            boundary_violations: AtomicU64::new(0),
            total_frames: AtomicU64::new(0),
            run_time_us: AtomicU64::new(0),
            reasons: Default::default(),
            start_time: Instant::now(),
            frame_history: RwLock::new(Vec::new()),
        }
    }

    /// Record one finished run and how long it took
    pub fn record(&self, result: &SyncRunResult, elapsed: Duration) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        self.reasons[reason_index(result.reason)].fetch_add(1, Ordering::Relaxed);
        self.total_frames.fetch_add(result.frames as u64, Ordering::Relaxed);
        self.run_time_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
        self.boundary_violations.fetch_add(
            result.final_state.boundary_violations.len() as u64,
            Ordering::Relaxed,
        );
        self.frame_history.write().push(result.frames);
    }

    pub fn count(&self, reason: RunReason) -> u64 {
        self.reasons[reason_index(reason)].load(Ordering::Relaxed)
    }

    /// Share of runs that scored, in percent
    pub fn win_rate(&self) -> f64 {
        let runs = self.runs.load(Ordering::Relaxed);
        if runs == 0 {
            return 0.0;
        }
        self.count(RunReason::Goal) as f64 * 100.0 / runs as f64
    }

    pub fn frame_percentiles(&self) -> FramePercentiles {
        let history = self.frame_history.read();
        if history.is_empty() {
            return FramePercentiles::default();
        }
        let mut sorted = history.clone();
        sorted.sort_unstable();

        let at = |q: f32| sorted[((sorted.len() as f32 * q) as usize).min(sorted.len() - 1)];
        FramePercentiles {
            p50: at(0.50),
            p95: at(0.95),
            p99: at(0.99),
            max: sorted.last().copied().unwrap_or(0),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Prometheus text format
    pub fn to_text(&self) -> String {
        let mut output = String::with_capacity(2048);

        macro_rules! metric {
            ($name:expr, $help:expr, $type:expr, $value:expr) => {
                output.push_str(&format!(
                    "# HELP {} {}\n# TYPE {} {}\n{} {}\n",
                    $name, $help, $name, $type, $name, $value
                ));
            };
        }

        metric!("handball_batch_runs_total", "Fast-forward runs completed", "counter",
            self.runs.load(Ordering::Relaxed));
        metric!("handball_batch_frames_total", "Frames simulated across all runs", "counter",
            self.total_frames.load(Ordering::Relaxed));
        metric!("handball_batch_boundary_violations_total", "Agents found outside the court envelope", "counter",
            self.boundary_violations.load(Ordering::Relaxed));
        metric!("handball_batch_run_time_microseconds_total", "Wall time spent simulating", "counter",
            self.run_time_us.load(Ordering::Relaxed));

        output.push_str("# HELP handball_batch_outcomes_total Runs by end reason\n");
        output.push_str("# TYPE handball_batch_outcomes_total counter\n");
        for reason in REASONS {
            output.push_str(&format!(
                "handball_batch_outcomes_total{{reason=\"{}\"}} {}\n",
                reason,
                self.count(reason)
            ));
        }

        let frames = self.frame_percentiles();
        metric!("handball_batch_frames_p50", "Median frames per run", "gauge", frames.p50);
        metric!("handball_batch_frames_p95", "95th percentile frames per run", "gauge", frames.p95);
        metric!("handball_batch_frames_p99", "99th percentile frames per run", "gauge", frames.p99);
        metric!("handball_batch_frames_max", "Longest run in frames", "gauge", frames.max);
        metric!("handball_batch_uptime_seconds", "Batch wall time in seconds", "counter",
            self.uptime_seconds());

        output
    }

    pub fn to_json(&self) -> serde_json::Value {
        let frames = self.frame_percentiles();
        let outcomes: serde_json::Map<String, serde_json::Value> = REASONS
            .iter()
            .map(|r| (r.to_string(), self.count(*r).into()))
            .collect();

        serde_json::json!({
            "runs": self.runs.load(Ordering::Relaxed),
            "win_rate": self.win_rate(),
            "outcomes": outcomes,
            "frames": {
                "total": self.total_frames.load(Ordering::Relaxed),
                "p50": frames.p50,
                "p95": frames.p95,
                "p99": frames.p99,
                "max": frames.max,
            },
            "boundary_violations": self.boundary_violations.load(Ordering::Relaxed),
            "run_time_us": self.run_time_us.load(Ordering::Relaxed),
        })
    }
}

impl Default for BatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn reason_index(reason: RunReason) -> usize {
    match reason {
        RunReason::Goal => 0,
        RunReason::Intercepted => 1,
        RunReason::AttemptFailed => 2,
        RunReason::TacticsCompletedNoGoal => 3,
        RunReason::Timeout => 4,
        RunReason::Error => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::match_result::{FinalState, StateFlags};
    use crate::game::position::Slot;
    use crate::game::state::Score;
    use crate::util::vec2::Vec2;

    fn result(reason: RunReason, frames: u32) -> SyncRunResult {
        SyncRunResult {
            success: reason == RunReason::Goal,
            reason,
            message: None,
            score: Score::default(),
            frames,
            outcome: None,
            failed_step_index: None,
            ball_holder_history: vec![Slot::CenterBack],
            action_log: Vec::new(),
            final_state: FinalState {
                score: Score::default(),
                attacker_positions: Vec::new(),
                defender_positions: Vec::new(),
                ball_position: Vec2::ZERO,
                ball_holder: Slot::CenterBack,
                boundary_violations: Vec::new(),
                flags: StateFlags {
                    ball_animating: false,
                    is_paused: false,
                    pending_takeover: false,
                    awaiting_shot_result: false,
                },
                tactics_executed: 0,
                total_tactics: 1,
            },
        }
    }

    #[test]
    fn test_counts_by_reason() {
        let metrics = BatchMetrics::new();
        metrics.record(&result(RunReason::Goal, 40), Duration::from_micros(10));
        metrics.record(&result(RunReason::Intercepted, 20), Duration::from_micros(10));
        metrics.record(&result(RunReason::Intercepted, 30), Duration::from_micros(10));

        assert_eq!(metrics.runs.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.count(RunReason::Intercepted), 2);
        assert_eq!(metrics.count(RunReason::Timeout), 0);
        assert!((metrics.win_rate() - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(metrics.frame_percentiles().max, 40);
    }

    #[test]
    fn test_empty_percentiles() {
        assert_eq!(BatchMetrics::new().frame_percentiles(), FramePercentiles::default());
    }

    #[test]
    fn test_renderings() {
        let metrics = BatchMetrics::new();
        metrics.record(&result(RunReason::TacticsCompletedNoGoal, 12), Duration::ZERO);

        let text = metrics.to_text();
        assert!(text.contains("handball_batch_outcomes_total{reason=\"tactics_completed_no_goal\"} 1"));

        let json = metrics.to_json();
        assert_eq!(json["runs"], 1);
        assert_eq!(json["outcomes"]["goal"], 0);
        assert_eq!(json["frames"]["max"], 12);
    }
}
