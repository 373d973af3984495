//! Real-time driver
//!
//! Ticks an engine on a tokio interval with `dt` measured from the clock.
//! Interception overlays are delayed by the configured time in a spawned
//! continuation that first checks the driver is still active, so `stop()`
//! never leaves a callback behind.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::game::engine::{EngineError, MatchEngine, MatchEvent, MatchObserver, MatchSnapshot};
use crate::game::state::MatchPhase;
use crate::util::vec2::Vec2;

pub struct RealtimeDriver;

impl RealtimeDriver {
    /// Start `engine` and tick it until the match ends or the handle stops it.
    /// Must be called inside a tokio runtime.
    pub fn spawn<O>(mut engine: MatchEngine, observer: O) -> Result<DriverHandle<O>, EngineError>
    where
        O: MatchObserver + Send + 'static,
    {
        engine.start()?;
        let tick = Duration::from_secs_f64(1.0 / engine.config().tick_rate.max(1) as f64);
        let overlay = Duration::from_millis(engine.config().interception_overlay_ms);

        let shared = Shared {
            engine: Arc::new(Mutex::new(engine)),
            observer: Arc::new(Mutex::new(observer)),
            active: Arc::new(AtomicBool::new(true)),
            overlay,
        };

        let task = {
            let shared = shared.clone();
            tokio::spawn(async move { shared.run(tick).await })
        };

        Ok(DriverHandle { shared, task })
    }
}

struct Shared<O> {
    engine: Arc<Mutex<MatchEngine>>,
    observer: Arc<Mutex<O>>,
    active: Arc<AtomicBool>,
    overlay: Duration,
}

impl<O> Clone for Shared<O> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            observer: Arc::clone(&self.observer),
            active: Arc::clone(&self.active),
            overlay: self.overlay,
        }
    }
}

impl<O: MatchObserver + Send + 'static> Shared<O> {
    async fn run(self, tick: Duration) {
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = Instant::now();

        loop {
            interval.tick().await;
            if !self.active.load(Ordering::Acquire) {
                break;
            }

            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f32();
            last = now;

            let events = match self.engine.lock().step(dt) {
                Ok(events) => events,
                Err(e) => {
                    tracing::debug!(error = %e, "realtime loop exiting");
                    break;
                }
            };
            if self.publish(events) {
                break;
            }
        }
    }

    /// Forward events to the observer. Returns true once the match ended.
    fn publish(&self, events: Vec<MatchEvent>) -> bool {
        let mut ended = false;
        for event in events {
            match event {
                MatchEvent::Interception(info) => {
                    let shared = self.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(shared.overlay).await;
                        if shared.active.load(Ordering::Acquire) {
                            shared.observer.lock().on_interception(&info);
                        }
                    });
                }
                MatchEvent::MatchEnd(_) => {
                    self.active.store(false, Ordering::Release);
                    event.dispatch(&mut *self.observer.lock());
                    ended = true;
                }
                other => other.dispatch(&mut *self.observer.lock()),
            }
        }
        ended
    }
}

/// Caller-side control of a running match
pub struct DriverHandle<O> {
    shared: Shared<O>,
    task: JoinHandle<()>,
}

impl<O: MatchObserver + Send + 'static> DriverHandle<O> {
    /// Acknowledge the pending interception
    pub fn resume(&self) -> Result<(), EngineError> {
        let events = self.shared.engine.lock().resume()?;
        self.shared.publish(events);
        Ok(())
    }

    /// Tear down. Safe at any time, including with an overlay pending.
    pub fn stop(&self) {
        self.shared.active.store(false, Ordering::Release);
        self.shared.engine.lock().stop();
        self.task.abort();
    }

    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::Acquire)
    }

    pub fn phase(&self) -> MatchPhase {
        self.shared.engine.lock().phase()
    }

    pub fn ball_position(&self) -> Vec2 {
        self.shared.engine.lock().ball_position()
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        self.shared.engine.lock().snapshot()
    }

    pub fn observer(&self) -> Arc<Mutex<O>> {
        Arc::clone(&self.shared.observer)
    }

    /// Wait for the tick loop to exit
    pub async fn join(self) {
        // An aborted task reports a JoinError; either way the loop is gone
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::match_result::{MatchEndInfo, MatchOutcome};
    use crate::game::rng::MatchRng;
    use crate::game::setup::{MatchSetup, OpponentDescriptor, RosterSnapshot, Stats};
    use crate::game::state::{InterceptionInfo, Score};
    use crate::game::systems::defense::DefenseBehavior;
    use crate::game::tactic::{ShootType, TacticPlan, TacticStep};

    #[derive(Default)]
    struct Recorder {
        interceptions: Vec<InterceptionInfo>,
        scores: Vec<Score>,
        end: Option<MatchEndInfo>,
    }

    impl MatchObserver for Recorder {
        fn on_score(&mut self, score: &Score) {
            self.scores.push(*score);
        }
        fn on_interception(&mut self, info: &InterceptionInfo) {
            self.interceptions.push(info.clone());
        }
        fn on_match_end(&mut self, info: &MatchEndInfo) {
            self.end = Some(info.clone());
        }
    }

    /// The zone CB sits on the center-shot line; a 99 roll loses the breakthrough
    fn blocked_shot_engine() -> MatchEngine {
        let plan = TacticPlan::new(vec![TacticStep::Shoot { shoot_type: ShootType::Center }]).unwrap();
        let opponent = OpponentDescriptor::new("Harbor City", DefenseBehavior::Zone, Stats::uniform(10.0));
        MatchEngine::new(MatchSetup::new(RosterSnapshot::default(), opponent, plan).with_rng(MatchRng::scripted([99.0])))
    }

    #[tokio::test(start_paused = true)]
    async fn test_interception_overlay_then_resume() {
        let handle = RealtimeDriver::spawn(blocked_shot_engine(), Recorder::default()).unwrap();

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(handle.phase(), MatchPhase::Paused);
        // Overlay still pending
        assert!(handle.observer().lock().interceptions.is_empty());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(handle.observer().lock().interceptions.len(), 1);

        tokio_test::assert_ok!(handle.resume());
        {
            let observer = handle.observer();
            let recorder = observer.lock();
            assert_eq!(recorder.scores, vec![Score { attacker: 0, defender: 1 }]);
            let end = recorder.end.as_ref().unwrap();
            assert_eq!(end.outcome, MatchOutcome::AttemptFailed);
            assert_eq!(end.failed_step_index, Some(0));
        }
        assert!(!handle.is_active());
        let err = tokio_test::assert_err!(handle.resume());
        assert_eq!(err, EngineError::NotPaused);
        handle.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_pending_overlay() {
        let handle = RealtimeDriver::spawn(blocked_shot_engine(), Recorder::default()).unwrap();

        tokio::time::sleep(Duration::from_millis(450)).await;
        assert_eq!(handle.phase(), MatchPhase::Paused);
        handle.stop();
        handle.stop();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(handle.observer().lock().interceptions.is_empty());
        assert_eq!(handle.phase(), MatchPhase::Ended);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ball_position_polling() {
        let handle = RealtimeDriver::spawn(blocked_shot_engine(), Recorder::default()).unwrap();
        let start = handle.ball_position();
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_ne!(handle.ball_position(), start);
        handle.stop();
    }
}
