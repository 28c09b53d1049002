//! Automatic execution: a repeating timer task that steps an engine at a fixed interval.
//!
//! `AutoRun` holds no clock. The caller reports how much time passed through `advance`,
//! which makes the schedule deterministic under test and lets each front-end use whatever
//! timing source it already has.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::machine::TuringEngine;

/// Delay between two automatic steps.
pub const DEFAULT_RUN_INTERVAL: Duration = Duration::from_millis(500);

/// Lifecycle of an `AutoRun`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Created; the first step fires on the next `advance`.
    Pending,
    /// Stepping once per interval.
    Active,
    /// A step was not applied or the machine halted.
    Finished,
    /// The token was cancelled.
    Cancelled,
}

#[derive(Debug)]
pub struct AutoRun {
    interval: Duration,
    elapsed: Duration,
    state: RunState,
    token: CancellationToken,
}

impl Default for AutoRun {
    fn default() -> Self {
        Self::new(DEFAULT_RUN_INTERVAL)
    }
}

impl AutoRun {
    /// Creates a pending run. A zero interval is raised to one millisecond.
    pub fn new(interval: Duration) -> Self {
        Self::with_token(interval, CancellationToken::new())
    }

    /// Creates a pending run that stops when `token` is cancelled.
    pub fn with_token(interval: Duration, token: CancellationToken) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            elapsed: Duration::ZERO,
            state: RunState::Pending,
            token,
        }
    }

    /// A handle that can stop this run from elsewhere. Clones share the same cancellation.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&mut self) {
        self.token.cancel();
        self.state = RunState::Cancelled;
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the run will take further steps.
    pub fn is_active(&self) -> bool {
        matches!(self.state, RunState::Pending | RunState::Active) && !self.token.is_cancelled()
    }

    /// Time left until the next scheduled step.
    pub fn next_due(&self) -> Duration {
        match self.state {
            RunState::Pending => Duration::ZERO,
            _ => self.interval.saturating_sub(self.elapsed),
        }
    }

    /// Reports that `elapsed` time has passed and takes every step that became due.
    ///
    /// The first call takes one step immediately regardless of `elapsed`; after that one step
    /// is taken per full interval. Cancellation is checked before every step.
    ///
    /// Returns the number of transitions applied.
    pub fn advance(&mut self, engine: &mut TuringEngine, elapsed: Duration) -> usize {
        let mut applied = 0;

        if self.state == RunState::Pending {
            self.state = RunState::Active;
            applied += self.fire(engine);
        } else if self.state == RunState::Active {
            self.elapsed += elapsed;
        }

        while self.state == RunState::Active && self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            applied += self.fire(engine);
        }

        applied
    }

    /// Takes one step unless cancelled, returning 1 if a transition was applied.
    fn fire(&mut self, engine: &mut TuringEngine) -> usize {
        if self.token.is_cancelled() {
            tracing::debug!("Auto-run cancelled");
            self.state = RunState::Cancelled;
            return 0;
        }

        let step = engine.step();
        if !step.applied() || engine.is_halted() {
            tracing::debug!(?step, steps = engine.step_count(), "Auto-run finished");
            self.state = RunState::Finished;
        }

        usize::from(step.applied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Status;

    fn counter_engine(input: &str) -> TuringEngine {
        // Walks right over 1s and accepts on the first blank.
        let mut engine = TuringEngine::new();
        engine
            .initialize(input, "q0", ["qf"], None, ["q0,1 → q0,1,R", "q0,_ → qf,_,R"])
            .unwrap();
        engine
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_first_advance_steps_immediately() {
        let mut engine = counter_engine("111");
        let mut run = AutoRun::new(ms(500));

        assert_eq!(run.next_due(), Duration::ZERO);
        assert_eq!(run.advance(&mut engine, Duration::ZERO), 1);
        assert_eq!(engine.step_count(), 1);
        assert_eq!(run.state(), RunState::Active);
        assert_eq!(run.next_due(), ms(500));
    }

    #[test]
    fn test_steps_once_per_interval() {
        let mut engine = counter_engine("1111111");
        let mut run = AutoRun::new(ms(500));
        run.advance(&mut engine, Duration::ZERO);

        assert_eq!(run.advance(&mut engine, ms(499)), 0);
        assert_eq!(run.next_due(), ms(1));
        assert_eq!(run.advance(&mut engine, ms(1)), 1);
        assert_eq!(run.advance(&mut engine, ms(1250)), 2);
        assert_eq!(engine.step_count(), 4);
        assert_eq!(run.next_due(), ms(250));
    }

    #[test]
    fn test_finishes_when_machine_accepts() {
        let mut engine = counter_engine("11");
        let mut run = AutoRun::new(ms(100));

        run.advance(&mut engine, Duration::ZERO);
        let applied = run.advance(&mut engine, ms(10_000));

        assert_eq!(applied, 2);
        assert_eq!(engine.status(), Status::Accepted);
        assert_eq!(run.state(), RunState::Finished);
        assert!(!run.is_active());
        assert_eq!(run.advance(&mut engine, ms(10_000)), 0);
        assert_eq!(engine.step_count(), 3);
    }

    #[test]
    fn test_finishes_when_machine_rejects() {
        let mut engine = counter_engine("10");
        let mut run = AutoRun::new(ms(100));

        run.advance(&mut engine, Duration::ZERO);
        run.advance(&mut engine, ms(1_000));

        assert_eq!(engine.status(), Status::Rejected);
        assert_eq!(engine.step_count(), 1);
        assert_eq!(run.state(), RunState::Finished);
    }

    #[test]
    fn test_halted_engine_finishes_without_stepping() {
        let mut engine = counter_engine("");
        engine.run(10);
        assert!(engine.is_halted());

        let mut run = AutoRun::default();
        assert_eq!(run.advance(&mut engine, Duration::ZERO), 0);
        assert_eq!(run.state(), RunState::Finished);
    }

    #[test]
    fn test_cancel_through_token() {
        let mut engine = counter_engine("111111");
        let mut run = AutoRun::new(ms(100));
        let token = run.token();

        run.advance(&mut engine, Duration::ZERO);
        run.advance(&mut engine, ms(100));
        token.cancel();

        assert!(!run.is_active());
        assert_eq!(run.advance(&mut engine, ms(1_000)), 0);
        assert_eq!(engine.step_count(), 2);
        assert_eq!(run.state(), RunState::Cancelled);
    }

    #[test]
    fn test_cancel_before_start() {
        let mut engine = counter_engine("111");
        let mut run = AutoRun::new(ms(100));
        run.cancel();

        assert_eq!(run.advance(&mut engine, ms(1_000)), 0);
        assert_eq!(engine.step_count(), 0);
    }

    #[test]
    fn test_cancel_from_another_thread() {
        let mut engine = counter_engine("111111");
        let token = CancellationToken::new();
        let mut run = AutoRun::with_token(ms(100), token.clone());
        run.advance(&mut engine, Duration::ZERO);

        std::thread::spawn(move || token.cancel()).join().unwrap();

        assert!(!run.is_active());
        assert_eq!(run.advance(&mut engine, ms(1_000)), 0);
        assert_eq!(engine.step_count(), 1);
    }

    #[test]
    fn test_child_token_follows_parent() {
        let parent = CancellationToken::new();
        let mut engine = counter_engine("111");
        let mut run = AutoRun::with_token(ms(100), parent.child_token());

        parent.cancel();

        assert_eq!(run.advance(&mut engine, Duration::ZERO), 0);
        assert_eq!(run.state(), RunState::Cancelled);
    }
}
