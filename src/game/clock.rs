//! Tick timing
//!
//! [`TickSchedule`] turns score and level into a tick interval. [`SimulationClock`]
//! owns the single repeating timer that drives the engine. Restarting replaces the
//! timer in place, so there is never more than one tick stream alive.

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::trace;

use super::config::{GameConfig, SpeedBasis};

/// Interval formula derived from the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSchedule {
    base_ms: u64,
    step_ms: u64,
    basis: SpeedBasis,
    floor_ms: u64,
    overdrive_bonus_ms: u64,
    overdrive_floor_ms: u64,
}

impl TickSchedule {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            base_ms: config.base_interval_ms,
            step_ms: config.speed_step_ms,
            basis: config.speed_basis,
            floor_ms: config.min_interval_ms,
            overdrive_bonus_ms: config.overdrive_bonus_ms,
            overdrive_floor_ms: config.overdrive_min_interval_ms,
        }
    }

    /// Interval at score 0 without Overdrive
    pub fn base(&self) -> Duration {
        Duration::from_millis(self.base_ms.max(self.floor_ms))
    }

    /// `max(floor, base - step * factor)`, minus the Overdrive bonus while active.
    ///
    /// The Overdrive result is clamped to its own floor, and never exceeds the
    /// regular interval.
    pub fn interval(&self, score: u32, level: u32, overdrive: bool) -> Duration {
        let factor = match self.basis {
            SpeedBasis::Score => u64::from(score),
            SpeedBasis::Level => u64::from(level.saturating_sub(1)),
        };
        let regular = self
            .base_ms
            .saturating_sub(self.step_ms.saturating_mul(factor))
            .max(self.floor_ms);

        let ms = if overdrive {
            regular
                .saturating_sub(self.overdrive_bonus_ms)
                .max(self.overdrive_floor_ms.min(regular))
        } else {
            regular
        };

        Duration::from_millis(ms)
    }
}

/// Repeating timer with stop/restart
///
/// The tokio timer is created lazily on the first [`SimulationClock::next_tick`]
/// after a (re)start, so the clock can be driven synchronously outside a runtime.
/// Its deadlines are still measured from the moment of the (re)start.
#[derive(Debug, Default)]
pub struct SimulationClock {
    period: Option<Duration>,
    started_at: Option<Instant>,
    timer: Option<Interval>,
    restarts: u64,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin ticking every `period`, first tick one period from now.
    ///
    /// A clock that is already running is replaced, not duplicated.
    pub fn start(&mut self, period: Duration) {
        self.timer = None;
        self.period = Some(period);
        self.started_at = Some(Instant::now());
        trace!(?period, "clock started");
    }

    /// Stop and start as one step
    pub fn restart(&mut self, period: Duration) {
        self.stop();
        self.start(period);
        self.restarts += 1;
    }

    /// Cancel the pending tick. Idempotent.
    pub fn stop(&mut self) {
        if self.period.take().is_some() {
            trace!("clock stopped");
        }
        self.started_at = None;
        self.timer = None;
    }

    pub fn is_running(&self) -> bool {
        self.period.is_some()
    }

    /// Current tick period, `None` when stopped
    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    /// Number of restarts since construction
    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    /// Wait for the next tick. Never resolves while the clock is stopped.
    ///
    /// Cancel safe: dropping the future keeps the timer phase, so it can sit in a
    /// `tokio::select!` branch. A deadline already missed fires at once.
    pub async fn next_tick(&mut self) {
        let Some(period) = self.period else {
            return std::future::pending().await;
        };

        let started_at = *self.started_at.get_or_insert_with(Instant::now);
        let timer = self.timer.get_or_insert_with(|| {
            let mut timer = interval_at(started_at + period, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            timer
        });
        timer.tick().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_elapsed(since: Instant, expected_ms: u64) {
        let elapsed = since.elapsed();
        assert!(
            elapsed >= Duration::from_millis(expected_ms)
                && elapsed < Duration::from_millis(expected_ms + 5),
            "elapsed {:?}, expected ~{}ms",
            elapsed,
            expected_ms
        );
    }

    fn schedule() -> TickSchedule {
        TickSchedule::from_config(&GameConfig::default())
    }

    #[test]
    fn test_interval_by_score() {
        let schedule = schedule();
        assert_eq!(schedule.interval(0, 1, false), Duration::from_millis(120));
        assert_eq!(schedule.interval(10, 1, false), Duration::from_millis(100));
        assert_eq!(schedule.interval(30, 1, false), Duration::from_millis(60));
        // Floor
        assert_eq!(schedule.interval(40, 1, false), Duration::from_millis(50));
        assert_eq!(schedule.interval(10_000, 201, false), Duration::from_millis(50));
    }

    #[test]
    fn test_interval_by_level() {
        let config = GameConfig {
            speed_basis: SpeedBasis::Level,
            speed_step_ms: 15,
            ..GameConfig::default()
        };
        let schedule = TickSchedule::from_config(&config);
        assert_eq!(schedule.interval(40, 1, false), Duration::from_millis(120));
        assert_eq!(schedule.interval(60, 2, false), Duration::from_millis(105));
        assert_eq!(schedule.interval(500, 11, false), Duration::from_millis(50));
    }

    #[test]
    fn test_interval_is_monotonic_and_floored() {
        let schedule = schedule();
        let mut previous = schedule.interval(0, 1, false);
        for score in (0..2_000).step_by(10) {
            let level = score / 50 + 1;
            let current = schedule.interval(score, level, false);
            assert!(current <= previous);
            assert!(current >= Duration::from_millis(50));
            previous = current;
        }
    }

    #[test]
    fn test_overdrive_bonus() {
        let schedule = schedule();
        assert_eq!(schedule.interval(0, 1, true), Duration::from_millis(100));
        // Regular floor 50, bonus 20, overdrive floor 35
        assert_eq!(schedule.interval(500, 11, true), Duration::from_millis(35));
    }

    #[test]
    fn test_overdrive_never_slows_down() {
        let config = GameConfig {
            overdrive_min_interval_ms: 80,
            ..GameConfig::default()
        };
        let schedule = TickSchedule::from_config(&config);
        let regular = schedule.interval(30, 1, false);
        assert_eq!(regular, Duration::from_millis(60));
        assert_eq!(schedule.interval(30, 1, true), regular);
    }

    #[test]
    fn test_clock_state() {
        let mut clock = SimulationClock::new();
        assert!(!clock.is_running());

        // Stopping an idle clock is fine
        clock.stop();
        assert!(!clock.is_running());

        clock.start(Duration::from_millis(120));
        assert_eq!(clock.period(), Some(Duration::from_millis(120)));

        clock.restart(Duration::from_millis(80));
        assert_eq!(clock.period(), Some(Duration::from_millis(80)));
        assert_eq!(clock.restarts(), 1);

        clock.stop();
        clock.stop();
        assert_eq!(clock.period(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_follow_period() {
        let mut clock = SimulationClock::new();
        clock.start(Duration::from_millis(100));

        let begin = Instant::now();
        clock.next_tick().await;
        assert_elapsed(begin, 100);
        clock.next_tick().await;
        assert_elapsed(begin, 200);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_counts_from_start() {
        let mut clock = SimulationClock::new();
        let begin = Instant::now();
        clock.start(Duration::from_millis(100));

        // Nobody waits on the clock for a while; the deadline does not move
        tokio::time::advance(Duration::from_millis(60)).await;
        clock.next_tick().await;
        assert_elapsed(begin, 100);
        clock.next_tick().await;
        assert_elapsed(begin, 200);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_timer() {
        let mut clock = SimulationClock::new();
        clock.start(Duration::from_millis(100));
        clock.next_tick().await;

        let restarted = Instant::now();
        clock.restart(Duration::from_millis(40));
        clock.next_tick().await;
        assert_elapsed(restarted, 40);
        clock.next_tick().await;
        assert_elapsed(restarted, 80);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_clock_never_ticks() {
        let mut clock = SimulationClock::new();
        clock.start(Duration::from_millis(10));
        clock.stop();

        let waited = tokio::time::timeout(Duration::from_secs(5), clock.next_tick()).await;
        assert!(waited.is_err());
    }
}
