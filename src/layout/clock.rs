//! Injectable wall clock and the periodic "now" sampler.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use super::dates::ClockTime;

pub const DEFAULT_REFRESH: Duration = Duration::from_secs(60);

pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// One reading of the clock, reduced to what the timeline needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NowSample {
    pub date: NaiveDate,
    pub time: ClockTime,
}

impl NowSample {
    pub fn of(now: NaiveDateTime) -> Self {
        Self {
            date: now.date(),
            time: ClockTime::of(now.time()),
        }
    }

    pub fn take(clock: &dyn Clock) -> Self {
        Self::of(clock.now())
    }
}

pub struct NowSampler;

impl NowSampler {
    /// Start sampling `clock` every `cadence` on the current tokio runtime.
    ///
    /// The returned handle owns the task; dropping it stops sampling.
    pub fn spawn(clock: Arc<dyn Clock>, cadence: Duration) -> SamplerHandle {
        let (tx, rx) = watch::channel(NowSample::take(clock.as_ref()));

        let task = tokio::spawn(async move {
            let mut ticks = tokio::time::interval(cadence);
            ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                let sample = NowSample::take(clock.as_ref());
                trace!(time = %sample.time, "sampled clock");
                let changed = tx.send_if_modified(|current| {
                    let changed = *current != sample;
                    *current = sample;
                    changed
                });
                if changed {
                    debug!(date = %sample.date, time = %sample.time, "now moved");
                }
                if tx.is_closed() {
                    break;
                }
            }
        });

        debug!(cadence_secs = cadence.as_secs(), "now sampler started");
        SamplerHandle { rx, task }
    }
}

pub struct SamplerHandle {
    rx: watch::Receiver<NowSample>,
    task: JoinHandle<()>,
}

impl SamplerHandle {
    pub fn current(&self) -> NowSample {
        *self.rx.borrow()
    }

    /// Wait until the sample moves to a new minute.
    pub async fn changed(&mut self) -> Option<NowSample> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }

    /// Whether a new sample arrived since the last `changed` or `mark_seen`.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    pub fn mark_seen(&mut self) -> NowSample {
        *self.rx.borrow_and_update()
    }

    pub fn stop(self) {
        // Drop does the work.
    }
}

impl Drop for SamplerHandle {
    fn drop(&mut self) {
        self.task.abort();
        debug!("now sampler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 9, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn manual_clock_moves_on_request() {
        let clock = ManualClock::new(at(9, 0));
        clock.advance(chrono::Duration::minutes(90));
        assert_eq!(NowSample::take(&clock).time.to_string(), "10:30");
        clock.set(at(23, 59));
        assert_eq!(clock.today(), at(0, 0).date());
    }

    #[tokio::test(start_paused = true)]
    async fn sampler_publishes_each_new_minute() {
        let clock = Arc::new(ManualClock::new(at(9, 0)));
        let mut handle = NowSampler::spawn(clock.clone(), Duration::from_secs(60));
        assert_eq!(handle.current().time.to_string(), "09:00");

        clock.advance(chrono::Duration::minutes(1));
        let sample = handle.changed().await.unwrap();
        assert_eq!(sample.time.to_string(), "09:01");

        clock.advance(chrono::Duration::minutes(5));
        let sample = handle.changed().await.unwrap();
        assert_eq!(sample.time.to_string(), "09:06");
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_clock_does_not_notify() {
        let clock = Arc::new(ManualClock::new(at(9, 0)));
        let handle = NowSampler::spawn(clock, Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(180)).await;
        assert!(!handle.has_changed());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_the_task() {
        let clock = Arc::new(ManualClock::new(at(9, 0)));
        let handle = NowSampler::spawn(clock.clone(), Duration::from_secs(60));
        handle.stop();

        tokio::time::sleep(Duration::from_secs(120)).await;
        // Only the test keeps a reference once the task is gone.
        assert_eq!(Arc::strong_count(&clock), 1);
    }
}
