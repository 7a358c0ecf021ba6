//! Cosmetic progress for conversions.
//!
//! The convert endpoint reports nothing until it is done, so the bar is
//! driven by a fixed workload curve instead of real backend state.

use std::time::Duration;

use futures::future::AbortHandle;
use futures::stream::{self, BoxStream, StreamExt};

use crate::domain::ProgressTick;

/// Ticks stop once the next step would reach this percentage.
pub const CEILING: f32 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phase {
    /// Exclusive upper bound of the bracket this phase applies to.
    pub until: f32,
    pub increment: f32,
    pub delay: Duration,
    pub label: &'static str,
}

const PHASES: [Phase; 5] = [
    Phase {
        until: 20.0,
        increment: 4.0,
        delay: Duration::from_millis(150),
        label: "Fetching video information...",
    },
    Phase {
        until: 40.0,
        increment: 3.0,
        delay: Duration::from_millis(200),
        label: "Preparing the magic cauldron...",
    },
    Phase {
        until: 60.0,
        increment: 2.0,
        delay: Duration::from_millis(300),
        label: "Extracting audio/video content...",
    },
    Phase {
        until: 80.0,
        increment: 0.8,
        delay: Duration::from_millis(400),
        label: "Brewing your file format...",
    },
    Phase {
        until: CEILING,
        increment: 0.5,
        delay: Duration::from_millis(500),
        label: "Finalizing your magic potion...",
    },
];

/// Phase for the bracket containing `percent`, or `None` once the ceiling is hit.
pub fn phase_for(percent: f32) -> Option<&'static Phase> {
    PHASES.iter().find(|phase| percent < phase.until)
}

/// Stops a running simulation. Cloneable; aborting more than once, or after
/// the simulation finished on its own, does nothing.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    inner: AbortHandle,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.inner.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.is_aborted()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressSimulator;

impl ProgressSimulator {
    pub fn new() -> Self {
        Self
    }

    /// Lazy tick stream plus the handle that ends it.
    ///
    /// Each step waits for its bracket's delay, then emits the advanced
    /// percentage with the label of the bracket it started in.
    pub fn ticks(&self) -> (BoxStream<'static, ProgressTick>, CancelHandle) {
        let schedule = stream::unfold(0.0_f32, |percent| async move {
            let phase = phase_for(percent)?;
            let next = percent + phase.increment;
            if next >= CEILING {
                return None;
            }

            tokio::time::sleep(phase.delay).await;

            Some((
                ProgressTick {
                    percent: next,
                    phase_label: phase.label,
                },
                next,
            ))
        });

        let (ticks, handle) = stream::abortable(schedule);
        (ticks.boxed(), CancelHandle { inner: handle })
    }

    /// Drive the simulation on the current tokio runtime, handing every tick
    /// to `on_tick`.
    pub fn start<F>(&self, mut on_tick: F) -> CancelHandle
    where
        F: FnMut(ProgressTick) + Send + 'static,
    {
        let (mut ticks, handle) = self.ticks();
        tokio::spawn(async move {
            while let Some(tick) = ticks.next().await {
                on_tick(tick);
            }
        });
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_phase_table() {
        let cases = [
            (0.0, 4.0, 150, "Fetching video information..."),
            (19.9, 4.0, 150, "Fetching video information..."),
            (20.0, 3.0, 200, "Preparing the magic cauldron..."),
            (40.0, 2.0, 300, "Extracting audio/video content..."),
            (60.0, 0.8, 400, "Brewing your file format..."),
            (80.0, 0.5, 500, "Finalizing your magic potion..."),
            (89.9, 0.5, 500, "Finalizing your magic potion..."),
        ];
        for (percent, increment, delay_ms, label) in cases {
            let phase = phase_for(percent).unwrap();
            assert_eq!(phase.increment, increment, "increment at {percent}");
            assert_eq!(phase.delay, Duration::from_millis(delay_ms), "delay at {percent}");
            assert_eq!(phase.label, label, "label at {percent}");
        }
        assert!(phase_for(90.0).is_none());
        assert!(phase_for(99.0).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_uncancelled_run_stays_below_ceiling() {
        let (ticks, handle) = ProgressSimulator::new().ticks();
        let ticks: Vec<ProgressTick> = ticks.collect().await;

        assert!(!ticks.is_empty());
        assert_eq!(ticks[0].percent, 4.0);
        assert_eq!(ticks[0].phase_label, "Fetching video information...");

        let mut previous = 0.0;
        for tick in &ticks {
            assert!(tick.percent >= previous);
            assert!(tick.percent < CEILING);
            // Label comes from the bracket the step started in.
            assert_eq!(tick.phase_label, phase_for(previous).unwrap().label);
            previous = tick.percent;
        }
        assert!(previous > 89.0);

        // Natural completion leaves the handle usable.
        handle.cancel();
        handle.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_waits_for_bracket_delay() {
        let (mut ticks, _handle) = ProgressSimulator::new().ticks();
        let started = tokio::time::Instant::now();

        ticks.next().await.unwrap();
        let first = started.elapsed();
        assert!(first >= Duration::from_millis(150) && first < Duration::from_millis(160));

        ticks.next().await.unwrap();
        let second = started.elapsed();
        assert!(second >= Duration::from_millis(300) && second < Duration::from_millis(320));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_further_ticks() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let handle = ProgressSimulator::new().start(move |tick| {
            sink.lock().unwrap().push(tick.percent);
        });

        tokio::time::sleep(Duration::from_millis(475)).await;
        handle.cancel();
        let at_cancel = seen.lock().unwrap().len();
        assert_eq!(at_cancel, 3);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(seen.lock().unwrap().len(), at_cancel);

        handle.cancel();
        assert!(handle.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_first_tick() {
        let (ticks, handle) = ProgressSimulator::new().ticks();
        handle.cancel();
        let ticks: Vec<ProgressTick> = ticks.collect().await;
        assert!(ticks.is_empty());
    }
}
