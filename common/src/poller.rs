// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

//! Periodic fetch driver.
//!
//! The poller fires a cycle as soon as it starts and then once per interval. A cycle that is
//! still waiting for its response makes the poller skip ticks until it resolved, so there is
//! never more than one request in flight and results arrive in request order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::source::TelemetrySourcePointer;
use crate::telemetry::TelemetryResponse;
use crate::Result;

/// Result of one fetch, numbered in request order.
#[derive(Debug)]
pub struct Cycle {
    pub sequence: u64,
    pub result: Result<TelemetryResponse>,
}

pub struct Poller {
    source: TelemetrySourcePointer,
    interval: Duration,
    in_flight: Arc<AtomicBool>,
    sequence: u64,
}

/// Clears the in-flight flag when the cycle ends, even if the callback panicked.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Poller {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5 * 60);

    pub fn new(source: TelemetrySourcePointer, interval: Duration) -> Self {
        Self {
            source,
            interval,
            in_flight: Arc::default(),
            sequence: 0,
        }
    }

    /// Polls until `shutdown` changes or its sender is dropped.
    ///
    /// # Panics
    ///
    /// If the interval is zero.
    pub async fn run<F>(mut self, on_cycle: F, mut shutdown: watch::Receiver<bool>)
    where
        F: Fn(Cycle) + Send + Sync + 'static,
    {
        let on_cycle = Arc::new(on_cycle);
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        log::info!(
            "Polling {} every {}s",
            self.source.describe(),
            self.interval.as_secs()
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick(&on_cycle),
                _ = shutdown.changed() => break,
            }
        }

        log::info!("Poller stopped after {} cycles", self.sequence);
    }

    fn tick<F>(&mut self, on_cycle: &Arc<F>)
    where
        F: Fn(Cycle) + Send + Sync + 'static,
    {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            log::debug!("Cycle {} still in flight, skipping tick", self.sequence);
            return;
        }

        self.sequence += 1;
        let sequence = self.sequence;
        let guard = InFlight(self.in_flight.clone());
        let source = self.source.clone();
        let on_cycle = on_cycle.clone();

        tokio::spawn(async move {
            let _guard = guard;
            log::debug!("Cycle {sequence}: fetching from {}", source.describe());

            let result = source.fetch().await;
            on_cycle(Cycle { sequence, result });
        });
    }

    /// Runs the poller on its own thread with a single threaded tokio runtime.
    pub fn spawn<F>(self, on_cycle: F) -> std::io::Result<PollerHandle>
    where
        F: Fn(Cycle) + Send + Sync + 'static,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let (shutdown, receiver) = watch::channel(false);

        let thread = std::thread::Builder::new()
            .name("telemetry-poller".into())
            .spawn(move || runtime.block_on(self.run(on_cycle, receiver)))?;

        Ok(PollerHandle {
            shutdown,
            thread: Some(thread),
        })
    }
}

/// Keeps the poller thread alive. Dropping it stops polling.
pub struct PollerHandle {
    shutdown: watch::Sender<bool>,
    thread: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.shutdown.send(true);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Poller thread panicked");
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::TelemetrySource;
    use crate::Error;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    #[derive(Default)]
    struct SlowSource {
        delay: Duration,
        fail: bool,
        calls: AtomicUsize,
        active: AtomicUsize,
        max_active: AtomicUsize,
    }

    #[async_trait]
    impl TelemetrySource for SlowSource {
        async fn fetch(&self) -> Result<TelemetryResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(active, Ordering::SeqCst);

            tokio::time::sleep(self.delay).await;

            self.active.fetch_sub(1, Ordering::SeqCst);
            if self.fail {
                Err(Error::Status(500))
            } else {
                Ok(TelemetryResponse::default())
            }
        }

        fn describe(&self) -> String {
            "slow source".into()
        }
    }

    /// Runs a poller for `duration` of (paused) time, returns the cycles it delivered.
    async fn poll_for(
        source: Arc<SlowSource>,
        interval: Duration,
        duration: Duration,
    ) -> Vec<(u64, bool)> {
        let cycles = Arc::new(Mutex::new(Vec::new()));
        let (shutdown, receiver) = watch::channel(false);

        let recorded = cycles.clone();
        let poller = Poller::new(source, interval);
        let task = tokio::spawn(poller.run(
            move |cycle: Cycle| {
                recorded
                    .lock()
                    .unwrap()
                    .push((cycle.sequence, cycle.result.is_ok()));
            },
            receiver,
        ));

        tokio::time::sleep(duration).await;
        shutdown.send(true).unwrap();
        task.await.unwrap();

        let cycles = cycles.lock().unwrap().clone();
        cycles
    }

    #[tokio::test(start_paused = true)]
    async fn first_cycle_is_immediate() {
        let source = Arc::new(SlowSource::default());

        let cycles = poll_for(source.clone(), Poller::DEFAULT_INTERVAL, Duration::from_secs(1)).await;

        assert_eq!(cycles, vec![(1, true)]);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn polls_every_interval() {
        let source = Arc::new(SlowSource::default());

        let cycles = poll_for(source, Duration::from_secs(10), Duration::from_secs(35)).await;

        assert_eq!(cycles, vec![(1, true), (2, true), (3, true), (4, true)]);
    }

    #[tokio::test(start_paused = true)]
    async fn never_overlaps_requests() {
        let source = Arc::new(SlowSource {
            delay: Duration::from_secs(25),
            ..Default::default()
        });

        let cycles = poll_for(source.clone(), Duration::from_secs(10), Duration::from_secs(65)).await;

        // Requests start at 0s, 30s and 60s; the last one is still running at shutdown.
        assert_eq!(cycles, vec![(1, true), (2, true)]);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert_eq!(source.max_active.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_do_not_stop_polling() {
        let source = Arc::new(SlowSource {
            fail: true,
            ..Default::default()
        });

        let cycles = poll_for(source, Duration::from_secs(10), Duration::from_secs(25)).await;

        assert_eq!(cycles, vec![(1, false), (2, false), (3, false)]);
    }

    #[test]
    fn handle_stops_thread() {
        let source = Arc::new(SlowSource::default());
        let delivered = Arc::new(AtomicUsize::new(0));

        let counter = delivered.clone();
        let handle = Poller::new(source, Duration::from_secs(3600))
            .spawn(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        let started = std::time::Instant::now();
        while delivered.load(Ordering::SeqCst) == 0 && started.elapsed() < Duration::from_secs(5) {
            std::thread::sleep(Duration::from_millis(10));
        }
        handle.shutdown();

        assert_eq!(delivered.load(Ordering::SeqCst), 1);
    }
}
