// SPDX-License-Identifier: MPL-2.0
//! Periodic CPU/RAM sampling on a background thread.
//!
//! The sampler is layered on top of the collector: it holds an ordinary
//! [`DiagnosticsHandle`] and logs a [`ResourceSample`] at each tick, so it
//! obeys the same non-blocking rules as every other producer. The core
//! pipeline works without it; applications that want resource context in
//! their reports start one alongside the collector.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use sysinfo::System;

use crate::collector::DiagnosticsHandle;

/// Sampling interval bounds (100 ms to 60 s).
pub mod sampling_bounds {
    /// Minimum interval between samples, in milliseconds.
    pub const MIN_MS: u64 = 100;
    /// Maximum interval between samples, in milliseconds.
    pub const MAX_MS: u64 = 60_000;
    /// Default interval between samples, in milliseconds.
    pub const DEFAULT_MS: u64 = 1_000;
}

/// Interval between resource samples, clamped to the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingInterval(u64);

impl SamplingInterval {
    /// Creates a sampling interval, clamping to 100 ms–60 s.
    #[must_use]
    pub fn new(value_ms: u64) -> Self {
        Self(value_ms.clamp(sampling_bounds::MIN_MS, sampling_bounds::MAX_MS))
    }

    /// Returns the interval in milliseconds.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }

    /// Returns the interval as a [`Duration`].
    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }
}

impl Default for SamplingInterval {
    fn default() -> Self {
        Self(sampling_bounds::DEFAULT_MS)
    }
}

/// One CPU/RAM measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSample {
    /// Global CPU usage percentage (0.0–100.0).
    pub cpu_percent: f32,
    /// RAM used by the system, in bytes.
    pub ram_bytes: u64,
}

impl ResourceSample {
    /// Creates a sample, clamping CPU usage into the 0–100 range.
    #[must_use]
    pub fn new(cpu_percent: f32, ram_bytes: u64) -> Self {
        Self {
            cpu_percent: cpu_percent.clamp(0.0, 100.0),
            ram_bytes,
        }
    }
}

/// Command channel payload for the sampler thread.
#[derive(Debug, Clone, Copy)]
enum SamplerCommand {
    Stop,
}

/// Background thread that logs a [`ResourceSample`] per interval tick.
///
/// Stopped explicitly with [`ResourceSampler::stop`] or implicitly on
/// drop. The thread sleeps in short steps so a stop request takes effect
/// within ~100 ms even for long intervals.
pub struct ResourceSampler {
    command_tx: Sender<SamplerCommand>,
    thread: Option<JoinHandle<()>>,
    running: Arc<AtomicBool>,
}

impl ResourceSampler {
    /// Starts sampling at `interval`, logging through `handle`.
    #[must_use]
    pub fn start(interval: SamplingInterval, handle: DiagnosticsHandle) -> Self {
        let (command_tx, command_rx) = bounded::<SamplerCommand>(1);
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);

        let thread = thread::spawn(move || {
            Self::sample_loop(interval, &handle, &command_rx, &thread_running);
        });

        Self {
            command_tx,
            thread: Some(thread),
            running,
        }
    }

    /// Returns true while the sampler thread is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stops the sampler and joins its thread.
    pub fn stop(&mut self) {
        if self.is_running() {
            let _ = self.command_tx.send(SamplerCommand::Stop);
            if let Some(thread) = self.thread.take() {
                let _ = thread.join();
            }
        }
    }

    fn sample_loop(
        interval: SamplingInterval,
        handle: &DiagnosticsHandle,
        command_rx: &Receiver<SamplerCommand>,
        running: &Arc<AtomicBool>,
    ) {
        let mut sys = System::new_all();

        // First CPU reading after new_all() is meaningless; refresh once
        // and give the counters a moment before the first real sample.
        sys.refresh_all();
        thread::sleep(Duration::from_millis(100));

        while running.load(Ordering::SeqCst) {
            if command_rx.try_recv().is_ok() {
                running.store(false, Ordering::SeqCst);
                break;
            }

            sys.refresh_all();
            handle.log_resource_snapshot(ResourceSample::new(
                sys.global_cpu_usage(),
                sys.used_memory(),
            ));

            // Interruptible sleep: check for a stop request every 100 ms.
            let step = Duration::from_millis(100);
            let mut slept = Duration::ZERO;
            while slept < interval.as_duration() && running.load(Ordering::SeqCst) {
                if command_rx.try_recv().is_ok() {
                    running.store(false, Ordering::SeqCst);
                    break;
                }
                let remaining = interval.as_duration().saturating_sub(slept);
                thread::sleep(step.min(remaining));
                slept += step;
            }
        }
        running.store(false, Ordering::SeqCst);
    }
}

impl Drop for ResourceSampler {
    fn drop(&mut self) {
        self.stop();
    }
}
