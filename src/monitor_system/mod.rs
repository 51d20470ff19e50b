//! Orchestration of the sampling pipeline: the self-rescheduling read loop,
//! the buffer/flush task that batches samples for subscribers, and the slow
//! periodic one-shot sampler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::types::{CurrentMonitor, MonitorConfig, MonitorError, MonitorEvent, Sample, SamplingState};

const EVENT_CHANNEL_CAPACITY: usize = 256;
const SAMPLE_CHANNEL_CAPACITY: usize = 1024;
const TASK_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(500);

type SharedMonitor = Arc<Mutex<Box<dyn CurrentMonitor>>>;

/// Owns a chip driver and drives the sampling pipeline against it.
///
/// Must be created inside a tokio runtime: the periodic sampler task is
/// spawned on construction.
pub struct MonitorSystem {
    monitor: SharedMonitor,
    config: MonitorConfig,
    events: broadcast::Sender<MonitorEvent>,
    sampling: Arc<AtomicBool>,
    cancel: CancellationToken,
    pipeline: Option<(JoinHandle<()>, JoinHandle<()>)>,
    periodic_cancel: CancellationToken,
    periodic_task: Option<JoinHandle<()>>,
}

impl MonitorSystem {
    pub fn new(monitor: Box<dyn CurrentMonitor>, config: MonitorConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let monitor: SharedMonitor = Arc::new(Mutex::new(monitor));

        let periodic_cancel = CancellationToken::new();
        let periodic_task = tokio::spawn(run_periodic_loop(
            Arc::clone(&monitor),
            events.clone(),
            periodic_cancel.clone(),
            Duration::from_millis(config.periodic_interval_ms),
        ));

        Self {
            monitor,
            config,
            events,
            sampling: Arc::new(AtomicBool::new(false)),
            cancel: CancellationToken::new(),
            pipeline: None,
            periodic_cancel,
            periodic_task: Some(periodic_task),
        }
    }

    /// Begin streaming samples at the requested interval (0 means
    /// back-to-back, bounded only by bus latency). No-op while already
    /// sampling.
    pub fn start_sampling(&mut self, interval_ms: u64) -> Result<(), MonitorError> {
        if self.sampling.load(Ordering::SeqCst) {
            debug!("start_sampling ignored, already sampling");
            return Ok(());
        }

        let chip = {
            let mut monitor = self.monitor.lock().unwrap();
            monitor.configure_for_interval(interval_ms)?;
            monitor.chip_name()
        };
        self.sampling.store(true, Ordering::SeqCst);

        self.cancel = CancellationToken::new();
        let (sample_tx, sample_rx) = mpsc::channel(SAMPLE_CHANNEL_CAPACITY);

        let reader = tokio::spawn(run_sampling_loop(
            Arc::clone(&self.monitor),
            sample_tx,
            self.cancel.clone(),
            interval_ms,
        ));
        let buffer = tokio::spawn(run_buffer_loop(
            sample_rx,
            self.events.clone(),
            self.cancel.clone(),
            Duration::from_millis(self.config.flush_interval_ms),
        ));
        self.pipeline = Some((reader, buffer));

        info!("Sampling {} with {}ms interval", chip, interval_ms);
        self.broadcast_state();
        Ok(())
    }

    /// Stop streaming. The read loop observes the cancellation at its next
    /// iteration boundary, so at most one in-flight read completes after
    /// this returns. Idempotent.
    pub async fn stop_sampling(&mut self) {
        if !self.sampling.swap(false, Ordering::SeqCst) {
            return;
        }
        self.cancel.cancel();

        if let Some((reader, buffer)) = self.pipeline.take() {
            for task in [reader, buffer] {
                if tokio::time::timeout(TASK_SHUTDOWN_TIMEOUT, task).await.is_err() {
                    warn!("sampling task did not stop within {:?}", TASK_SHUTDOWN_TIMEOUT);
                }
            }
        }

        info!("Stopped sampling");
        self.broadcast_state();
    }

    /// Update calibration; omitted fields keep their prior value. Applies to
    /// the very next read, including reads already scheduled by the loop.
    pub fn calibrate(
        &self,
        resistor_ohms: Option<f64>,
        calibration_offset: Option<i64>,
    ) -> Result<(), MonitorError> {
        {
            let mut monitor = self.monitor.lock().unwrap();
            monitor.calibrate(resistor_ohms, calibration_offset)?;
        }
        self.broadcast_state();
        Ok(())
    }

    /// One-shot current reading, independent of the streaming state.
    pub fn read_current(&self) -> Result<f64, MonitorError> {
        self.monitor.lock().unwrap().shunt_current()
    }

    pub fn sampling_state(&self) -> SamplingState {
        let calibration = self.monitor.lock().unwrap().calibration();
        SamplingState {
            sampling: self.sampling.load(Ordering::SeqCst),
            resistor_ohms: calibration.resistor_ohms,
            calibration_offset: calibration.calibration_offset,
        }
    }

    /// Attach a subscriber. The returned snapshot is the subscriber's
    /// synchronization point; events from here on arrive on the receiver.
    pub fn subscribe(&self) -> (SamplingState, broadcast::Receiver<MonitorEvent>) {
        (self.sampling_state(), self.events.subscribe())
    }

    /// Stop sampling and tear down the periodic sampler.
    pub async fn shutdown(&mut self) {
        self.stop_sampling().await;
        self.periodic_cancel.cancel();
        if let Some(task) = self.periodic_task.take() {
            if tokio::time::timeout(TASK_SHUTDOWN_TIMEOUT, task).await.is_err() {
                warn!("periodic sampler did not stop within {:?}", TASK_SHUTDOWN_TIMEOUT);
            }
        }
    }

    fn broadcast_state(&self) {
        // send only fails when no subscriber is connected
        let _ = self.events.send(MonitorEvent::SamplingState(self.sampling_state()));
    }
}

impl Drop for MonitorSystem {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.periodic_cancel.cancel();
    }
}

/// The read loop: one immediate read, then delay-and-reread until cancelled.
///
/// A failed read logs a warning and skips the cycle; the loop stays alive
/// for the next scheduled attempt and never emits a stale sample.
async fn run_sampling_loop(
    monitor: SharedMonitor,
    sample_tx: mpsc::Sender<Sample>,
    cancel: CancellationToken,
    interval_ms: u64,
) {
    let interval = Duration::from_millis(interval_ms);
    loop {
        if cancel.is_cancelled() {
            break;
        }

        let reading = monitor.lock().unwrap().shunt_current();
        match reading {
            Ok(value) => {
                // capture time is stamped here, at emission
                if sample_tx.send(Sample::captured_now(value)).await.is_err() {
                    break;
                }
            }
            Err(e) => warn!("shunt read failed, skipping cycle: {}", e),
        }

        if interval_ms > 0 {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        } else {
            tokio::task::yield_now().await;
        }
    }
}

/// The buffer loop: accumulate samples in arrival order and hand them to
/// subscribers as one batch per non-empty flush tick.
async fn run_buffer_loop(
    mut sample_rx: mpsc::Receiver<Sample>,
    events: broadcast::Sender<MonitorEvent>,
    cancel: CancellationToken,
    flush_interval: Duration,
) {
    let mut buffer: Vec<Sample> = Vec::new();
    let mut ticker = tokio::time::interval(flush_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if !buffer.is_empty() {
                    let batch = std::mem::take(&mut buffer);
                    let _ = events.send(MonitorEvent::Samples(batch));
                }
            }
            sample = sample_rx.recv() => match sample {
                Some(sample) => buffer.push(sample),
                None => break,
            }
        }
    }

    // Flush whatever was captured before the stop so no sample is lost.
    while let Ok(sample) = sample_rx.try_recv() {
        buffer.push(sample);
    }
    if !buffer.is_empty() {
        let _ = events.send(MonitorEvent::Samples(buffer));
    }
}

/// Slow one-shot sampler: every tick, read the current and broadcast it,
/// regardless of whether streaming is active. Read failures skip the tick.
async fn run_periodic_loop(
    monitor: SharedMonitor,
    events: broadcast::Sender<MonitorEvent>,
    cancel: CancellationToken,
    period: Duration,
) {
    let start = tokio::time::Instant::now() + period;
    let mut ticker = tokio::time::interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let reading = monitor.lock().unwrap().shunt_current();
                match reading {
                    Ok(value) => {
                        let _ = events.send(MonitorEvent::PeriodicSample(value));
                    }
                    Err(e) => warn!("periodic read failed, skipping tick: {}", e),
                }
            }
        }
    }
}
