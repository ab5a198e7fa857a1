//! Periodic driver around [`InputCore::poll`].
//!
//! The loop polls once per period, publishes every changed state on a watch
//! channel and stops on cancellation. A poll error ends the loop and is returned
//! from [`PollerHandle::join`]; the caller is expected to halt.

use chrono::Local;
use std::io::BufRead;
use std::thread;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::input::source::{ExternalHandle, OverrideQueue};
use crate::input::{InputCore, InputError, NormalizedInputState, Polling, RawInputSnapshot};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("Input fault: {0}")]
    Input(#[from] InputError),

    #[error("Poll task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub struct PollerHandle {
    state_receiver: watch::Receiver<NormalizedInputState>,
    task: JoinHandle<Result<(), InputError>>,
}

impl PollerHandle {
    // Spawn the poll loop as a tokio task
    pub fn spawn(
        core: InputCore<Polling>,
        period: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        info!("Spawning poll loop with {:?} period", period);
        let (state_sender, state_receiver) = watch::channel(NormalizedInputState::default());

        let task = tokio::spawn(async move {
            let result = run_poll_loop(core, period, state_sender, shutdown).await;
            if let Err(e) = &result {
                error!("Poll loop terminated: {}", e);
            }
            result
        });

        Self {
            state_receiver,
            task,
        }
    }

    // Get a receiver for the latest normalized state
    pub fn subscribe(&self) -> watch::Receiver<NormalizedInputState> {
        self.state_receiver.clone()
    }

    pub async fn join(self) -> Result<(), RuntimeError> {
        self.task.await??;
        Ok(())
    }
}

async fn run_poll_loop(
    mut core: InputCore<Polling>,
    period: Duration,
    state_sender: watch::Sender<NormalizedInputState>,
    shutdown: CancellationToken,
) -> Result<(), InputError> {
    let mut interval_timer = tokio::time::interval(period);
    // A late cycle is dropped rather than replayed in a burst
    interval_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut cycles: u64 = 0;
    let mut slow_cycles: u64 = 0;
    let mut last_stats_time = Local::now();
    let stats_interval = chrono::Duration::seconds(30);

    info!("Entering poll loop");
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Poll loop cancelled after {} cycles", cycles);
                return Ok(());
            }
            _ = interval_timer.tick() => {}
        }

        let cycle_start = Instant::now();
        let state = core.poll()?;

        let changed = state_sender.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
        if changed {
            debug!("Input state changed: {:?}", state);
        }

        cycles += 1;
        if cycle_start.elapsed() > period {
            slow_cycles += 1;
        }

        let now = Local::now();
        if now - last_stats_time > stats_interval {
            let elapsed_seconds = (now - last_stats_time).num_seconds().max(1);
            info!(
                "Poll stats: {} cycles in {} seconds ({:.1}/sec), {} over period, locked: {}",
                cycles,
                elapsed_seconds,
                cycles as f64 / elapsed_seconds as f64,
                slow_cycles,
                core.get_locked()
            );
            cycles = 0;
            slow_cycles = 0;
            last_stats_time = now;
        }
    }
}

/// Where simulated snapshots typed on stdin are delivered.
#[derive(Debug, Clone)]
pub enum OverrideTarget {
    External(ExternalHandle),
    Queue(OverrideQueue),
}

impl OverrideTarget {
    pub fn deliver(&self, snapshot: RawInputSnapshot) -> Result<(), InputError> {
        match self {
            OverrideTarget::External(handle) => {
                handle.set_raw_override(snapshot);
                Ok(())
            }
            OverrideTarget::Queue(queue) => queue.push(snapshot),
        }
    }
}

// Reads lines of asserted line names from stdin, one snapshot per line.
// The thread is detached: a pending stdin read must not block process exit.
pub fn spawn_stdin_feeder(
    target: OverrideTarget,
    shutdown: CancellationToken,
) -> std::io::Result<thread::JoinHandle<()>> {
    info!("Reading simulated input from stdin");
    thread::Builder::new()
        .name("stdin-feeder".to_string())
        .spawn(move || feed_lines(std::io::stdin().lock(), &target, &shutdown))
}

fn feed_lines(reader: impl BufRead, target: &OverrideTarget, shutdown: &CancellationToken) {
    for line in reader.lines() {
        if shutdown.is_cancelled() {
            return;
        }

        match line {
            Ok(text) => match text.parse::<RawInputSnapshot>() {
                Ok(snapshot) => {
                    debug!("Simulated input: {:?}", snapshot.asserted().collect::<Vec<_>>());
                    if let Err(e) = target.deliver(snapshot) {
                        warn!("Dropping simulated input: {}", e);
                    }
                }
                Err(e) => warn!("Ignoring simulated input '{}': {}", text.trim(), e),
            },
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                return;
            }
        }
    }
    info!("Stdin closed, simulated input stopped");
}
