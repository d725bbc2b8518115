pub mod controller;
pub mod history;
pub mod source;

#[cfg(test)]
mod testing;

pub use controller::{ControllerState, SampleController};
pub use history::{CoreHistory, SeriesBuffer};
pub use source::{DirectSource, FrequencySource, LibrarySource};

use freq_core::{FreqError, Result, Snapshot};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

/// Handle to a running sampling task.
pub struct Sampler {
    stop: watch::Sender<bool>,
    task: JoinHandle<Result<SampleController>>,
}

impl Sampler {
    /// Ask the sampler to stop. A tick already in flight finishes first;
    /// no further tick starts afterwards. Safe to call repeatedly.
    pub fn stop(&self) {
        self.stop.send_replace(true);
    }

    /// Wait for the task to end.
    ///
    /// Returns the controller in `Stopped` state, or the error of the tick
    /// that moved it to `Failed`.
    pub async fn join(self) -> Result<SampleController> {
        self.task
            .await
            .map_err(|e| FreqError::Read(format!("sampler task aborted: {e}")))?
    }
}

/// Start `controller` and tick it every `interval` on a background Tokio
/// task, forwarding each [`Snapshot`] through the returned channel.
///
/// Ticks never overlap: a tick that runs late delays the next one instead of
/// being skipped, and a full channel holds the next tick back until the
/// consumer catches up. The task stops when [`Sampler::stop`] is called,
/// when the [`Sampler`] or the receiver is dropped, or on a failed poll.
pub fn spawn_sampler(
    mut controller: SampleController,
    interval: Duration,
) -> Result<(Sampler, mpsc::Receiver<Snapshot>)> {
    controller.start()?;

    let (tx, rx) = mpsc::channel(4);
    let (stop_tx, stop_rx) = watch::channel(false);
    let task = tokio::spawn(sample_loop(controller, interval, tx, stop_rx));

    Ok((Sampler { stop: stop_tx, task }, rx))
}

async fn sample_loop(
    mut controller: SampleController,
    interval: Duration,
    tx: mpsc::Sender<Snapshot>,
    mut stop: watch::Receiver<bool>,
) -> Result<SampleController> {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    break;
                }
                continue;
            }
            _ = ticker.tick() => {}
        }

        // Polling may block on file or library I/O.
        let (returned, result) = tokio::task::spawn_blocking(move || {
            let result = controller.tick();
            (controller, result)
        })
        .await
        .map_err(|e| FreqError::Read(format!("sampling tick panicked: {e}")))?;
        controller = returned;

        let snapshot = result?;
        if tx.send(snapshot).await.is_err() {
            debug!("Snapshot receiver dropped");
            break;
        }
    }

    controller.stop();
    info!(ticks = controller.snapshot().map_or(0, |s| s.tick), "Sampler finished");
    Ok(controller)
}
