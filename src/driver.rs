//! Async host for a timer engine.
//!
//! [`TimerDriver::spawn`] moves a [`TimerEngine`] into a tokio task that
//! owns it exclusively. Mutation arrives as serialized commands over an
//! mpsc channel, and a 10 ms ticker refreshes the elapsed display while
//! the timer is running. The ticker branch is disabled in any other
//! phase, so a stopped or paused timer costs no wakeups.
//!
//! Every command and tick publishes a fresh [`TimerSnapshot`] on a watch
//! channel; [`TimerHandle::subscribe`] exposes it as a `Stream` with
//! latest-wins semantics, which is exactly what a display loop wants.

use std::time::Duration;

use futures::Stream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::engine::TimerEngine;
use crate::error::{Result, TimingError};
use crate::types::{LapId, LapRecord, Phase, StageId, TimerSnapshot};

/// Cadence of display refreshes while the timer is running.
///
/// 10 ms gives the illusion of a continuously updating centisecond
/// display; elapsed-time correctness does not depend on it.
pub const TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Command depth before senders are backpressured. Operator consoles issue
/// commands at human rates, so a small buffer is plenty.
const COMMAND_BUFFER: usize = 32;

enum TimerCommand {
    Start(StageId, oneshot::Sender<Result<()>>),
    Pause(oneshot::Sender<Result<()>>),
    Resume(oneshot::Sender<Result<()>>),
    Stop(oneshot::Sender<Result<()>>),
    Reset(oneshot::Sender<Result<()>>),
    RecordLap(oneshot::Sender<Result<LapRecord>>),
    SetActiveStage(Option<StageId>, oneshot::Sender<()>),
    UpdateLapParticipant {
        lap_id: LapId,
        participant_id: Option<String>,
        participant_label: Option<String>,
        reply: oneshot::Sender<bool>,
    },
    MarkLapSaved(LapId, oneshot::Sender<bool>),
    Laps(oneshot::Sender<Vec<LapRecord>>),
}

/// Spawns the task that owns a timer engine.
pub struct TimerDriver;

impl TimerDriver {
    /// Move `engine` into a background task and return the handle that
    /// commands it.
    ///
    /// The task runs until the handle is dropped (or
    /// [`TimerHandle::shutdown`] is called), at which point the ticker and
    /// the engine are torn down together.
    pub fn spawn<C: Clock>(engine: TimerEngine<C>) -> TimerHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());
        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();

        tokio::spawn(async move {
            Self::engine_task(engine, command_rx, snapshot_tx, cancel_task).await;
        });

        TimerHandle { commands: command_tx, snapshots: snapshot_rx, cancel }
    }

    async fn engine_task<C: Clock>(
        mut engine: TimerEngine<C>,
        mut commands: mpsc::Receiver<TimerCommand>,
        snapshots: watch::Sender<TimerSnapshot>,
        cancel: CancellationToken,
    ) {
        info!("timer task started");
        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            let running = engine.phase() == Phase::Running;
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("timer task cancelled");
                    break;
                }
                command = commands.recv() => {
                    let Some(command) = command else {
                        debug!("all timer handles dropped, shutting down");
                        break;
                    };
                    let was_running = running;
                    Self::apply(&mut engine, command);
                    // Entering Running rebases the ticker so the first
                    // refresh lands one full interval out.
                    if !was_running && engine.phase() == Phase::Running {
                        ticker.reset();
                    }
                    if snapshots.send(engine.snapshot()).is_err() {
                        debug!("snapshot receiver dropped");
                    }
                }
                _ = ticker.tick(), if running => {
                    engine.tick();
                    if snapshots.send(engine.snapshot()).is_err() {
                        debug!("snapshot receiver dropped");
                    }
                }
            }
        }

        info!(laps = engine.laps().len(), "timer task ended");
    }

    fn apply<C: Clock>(engine: &mut TimerEngine<C>, command: TimerCommand) {
        match command {
            TimerCommand::Start(stage, reply) => {
                let _ = reply.send(engine.start(stage));
            }
            TimerCommand::Pause(reply) => {
                let _ = reply.send(engine.pause());
            }
            TimerCommand::Resume(reply) => {
                let _ = reply.send(engine.resume());
            }
            TimerCommand::Stop(reply) => {
                let _ = reply.send(engine.stop());
            }
            TimerCommand::Reset(reply) => {
                let _ = reply.send(engine.reset());
            }
            TimerCommand::RecordLap(reply) => {
                let _ = reply.send(engine.record_lap());
            }
            TimerCommand::SetActiveStage(stage, reply) => {
                engine.set_active_stage(stage);
                let _ = reply.send(());
            }
            TimerCommand::UpdateLapParticipant {
                lap_id,
                participant_id,
                participant_label,
                reply,
            } => {
                let matched = engine.update_lap_participant(
                    &lap_id,
                    participant_id.as_deref(),
                    participant_label.as_deref(),
                );
                let _ = reply.send(matched);
            }
            TimerCommand::MarkLapSaved(lap_id, reply) => {
                let _ = reply.send(engine.mark_lap_saved(&lap_id));
            }
            TimerCommand::Laps(reply) => {
                let _ = reply.send(engine.laps().to_vec());
            }
        }
    }
}

/// Handle to a spawned timer task.
///
/// All methods funnel into the single engine-owning task, so concurrent
/// callers are serialized in arrival order. Dropping the handle cancels
/// the task.
pub struct TimerHandle {
    commands: mpsc::Sender<TimerCommand>,
    snapshots: watch::Receiver<TimerSnapshot>,
    cancel: CancellationToken,
}

impl TimerHandle {
    /// Start timing for `stage`.
    pub async fn start(&self, stage: impl Into<StageId>) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.send(TimerCommand::Start(stage.into(), reply)).await?;
        response.await.map_err(|_| TimingError::DriverClosed)?
    }

    /// Pause the running timer.
    pub async fn pause(&self) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.send(TimerCommand::Pause(reply)).await?;
        response.await.map_err(|_| TimingError::DriverClosed)?
    }

    /// Resume a paused timer.
    pub async fn resume(&self) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.send(TimerCommand::Resume(reply)).await?;
        response.await.map_err(|_| TimingError::DriverClosed)?
    }

    /// Stop the timer, retaining elapsed time and laps.
    pub async fn stop(&self) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.send(TimerCommand::Stop(reply)).await?;
        response.await.map_err(|_| TimingError::DriverClosed)?
    }

    /// Clear elapsed time and laps; the active stage is preserved.
    pub async fn reset(&self) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.send(TimerCommand::Reset(reply)).await?;
        response.await.map_err(|_| TimingError::DriverClosed)?
    }

    /// Capture a lap at the current elapsed time.
    pub async fn record_lap(&self) -> Result<LapRecord> {
        let (reply, response) = oneshot::channel();
        self.send(TimerCommand::RecordLap(reply)).await?;
        response.await.map_err(|_| TimingError::DriverClosed)?
    }

    /// Associate the timer with a stage (or clear it with `None`).
    pub async fn set_active_stage(&self, stage: Option<StageId>) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.send(TimerCommand::SetActiveStage(stage, reply)).await?;
        response.await.map_err(|_| TimingError::DriverClosed)
    }

    /// Assign or clear a participant on a recorded lap. Returns whether a
    /// lap matched.
    pub async fn update_lap_participant(
        &self,
        lap_id: LapId,
        participant_id: Option<String>,
        participant_label: Option<String>,
    ) -> Result<bool> {
        let (reply, response) = oneshot::channel();
        self.send(TimerCommand::UpdateLapParticipant {
            lap_id,
            participant_id,
            participant_label,
            reply,
        })
        .await?;
        response.await.map_err(|_| TimingError::DriverClosed)
    }

    /// Mark a lap persisted. Idempotent; returns whether a lap matched.
    pub async fn mark_lap_saved(&self, lap_id: LapId) -> Result<bool> {
        let (reply, response) = oneshot::channel();
        self.send(TimerCommand::MarkLapSaved(lap_id, reply)).await?;
        response.await.map_err(|_| TimingError::DriverClosed)
    }

    /// Current recorded laps, in recording order.
    pub async fn laps(&self) -> Result<Vec<LapRecord>> {
        let (reply, response) = oneshot::channel();
        self.send(TimerCommand::Laps(reply)).await?;
        response.await.map_err(|_| TimingError::DriverClosed)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> TimerSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Snapshot feed as a stream. Yields the current snapshot immediately,
    /// then the latest one after each command or tick; a slow consumer
    /// skips intermediate values rather than lagging behind.
    pub fn subscribe(&self) -> impl Stream<Item = TimerSnapshot> + Send + 'static {
        WatchStream::new(self.snapshots.clone())
    }

    /// Stop the background task. Further calls on this handle return
    /// [`TimingError::DriverClosed`].
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    async fn send(&self, command: TimerCommand) -> Result<()> {
        self.commands.send(command).await.map_err(|_| {
            warn!("command issued after timer task shut down");
            TimingError::DriverClosed
        })
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        debug!("dropping timer handle");
        self.cancel.cancel();
    }
}
