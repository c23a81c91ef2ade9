//! Race timing engine for staggered-start cycling events.
//!
//! Paceline is the timing core of a race operator's console: a stopwatch
//! state machine with lap capture, plus the start-offset arithmetic that
//! turns a recorded lap time into a final, comparable result when
//! categories leave at staggered times.
//!
//! # Features
//!
//! - **Stopwatch state machine**: start / pause / resume / stop / reset
//!   with derived capability flags for gating UI controls
//! - **Lap capture**: ordered lap records with operator-assigned
//!   participants and a one-way saved flag
//! - **Drift-free elapsed time**: derived from a single injected clock,
//!   never accumulated from tick deltas
//! - **Start-offset adjustment**: signed category offsets folded into
//!   recorded times
//! - **Async host**: a tokio task owns the engine, serializes commands,
//!   and streams display snapshots at a 10 ms cadence while running
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use paceline::{StartAdjustment, TimerDriver, TimerEngine, format_signed};
//!
//! #[tokio::main]
//! async fn main() -> paceline::Result<()> {
//!     let timer = TimerDriver::spawn(TimerEngine::new());
//!     timer.start("stage-1").await?;
//!
//!     let mut snapshots = timer.subscribe();
//!     if let Some(snapshot) = snapshots.next().await {
//!         println!("elapsed: {}", snapshot.display);
//!     }
//!
//!     let lap = timer.record_lap().await?;
//!     timer
//!         .update_lap_participant(lap.id.clone(), Some("p-42".into()), Some("Ana Ruiz".into()))
//!         .await?;
//!
//!     // Rider's category left two minutes after the base group.
//!     let adjustment = StartAdjustment::from_times("07:02:00", "07:00:00");
//!     let final_ms = adjustment.apply(lap.recorded_elapsed_ms);
//!     println!("final time: {}", format_signed(final_ms));
//!
//!     timer.stop().await?;
//!     Ok(())
//! }
//! ```
//!
//! The engine can also be driven synchronously, without tokio, by calling
//! [`TimerEngine`] methods directly and invoking [`TimerEngine::tick`]
//! from any cadence source.

mod clock;
mod driver;
mod engine;
mod error;
mod format;
mod offset;
mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::{TICK_INTERVAL, TimerDriver, TimerHandle};
pub use engine::TimerEngine;
pub use error::{Result, TimingError};
pub use format::{format_elapsed, format_elapsed_opt, format_signed};
pub use offset::{StartAdjustment, compute_start_offset_ms};
pub use types::{Capabilities, LapId, LapRecord, Phase, StageId, TimerSnapshot};
