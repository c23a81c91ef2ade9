//! The stopwatch state machine.
//!
//! One [`TimerEngine`] instance belongs to one console session. All
//! mutation funnels through its methods, so the engine itself needs no
//! locking; hosts that share it across tasks wrap it behind the
//! [`TimerDriver`](crate::TimerDriver), which serializes commands.
//!
//! Elapsed time is always derived as `now - start_timestamp` against the
//! injected [`Clock`], never by accumulating tick deltas, so an irregular
//! tick cadence cannot introduce drift. `tick()` exists only to refresh
//! the observable value for display.

use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, TimingError};
use crate::format::format_elapsed;
use crate::types::{Capabilities, LapId, LapRecord, Phase, StageId, TimerSnapshot};

/// Stopwatch and lap recorder for a single race session.
#[derive(Debug)]
pub struct TimerEngine<C: Clock = SystemClock> {
    clock: C,
    phase: Phase,
    elapsed_ms: u64,
    /// Instant the current running segment is measured from. Meaningful
    /// only while `phase == Running`; rebased on resume.
    start_timestamp_ms: u64,
    /// Elapsed value frozen at the moment of pausing.
    paused_elapsed_ms: u64,
    active_stage: Option<StageId>,
    laps: Vec<LapRecord>,
    lap_sequence: u64,
}

impl TimerEngine<SystemClock> {
    /// Create an engine on the wall clock, stopped, with no stage assigned.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for TimerEngine<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TimerEngine<C> {
    /// Create a stopped engine reading time from `clock`.
    ///
    /// Every timestamp the engine takes (start, resume rebase, tick, lap
    /// capture) comes from this one clock, so time sources cannot mix.
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            phase: Phase::Stopped,
            elapsed_ms: 0,
            start_timestamp_ms: 0,
            paused_elapsed_ms: 0,
            active_stage: None,
            laps: Vec::new(),
            lap_sequence: 0,
        }
    }

    // --- transitions ---

    /// Start timing for `stage`. Allowed only while stopped.
    pub fn start(&mut self, stage: impl Into<StageId>) -> Result<()> {
        if self.phase != Phase::Stopped {
            return Err(TimingError::invalid_transition("start", self.phase));
        }
        let stage = stage.into();
        debug!(stage = %stage, "timer started");
        self.active_stage = Some(stage);
        self.start_timestamp_ms = self.clock.now_ms();
        self.paused_elapsed_ms = 0;
        self.elapsed_ms = 0;
        self.phase = Phase::Running;
        Ok(())
    }

    /// Freeze the elapsed time. Allowed only while running.
    pub fn pause(&mut self) -> Result<()> {
        if self.phase != Phase::Running {
            return Err(TimingError::invalid_transition("pause", self.phase));
        }
        self.refresh_elapsed();
        self.paused_elapsed_ms = self.elapsed_ms;
        self.phase = Phase::Paused;
        debug!(elapsed_ms = self.elapsed_ms, "timer paused");
        Ok(())
    }

    /// Continue timing from a pause without losing accumulated time.
    ///
    /// Rebases the start timestamp to `now - paused_elapsed`, read from the
    /// same clock every other transition uses.
    pub fn resume(&mut self) -> Result<()> {
        if self.phase != Phase::Paused {
            return Err(TimingError::invalid_transition("resume", self.phase));
        }
        self.start_timestamp_ms = self.clock.now_ms().saturating_sub(self.paused_elapsed_ms);
        self.phase = Phase::Running;
        debug!(elapsed_ms = self.paused_elapsed_ms, "timer resumed");
        Ok(())
    }

    /// End timing. Elapsed time and recorded laps are retained.
    pub fn stop(&mut self) -> Result<()> {
        match self.phase {
            Phase::Running => self.refresh_elapsed(),
            Phase::Paused => {}
            Phase::Stopped => {
                return Err(TimingError::invalid_transition("stop", self.phase));
            }
        }
        self.phase = Phase::Stopped;
        debug!(elapsed_ms = self.elapsed_ms, laps = self.laps.len(), "timer stopped");
        Ok(())
    }

    /// Clear elapsed time, laps, and the lap sequence. The active stage is
    /// preserved. Rejected while running.
    pub fn reset(&mut self) -> Result<()> {
        if self.phase == Phase::Running {
            return Err(TimingError::invalid_transition("reset", self.phase));
        }
        debug!(discarded_laps = self.laps.len(), "timer reset");
        self.elapsed_ms = 0;
        self.paused_elapsed_ms = 0;
        self.start_timestamp_ms = 0;
        self.laps.clear();
        self.lap_sequence = 0;
        self.phase = Phase::Stopped;
        Ok(())
    }

    /// Refresh the observable elapsed value. No-op unless running.
    ///
    /// Callable from any cadence source; correctness of the elapsed value
    /// never depends on how often this runs.
    pub fn tick(&mut self) -> u64 {
        if self.phase == Phase::Running {
            self.refresh_elapsed();
            trace!(elapsed_ms = self.elapsed_ms, "tick");
        }
        self.elapsed_ms
    }

    /// Capture a lap at the current elapsed time. Allowed only while
    /// running; the `Err` is the "no lap recorded" signal for the caller
    /// to surface.
    pub fn record_lap(&mut self) -> Result<LapRecord> {
        if self.phase != Phase::Running {
            return Err(TimingError::invalid_transition("record a lap", self.phase));
        }
        self.refresh_elapsed();
        let wall_clock_ms = self.clock.now_ms();
        self.lap_sequence += 1;
        let lap = LapRecord {
            id: LapId::generate(self.lap_sequence, wall_clock_ms),
            recorded_elapsed_ms: self.elapsed_ms,
            wall_clock_ms,
            participant_id: None,
            participant_label: None,
            saved: false,
        };
        debug!(lap = %lap.id, recorded_elapsed_ms = lap.recorded_elapsed_ms, "lap recorded");
        self.laps.push(lap.clone());
        Ok(lap)
    }

    /// Associate the timer with a stage without touching phase or elapsed
    /// time. `None` clears the association.
    pub fn set_active_stage(&mut self, stage: Option<StageId>) {
        debug!(stage = stage.as_ref().map(|s| s.as_str()), "active stage changed");
        self.active_stage = stage;
    }

    /// Assign or reassign a participant on a recorded lap.
    ///
    /// Null-ish ids (`None`, empty/whitespace, or the literal `"null"` that
    /// form selects submit) clear both the id and the label; the label is
    /// never stored without an id. Returns `false` when no lap matches,
    /// which callers treat as a benign race with the lap list.
    pub fn update_lap_participant(
        &mut self,
        lap_id: &LapId,
        participant_id: Option<&str>,
        participant_label: Option<&str>,
    ) -> bool {
        let Some(lap) = self.laps.iter_mut().find(|lap| &lap.id == lap_id) else {
            debug!(lap = %lap_id, "participant update for unknown lap ignored");
            return false;
        };
        match normalize_participant(participant_id) {
            Some(id) => {
                lap.participant_label =
                    participant_label.map(str::trim).filter(|l| !l.is_empty()).map(String::from);
                lap.participant_id = Some(id);
            }
            None => {
                lap.participant_id = None;
                lap.participant_label = None;
            }
        }
        debug!(lap = %lap_id, participant = lap.participant_id.as_deref(), "lap participant updated");
        true
    }

    /// Mark a lap as persisted by the host. One-way and idempotent; returns
    /// `false` when no lap matches.
    pub fn mark_lap_saved(&mut self, lap_id: &LapId) -> bool {
        let Some(lap) = self.laps.iter_mut().find(|lap| &lap.id == lap_id) else {
            debug!(lap = %lap_id, "saved mark for unknown lap ignored");
            return false;
        };
        lap.saved = true;
        true
    }

    // --- reads ---

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Elapsed run time in milliseconds, as of the last transition or tick.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn active_stage(&self) -> Option<&StageId> {
        self.active_stage.as_ref()
    }

    /// Recorded laps in recording order. Never reordered or deduplicated.
    pub fn laps(&self) -> &[LapRecord] {
        &self.laps
    }

    pub fn lap(&self, lap_id: &LapId) -> Option<&LapRecord> {
        self.laps.iter().find(|lap| &lap.id == lap_id)
    }

    /// Derived capability flags for gating UI actions.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities::derive(self.phase, self.active_stage.is_some())
    }

    pub fn can_start(&self) -> bool {
        self.capabilities().can_start
    }

    pub fn can_pause(&self) -> bool {
        self.capabilities().can_pause
    }

    pub fn can_resume(&self) -> bool {
        self.capabilities().can_resume
    }

    pub fn can_stop(&self) -> bool {
        self.capabilities().can_stop
    }

    pub fn can_reset(&self) -> bool {
        self.capabilities().can_reset
    }

    pub fn can_record_lap(&self) -> bool {
        self.capabilities().can_record_lap
    }

    /// Serializable read-model of the current state.
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase,
            elapsed_ms: self.elapsed_ms,
            display: format_elapsed(self.elapsed_ms),
            active_stage: self.active_stage.clone(),
            lap_count: self.laps.len(),
            capabilities: self.capabilities(),
        }
    }

    fn refresh_elapsed(&mut self) {
        self.elapsed_ms = self.clock.now_ms().saturating_sub(self.start_timestamp_ms);
    }
}

/// Normalize a participant id at the API boundary.
///
/// Browser form selects submit unset options as an empty string or the
/// literal string `"null"`; both mean "no participant".
fn normalize_participant(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() || trimmed == "null" {
        None
    } else {
        Some(trimmed.to_string())
    }
}
