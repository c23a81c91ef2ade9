//! Core data types for the timing engine.
//!
//! These are the values that cross the engine boundary: the state-machine
//! phase, stage and lap identifiers, recorded laps, and the serializable
//! snapshot the driver publishes to UI hosts. Field names serialize in
//! camelCase for consumption by browser-side callers.

use serde::{Deserialize, Serialize};

/// State-machine phase of the timer. Exactly one phase is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Initial and terminal state. Elapsed time and laps are retained
    /// until an explicit reset.
    Stopped,
    /// Timer is accruing elapsed time; laps may be recorded.
    Running,
    /// Elapsed time is frozen; resuming continues without loss.
    Paused,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Stopped => f.write_str("stopped"),
            Phase::Running => f.write_str("running"),
            Phase::Paused => f.write_str("paused"),
        }
    }
}

/// Identifier of the race stage the timer is associated with.
///
/// Stages are defined by the host system; the engine only carries the id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(String);

impl StageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for StageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier of a recorded lap.
///
/// Generated by the engine from its lap sequence counter and the wall-clock
/// instant of recording; immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LapId(String);

impl LapId {
    pub(crate) fn generate(sequence: u64, wall_clock_ms: u64) -> Self {
        Self(format!("lap-{sequence}-{wall_clock_ms}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LapId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for LapId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for LapId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single lap capture.
///
/// `recorded_elapsed_ms` is fixed at the instant the lap is taken; the
/// participant assignment is filled in afterwards by the operator, and
/// `saved` flips to `true` once the host has persisted the lap (one-way).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LapRecord {
    pub id: LapId,
    /// Elapsed run time at the instant of recording, in milliseconds.
    pub recorded_elapsed_ms: u64,
    /// Wall-clock instant of recording (epoch ms), for display and audit.
    pub wall_clock_ms: u64,
    /// Assigned participant, if any. Updated together with
    /// `participant_label` through
    /// [`TimerEngine::update_lap_participant`](crate::TimerEngine::update_lap_participant).
    pub participant_id: Option<String>,
    /// Display label cached alongside `participant_id`; never set without it.
    pub participant_label: Option<String>,
    /// Whether the host has persisted this lap. Never reverts to `false`.
    pub saved: bool,
}

/// Which operations the timer currently permits.
///
/// Derived from the phase and active stage on demand, never stored by the
/// engine, so the flags cannot drift from the actual state. UI hosts use
/// them to enable and disable controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub can_start: bool,
    pub can_pause: bool,
    pub can_resume: bool,
    pub can_stop: bool,
    pub can_reset: bool,
    pub can_record_lap: bool,
}

impl Capabilities {
    /// Derive the capability flags for a phase and stage assignment.
    pub fn derive(phase: Phase, has_active_stage: bool) -> Self {
        Self {
            can_start: phase == Phase::Stopped && has_active_stage,
            can_pause: phase == Phase::Running,
            can_resume: phase == Phase::Paused,
            can_stop: matches!(phase, Phase::Running | Phase::Paused),
            can_reset: matches!(phase, Phase::Stopped | Phase::Paused),
            can_record_lap: phase == Phase::Running,
        }
    }
}

/// Read-model of the timer published by the driver after every command and
/// tick. This is the unit that flows through the snapshot watch channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub elapsed_ms: u64,
    /// Elapsed time pre-rendered as `MM:SS.cc` / `HH:MM:SS.cc`.
    pub display: String,
    pub active_stage: Option<StageId>,
    pub lap_count: usize,
    pub capabilities: Capabilities,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_match_transition_table() {
        let stopped = Capabilities::derive(Phase::Stopped, true);
        assert!(stopped.can_start);
        assert!(stopped.can_reset);
        assert!(!stopped.can_pause);
        assert!(!stopped.can_resume);
        assert!(!stopped.can_stop);
        assert!(!stopped.can_record_lap);

        // Without a stage assigned there is nothing to start.
        assert!(!Capabilities::derive(Phase::Stopped, false).can_start);

        let running = Capabilities::derive(Phase::Running, true);
        assert!(running.can_pause);
        assert!(running.can_stop);
        assert!(running.can_record_lap);
        assert!(!running.can_start);
        assert!(!running.can_resume);
        assert!(!running.can_reset);

        let paused = Capabilities::derive(Phase::Paused, true);
        assert!(paused.can_resume);
        assert!(paused.can_stop);
        assert!(paused.can_reset);
        assert!(!paused.can_pause);
        assert!(!paused.can_record_lap);
    }

    #[test]
    fn lap_id_embeds_sequence_and_timestamp() {
        let id = LapId::generate(3, 1_700_000_000_000);
        assert_eq!(id.as_str(), "lap-3-1700000000000");
    }

    #[test]
    fn phase_display_is_lowercase() {
        assert_eq!(Phase::Stopped.to_string(), "stopped");
        assert_eq!(Phase::Running.to_string(), "running");
        assert_eq!(Phase::Paused.to_string(), "paused");
    }
}
