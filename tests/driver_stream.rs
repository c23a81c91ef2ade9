//! Integration tests for the tokio driver.
//!
//! These run against real time with generous tolerances: the driver's
//! job is snapshot plumbing and tick gating, not precise measurement
//! (the engine's arithmetic is covered deterministically elsewhere).

use std::time::Duration;

use futures::StreamExt;
use paceline::{Phase, StageId, TimerDriver, TimerEngine, TimingError};

fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}

#[tokio::test(flavor = "multi_thread")]
async fn driver_runs_a_full_session() {
    init_tracing();
    let timer = TimerDriver::spawn(TimerEngine::new());

    let initial = timer.snapshot();
    assert_eq!(initial.phase, Phase::Stopped);
    assert_eq!(initial.display, "00:00.00");
    assert!(!initial.capabilities.can_start); // no stage yet

    timer.start("stage-1").await.unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;

    let running = timer.snapshot();
    assert_eq!(running.phase, Phase::Running);
    assert!(running.capabilities.can_record_lap);
    assert!(running.elapsed_ms >= 100, "elapsed {} too small", running.elapsed_ms);
    assert!(running.elapsed_ms < 5_000, "elapsed {} too large", running.elapsed_ms);

    let lap = timer.record_lap().await.unwrap();
    assert!(lap.recorded_elapsed_ms >= 100);

    assert!(
        timer
            .update_lap_participant(lap.id.clone(), Some("p-1".into()), Some("Ana".into()))
            .await
            .unwrap()
    );
    assert!(timer.mark_lap_saved(lap.id.clone()).await.unwrap());

    let laps = timer.laps().await.unwrap();
    assert_eq!(laps.len(), 1);
    assert_eq!(laps[0].participant_id.as_deref(), Some("p-1"));
    assert!(laps[0].saved);

    timer.stop().await.unwrap();
    let stopped = timer.snapshot();
    assert_eq!(stopped.phase, Phase::Stopped);
    assert_eq!(stopped.lap_count, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn paused_timer_freezes_and_stops_ticking() {
    init_tracing();
    let timer = TimerDriver::spawn(TimerEngine::new());
    timer.start("stage-1").await.unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;

    timer.pause().await.unwrap();
    let frozen = timer.snapshot();
    assert_eq!(frozen.phase, Phase::Paused);

    // No ticks while paused: the snapshot stays byte-identical.
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(timer.snapshot(), frozen);

    timer.resume().await.unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;
    timer.stop().await.unwrap();

    let total = timer.snapshot().elapsed_ms;
    assert!(total >= frozen.elapsed_ms + 50, "resume did not accrue: {total}");
    assert!(total < frozen.elapsed_ms + 5_000);
}

#[tokio::test(flavor = "multi_thread")]
async fn snapshot_stream_tracks_the_running_display() {
    init_tracing();
    let timer = TimerDriver::spawn(TimerEngine::new());
    timer.start("stage-1").await.unwrap();

    let snapshots: Vec<_> = timer.subscribe().take(8).collect().await;
    assert_eq!(snapshots.len(), 8);
    for pair in snapshots.windows(2) {
        assert!(pair[0].elapsed_ms <= pair[1].elapsed_ms);
    }
    // Later snapshots come from the ticker, so time must actually move.
    assert!(snapshots.last().unwrap().elapsed_ms > 0);

    timer.stop().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_transitions_surface_as_errors_not_panics() {
    init_tracing();
    let timer = TimerDriver::spawn(TimerEngine::new());

    let err = timer.record_lap().await.unwrap_err();
    assert!(matches!(err, TimingError::InvalidTransition { phase: Phase::Stopped, .. }));

    timer.start("stage-1").await.unwrap();
    assert!(matches!(
        timer.reset().await.unwrap_err(),
        TimingError::InvalidTransition { phase: Phase::Running, .. }
    ));

    // Unknown lap ids are benign no-ops.
    assert!(!timer.update_lap_participant("lap-9-9".into(), None, None).await.unwrap());
    assert!(!timer.mark_lap_saved("lap-9-9".into()).await.unwrap());
}

#[tokio::test(flavor = "multi_thread")]
async fn stage_can_be_set_ahead_of_start() {
    init_tracing();
    let timer = TimerDriver::spawn(TimerEngine::new());

    timer.set_active_stage(Some(StageId::from("stage-9"))).await.unwrap();
    let snap = timer.snapshot();
    assert!(snap.capabilities.can_start);
    assert_eq!(snap.active_stage, Some(StageId::from("stage-9")));

    timer.start("stage-9").await.unwrap();
    timer.set_active_stage(None).await.unwrap();
    assert_eq!(timer.snapshot().phase, Phase::Running);
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_closes_the_handle() {
    init_tracing();
    let timer = TimerDriver::spawn(TimerEngine::new());
    timer.start("stage-1").await.unwrap();

    timer.shutdown();
    // The task observes cancellation on its next loop turn.
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(timer.start("stage-1").await.unwrap_err(), TimingError::DriverClosed);
}
