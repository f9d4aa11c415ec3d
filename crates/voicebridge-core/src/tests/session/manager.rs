use crate::{
    Theme,
    capture::CaptureEvent,
    session::manager::{
        MIN_TRANSCRIBE_BYTES, MSG_NOT_INITIALIZED, MSG_START_FAILED, MSG_TRANSCRIBE_FAILED,
    },
    tests::session::mock::{harness, large_blob, small_blob},
};

use std::sync::atomic::Ordering;

/// WHAT: First toggle lazily initializes and starts the engine
/// WHY: Recording must work without an explicit initialize() call
#[tokio::test]
async fn given_uninitialized_manager_when_toggling_then_engine_built_and_started() {
    // Given: A fresh, uninitialized manager
    let mut h = harness();
    assert!(!h.manager.state().initialized);

    // When: Toggling once
    h.manager.toggle_recording().await;

    // Then: One engine was constructed and asked to start
    assert_eq!(h.styles().len(), 1);
    assert_eq!(h.engine_starts.load(Ordering::SeqCst), 1);
    assert!(h.manager.state().initialized);
}

/// WHAT: Toggles while a transition is in flight are no-ops
/// WHY: Rapid double-clicks must not start a second transition
#[tokio::test]
async fn given_start_in_flight_when_toggling_again_then_ignored() {
    // Given: A start transition in flight (Started event not yet observed)
    let mut h = harness();
    h.manager.toggle_recording().await;
    assert_eq!(h.engine_starts.load(Ordering::SeqCst), 1);

    // When: Toggling repeatedly before the engine reports Started
    h.manager.toggle_recording().await;
    h.manager.toggle_recording().await;

    // Then: Only the first toggle had effect
    assert_eq!(h.engine_starts.load(Ordering::SeqCst), 1);
    assert_eq!(h.styles().len(), 1);
}

/// WHAT: Started event flips recording on and clears the last error
/// WHY: Recording state must track engine events, not start requests
#[tokio::test]
async fn given_started_event_when_applied_then_recording_true() {
    // Given: A manager with a start requested
    let mut h = harness();
    h.manager.toggle_recording().await;
    assert!(!h.manager.state().recording);

    // When: The engine reports the capture started
    h.manager.on_capture_event(CaptureEvent::Started).await;

    // Then: Recording is on and no error is shown
    let state = h.manager.state();
    assert!(state.recording);
    assert_eq!(state.last_error, None);
}

/// WHAT: A below-threshold capture is discarded silently
/// WHY: Accidental taps must not trigger uploads or errors
#[tokio::test]
async fn given_small_blob_when_capture_ends_then_no_upload_and_no_error() {
    // Given: An active capture
    let mut h = harness();
    h.manager.toggle_recording().await;
    h.manager.on_capture_event(CaptureEvent::Started).await;

    // When: The capture ends with a blob under the threshold
    assert!(small_blob().size() < MIN_TRANSCRIBE_BYTES);
    h.manager
        .on_capture_event(CaptureEvent::Ended(small_blob()))
        .await;

    // Then: No transcription ran, no processing, no error
    let state = h.manager.state();
    assert_eq!(h.transcribe_calls.load(Ordering::SeqCst), 0);
    assert!(!state.recording);
    assert!(!state.processing);
    assert_eq!(state.last_error, None);
    assert!(h.transcript_rx.try_recv().is_err());
}

/// WHAT: An accepted capture is uploaded and its transcript delivered once
/// WHY: The full record -> upload -> transcript path is the product
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_large_blob_when_capture_ends_then_transcript_delivered_once() {
    // Given: An active capture
    let mut h = harness();
    h.manager.toggle_recording().await;
    h.manager.on_capture_event(CaptureEvent::Started).await;

    // When: The capture ends with an accepted blob
    h.manager
        .on_capture_event(CaptureEvent::Ended(large_blob()))
        .await;

    // Then: Exactly one upload ran and the transcript arrived once
    assert_eq!(h.transcribe_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.transcript_rx.try_recv().unwrap(), "hello world");
    assert!(h.transcript_rx.try_recv().is_err());

    let state = h.manager.state();
    assert!(!state.processing);
    assert_eq!(state.last_error, None);
}

/// WHAT: A failed upload surfaces a message and clears processing
/// WHY: Transcription failures must become state, never propagate
#[tokio::test]
async fn given_transcription_failure_when_capture_ends_then_error_state_only() {
    // Given: An active capture with a failing transcriber
    let mut h = harness();
    h.transcribe_fail.store(true, Ordering::SeqCst);
    h.manager.toggle_recording().await;
    h.manager.on_capture_event(CaptureEvent::Started).await;

    // When: The capture ends with an accepted blob
    h.manager
        .on_capture_event(CaptureEvent::Ended(large_blob()))
        .await;

    // Then: Processing cleared, user-facing message set, no transcript
    let state = h.manager.state();
    assert!(!state.processing);
    assert_eq!(state.last_error.as_deref(), Some(MSG_TRANSCRIBE_FAILED));
    assert!(h.transcript_rx.try_recv().is_err());
}

/// WHAT: Cleanup drops the handle and the next start fully re-initializes
/// WHY: Teardown must not leave a half-usable session behind
#[tokio::test]
async fn given_cleanup_when_starting_again_then_fresh_engine_built() {
    // Given: An initialized manager that finished one capture
    let mut h = harness();
    h.manager.toggle_recording().await;
    h.manager.on_capture_event(CaptureEvent::Started).await;
    h.manager
        .on_capture_event(CaptureEvent::Ended(small_blob()))
        .await;
    assert_eq!(h.styles().len(), 1);

    // When: Cleaning up and toggling again
    h.manager.cleanup();
    assert!(!h.manager.state().initialized);
    h.manager.toggle_recording().await;

    // Then: A second engine was constructed
    assert_eq!(h.styles().len(), 2);
    assert_eq!(h.engine_starts.load(Ordering::SeqCst), 2);
}

/// WHAT: A theme change while idle rebuilds the engine with new colors
/// WHY: Waveform colors are baked in at construction time
#[tokio::test]
async fn given_idle_manager_when_theme_changes_then_engine_rebuilt() {
    // Given: An initialized, idle manager on the dark theme
    let mut h = harness();
    h.manager.initialize().await;
    assert_eq!(h.styles(), vec![Theme::Dark.waveform_style()]);

    // When: The observed theme flips to light
    h.manager.observe_theme(Theme::Light).await;

    // Then: A fresh engine carries the light colors and the session is ready
    assert_eq!(
        h.styles(),
        vec![Theme::Dark.waveform_style(), Theme::Light.waveform_style()]
    );
    assert!(h.manager.state().initialized);
}

/// WHAT: A theme change mid-recording does not touch the active capture
/// WHY: The in-progress waveform keeps its colors; the change applies on
///      the next idle initialization
#[tokio::test]
async fn given_recording_when_theme_changes_then_applied_only_on_next_init() {
    // Given: An active capture on the dark theme
    let mut h = harness();
    h.manager.toggle_recording().await;
    h.manager.on_capture_event(CaptureEvent::Started).await;

    // When: The observed theme flips mid-capture
    h.manager.observe_theme(Theme::Light).await;

    // Then: No rebuild happened, but the new value is retained
    assert_eq!(h.styles().len(), 1);
    assert_eq!(h.manager.theme(), Theme::Light);

    // And: The next initialization picks up the stored theme
    h.manager
        .on_capture_event(CaptureEvent::Ended(small_blob()))
        .await;
    h.manager.cleanup();
    h.manager.toggle_recording().await;
    assert_eq!(h.styles().last().copied(), Some(Theme::Light.waveform_style()));
}

/// WHAT: A denied device start sets an error and releases the guard
/// WHY: The user must be able to retry once permission is granted
#[tokio::test]
async fn given_denied_start_when_retrying_then_second_toggle_succeeds() {
    // Given: An engine that refuses to start
    let mut h = harness();
    h.fail_start.store(true, Ordering::SeqCst);

    // When: Toggling while denied
    h.manager.toggle_recording().await;

    // Then: Error shown, nothing recording
    let state = h.manager.state();
    assert_eq!(state.last_error.as_deref(), Some(MSG_START_FAILED));
    assert!(!state.recording);
    assert_eq!(h.engine_starts.load(Ordering::SeqCst), 0);

    // And: Once permission is granted, the next toggle starts cleanly,
    // proving the in-flight guard was released
    h.fail_start.store(false, Ordering::SeqCst);
    h.manager.toggle_recording().await;
    assert_eq!(h.engine_starts.load(Ordering::SeqCst), 1);
    assert_eq!(h.manager.state().last_error, None);
}

/// WHAT: Engine construction failure surfaces as not-initialized
/// WHY: A start without a usable handle must fail into state, not panic
#[tokio::test]
async fn given_factory_failure_when_toggling_then_not_initialized_error() {
    // Given: A factory that cannot build an engine
    let mut h = harness();
    h.fail_create.store(true, Ordering::SeqCst);

    // When: Toggling
    h.manager.toggle_recording().await;

    // Then: Error shown, session stays uninitialized
    let state = h.manager.state();
    assert_eq!(state.last_error.as_deref(), Some(MSG_NOT_INITIALIZED));
    assert!(!state.initialized);

    // And: The guard was released; a later toggle builds the engine
    h.fail_create.store(false, Ordering::SeqCst);
    h.manager.toggle_recording().await;
    assert_eq!(h.styles().len(), 1);
    assert_eq!(h.engine_starts.load(Ordering::SeqCst), 1);
}

/// WHAT: Toggling while recording requests a stop and clears the guard
/// WHY: Stop completion is observed via the Ended event, not the call
#[tokio::test]
async fn given_recording_when_toggling_then_stop_requested() {
    // Given: An active capture
    let mut h = harness();
    h.manager.toggle_recording().await;
    h.manager.on_capture_event(CaptureEvent::Started).await;
    assert!(h.manager.state().recording);

    // When: Toggling again
    h.manager.toggle_recording().await;

    // Then: The engine was asked to stop; recording clears on the event
    assert_eq!(h.engine_stops.load(Ordering::SeqCst), 1);
    h.manager
        .on_capture_event(CaptureEvent::Ended(small_blob()))
        .await;
    assert!(!h.manager.state().recording);
}
