//! Integration tests for single-flight decoding
//!
//! Bursts of point changes must produce at most one outstanding decode call, and the
//! final overlay must reflect the most recent point state.

mod common;

use common::assertions::assert_points_close;
use common::mock_backend::MockBackend;
use common::test_frames::gradient;
use point_prompt_cutout::core::{DecodePhase, DecodeRequest, Point};
use point_prompt_cutout::{SegmentationSession, SessionState, UiEvent};
use tokio::sync::mpsc;

fn session(backend: &MockBackend) -> SegmentationSession {
    SegmentationSession::builder()
        .with_backend(backend.clone())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_burst_collapses_into_one_rerun_with_latest_points() {
    let backend = MockBackend::new();
    let mut session = session(&backend);
    session.load_rgba(gradient(10, 10)).unwrap();
    session.settle().await;

    for x in [1.0, 2.0, 3.0, 4.0, 5.0] {
        assert!(session.pointer_move(x, 5.0).unwrap());
    }
    assert_eq!(
        session.coordinator().phase(),
        DecodePhase::RunningWithPendingRerun
    );
    session.settle().await;

    let calls = backend.decode_calls();
    assert_eq!(calls.len(), 2);
    assert_points_close(&calls[0], &[Point::foreground(0.1, 0.5)]);
    assert_points_close(&calls[1], &[Point::foreground(0.5, 0.5)]);
    assert_eq!(session.coordinator().dispatched(), 2);
    assert_eq!(session.coordinator().coalesced(), 4);
    assert_eq!(session.coordinator().phase(), DecodePhase::Idle);
    assert_eq!(backend.max_in_flight(), 1);
}

#[tokio::test]
async fn test_request_while_running_is_coalesced() {
    let backend = MockBackend::new();
    let mut session = session(&backend);
    session.load_rgba(gradient(4, 4)).unwrap();
    session.settle().await;

    session.pointer_down(1.0, 1.0, 0).unwrap();
    assert_eq!(session.request_decode().unwrap(), DecodeRequest::Coalesced);
    session.settle().await;
    assert_eq!(backend.decode_calls().len(), 2);
}

#[tokio::test]
async fn test_failed_decode_releases_coordinator() {
    let backend = MockBackend::new();
    backend.fail_next_decodes(1);
    let mut session = session(&backend);
    session.load_rgba(gradient(4, 4)).unwrap();
    session.settle().await;

    session.pointer_down(1.0, 1.0, 0).unwrap();
    session.settle().await;
    assert!(session.status().starts_with("Decode failed"));
    assert!(session.overlay().is_none());
    assert_eq!(session.coordinator().phase(), DecodePhase::Idle);

    // No automatic retry; the next click decodes normally.
    assert_eq!(backend.decode_calls().len(), 1);
    session.pointer_down(3.0, 3.0, 0).unwrap();
    session.settle().await;
    assert!(session.overlay().is_some());
    assert_eq!(backend.decode_calls().len(), 2);
}

#[tokio::test]
async fn test_failed_decode_keeps_last_overlay() {
    let backend = MockBackend::new();
    let mut session = session(&backend);
    session.load_rgba(gradient(6, 6)).unwrap();
    session.settle().await;

    session.pointer_down(1.0, 1.0, 0).unwrap();
    session.settle().await;
    let before = session.overlay().unwrap().image().clone();

    backend.fail_next_decodes(1);
    session.pointer_down(4.0, 4.0, 2).unwrap();
    session.settle().await;

    assert_eq!(backend.decode_calls().len(), 2);
    assert_eq!(session.overlay().unwrap().image(), &before);
    assert!(session.status().starts_with("Decode failed: decoder crashed"));
    assert_eq!(session.coordinator().phase(), DecodePhase::Idle);
}

#[tokio::test]
async fn test_failed_decode_still_runs_pending_rerun() {
    let backend = MockBackend::new();
    backend.fail_next_decodes(1);
    let mut session = session(&backend);
    session.load_rgba(gradient(4, 4)).unwrap();
    session.settle().await;

    session.pointer_down(1.0, 1.0, 0).unwrap();
    session.pointer_down(3.0, 3.0, 2).unwrap();
    session.settle().await;

    assert_eq!(backend.decode_calls().len(), 2);
    assert!(session.overlay().is_some());
    assert!(session.status().starts_with("Score:"));
}

#[tokio::test]
async fn test_event_loop_keeps_single_decode_in_flight() {
    let backend = MockBackend::new();
    let mut session = session(&backend);
    let (tx, rx) = mpsc::channel(32);

    let driver = {
        let backend = backend.clone();
        async move {
            tx.send(UiEvent::LoadImage(gradient(10, 10))).await.unwrap();
            backend.embedding_returned().await;
            for x in [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0] {
                tx.send(UiEvent::PointerMove { x, y: 5.0 }).await.unwrap();
            }
        }
    };
    tokio::join!(session.run(rx), driver);

    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(backend.max_in_flight(), 1);
    let calls = backend.decode_calls();
    assert!(!calls.is_empty() && calls.len() < 7, "{} decode calls", calls.len());
    assert_points_close(calls.last().unwrap(), &[Point::foreground(0.7, 0.5)]);
    assert!(session.overlay().is_some());
    assert!(session.is_drained());
}
