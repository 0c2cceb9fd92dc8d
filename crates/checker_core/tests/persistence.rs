mod common;

use checker_core::{
    update, AppState, HistoryEntry, HistorySource, Msg, PersistedSnapshot, Store, View,
    BACKEND_HISTORY_CAP, STATE_VERSION,
};
use common::{at, ready_state, result_with_score};

fn init_logging() {
    checker_logging::initialize_for_tests();
}

#[test]
fn snapshot_round_trips_inputs_and_history() {
    init_logging();
    let (state, _) = update(
        ready_state(),
        Msg::CompleteAnalysis {
            result: result_with_score("a-1", 82.0),
            at: at(9),
        },
    );

    let snapshot = state.snapshot();
    assert_eq!(snapshot.version, STATE_VERSION);
    assert_eq!(snapshot.history.len(), 1);

    let (restored, _) = update(AppState::new(), Msg::RestoreSnapshot(snapshot));
    assert_eq!(restored.cv(), state.cv());
    assert_eq!(restored.job(), state.job());
    assert_eq!(restored.history().latest().unwrap().score, 82.0);
}

#[test]
fn transient_fields_are_not_restored() {
    init_logging();
    let (state, _) = update(ready_state(), Msg::SubmitAnalysis { streaming: true });
    let (state, _) = update(state, Msg::SetCurrentView(View::History));
    assert!(state.is_loading());

    let (restored, _) = update(AppState::new(), Msg::RestoreSnapshot(state.snapshot()));
    assert!(!restored.is_loading());
    assert_eq!(restored.current_view(), View::Upload);
    assert_eq!(restored.result(), None);
    assert!(restored.cv().is_some());
}

#[test]
fn stale_version_is_discarded() {
    init_logging();
    let mut snapshot = ready_state().snapshot();
    snapshot.version = STATE_VERSION - 1;

    let (restored, _) = update(ready_state(), Msg::RestoreSnapshot(snapshot));
    assert!(restored.cv().is_none());
    assert!(restored.job().is_none());
    assert!(restored.history().is_empty());
}

#[test]
fn default_snapshot_is_current_and_empty() {
    let snapshot = PersistedSnapshot::default();
    assert!(snapshot.is_current());
    let (restored, _) = update(ready_state(), Msg::RestoreSnapshot(snapshot));
    assert_eq!(restored.snapshot(), PersistedSnapshot::default());
}

#[test]
fn restored_history_respects_local_cap() {
    let mut state = AppState::new();
    for i in 0..15 {
        let (next, _) = update(
            state,
            Msg::CompleteAnalysis {
                result: result_with_score(&format!("a-{i}"), 50.0),
                at: at(i),
            },
        );
        state = next;
    }
    let snapshot = state.snapshot();
    assert_eq!(snapshot.history.len(), 10);

    let (restored, _) = update(AppState::with_history_cap(4), Msg::RestoreSnapshot(snapshot));
    assert_eq!(restored.history().len(), 4);
    assert_eq!(restored.history().latest().unwrap().id, "a-14");
}

#[test]
fn backend_page_survives_a_restart_intact() {
    let entries: Vec<HistoryEntry> = (0..20)
        .map(|i| HistoryEntry {
            id: format!("b-{i}"),
            timestamp: at(i),
            cv_filename: "cv.md".to_string(),
            score: 70.0,
            result: result_with_score(&format!("b-{i}"), 70.0),
        })
        .collect();
    let mut store = Store::default();
    store.send(Msg::HistoryLoaded(entries));
    let snapshot = store.state().snapshot();
    assert_eq!(snapshot.history.len(), BACKEND_HISTORY_CAP);
    assert_eq!(snapshot.history_source, HistorySource::Backend);

    let mut restarted = Store::default();
    restarted.send(Msg::RestoreSnapshot(snapshot));
    assert_eq!(restarted.state().history().len(), BACKEND_HISTORY_CAP);
    assert_eq!(restarted.state().history().source(), HistorySource::Backend);
}
