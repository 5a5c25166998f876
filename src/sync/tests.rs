//! Unit tests for the sync protocol, against an in-memory remote store.

use std::sync::Mutex;

use bevy::prelude::*;

use crate::error::OverlayError;
use crate::overlay::store::OverlayDraft;
use crate::overlay::wire::CoordUnit;
use crate::overlay::{
    Geometry, OverlayId, OverlayKey, OverlayKind, OverlayPatch, OverlayStore, RawOverlay,
    SyncStatus,
};

use super::messages::SyncCommand;
use super::outbox::SyncOutbox;
use super::protocol::{execute, SyncAction, SyncRequest};
use super::remote::RemoteStore;

const SURFACE: Vec2 = Vec2::new(800.0, 450.0);

#[derive(Default)]
struct FakeState {
    records: Vec<RawOverlay>,
    next_id: u32,
    fail_with: Option<OverlayError>,
    omit_id: bool,
}

/// Remote store kept in memory. `fail_with` makes every call fail until cleared.
#[derive(Default)]
struct FakeRemote {
    state: Mutex<FakeState>,
}

impl FakeRemote {
    fn with_records(records: Vec<RawOverlay>) -> Self {
        Self {
            state: Mutex::new(FakeState {
                records,
                ..Default::default()
            }),
        }
    }

    fn fail_with(&self, error: Option<OverlayError>) {
        self.state.lock().unwrap().fail_with = error;
    }

    fn record(&self, id: &str) -> Option<RawOverlay> {
        let state = self.state.lock().unwrap();
        state
            .records
            .iter()
            .find(|r| r.id.as_ref().map(|i| i.as_str()) == Some(id))
            .cloned()
    }

    fn check(&self) -> Result<(), OverlayError> {
        match &self.state.lock().unwrap().fail_with {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl RemoteStore for FakeRemote {
    fn list(&self) -> Result<Vec<RawOverlay>, OverlayError> {
        self.check()?;
        Ok(self.state.lock().unwrap().records.clone())
    }

    fn create(&self, payload: &RawOverlay) -> Result<RawOverlay, OverlayError> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let mut record = payload.clone();
        record.id = Some(OverlayId(format!("srv-{}", state.next_id)));
        state.records.push(record.clone());
        if state.omit_id {
            record.id = None;
        }
        Ok(record)
    }

    fn update(&self, id: &OverlayId, payload: &RawOverlay) -> Result<RawOverlay, OverlayError> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        let Some(record) = state.records.iter_mut().find(|r| r.id.as_ref() == Some(id)) else {
            return Err(OverlayError::RemoteRejection("HTTP 404".into()));
        };
        *record = RawOverlay {
            id: Some(id.clone()),
            ..payload.clone()
        };
        Ok(record.clone())
    }

    fn delete(&self, id: &OverlayId) -> Result<(), OverlayError> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        let before = state.records.len();
        state.records.retain(|r| r.id.as_ref() != Some(id));
        if state.records.len() == before {
            return Err(OverlayError::RemoteRejection("HTTP 404".into()));
        }
        Ok(())
    }
}

fn record(id: &str, x: f32) -> RawOverlay {
    RawOverlay {
        id: Some(OverlayId(id.to_string())),
        kind: OverlayKind::Text,
        content: id.to_string(),
        x,
        y: 10.0,
        width: 20.0,
        height: 10.0,
        coord_unit: Some(CoordUnit::Percent),
        ..Default::default()
    }
}

fn draft() -> OverlayDraft {
    OverlayDraft {
        kind: OverlayKind::Text,
        content: "Overlay text".into(),
        geometry: Geometry::new(1.25, 2.22, 18.75, 8.89),
    }
}

/// Run one request to completion and return any follow-up request.
fn run(
    outbox: &mut SyncOutbox,
    store: &mut OverlayStore,
    remote: &FakeRemote,
    request: SyncRequest,
) -> (Option<super::protocol::SyncFailure>, Option<SyncRequest>) {
    let response = execute(remote, request);
    let completion = outbox.complete(store, response, SURFACE);
    (completion.reconciled.failure, completion.next)
}

/// Store and outbox loaded from the remote's current listing.
fn loaded(remote: &FakeRemote) -> (OverlayStore, SyncOutbox) {
    let mut store = OverlayStore::default();
    let mut outbox = SyncOutbox::default();
    let request = outbox.submit(&mut store, SyncCommand::Refresh).unwrap();
    run(&mut outbox, &mut store, remote, request);
    (store, outbox)
}

fn key_of(store: &OverlayStore, id: &str) -> OverlayKey {
    store.find_by_id(&OverlayId(id.into())).unwrap().key
}

// Listing tests
#[test]
fn test_initial_listing_normalizes_legacy_pixels() {
    let mut legacy = record("legacy", 760.0);
    legacy.coord_unit = None;
    legacy.y = 50.0;
    legacy.width = 640.0;
    legacy.height = 80.0;
    let remote = FakeRemote::with_records(vec![legacy]);

    let (store, outbox) = loaded(&remote);
    let overlay = store.find_by_id(&OverlayId("legacy".into())).unwrap();
    assert_eq!(overlay.geometry, Geometry::new(95.0, 11.11, 80.0, 17.78));
    assert!(!outbox.is_listing());
}

#[test]
fn test_listing_failure_is_visible_and_keeps_drafts() {
    let remote = FakeRemote::default();
    remote.fail_with(Some(OverlayError::NetworkFailure("refused".into())));
    let mut store = OverlayStore::default();
    let mut outbox = SyncOutbox::default();
    let draft_key = store.insert_draft(draft());

    let request = outbox.submit(&mut store, SyncCommand::Refresh).unwrap();
    let (failure, _) = run(&mut outbox, &mut store, &remote, request);

    assert_eq!(failure.unwrap().action, SyncAction::List);
    assert!(store.listing_error().is_some());
    assert!(store.contains(draft_key));
}

#[test]
fn test_refresh_not_duplicated_while_in_flight() {
    let mut store = OverlayStore::default();
    let mut outbox = SyncOutbox::default();
    assert!(outbox.submit(&mut store, SyncCommand::Refresh).is_some());
    assert!(outbox.submit(&mut store, SyncCommand::Refresh).is_none());
}

// Create tests
#[test]
fn test_create_assigns_id() {
    let remote = FakeRemote::default();
    let mut store = OverlayStore::default();
    let mut outbox = SyncOutbox::default();
    let key = store.insert_draft(draft());

    let request = outbox.submit(&mut store, SyncCommand::Create(key)).unwrap();
    assert_eq!(store.get(key).unwrap().status, SyncStatus::Creating);
    let SyncRequest::Create { payload, .. } = &request else {
        panic!("expected a create request");
    };
    assert_eq!(payload.coord_unit, Some(CoordUnit::Percent));
    assert!(payload.id.is_none());

    let (failure, next) = run(&mut outbox, &mut store, &remote, request);
    assert!(failure.is_none());
    assert!(next.is_none());
    let overlay = store.get(key).unwrap();
    assert_eq!(overlay.id, Some(OverlayId("srv-1".into())));
    assert_eq!(overlay.status, SyncStatus::Synced);
}

#[test]
fn test_create_failure_keeps_draft_and_allows_retry() {
    let remote = FakeRemote::default();
    remote.fail_with(Some(OverlayError::NetworkFailure("timed out".into())));
    let mut store = OverlayStore::default();
    let mut outbox = SyncOutbox::default();
    let key = store.insert_draft(draft());

    let request = outbox.submit(&mut store, SyncCommand::Create(key)).unwrap();
    let (failure, next) = run(&mut outbox, &mut store, &remote, request);
    assert_eq!(failure.unwrap().action, SyncAction::Create);
    assert!(next.is_none());

    let overlay = store.get(key).unwrap();
    assert!(matches!(overlay.status, SyncStatus::CreateFailed(_)));
    assert!(overlay.id.is_none());
    assert_eq!(overlay.content, "Overlay text");

    // Explicit retry
    remote.fail_with(None);
    let request = outbox.submit(&mut store, SyncCommand::Create(key)).unwrap();
    run(&mut outbox, &mut store, &remote, request);
    assert!(store.get(key).unwrap().id.is_some());
}

#[test]
fn test_create_response_without_id_is_rejected() {
    let remote = FakeRemote::default();
    remote.state.lock().unwrap().omit_id = true;
    let mut store = OverlayStore::default();
    let mut outbox = SyncOutbox::default();
    let key = store.insert_draft(draft());

    let request = outbox.submit(&mut store, SyncCommand::Create(key)).unwrap();
    let (failure, _) = run(&mut outbox, &mut store, &remote, request);

    assert!(matches!(
        failure.unwrap().error,
        OverlayError::RemoteRejection(_)
    ));
    assert!(matches!(store.get(key).unwrap().status, SyncStatus::CreateFailed(_)));
}

#[test]
fn test_listing_between_create_and_reply_keeps_one_entry() {
    let remote = FakeRemote::default();
    let mut store = OverlayStore::default();
    let mut outbox = SyncOutbox::default();
    let key = store.insert_draft(draft());

    let create = outbox.submit(&mut store, SyncCommand::Create(key)).unwrap();
    let listing = outbox.submit(&mut store, SyncCommand::Refresh).unwrap();

    // The server stores the overlay, then the listing reply is handled first
    let created = execute(&remote, create);
    let listed = execute(&remote, listing);
    outbox.complete(&mut store, listed, SURFACE);
    assert_eq!(store.len(), 2);

    let completion = outbox.complete(&mut store, created, SURFACE);
    assert!(completion.reconciled.failure.is_none());

    let id = OverlayId("srv-1".into());
    assert_eq!(store.iter().filter(|o| o.id.as_ref() == Some(&id)).count(), 1);
    assert_eq!(store.len(), 1);
    let overlay = store.get(key).unwrap();
    assert_eq!(overlay.id, Some(id));
    assert_eq!(overlay.status, SyncStatus::Synced);
}

#[test]
fn test_create_twice_is_ignored_while_in_flight() {
    let mut store = OverlayStore::default();
    let mut outbox = SyncOutbox::default();
    let key = store.insert_draft(draft());
    assert!(outbox.submit(&mut store, SyncCommand::Create(key)).is_some());
    assert!(outbox.submit(&mut store, SyncCommand::Create(key)).is_none());
}

#[test]
fn test_edit_during_create_is_committed_after() {
    let remote = FakeRemote::default();
    let mut store = OverlayStore::default();
    let mut outbox = SyncOutbox::default();
    let key = store.insert_draft(draft());

    let request = outbox.submit(&mut store, SyncCommand::Create(key)).unwrap();
    // Dragged while the create is in flight
    store.set_geometry(key, Geometry::new(40.0, 40.0, 18.75, 8.89));
    assert!(outbox.submit(&mut store, SyncCommand::Commit { key, patch: None }).is_none());

    let (_, next) = run(&mut outbox, &mut store, &remote, request);
    // The echo of the create is older than the local state
    assert_eq!(store.get(key).unwrap().geometry.x, 40.0);

    let next = next.unwrap();
    assert!(matches!(next, SyncRequest::Commit { .. }));
    run(&mut outbox, &mut store, &remote, next);

    assert_eq!(remote.record("srv-1").unwrap().x, 40.0);
    assert_eq!(store.get(key).unwrap().status, SyncStatus::Synced);
}

// Commit tests
#[test]
fn test_commit_round_trip() {
    let remote = FakeRemote::with_records(vec![record("a", 10.0)]);
    let (mut store, mut outbox) = loaded(&remote);
    let key = key_of(&store, "a");

    let moved = Geometry::new(50.0, 50.0, 20.0, 10.0);
    store.set_geometry(key, moved);
    let request = outbox.submit(&mut store, SyncCommand::Commit { key, patch: None }).unwrap();
    assert_eq!(store.get(key).unwrap().status, SyncStatus::Committing);

    let (failure, _) = run(&mut outbox, &mut store, &remote, request);
    assert!(failure.is_none());

    let overlay = store.get(key).unwrap();
    assert_eq!(overlay.geometry, moved);
    assert_eq!(overlay.status, SyncStatus::Synced);
    let stored = remote.record("a").unwrap();
    assert_eq!(stored.x, 50.0);
    assert_eq!(stored.coord_unit, Some(CoordUnit::Percent));
}

#[test]
fn test_commit_with_patch() {
    let remote = FakeRemote::with_records(vec![record("a", 10.0)]);
    let (mut store, mut outbox) = loaded(&remote);
    let key = key_of(&store, "a");

    let patch = OverlayPatch {
        content: Some("Breaking news".into()),
        ..Default::default()
    };
    let request = outbox
        .submit(&mut store, SyncCommand::Commit { key, patch: Some(patch) })
        .unwrap();
    assert_eq!(store.get(key).unwrap().content, "Breaking news");

    run(&mut outbox, &mut store, &remote, request);
    assert_eq!(remote.record("a").unwrap().content, "Breaking news");
}

#[test]
fn test_commit_failure_keeps_optimistic_value() {
    let remote = FakeRemote::with_records(vec![record("a", 10.0)]);
    let (mut store, mut outbox) = loaded(&remote);
    let key = key_of(&store, "a");

    store.set_geometry(key, Geometry::new(60.0, 10.0, 20.0, 10.0));
    remote.fail_with(Some(OverlayError::NetworkFailure("reset".into())));
    let request = outbox.submit(&mut store, SyncCommand::Commit { key, patch: None }).unwrap();
    let (failure, _) = run(&mut outbox, &mut store, &remote, request);

    assert_eq!(failure.unwrap().action, SyncAction::Commit);
    let overlay = store.get(key).unwrap();
    assert_eq!(overlay.geometry.x, 60.0);
    assert!(matches!(overlay.status, SyncStatus::Unsynced(_)));
    assert_eq!(remote.record("a").unwrap().x, 10.0);
}

#[test]
fn test_stale_echo_is_ignored() {
    let remote = FakeRemote::with_records(vec![record("a", 10.0)]);
    let (mut store, mut outbox) = loaded(&remote);
    let key = key_of(&store, "a");

    store.set_geometry(key, Geometry::new(20.0, 10.0, 20.0, 10.0));
    let request = outbox.submit(&mut store, SyncCommand::Commit { key, patch: None }).unwrap();

    // A new gesture moves it again before the echo arrives
    store.set_geometry(key, Geometry::new(70.0, 10.0, 20.0, 10.0));
    run(&mut outbox, &mut store, &remote, request);

    let overlay = store.get(key).unwrap();
    assert_eq!(overlay.geometry.x, 70.0);
    assert_eq!(overlay.status, SyncStatus::Modified);
}

#[test]
fn test_commits_for_one_overlay_are_serialized() {
    let remote = FakeRemote::with_records(vec![record("a", 10.0)]);
    let (mut store, mut outbox) = loaded(&remote);
    let key = key_of(&store, "a");

    store.set_geometry(key, Geometry::new(20.0, 10.0, 20.0, 10.0));
    let first = outbox.submit(&mut store, SyncCommand::Commit { key, patch: None }).unwrap();

    store.set_geometry(key, Geometry::new(30.0, 10.0, 20.0, 10.0));
    assert!(outbox.submit(&mut store, SyncCommand::Commit { key, patch: None }).is_none());
    assert!(outbox.is_busy(key));

    let (_, second) = run(&mut outbox, &mut store, &remote, first);
    let second = second.unwrap();
    let SyncRequest::Commit { payload, .. } = &second else {
        panic!("expected a commit");
    };
    assert_eq!(payload.x, 30.0);

    run(&mut outbox, &mut store, &remote, second);
    assert_eq!(remote.record("a").unwrap().x, 30.0);
    assert_eq!(store.get(key).unwrap().status, SyncStatus::Synced);
    assert!(!outbox.is_busy(key));
}

#[test]
fn test_different_overlays_commit_concurrently() {
    let remote = FakeRemote::with_records(vec![record("a", 10.0), record("b", 40.0)]);
    let (mut store, mut outbox) = loaded(&remote);
    let a = key_of(&store, "a");
    let b = key_of(&store, "b");

    store.set_geometry(a, Geometry::new(11.0, 10.0, 20.0, 10.0));
    store.set_geometry(b, Geometry::new(41.0, 10.0, 20.0, 10.0));
    assert!(outbox.submit(&mut store, SyncCommand::Commit { key: a, patch: None }).is_some());
    assert!(outbox.submit(&mut store, SyncCommand::Commit { key: b, patch: None }).is_some());
    assert_eq!(outbox.in_flight_count(), 2);
}

#[test]
fn test_commit_on_draft_stays_local() {
    let mut store = OverlayStore::default();
    let mut outbox = SyncOutbox::default();
    let key = store.insert_draft(draft());
    store.set_geometry(key, Geometry::new(5.0, 5.0, 10.0, 10.0));

    assert!(outbox.submit(&mut store, SyncCommand::Commit { key, patch: None }).is_none());
    assert_eq!(store.get(key).unwrap().status, SyncStatus::Draft);
}

// Remove tests
#[test]
fn test_remove_after_acknowledgement() {
    let remote = FakeRemote::with_records(vec![record("a", 10.0)]);
    let (mut store, mut outbox) = loaded(&remote);
    let key = key_of(&store, "a");

    let request = outbox.submit(&mut store, SyncCommand::Remove(key)).unwrap();
    // Still present until the store answers
    assert_eq!(store.get(key).unwrap().status, SyncStatus::Deleting);

    run(&mut outbox, &mut store, &remote, request);
    assert!(!store.contains(key));
    assert!(remote.record("a").is_none());
}

#[test]
fn test_remove_failure_keeps_overlay() {
    let remote = FakeRemote::with_records(vec![record("a", 10.0)]);
    let (mut store, mut outbox) = loaded(&remote);
    let key = key_of(&store, "a");

    remote.fail_with(Some(OverlayError::RemoteRejection("HTTP 500".into())));
    let request = outbox.submit(&mut store, SyncCommand::Remove(key)).unwrap();
    let (failure, _) = run(&mut outbox, &mut store, &remote, request);

    assert_eq!(failure.unwrap().action, SyncAction::Remove);
    let overlay = store.get(key).unwrap();
    assert_eq!(overlay.status, SyncStatus::Synced);
    assert_eq!(overlay.geometry.x, 10.0);
}

#[test]
fn test_remove_draft_is_local() {
    let mut store = OverlayStore::default();
    let mut outbox = SyncOutbox::default();
    let key = store.insert_draft(draft());

    assert!(outbox.submit(&mut store, SyncCommand::Remove(key)).is_none());
    assert!(!store.contains(key));
}

#[test]
fn test_remove_waits_for_in_flight_commit() {
    let remote = FakeRemote::with_records(vec![record("a", 10.0)]);
    let (mut store, mut outbox) = loaded(&remote);
    let key = key_of(&store, "a");

    store.set_geometry(key, Geometry::new(20.0, 10.0, 20.0, 10.0));
    let commit = outbox.submit(&mut store, SyncCommand::Commit { key, patch: None }).unwrap();
    assert!(outbox.submit(&mut store, SyncCommand::Remove(key)).is_none());

    let (_, next) = run(&mut outbox, &mut store, &remote, commit);
    let next = next.unwrap();
    assert!(matches!(next, SyncRequest::Remove { .. }));

    run(&mut outbox, &mut store, &remote, next);
    assert!(!store.contains(key));
}

#[test]
fn test_no_commit_while_deleting() {
    let remote = FakeRemote::with_records(vec![record("a", 10.0)]);
    let (mut store, mut outbox) = loaded(&remote);
    let key = key_of(&store, "a");

    outbox.submit(&mut store, SyncCommand::Remove(key)).unwrap();
    let patch = OverlayPatch::geometry(Geometry::new(90.0, 10.0, 20.0, 10.0));
    assert!(outbox
        .submit(&mut store, SyncCommand::Commit { key, patch: Some(patch) })
        .is_none());
    assert_eq!(store.get(key).unwrap().geometry.x, 10.0);
}
