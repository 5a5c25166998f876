//! The client-side overlay cache the UI renders from and mutates optimistically.

use bevy::prelude::*;

use crate::error::OverlayError;

use super::model::{Geometry, Overlay, OverlayId, OverlayKey, OverlayKind, OverlayPatch, SyncStatus};
use super::normalize::normalize;
use super::wire::RawOverlay;

/// Fields needed to create a new overlay locally.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayDraft {
    pub kind: OverlayKind,
    pub content: String,
    pub geometry: Geometry,
}

/// Ordered overlay collection. Later entries render on top.
#[derive(Resource, Default, Debug)]
pub struct OverlayStore {
    overlays: Vec<Overlay>,
    next_key: u64,
    /// Set when the last listing failed, so the UI can say so.
    listing_error: Option<String>,
}

impl OverlayStore {
    fn allocate_key(&mut self) -> OverlayKey {
        let key = OverlayKey(self.next_key);
        self.next_key += 1;
        key
    }

    /// Record a local mutation: bump the revision and mark persisted entries modified.
    fn touch(overlay: &mut Overlay) {
        overlay.revision += 1;
        if matches!(overlay.status, SyncStatus::Synced | SyncStatus::Committing) {
            overlay.status = SyncStatus::Modified;
        }
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Overlay> {
        self.overlays.iter()
    }

    pub fn get(&self, key: OverlayKey) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.key == key)
    }

    pub fn get_mut(&mut self, key: OverlayKey) -> Option<&mut Overlay> {
        self.overlays.iter_mut().find(|o| o.key == key)
    }

    #[cfg(test)]
    pub fn find_by_id(&self, id: &OverlayId) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.id.as_ref() == Some(id))
    }

    pub fn contains(&self, key: OverlayKey) -> bool {
        self.get(key).is_some()
    }

    pub fn listing_error(&self) -> Option<&str> {
        self.listing_error.as_deref()
    }

    pub fn set_listing_error(&mut self, message: Option<String>) {
        self.listing_error = message;
    }

    /// Add a local draft (no remote id yet) at the top of the stack.
    pub fn insert_draft(&mut self, draft: OverlayDraft) -> OverlayKey {
        let key = self.allocate_key();
        self.overlays.push(Overlay {
            key,
            id: None,
            kind: draft.kind,
            content: draft.content,
            geometry: draft.geometry.rounded(),
            extra: serde_json::Map::new(),
            status: SyncStatus::Draft,
            revision: 0,
        });
        key
    }

    /// Drop a local entry outright. Used for drafts that were never persisted and for
    /// acknowledged deletes.
    pub fn remove(&mut self, key: OverlayKey) -> Option<Overlay> {
        let index = self.overlays.iter().position(|o| o.key == key)?;
        Some(self.overlays.remove(index))
    }

    /// Optimistically move/resize an overlay. Returns false if the key is gone.
    pub fn set_geometry(&mut self, key: OverlayKey, geometry: Geometry) -> bool {
        let Some(overlay) = self.get_mut(key) else {
            return false;
        };
        if overlay.geometry != geometry {
            overlay.geometry = geometry;
            Self::touch(overlay);
        }
        true
    }

    /// Apply explicit field edits locally. Returns false if the key is gone.
    pub fn apply_patch(&mut self, key: OverlayKey, patch: &OverlayPatch) -> bool {
        let Some(overlay) = self.get_mut(key) else {
            return false;
        };
        if patch.is_empty() {
            return true;
        }
        if let Some(kind) = patch.kind {
            overlay.kind = kind;
        }
        if let Some(content) = &patch.content {
            overlay.content = content.clone();
        }
        if let Some(geometry) = patch.geometry {
            overlay.geometry = geometry.clamped().rounded();
        }
        Self::touch(overlay);
        true
    }

    pub fn set_status(&mut self, key: OverlayKey, status: SyncStatus) -> bool {
        let Some(overlay) = self.get_mut(key) else {
            return false;
        };
        overlay.status = status;
        true
    }

    /// Overwrite a local entry with an authoritative record from the store.
    ///
    /// The record is normalized first; the local key and position in the stack are kept.
    pub fn apply_remote(&mut self, key: OverlayKey, raw: &RawOverlay, surface: Vec2) -> bool {
        let normalized = normalize(raw, surface);
        if let Some(notice) = normalized.ambiguity() {
            warn!("{}", notice);
        }
        let record = normalized.record;
        let Some(overlay) = self.get_mut(key) else {
            return false;
        };
        if record.id.is_some() {
            overlay.id = record.id;
        }
        overlay.kind = record.kind;
        overlay.content = record.content;
        overlay.geometry = Geometry::new(record.x, record.y, record.width, record.height);
        overlay.extra = record.extra;
        overlay.status = SyncStatus::Synced;
        true
    }

    /// Take the remote id from a create response without touching local fields.
    ///
    /// Used when the overlay was edited while its create was in flight; the local
    /// state is newer than the echo and still has to be committed.
    pub fn adopt_id(
        &mut self,
        key: OverlayKey,
        id: OverlayId,
        extra: serde_json::Map<String, serde_json::Value>,
    ) -> bool {
        let Some(overlay) = self.get_mut(key) else {
            return false;
        };
        overlay.id = Some(id);
        overlay.extra = extra;
        overlay.status = SyncStatus::Modified;
        true
    }

    /// Drop every entry other than `keep` that carries `id`.
    ///
    /// A listing that lands between the server storing a create and the create reply
    /// being handled adds the new record under its own key; the draft that owns the
    /// create wins. Returns how many entries were dropped.
    pub fn discard_duplicates(&mut self, keep: OverlayKey, id: &OverlayId) -> usize {
        let before = self.overlays.len();
        self.overlays
            .retain(|o| o.key == keep || o.id.as_ref() != Some(id));
        before - self.overlays.len()
    }

    /// Replace every persisted entry with a fresh listing from the remote store.
    ///
    /// Local drafts survive. Entries whose id is already known keep their key so that a
    /// live gesture keeps its target, and entries with unsaved or in-flight local changes
    /// keep their local fields. Returns the ambiguity notices raised while normalizing.
    pub fn replace_listing(&mut self, records: &[RawOverlay], surface: Vec2) -> Vec<OverlayError> {
        let mut notices = Vec::new();
        let mut previous: Vec<Overlay> = std::mem::take(&mut self.overlays);
        let mut next = Vec::with_capacity(records.len() + previous.len());

        for raw in records {
            let normalized = normalize(raw, surface);
            if let Some(notice) = normalized.ambiguity() {
                warn!("{}", notice);
                notices.push(notice);
            }
            let record = normalized.record;
            let Some(id) = record.id.clone() else {
                warn!("Ignoring listed overlay without an id: {}", record.describe());
                continue;
            };

            let mut existing = previous
                .iter()
                .position(|o| o.id.as_ref() == Some(&id))
                .map(|index| previous.remove(index));
            if let Some(overlay) = existing.take_if(|o| o.status != SyncStatus::Synced) {
                next.push(overlay);
                continue;
            }

            let key = match &existing {
                Some(overlay) => overlay.key,
                None => self.allocate_key(),
            };
            let revision = existing.as_ref().map(|o| o.revision).unwrap_or(0);

            next.push(Overlay {
                key,
                id: Some(id),
                kind: record.kind,
                content: record.content,
                geometry: Geometry::new(record.x, record.y, record.width, record.height),
                extra: record.extra,
                status: SyncStatus::Synced,
                revision,
            });
        }

        // Drafts were never on the server; keep them above the listed entries.
        next.extend(previous.into_iter().filter(|o| !o.is_persistent()));

        self.overlays = next;
        self.listing_error = None;
        notices
    }
}
