use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;
use bevy::tasks::Task;

use crate::constants::{DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS, MAX_SYNC_FEEDBACK};

use super::protocol::SyncResponse;
use super::remote::{HttpRemoteStore, RemoteStore};

/// The remote store every sync task talks to.
#[derive(Resource, Clone)]
pub struct RemoteStoreHandle(pub Arc<dyn RemoteStore>);

impl Default for RemoteStoreHandle {
    fn default() -> Self {
        Self(Arc::new(HttpRemoteStore::new(
            DEFAULT_API_BASE_URL,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        )))
    }
}

/// Component for an in-flight remote request
#[derive(Component)]
pub struct SyncTask(pub Task<SyncResponse>);

/// Recent sync failures and notices for the operator, newest last.
#[derive(Resource, Default, Debug)]
pub struct SyncFeedback {
    entries: VecDeque<FeedbackEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackEntry {
    pub message: String,
    pub is_error: bool,
}

impl SyncFeedback {
    fn push(&mut self, message: String, is_error: bool) {
        self.entries.push_back(FeedbackEntry { message, is_error });
        while self.entries.len() > MAX_SYNC_FEEDBACK {
            self.entries.pop_front();
        }
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message.into(), true);
    }

    pub fn notice(&mut self, message: impl Into<String>) {
        self.push(message.into(), false);
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeedbackEntry> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dismiss(&mut self, index: usize) {
        self.entries.remove(index);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_keeps_newest() {
        let mut feedback = SyncFeedback::default();
        for i in 0..(MAX_SYNC_FEEDBACK + 2) {
            feedback.error(format!("failure {}", i));
        }
        let messages: Vec<_> = feedback.iter().map(|e| e.message.clone()).collect();
        assert_eq!(messages.len(), MAX_SYNC_FEEDBACK);
        assert_eq!(messages.last().unwrap(), &format!("failure {}", MAX_SYNC_FEEDBACK + 1));
        assert_eq!(messages.first().unwrap(), "failure 2");
    }

    #[test]
    fn test_feedback_dismiss() {
        let mut feedback = SyncFeedback::default();
        feedback.error("a");
        feedback.notice("b");
        feedback.dismiss(0);
        let entry = feedback.iter().next().unwrap();
        assert_eq!(entry.message, "b");
        assert!(!entry.is_error);
    }
}
