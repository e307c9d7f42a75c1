//! Registry of active trackers.
//!
//! The HTTP layer activates a tracker when the UI opens a file's
//! analysis panel and deactivates it when the panel closes or the
//! user navigates to another file. One tracker per file id; repeated
//! activation reuses the existing tracker rather than spawning a
//! second poll loop.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::tracker::AnalysisTracker;
use crate::auth::Credential;
use crate::backend::DicomBackend;

pub struct TrackerRegistry {
    backend: Arc<dyn DicomBackend>,
    trackers: Mutex<HashMap<String, Arc<AnalysisTracker>>>,
}

impl TrackerRegistry {
    pub fn new(backend: Arc<dyn DicomBackend>) -> Self {
        Self {
            backend,
            trackers: Mutex::new(HashMap::new()),
        }
    }

    /// Start tracking `subject_id`, or return the tracker already
    /// running for it. The credential of the first activation is the
    /// one the poll loop uses.
    pub fn activate(&self, subject_id: &str, cred: Credential) -> Arc<AnalysisTracker> {
        let mut trackers = self.trackers.lock().unwrap();
        if let Some(existing) = trackers.get(subject_id) {
            if !existing.is_deactivated() {
                return Arc::clone(existing);
            }
        }
        tracing::info!(subject_id, "activating analysis tracker");
        let tracker = AnalysisTracker::activate(Arc::clone(&self.backend), cred, subject_id);
        trackers.insert(subject_id.to_string(), Arc::clone(&tracker));
        tracker
    }

    pub fn get(&self, subject_id: &str) -> Option<Arc<AnalysisTracker>> {
        self.trackers
            .lock()
            .unwrap()
            .get(subject_id)
            .filter(|t| !t.is_deactivated())
            .cloned()
    }

    /// Stop tracking and drop the tracker. Safe to call for an
    /// unknown id.
    pub fn deactivate(&self, subject_id: &str) {
        if let Some(tracker) = self.trackers.lock().unwrap().remove(subject_id) {
            tracker.deactivate();
        }
    }

    /// Cancel every tracker, used at server shutdown.
    pub fn deactivate_all(&self) {
        let mut trackers = self.trackers.lock().unwrap();
        for tracker in trackers.values() {
            tracker.deactivate();
        }
        trackers.clear();
    }

    pub fn active_count(&self) -> usize {
        self.trackers.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;

    fn registry() -> TrackerRegistry {
        TrackerRegistry::new(Arc::new(MockBackend::new()))
    }

    #[tokio::test]
    async fn activation_is_idempotent() {
        let reg = registry();
        let first = reg.activate("f1", Credential::anonymous());
        let second = reg.activate("f1", Credential::anonymous());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(reg.active_count(), 1);
    }

    #[tokio::test]
    async fn distinct_subjects_get_distinct_trackers() {
        let reg = registry();
        let a = reg.activate("f1", Credential::anonymous());
        let b = reg.activate("f2", Credential::anonymous());
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(reg.active_count(), 2);
    }

    #[tokio::test]
    async fn deactivation_cancels_and_forgets() {
        let reg = registry();
        let tracker = reg.activate("f1", Credential::anonymous());
        reg.deactivate("f1");
        assert!(tracker.is_deactivated());
        assert!(reg.get("f1").is_none());
        assert_eq!(reg.active_count(), 0);

        // Unknown id is fine.
        reg.deactivate("nope");
    }

    #[tokio::test]
    async fn reactivation_after_deactivation_spawns_fresh_tracker() {
        let reg = registry();
        let first = reg.activate("f1", Credential::anonymous());
        reg.deactivate("f1");
        let second = reg.activate("f1", Credential::anonymous());
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(!second.is_deactivated());
    }

    #[tokio::test]
    async fn deactivate_all_clears_everything() {
        let reg = registry();
        let a = reg.activate("f1", Credential::anonymous());
        let b = reg.activate("f2", Credential::anonymous());
        reg.deactivate_all();
        assert!(a.is_deactivated());
        assert!(b.is_deactivated());
        assert_eq!(reg.active_count(), 0);
    }
}
