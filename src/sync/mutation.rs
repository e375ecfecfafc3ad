//! Mutation Pipeline
//!
//! User-initiated writes with perceived-immediate feedback: capture the
//! previous cached value, apply the edit locally, issue the remote write,
//! and roll the local edit back if the write fails. Mutations against the
//! same key serialize on a per-key async lock held across the write, so a
//! concurrent second mutation always observes the first one's outcome as
//! its rollback baseline.

use crate::error::Result;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
pub struct MutationPipeline {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl MutationPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Run one optimistic mutation against `key`.
    ///
    /// `capture` snapshots the pre-mutation value, `apply` lands the edit in
    /// the Entity Cache, `write` performs exactly one remote call, and
    /// `restore` undoes the edit when the write fails. The failure is never
    /// retried here; it propagates to the caller for surfacing.
    pub async fn run<P, Fut>(
        &self,
        key: &str,
        capture: impl FnOnce() -> P,
        apply: impl FnOnce(),
        restore: impl FnOnce(P),
        write: impl FnOnce() -> Fut,
    ) -> Result<()>
    where
        Fut: Future<Output = Result<()>>,
    {
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        let previous = capture();
        apply();

        match write().await {
            Ok(()) => Ok(()),
            Err(err) => {
                restore(previous);
                Err(err)
            }
        }
    }
}
