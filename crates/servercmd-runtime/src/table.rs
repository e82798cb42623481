//! Id-keyed table of live executions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use servercmd_models::ExecutionId;

use crate::admission::AdmissionView;
use crate::context::ExecutionContext;

/// Table of execution contexts behind one coarse lock.
///
/// Entries are only ever removed by [`TableGuard::sweep`].
#[derive(Debug, Default)]
pub(crate) struct ExecutionTable {
    contexts: Mutex<HashMap<ExecutionId, Arc<ExecutionContext>>>,
}

impl ExecutionTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Locks the table. Keep the guard for short, non-blocking sections.
    pub(crate) fn lock(&self) -> TableGuard<'_> {
        TableGuard {
            contexts: self
                .contexts
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        }
    }
}

/// Exclusive access to the execution table.
pub(crate) struct TableGuard<'a> {
    contexts: MutexGuard<'a, HashMap<ExecutionId, Arc<ExecutionContext>>>,
}

impl TableGuard<'_> {
    pub(crate) fn get(&self, id: &ExecutionId) -> Option<&Arc<ExecutionContext>> {
        self.contexts.get(id)
    }

    /// Inserts a context. Returns false, leaving the table unchanged, if the
    /// id is already present.
    pub(crate) fn insert(&mut self, context: Arc<ExecutionContext>) -> bool {
        let id = context.execution_id().clone();
        if self.contexts.contains_key(&id) {
            return false;
        }
        self.contexts.insert(id, context);
        true
    }

    /// Removes every orphaned context and returns the evicted ids.
    pub(crate) fn sweep(&mut self, retention: Duration, now: Instant) -> Vec<ExecutionId> {
        let mut evicted = Vec::new();
        self.contexts.retain(|id, context| {
            if context.is_orphaned(retention, now) {
                evicted.push(id.clone());
                false
            } else {
                true
            }
        });
        evicted
    }

    pub(crate) fn view(&self) -> AdmissionView<'_> {
        AdmissionView::new(&self.contexts)
    }

    pub(crate) fn len(&self) -> usize {
        self.contexts.len()
    }
}
