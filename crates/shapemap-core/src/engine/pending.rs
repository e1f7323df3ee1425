//! Deferred middleware results and their reconciliation
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

use crate::Result;
use futures::future::{join_all, BoxFuture};
use serde_json::Value;
use std::fmt;

/// A step from a result root to one of its slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Key(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(index) => write!(f, "{}", index),
        }
    }
}

pub(crate) type Location = Vec<Segment>;

pub(crate) type Task = BoxFuture<'static, Result<Value>>;

/// A deferred value waiting to be written into a per-source result
pub(crate) struct PendingEntry {
    pub source_index: usize,
    pub location: Location,
    pub task: Task,
}

impl fmt::Debug for PendingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingEntry")
            .field("source_index", &self.source_index)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

/// Await every entry, then write each value at its recorded slot
///
/// Entries are awaited together; writes and error reporting follow enqueue
/// order, so the first failing entry decides the error.
pub(crate) async fn reconcile(results: &mut [Value], pending: Vec<PendingEntry>) -> Result<()> {
    let (targets, tasks): (Vec<_>, Vec<_>) = pending
        .into_iter()
        .map(|entry| ((entry.source_index, entry.location), entry.task))
        .unzip();

    tracing::debug!(count = tasks.len(), "awaiting deferred middleware results");
    let resolved = join_all(tasks).await;

    for ((source_index, location), value) in targets.into_iter().zip(resolved) {
        let value = value?;
        match results.get_mut(source_index).and_then(|root| slot_mut(root, &location)) {
            Some(slot) => *slot = value,
            None => tracing::warn!(
                source_index,
                location = %describe(&location),
                "no slot for deferred result"
            ),
        }
    }
    Ok(())
}

fn slot_mut<'a>(root: &'a mut Value, location: &[Segment]) -> Option<&'a mut Value> {
    location.iter().try_fold(root, |current, segment| match segment {
        Segment::Key(key) => current.as_object_mut()?.get_mut(key),
        Segment::Index(index) => current.as_array_mut()?.get_mut(*index),
    })
}

/// Render a location as `a.b[2].c`
pub(crate) fn describe(location: &[Segment]) -> String {
    let mut rendered = String::new();
    for segment in location {
        match segment {
            Segment::Key(key) => {
                if !rendered.is_empty() {
                    rendered.push('.');
                }
                rendered.push_str(key);
            }
            Segment::Index(index) => rendered.push_str(&format!("[{}]", index)),
        }
    }
    rendered
}
